//! Adaptive dollar-bar construction from trade ticks.
//!
//! This is a facade crate that re-exports functionality from the obol
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use obol_lib::prelude::*;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let volumes = [
//!     DailyVolume::new(day(1), 1_000_000.0),
//!     DailyVolume::new(day(2), 1_000_000.0),
//! ];
//! let config = EngineConfig::new(&[1000], 1)?;
//! let mut engine = Engine::from_volumes(config, &volumes)?;
//!
//! // Threshold on day 2 is 1,000,000 / 1000 = 1,000 dollars.
//! let source = MemoryTickSource::new().with_day(
//!     day(2),
//!     vec![Tick::new(0, 600.0, 1.0), Tick::new(1, 500.0, 1.0)],
//! );
//! let mut sink = MemorySink::new();
//! let summary = engine.run(&source, &mut sink)?;
//!
//! assert_eq!(summary.processed_days, 1);
//! assert_eq!(sink.bars_for(Target::new(1000)?).len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/obol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use obol_types::*;

// Re-export ADV estimation and scheduling
pub use obol_adv::{
    AdvPolicy, AdvSource, DaySchedule, RollingAdv, ThresholdScheduler, thresholds_for,
};

// Re-export aggregation
pub use obol_aggregate::{
    AggregatorState, ChunkOutput, DollarBar, DollarBarAggregator, aggregate_chunk,
    aggregate_chunk_with_capacity,
};

// Re-export orchestration
pub use obol_engine::{
    BarSink, DayOutput, DayPlan, DayResult, DaySkip, DaySummary, Engine, EngineConfig,
    EngineError, MemorySink, MemoryTickSource, RunSummary, SinkError, SkipCounts, SourceError,
    TickSource,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use obol_format::{
    CsvFormatter, FileSink, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat,
    OutputLayout,
};

#[cfg(all(feature = "format", feature = "parquet"))]
pub use obol_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use obol_lib::prelude::*;
/// ```
pub mod prelude {
    pub use obol_types::{ConfigError, DailyVolume, Target, TargetTable, Tick, TickError};

    pub use obol_adv::{AdvPolicy, RollingAdv, ThresholdScheduler};

    pub use obol_aggregate::{AggregatorState, DollarBar, DollarBarAggregator};

    pub use obol_engine::{
        BarSink, DayResult, DaySkip, Engine, EngineConfig, EngineError, MemorySink,
        MemoryTickSource, RunSummary, TickSource,
    };

    #[cfg(feature = "format")]
    pub use obol_format::{CsvFormatter, FileSink, Formatter, JsonFormatter, OutputLayout};

    #[cfg(all(feature = "format", feature = "parquet"))]
    pub use obol_format::ParquetFormatter;
}
