//! Multi-target dollar-bar orchestration.
//!
//! - [`Engine`] - Runs every target over each trading day and commits atomically
//! - [`EngineConfig`] - Validated targets, ADV window, and naming
//! - [`TickSource`] / [`BarSink`] - Input and output seams
//! - [`DaySummary`] / [`RunSummary`] - Per-day and per-run reporting

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/obol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod engine;
mod error;
mod io;
mod summary;

pub use config::{DEFAULT_TARGETS, DEFAULT_WINDOW_DAYS, EngineConfig};
pub use engine::{DayOutput, DayPlan, DayResult, DaySkip, Engine};
pub use error::{EngineError, Result};
pub use io::{BarSink, MemorySink, MemoryTickSource, SinkError, SourceError, TickSource};
pub use summary::{DaySummary, RunSummary, SkipCounts};
