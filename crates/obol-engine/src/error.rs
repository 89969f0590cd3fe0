//! Error types for the engine.

use chrono::NaiveDate;
use obol_types::Target;
use thiserror::Error;

use crate::SinkError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that stop an engine run.
///
/// Skipped days are not errors; see [`crate::DaySkip`].
#[derive(Error, Debug)]
pub enum EngineError {
    /// A day was submitted at or before the last committed day.
    #[error("Day {date} is not after the last committed day {last}")]
    DayOutOfOrder {
        /// The rejected day.
        date: NaiveDate,
        /// The last committed day.
        last: NaiveDate,
    },

    /// A plan was prepared from state that has since been committed past.
    #[error("Plan for {date} was prepared before the last commit")]
    StalePlan {
        /// Day of the stale plan.
        date: NaiveDate,
    },

    /// A plan was prepared by an engine with different targets.
    #[error("Plan targets do not match the engine's targets")]
    PlanMismatch,

    /// The sink rejected a day's bars.
    #[error("Failed to write {target} bars for {date}: {source}")]
    Sink {
        /// Target whose bars were being written.
        target: Target,
        /// Day being written.
        date: NaiveDate,
        /// Underlying sink error.
        source: SinkError,
    },

    /// A per-target aggregation task did not finish.
    #[error("Aggregation task failed: {0}")]
    Join(String),
}
