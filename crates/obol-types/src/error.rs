//! Error types for obol.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building an engine configuration.
///
/// These are fatal: they are reported before any aggregator state exists.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A target divisor was zero, negative, or too large.
    #[error("Invalid target {0}: targets must be positive integers")]
    InvalidTarget(i64),

    /// The same target appeared twice.
    #[error("Duplicate target {0}")]
    DuplicateTarget(u32),

    /// No targets were configured.
    #[error("At least one target must be configured")]
    NoTargets,

    /// The rolling window was zero or negative.
    #[error("Invalid rolling window {0}: must be at least one day")]
    InvalidWindow(i64),

    /// A naming field was empty.
    #[error("Configuration field '{0}' must not be empty")]
    EmptyName(&'static str),

    /// Failed to read a configuration file.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A tick that cannot be aggregated.
///
/// Any of these rejects the whole day it belongs to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TickError {
    /// Price was not finite and strictly positive.
    #[error("Tick {index} has invalid price {price}")]
    InvalidPrice {
        /// Position of the tick in its day.
        index: usize,
        /// The offending price.
        price: f64,
    },

    /// Quantity was not finite and strictly positive.
    #[error("Tick {index} has invalid quantity {quantity}")]
    InvalidQuantity {
        /// Position of the tick in its day.
        index: usize,
        /// The offending quantity.
        quantity: f64,
    },

    /// Price times quantity overflowed.
    #[error("Tick {index} has non-finite dollar value {value}")]
    InvalidDollarValue {
        /// Position of the tick in its day.
        index: usize,
        /// The overflowed product.
        value: f64,
    },

    /// Timestamp went backwards.
    #[error("Tick {index} at {timestamp} precedes previous tick at {previous}")]
    OutOfOrder {
        /// Position of the tick in its day.
        index: usize,
        /// Timestamp of the offending tick (epoch ms).
        timestamp: i64,
        /// Timestamp of the tick before it (epoch ms).
        previous: i64,
    },
}
