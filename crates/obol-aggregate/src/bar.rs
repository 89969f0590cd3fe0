//! Dollar bar data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed dollar bar.
///
/// Bars are immutable once emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DollarBar {
    /// Timestamp of the tick that closed the bar (epoch ms).
    #[serde(rename = "timestamp")]
    pub close_timestamp: i64,
    /// Price of the first tick in the bar.
    pub open: f64,
    /// Highest traded price in the bar.
    pub high: f64,
    /// Lowest traded price in the bar.
    pub low: f64,
    /// Price of the closing tick.
    pub close: f64,
    /// Total quantity traded.
    pub volume: f64,
    /// Total dollar value traded (sum of price * quantity).
    pub dollar_value: f64,
}

impl DollarBar {
    /// Creates a new dollar bar.
    #[must_use]
    pub const fn new(
        close_timestamp: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        dollar_value: f64,
    ) -> Self {
        Self {
            close_timestamp,
            open,
            high,
            low,
            close,
            volume,
            dollar_value,
        }
    }

    /// Returns the close time as a UTC datetime.
    #[must_use]
    pub fn close_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.close_timestamp)
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the volume-weighted average price.
    #[must_use]
    pub fn vwap(&self) -> f64 {
        self.dollar_value / self.volume
    }

    /// Returns true if the bar closed above its open.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if the bar closed below its open.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}
