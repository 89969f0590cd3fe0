//! Daily quote volume.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Dollar (quote) volume traded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyVolume {
    /// Calendar day (UTC).
    pub date: NaiveDate,
    /// Quote-currency volume traded that day.
    pub quote_volume: f64,
}

impl DailyVolume {
    /// Creates a new daily volume entry.
    #[must_use]
    pub const fn new(date: NaiveDate, quote_volume: f64) -> Self {
        Self { date, quote_volume }
    }

    /// Creates an entry from a daily kline's open time (epoch ms).
    ///
    /// The open time is truncated to its UTC calendar day. Returns `None`
    /// if the open time is outside chrono's range.
    #[must_use]
    pub fn from_open_time(open_time_ms: i64, quote_volume: f64) -> Option<Self> {
        let date = DateTime::from_timestamp_millis(open_time_ms)?.date_naive();
        Some(Self::new(date, quote_volume))
    }

    /// Returns true if the volume is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.quote_volume.is_finite() && self.quote_volume >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_from_open_time_truncates_to_day() {
        let open = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let volume = DailyVolume::from_open_time(open.timestamp_millis(), 10.0).unwrap();
        assert_eq!(volume.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        let late = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        let volume = DailyVolume::from_open_time(late.timestamp_millis(), 10.0).unwrap();
        assert_eq!(volume.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_is_valid() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DailyVolume::new(date, 0.0).is_valid());
        assert!(!DailyVolume::new(date, -1.0).is_valid());
        assert!(!DailyVolume::new(date, f64::NAN).is_valid());
    }
}
