//! Trade tick representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TickError;

/// A single executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Trade time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Execution price.
    pub price: f64,
    /// Executed quantity in base units.
    pub quantity: f64,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(timestamp: i64, price: f64, quantity: f64) -> Self {
        Self {
            timestamp,
            price,
            quantity,
        }
    }

    /// Returns the traded dollar value (price * quantity).
    #[must_use]
    pub fn dollar_value(&self) -> f64 {
        self.price * self.quantity
    }

    /// Returns the trade time as a UTC datetime.
    ///
    /// Returns `None` if the timestamp is outside chrono's range.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Checks that price and quantity are finite and strictly positive, and
    /// that their product does not overflow.
    ///
    /// # Errors
    ///
    /// Returns the first violated field, tagged with `index`.
    pub fn validate(&self, index: usize) -> Result<(), TickError> {
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(TickError::InvalidPrice {
                index,
                price: self.price,
            });
        }
        if !(self.quantity.is_finite() && self.quantity > 0.0) {
            return Err(TickError::InvalidQuantity {
                index,
                quantity: self.quantity,
            });
        }
        let value = self.dollar_value();
        if !value.is_finite() {
            return Err(TickError::InvalidDollarValue { index, value });
        }
        Ok(())
    }
}

/// Validates one day's tick slice.
///
/// Every tick must be valid and timestamps must be non-decreasing.
///
/// # Errors
///
/// Returns the first problem found.
pub fn validate_day(ticks: &[Tick]) -> Result<(), TickError> {
    let mut previous: Option<i64> = None;
    for (index, tick) in ticks.iter().enumerate() {
        tick.validate(index)?;
        if let Some(previous) = previous
            && tick.timestamp < previous
        {
            return Err(TickError::OutOfOrder {
                index,
                timestamp: tick.timestamp,
                previous,
            });
        }
        previous = Some(tick.timestamp);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_dollar_value() {
        let tick = Tick::new(1, 101.5, 2.0);
        assert_relative_eq!(tick.dollar_value(), 203.0);
    }

    #[test]
    fn test_datetime() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 1).unwrap();
        let tick = Tick::new(expected.timestamp_millis(), 1.0, 1.0);
        assert_eq!(tick.datetime(), Some(expected));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Tick::new(0, 100.0, 1.0).validate(0).is_ok());
        assert_eq!(
            Tick::new(0, -1.0, 1.0).validate(3),
            Err(TickError::InvalidPrice {
                index: 3,
                price: -1.0
            })
        );
        assert!(matches!(
            Tick::new(0, 1.0, 0.0).validate(0),
            Err(TickError::InvalidQuantity { .. })
        ));
        assert!(Tick::new(0, f64::NAN, 1.0).validate(0).is_err());
        assert!(Tick::new(0, 1.0, f64::INFINITY).validate(0).is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_dollar_value() {
        let tick = Tick::new(0, 1e200, 1e200);
        assert!(tick.price.is_finite() && tick.quantity.is_finite());
        assert_eq!(
            tick.validate(2),
            Err(TickError::InvalidDollarValue {
                index: 2,
                value: f64::INFINITY
            })
        );
        assert!(matches!(
            validate_day(&[Tick::new(0, 1.0, 1.0), tick]),
            Err(TickError::InvalidDollarValue { index: 1, .. })
        ));
        assert!(Tick::new(0, f64::MAX, 1.0).validate(0).is_ok());
    }

    #[test]
    fn test_validate_day_ordering() {
        let ordered = [
            Tick::new(1, 1.0, 1.0),
            Tick::new(1, 1.0, 1.0),
            Tick::new(2, 1.0, 1.0),
        ];
        assert!(validate_day(&ordered).is_ok());
        assert!(validate_day(&[]).is_ok());

        let unordered = [Tick::new(5, 1.0, 1.0), Tick::new(4, 1.0, 1.0)];
        assert_eq!(
            validate_day(&unordered),
            Err(TickError::OutOfOrder {
                index: 1,
                timestamp: 4,
                previous: 5
            })
        );
    }
}
