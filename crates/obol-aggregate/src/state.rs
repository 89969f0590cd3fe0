//! In-progress bar state.

use obol_types::Tick;

use crate::DollarBar;

/// Accumulators for a bar that has not been emitted yet.
///
/// A fresh state has zero accumulated dollar value, `-inf`/`+inf` extremes
/// and no open price. The state returned by one aggregation call is the exact
/// input of the next call for the same target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorState {
    cumulative_dollar: f64,
    cumulative_volume: f64,
    running_high: f64,
    running_low: f64,
    bar_open_price: Option<f64>,
}

impl AggregatorState {
    /// Creates a zero-initialised state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cumulative_dollar: 0.0,
            cumulative_volume: 0.0,
            running_high: f64::NEG_INFINITY,
            running_low: f64::INFINITY,
            bar_open_price: None,
        }
    }

    /// Returns true if no tick has contributed to the current bar.
    ///
    /// The accumulator is reset by assignment, so this is an exact test.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_fresh(&self) -> bool {
        self.cumulative_dollar == 0.0
    }

    /// Dollar value accumulated in the current bar.
    #[must_use]
    pub const fn cumulative_dollar(&self) -> f64 {
        self.cumulative_dollar
    }

    /// Quantity accumulated in the current bar.
    #[must_use]
    pub const fn cumulative_volume(&self) -> f64 {
        self.cumulative_volume
    }

    /// Highest price seen in the current bar (`-inf` when fresh).
    #[must_use]
    pub const fn running_high(&self) -> f64 {
        self.running_high
    }

    /// Lowest price seen in the current bar (`+inf` when fresh).
    #[must_use]
    pub const fn running_low(&self) -> f64 {
        self.running_low
    }

    /// Price of the first tick in the current bar.
    #[must_use]
    pub const fn bar_open_price(&self) -> Option<f64> {
        self.bar_open_price
    }

    /// Adds a tick to the current bar.
    pub(crate) fn accumulate(&mut self, tick: &Tick) {
        let price = tick.price;
        if self.is_fresh() {
            self.bar_open_price = Some(price);
            self.running_high = price;
            self.running_low = price;
        } else {
            self.running_high = self.running_high.max(price);
            self.running_low = self.running_low.min(price);
        }
        self.cumulative_volume += tick.quantity;
        self.cumulative_dollar += tick.dollar_value();
    }

    /// Emits the current bar, closed by `tick`, and resets the accumulators.
    pub(crate) fn close(&mut self, tick: &Tick) -> DollarBar {
        let bar = DollarBar::new(
            tick.timestamp,
            self.bar_open_price.unwrap_or(tick.price),
            self.running_high,
            self.running_low,
            tick.price,
            self.cumulative_volume,
            self.cumulative_dollar,
        );
        *self = Self::new();
        bar
    }
}

impl Default for AggregatorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_state_is_fresh() {
        let state = AggregatorState::new();
        assert!(state.is_fresh());
        assert_eq!(state.running_high(), f64::NEG_INFINITY);
        assert_eq!(state.running_low(), f64::INFINITY);
        assert_eq!(state.bar_open_price(), None);
        assert_eq!(state, AggregatorState::default());
    }

    #[test]
    fn test_accumulate_tracks_extremes() {
        let mut state = AggregatorState::new();
        state.accumulate(&Tick::new(1, 100.0, 1.0));
        state.accumulate(&Tick::new(2, 103.0, 0.5));
        state.accumulate(&Tick::new(3, 98.0, 2.0));

        assert_eq!(state.bar_open_price(), Some(100.0));
        assert_relative_eq!(state.running_high(), 103.0);
        assert_relative_eq!(state.running_low(), 98.0);
        assert_relative_eq!(state.cumulative_volume(), 3.5);
        assert_relative_eq!(state.cumulative_dollar(), 100.0 + 51.5 + 196.0);
        assert!(!state.is_fresh());
    }

    #[test]
    fn test_close_resets() {
        let mut state = AggregatorState::new();
        let tick = Tick::new(7, 50.0, 2.0);
        state.accumulate(&tick);
        let bar = state.close(&tick);

        assert_eq!(bar, DollarBar::new(7, 50.0, 50.0, 50.0, 50.0, 2.0, 100.0));
        assert_eq!(state, AggregatorState::new());
    }
}
