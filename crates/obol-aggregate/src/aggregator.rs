//! Threshold-driven tick-to-bar aggregation.

use obol_types::Tick;

use crate::{AggregatorState, DollarBar};

/// Streaming dollar-bar aggregator.
///
/// Accumulates ticks until their summed dollar value reaches the threshold,
/// then emits a bar on that same tick and starts over.
#[derive(Debug, Clone)]
pub struct DollarBarAggregator {
    threshold: f64,
    state: AggregatorState,
}

impl DollarBarAggregator {
    /// Creates an aggregator resuming from `state`.
    ///
    /// `threshold` must be finite and strictly positive.
    #[must_use]
    pub fn new(threshold: f64, state: AggregatorState) -> Self {
        debug_assert!(threshold.is_finite() && threshold > 0.0);
        Self { threshold, state }
    }

    /// Returns the dollar threshold of this aggregator.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the in-progress bar state.
    #[must_use]
    pub const fn state(&self) -> &AggregatorState {
        &self.state
    }

    /// Processes a tick, potentially emitting a completed bar.
    ///
    /// Returns `Some(bar)` when this tick brings the accumulated dollar value
    /// to or above the threshold. The tick is counted whole in that bar.
    pub fn process(&mut self, tick: &Tick) -> Option<DollarBar> {
        self.state.accumulate(tick);
        (self.state.cumulative_dollar() >= self.threshold).then(|| self.state.close(tick))
    }

    /// Finishes the chunk, returning the state to carry into the next one.
    ///
    /// Unlike time bars, an unfinished dollar bar is never emitted here.
    #[must_use]
    pub const fn into_state(self) -> AggregatorState {
        self.state
    }
}

/// Result of aggregating one tick slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOutput {
    /// Bars completed in this slice, in emission order.
    pub bars: Vec<DollarBar>,
    /// State to carry into the next slice.
    pub state: AggregatorState,
}

/// Aggregates a tick slice in a single forward pass.
///
/// Equivalent to [`aggregate_chunk_with_capacity`] with a hint derived from
/// the slice length.
#[must_use]
pub fn aggregate_chunk(ticks: &[Tick], threshold: f64, state: AggregatorState) -> ChunkOutput {
    let hint = ticks.len() / 16 + 1;
    aggregate_chunk_with_capacity(ticks, threshold, state, hint)
}

/// Aggregates a tick slice, pre-allocating room for `capacity_hint` bars.
///
/// The hint only sizes the first allocation; the output grows as needed and
/// is trimmed to the emitted count before returning.
#[must_use]
pub fn aggregate_chunk_with_capacity(
    ticks: &[Tick],
    threshold: f64,
    state: AggregatorState,
    capacity_hint: usize,
) -> ChunkOutput {
    let mut aggregator = DollarBarAggregator::new(threshold, state);
    let mut bars = Vec::with_capacity(capacity_hint.min(ticks.len()));

    for tick in ticks {
        if let Some(bar) = aggregator.process(tick) {
            bars.push(bar);
        }
    }

    bars.shrink_to_fit();
    ChunkOutput {
        bars,
        state: aggregator.into_state(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ticks(raw: &[(i64, f64, f64)]) -> Vec<Tick> {
        raw.iter().map(|&(t, p, q)| Tick::new(t, p, q)).collect()
    }

    #[test]
    fn test_three_tick_bar() {
        let input = ticks(&[(1, 100.0, 1.0), (2, 101.0, 1.0), (3, 99.0, 2.0)]);
        let out = aggregate_chunk(&input, 300.0, AggregatorState::new());

        assert_eq!(out.bars.len(), 1);
        let bar = out.bars[0];
        assert_eq!(bar.close_timestamp, 3);
        assert_relative_eq!(bar.open, 100.0);
        assert_relative_eq!(bar.high, 101.0);
        assert_relative_eq!(bar.low, 99.0);
        assert_relative_eq!(bar.close, 99.0);
        assert_relative_eq!(bar.volume, 4.0);
        assert_relative_eq!(bar.dollar_value, 399.0);
        assert_eq!(out.state, AggregatorState::new());
    }

    #[test]
    fn test_exact_threshold_closes_bar() {
        let input = ticks(&[(1, 100.0, 1.0), (2, 100.0, 1.0)]);
        let out = aggregate_chunk(&input, 200.0, AggregatorState::new());

        assert_eq!(out.bars.len(), 1);
        assert_eq!(out.bars[0].close_timestamp, 2);
        assert!(out.state.is_fresh());
    }

    #[test]
    fn test_large_tick_closes_bar_alone() {
        let input = ticks(&[(1, 100.0, 50.0), (2, 10.0, 1.0)]);
        let out = aggregate_chunk(&input, 300.0, AggregatorState::new());

        assert_eq!(out.bars.len(), 1);
        assert_relative_eq!(out.bars[0].dollar_value, 5000.0);
        assert_relative_eq!(out.bars[0].open, 100.0);
        assert_relative_eq!(out.state.cumulative_dollar(), 10.0);
        assert_eq!(out.state.bar_open_price(), Some(10.0));
    }

    #[test]
    fn test_partial_bar_carries_over() {
        let day_one = ticks(&[(1, 100.0, 1.0), (2, 105.0, 1.0)]);
        let day_two = ticks(&[(3, 95.0, 1.0), (4, 100.0, 1.0)]);

        let first = aggregate_chunk(&day_one, 300.0, AggregatorState::new());
        assert!(first.bars.is_empty());
        assert_relative_eq!(first.state.cumulative_dollar(), 205.0);
        assert_relative_eq!(first.state.cumulative_volume(), 2.0);

        let second = aggregate_chunk(&day_two, 300.0, first.state);
        assert_eq!(second.bars.len(), 1);
        let bar = second.bars[0];
        assert_relative_eq!(bar.open, 100.0);
        assert_relative_eq!(bar.high, 105.0);
        assert_relative_eq!(bar.low, 95.0);
        assert_eq!(bar.close_timestamp, 3);
        assert_relative_eq!(second.state.cumulative_dollar(), 100.0);
    }

    #[test]
    fn test_many_bars_not_truncated() {
        let input: Vec<Tick> = (0..10_000).map(|i| Tick::new(i, 10.0, 1.0)).collect();
        let out = aggregate_chunk_with_capacity(&input, 10.0, AggregatorState::new(), 1);

        assert_eq!(out.bars.len(), 10_000);
        assert_eq!(out.bars[9_999].close_timestamp, 9_999);
    }

    #[test]
    fn test_empty_slice_keeps_state() {
        let mut state = AggregatorState::new();
        state.accumulate(&Tick::new(1, 10.0, 1.0));
        let out = aggregate_chunk(&[], 100.0, state);

        assert!(out.bars.is_empty());
        assert_eq!(out.state, state);
    }

    #[test]
    fn test_process_matches_chunk() {
        let input = ticks(&[(1, 10.0, 3.0), (2, 11.0, 2.0), (3, 9.0, 4.0), (4, 12.0, 1.0)]);
        let mut aggregator = DollarBarAggregator::new(40.0, AggregatorState::new());
        let streamed: Vec<DollarBar> = input.iter().filter_map(|t| aggregator.process(t)).collect();
        let chunked = aggregate_chunk(&input, 40.0, AggregatorState::new());

        assert_eq!(streamed, chunked.bars);
        assert_eq!(aggregator.into_state(), chunked.state);
    }
}
