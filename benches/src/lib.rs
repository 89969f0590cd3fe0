//! Synthetic market data for obol benchmarks.

use chrono::{Days, NaiveDate};
use obol_engine::{MemoryTickSource, TickSource};
use obol_types::{DailyVolume, Tick};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random-walk trade generator.
#[derive(Debug)]
pub struct SyntheticMarket {
    rng: StdRng,
    price: f64,
}

impl SyntheticMarket {
    /// Creates a generator starting at `price`, reproducible from `seed`.
    pub fn new(seed: u64, price: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            price,
        }
    }

    /// Generates `count` time-ordered ticks inside `date`.
    pub fn day(&mut self, date: NaiveDate, count: usize) -> Vec<Tick> {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .map_or(0, |t| t.and_utc().timestamp_millis());
        let spacing = (86_400_000 / count.max(1) as i64).max(1);

        (0..count)
            .map(|i| {
                self.price *= 1.0 + self.rng.gen_range(-0.0005..0.0005);
                let jitter = self.rng.gen_range(0..spacing);
                let timestamp = midnight + i as i64 * spacing + jitter;
                Tick::new(timestamp, self.price, self.rng.gen_range(0.001..2.0))
            })
            .collect()
    }
}

/// Builds a source with `days` consecutive days of `ticks_per_day` ticks.
pub fn synthetic_source(start: NaiveDate, days: u64, ticks_per_day: usize, seed: u64) -> MemoryTickSource {
    let mut market = SyntheticMarket::new(seed, 40_000.0);
    let mut source = MemoryTickSource::new();
    for offset in 0..days {
        let date = start + Days::new(offset);
        source.insert_day(date, market.day(date, ticks_per_day));
    }
    source
}

/// Sums each day's traded dollar value into a daily volume row.
pub fn daily_volumes(source: &MemoryTickSource) -> Vec<DailyVolume> {
    source
        .days()
        .into_iter()
        .filter_map(|date| {
            let ticks = source.read_day(date).ok()?;
            Some(DailyVolume::new(date, ticks.iter().map(Tick::dollar_value).sum()))
        })
        .collect()
}
