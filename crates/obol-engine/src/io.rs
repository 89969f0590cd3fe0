//! Tick input and bar output seams.
//!
//! The engine reads one day of ticks at a time through a [`TickSource`] and
//! hands each target's completed bars to a [`BarSink`]. The in-memory
//! implementations here back tests and embedding callers that already hold
//! their data.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use obol_aggregate::DollarBar;
use obol_types::{Target, Tick};
use thiserror::Error;

/// Errors from reading a day of ticks.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The day's data could not be read.
    #[error("I/O error reading ticks for {date}: {source}")]
    Io {
        /// Day being read.
        date: NaiveDate,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The day's data was read but could not be decoded.
    #[error("Corrupt tick data for {date}: {reason}")]
    Corrupt {
        /// Day being read.
        date: NaiveDate,
        /// What was wrong with it.
        reason: String,
    },

    /// The source has nothing for the day.
    #[error("No tick data for {0}")]
    Missing(NaiveDate),
}

/// Errors from writing bars.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing to the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the bars failed.
    #[error("Format error: {0}")]
    Format(String),
}

/// Supplies ticks one trading day at a time.
pub trait TickSource {
    /// Returns the days this source can supply, in ascending order.
    fn days(&self) -> Vec<NaiveDate>;

    /// Reads every tick of `date` in time order.
    ///
    /// # Errors
    ///
    /// Returns an error if the day cannot be read or decoded.
    fn read_day(&self, date: NaiveDate) -> Result<Vec<Tick>, SourceError>;
}

/// Receives the bars completed for one target on one day.
///
/// The engine never calls a sink with an empty slice, and calls it at most
/// once per `(target, date)`.
pub trait BarSink {
    /// Persists `bars` for `target` on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bars could not be written. The engine stops
    /// the run and leaves the day uncommitted.
    fn write_bars(
        &mut self,
        target: Target,
        date: NaiveDate,
        bars: &[DollarBar],
    ) -> Result<(), SinkError>;
}

impl<S: BarSink + ?Sized> BarSink for &mut S {
    fn write_bars(
        &mut self,
        target: Target,
        date: NaiveDate,
        bars: &[DollarBar],
    ) -> Result<(), SinkError> {
        (**self).write_bars(target, date, bars)
    }
}

/// Tick source backed by in-memory days.
#[derive(Debug, Clone, Default)]
pub struct MemoryTickSource {
    days: BTreeMap<NaiveDate, Result<Vec<Tick>, String>>,
}

impl MemoryTickSource {
    /// Creates an empty source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            days: BTreeMap::new(),
        }
    }

    /// Adds a day of ticks, replacing any previous entry.
    #[must_use]
    pub fn with_day(mut self, date: NaiveDate, ticks: Vec<Tick>) -> Self {
        self.insert_day(date, ticks);
        self
    }

    /// Adds a day whose read always fails with `reason`.
    #[must_use]
    pub fn with_failure(mut self, date: NaiveDate, reason: impl Into<String>) -> Self {
        self.days.insert(date, Err(reason.into()));
        self
    }

    /// Adds a day of ticks, replacing any previous entry.
    pub fn insert_day(&mut self, date: NaiveDate, ticks: Vec<Tick>) {
        self.days.insert(date, Ok(ticks));
    }
}

impl TickSource for MemoryTickSource {
    fn days(&self) -> Vec<NaiveDate> {
        self.days.keys().copied().collect()
    }

    fn read_day(&self, date: NaiveDate) -> Result<Vec<Tick>, SourceError> {
        match self.days.get(&date) {
            Some(Ok(ticks)) => Ok(ticks.clone()),
            Some(Err(reason)) => Err(SourceError::Corrupt {
                date,
                reason: reason.clone(),
            }),
            None => Err(SourceError::Missing(date)),
        }
    }
}

/// Bar sink that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    bars: BTreeMap<(Target, NaiveDate), Vec<DollarBar>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bars: BTreeMap::new(),
        }
    }

    /// Returns the bars written for one target on one day.
    #[must_use]
    pub fn get(&self, target: Target, date: NaiveDate) -> Option<&[DollarBar]> {
        self.bars.get(&(target, date)).map(Vec::as_slice)
    }

    /// Returns every bar written for `target`, in date order.
    #[must_use]
    pub fn bars_for(&self, target: Target) -> Vec<DollarBar> {
        self.bars
            .iter()
            .filter(|((t, _), _)| *t == target)
            .flat_map(|(_, bars)| bars.iter().copied())
            .collect()
    }

    /// Returns the days with bars written for `target`.
    #[must_use]
    pub fn days_for(&self, target: Target) -> Vec<NaiveDate> {
        self.bars
            .keys()
            .filter(|(t, _)| *t == target)
            .map(|(_, date)| *date)
            .collect()
    }

    /// Returns the number of `(target, day)` writes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

impl BarSink for MemorySink {
    fn write_bars(
        &mut self,
        target: Target,
        date: NaiveDate,
        bars: &[DollarBar],
    ) -> Result<(), SinkError> {
        self.bars.insert((target, date), bars.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_memory_source_days_sorted() {
        let source = MemoryTickSource::new()
            .with_day(date(3), vec![])
            .with_failure(date(1), "truncated archive")
            .with_day(date(2), vec![Tick::new(0, 1.0, 1.0)]);

        assert_eq!(source.days(), vec![date(1), date(2), date(3)]);
        assert_eq!(source.read_day(date(2)).unwrap().len(), 1);
        assert!(matches!(
            source.read_day(date(1)),
            Err(SourceError::Corrupt { .. })
        ));
        assert!(matches!(
            source.read_day(date(9)),
            Err(SourceError::Missing(_))
        ));
    }

    #[test]
    fn test_memory_sink_collects_by_target() {
        let a = Target::new(100).unwrap();
        let b = Target::new(10).unwrap();
        let bar = DollarBar::new(1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0);

        let mut sink = MemorySink::new();
        sink.write_bars(a, date(2), &[bar]).unwrap();
        sink.write_bars(a, date(1), &[bar, bar]).unwrap();
        sink.write_bars(b, date(1), &[bar]).unwrap();

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.bars_for(a).len(), 3);
        assert_eq!(sink.days_for(a), vec![date(1), date(2)]);
        assert_eq!(sink.get(b, date(1)).unwrap().len(), 1);
        assert!(sink.get(b, date(2)).is_none());
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn write_one(mut sink: impl BarSink) {
            let bar = DollarBar::new(1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0);
            sink.write_bars(Target::new(5).unwrap(), date(1), &[bar])
                .unwrap();
        }

        let mut sink = MemorySink::new();
        write_one(&mut sink);
        assert_eq!(sink.len(), 1);
    }
}
