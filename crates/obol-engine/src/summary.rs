//! Per-day and per-run reporting.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use obol_adv::AdvSource;
use obol_types::TargetTable;

use crate::DaySkip;

/// What one committed day produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    /// The committed day.
    pub date: NaiveDate,
    /// ADV the day's thresholds were derived from.
    pub adv: f64,
    /// Where the ADV came from.
    pub source: AdvSource,
    /// Bars completed per target.
    pub bars: TargetTable<usize>,
}

impl DaySummary {
    /// Returns the total number of bars across targets.
    #[must_use]
    pub fn total_bars(&self) -> usize {
        self.bars.iter().map(|(_, n)| n).sum()
    }
}

/// Renders as `2024-03-02 (ADV $1,234,567) -> [10000pd:12 | 500pd:1]`.
impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ADV ${}", self.date, group_thousands(self.adv))?;
        if let AdvSource::CarriedForward { from } = self.source {
            write!(f, " from {from}")?;
        }
        f.write_str(") -> [")?;
        for (i, (target, count)) in self.bars.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{target}:{count}")?;
        }
        f.write_str("]")
    }
}

/// Skipped days by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Days without a usable ADV.
    pub no_adv: usize,
    /// Days whose ticks could not be read.
    pub source_failed: usize,
    /// Days with invalid or unordered ticks.
    pub malformed: usize,
    /// Days with no ticks.
    pub no_ticks: usize,
}

impl SkipCounts {
    /// Counts one more skip for `reason`.
    pub const fn record(&mut self, reason: &DaySkip) {
        match reason {
            DaySkip::NoAdv => self.no_adv += 1,
            DaySkip::SourceFailed(_) => self.source_failed += 1,
            DaySkip::Malformed(_) => self.malformed += 1,
            DaySkip::NoTicks => self.no_ticks += 1,
        }
    }

    /// Returns the number of skipped days.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.no_adv + self.source_failed + self.malformed + self.no_ticks
    }
}

/// Totals for a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Days committed.
    pub processed_days: usize,
    /// Days skipped, by reason.
    pub skipped: SkipCounts,
    /// Bars emitted per target.
    pub bars: TargetTable<u64>,
    /// Last committed day, if any.
    pub last_date: Option<NaiveDate>,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Creates an empty summary with a zero count per target.
    #[must_use]
    pub fn new<T>(targets: &TargetTable<T>) -> Self {
        Self {
            processed_days: 0,
            skipped: SkipCounts::default(),
            bars: targets.map(|_, _| 0),
            last_date: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Adds a committed day.
    pub fn record_day(&mut self, day: &DaySummary) {
        self.processed_days += 1;
        self.last_date = Some(day.date);
        for (target, count) in day.bars.iter() {
            if let Some(total) = self.bars.get_mut(target) {
                *total += *count as u64;
            }
        }
    }

    /// Adds a skipped day.
    pub const fn record_skip(&mut self, reason: &DaySkip) {
        self.skipped.record(reason);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} days, skipped {} in {:.2}s",
            self.processed_days,
            self.skipped.total(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Formats a dollar amount rounded to whole dollars with `,` separators.
fn group_thousands(amount: f64) -> String {
    let digits = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount.is_sign_negative() && digits != "0" {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use obol_types::{Target, TickError};

    fn table(entries: &[(i64, usize)]) -> TargetTable<usize> {
        let targets = TargetTable::try_new(
            entries.iter().map(|(t, _)| Target::new(*t).unwrap()),
            |_| (),
        )
        .unwrap();
        targets
            .with_values(entries.iter().map(|(_, n)| *n).collect())
            .unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.4), "999");
        assert_eq!(group_thousands(1_000.0), "1,000");
        assert_eq!(group_thousands(1_234_567.2), "1,234,567");
        assert_eq!(group_thousands(12_345_678_901.0), "12,345,678,901");
    }

    #[test]
    fn test_day_summary_display() {
        let day = DaySummary {
            date: date(2),
            adv: 1_234_567.0,
            source: AdvSource::Exact,
            bars: table(&[(10_000, 12), (500, 1)]),
        };
        assert_eq!(
            day.to_string(),
            "2024-03-02 (ADV $1,234,567) -> [10000pd:12 | 500pd:1]"
        );
        assert_eq!(day.total_bars(), 13);
    }

    #[test]
    fn test_carried_day_summary_display() {
        let day = DaySummary {
            date: date(5),
            adv: 2_000.0,
            source: AdvSource::CarriedForward { from: date(3) },
            bars: table(&[(10, 0)]),
        };
        assert_eq!(
            day.to_string(),
            "2024-03-05 (ADV $2,000 from 2024-03-03) -> [10pd:0]"
        );
    }

    #[test]
    fn test_run_summary_totals() {
        let mut run = RunSummary::new(&table(&[(100, 0), (10, 0)]));
        run.record_day(&DaySummary {
            date: date(1),
            adv: 1.0,
            source: AdvSource::Exact,
            bars: table(&[(100, 7), (10, 1)]),
        });
        run.record_day(&DaySummary {
            date: date(2),
            adv: 1.0,
            source: AdvSource::Exact,
            bars: table(&[(100, 3), (10, 0)]),
        });
        run.record_skip(&DaySkip::NoAdv);
        run.record_skip(&DaySkip::Malformed(TickError::InvalidPrice {
            index: 0,
            price: -1.0,
        }));

        assert_eq!(run.processed_days, 2);
        assert_eq!(run.last_date, Some(date(2)));
        assert_eq!(run.skipped.total(), 2);
        assert_eq!(run.skipped.malformed, 1);
        assert_eq!(run.bars.get(Target::new(100).unwrap()), Some(&10));
        assert_eq!(run.bars.get(Target::new(10).unwrap()), Some(&1));
        assert!(run.to_string().starts_with("Processed 2 days, skipped 2 in "));
    }
}
