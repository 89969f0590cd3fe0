//! Rolling ADV estimation.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use chrono::NaiveDate;
use obol_types::DailyVolume;
use tracing::{debug, warn};

/// Trailing average daily dollar volume, keyed by the day it applies to.
///
/// The value stored for day `D` is the mean of the `W` calendar days ending
/// on `D - 1`. Days missing from the input count as zero volume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollingAdv {
    values: BTreeMap<NaiveDate, f64>,
}

impl RollingAdv {
    /// Computes the rolling ADV over `window` days.
    ///
    /// Rows with a negative or non-finite quote volume are ignored, as are
    /// days with no row at all: both contribute zero volume to every window
    /// they fall in. Several rows on the same date are summed.
    ///
    /// ADV is only produced for days inside the input's date span that have
    /// a full window of prior days, so the first `window` calendar days never
    /// get one. Empty or short input gives an empty result.
    #[must_use]
    pub fn compute(volumes: &[DailyVolume], window: NonZeroUsize) -> Self {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut rejected = 0_usize;
        for volume in volumes {
            if volume.is_valid() {
                *daily.entry(volume.date).or_insert(0.0) += volume.quote_volume;
            } else {
                rejected += 1;
            }
        }
        if rejected > 0 {
            warn!(rejected, "ignoring daily volume rows with invalid quote volume");
        }

        let (Some(&first), Some(&last)) = (daily.keys().next(), daily.keys().next_back()) else {
            warn!("no daily volume available, ADV is empty");
            return Self::default();
        };

        let calendar: Vec<(NaiveDate, f64)> = first
            .iter_days()
            .take_while(|day| *day <= last)
            .map(|day| (day, daily.get(&day).copied().unwrap_or(0.0)))
            .collect();
        let filled = calendar.len() - daily.len();
        if filled > 0 {
            debug!(filled, "filled calendar gaps with zero volume");
        }

        // Each span holds `w` prior days followed by the day the mean applies to.
        let w = window.get();
        let values: BTreeMap<NaiveDate, f64> = calendar
            .windows(w + 1)
            .map(|span| {
                let (prior, applies) = span.split_at(w);
                let sum: f64 = prior.iter().map(|(_, volume)| volume).sum();
                (applies[0].0, sum / w as f64)
            })
            .collect();

        debug!(
            window = w,
            days = calendar.len(),
            coverage = values.len(),
            "rolling ADV ready"
        );
        Self { values }
    }

    /// Returns the ADV for a day, if defined.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// Returns the most recent ADV dated on or before `date`.
    #[must_use]
    pub fn latest_on_or_before(&self, date: NaiveDate) -> Option<(NaiveDate, f64)> {
        self.values
            .range(..=date)
            .next_back()
            .map(|(day, adv)| (*day, *adv))
    }

    /// Returns the most recent finite, strictly positive ADV dated on or
    /// before `date`.
    #[must_use]
    pub fn latest_usable_on_or_before(&self, date: NaiveDate) -> Option<(NaiveDate, f64)> {
        self.values
            .range(..=date)
            .rev()
            .find(|(_, adv)| is_usable(**adv))
            .map(|(day, adv)| (*day, *adv))
    }

    /// Returns the first day with a defined ADV.
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.values.keys().next().copied()
    }

    /// Returns the last day with a defined ADV.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.values.keys().next_back().copied()
    }

    /// Iterates over `(date, adv)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().map(|(day, adv)| (*day, *adv))
    }

    /// Returns the number of days with a defined ADV.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no day has an ADV.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(NaiveDate, f64)> for RollingAdv {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// True for values usable as a divisor base: finite and strictly positive.
pub(crate) const fn is_usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
