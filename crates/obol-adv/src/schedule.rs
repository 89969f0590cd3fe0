//! Per-day threshold scheduling.

use chrono::NaiveDate;
use obol_types::{Target, TargetTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::RollingAdv;
use crate::estimator::is_usable;

/// How to handle a day without an ADV of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvPolicy {
    /// Skip the day for every target.
    #[default]
    Skip,
    /// Reuse the most recent earlier ADV. Days before the first ADV are
    /// still skipped.
    CarryForward,
}

impl AdvPolicy {
    /// Returns the policy as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::CarryForward => "carry_forward",
        }
    }
}

impl std::fmt::Display for AdvPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a day's ADV came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvSource {
    /// The day's own ADV.
    Exact,
    /// Carried forward from an earlier day.
    CarriedForward {
        /// Day the ADV was computed for.
        from: NaiveDate,
    },
}

/// Thresholds resolved for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    date: NaiveDate,
    adv: f64,
    source: AdvSource,
    thresholds: TargetTable<f64>,
}

impl DaySchedule {
    /// Returns the day the thresholds apply to.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the ADV used for the day.
    #[must_use]
    pub const fn adv(&self) -> f64 {
        self.adv
    }

    /// Returns where the ADV came from.
    #[must_use]
    pub const fn source(&self) -> AdvSource {
        self.source
    }

    /// Returns the dollar threshold per target.
    #[must_use]
    pub const fn thresholds(&self) -> &TargetTable<f64> {
        &self.thresholds
    }

    /// Returns the dollar threshold for one target.
    #[must_use]
    pub fn threshold(&self, target: Target) -> Option<f64> {
        self.thresholds.get(target).copied()
    }
}

/// Computes `adv / target` for every target in `targets`.
#[must_use]
pub fn thresholds_for<T>(adv: f64, targets: &TargetTable<T>) -> TargetTable<f64> {
    targets.map(|target, _| target.threshold_for(adv))
}

/// Derives per-target dollar thresholds from a rolling ADV.
#[derive(Debug, Clone)]
pub struct ThresholdScheduler {
    adv: RollingAdv,
    policy: AdvPolicy,
}

impl ThresholdScheduler {
    /// Creates a scheduler over a precomputed ADV series.
    #[must_use]
    pub const fn new(adv: RollingAdv, policy: AdvPolicy) -> Self {
        Self { adv, policy }
    }

    /// Returns the underlying ADV series.
    #[must_use]
    pub const fn adv(&self) -> &RollingAdv {
        &self.adv
    }

    /// Returns the policy for days without ADV.
    #[must_use]
    pub const fn policy(&self) -> AdvPolicy {
        self.policy
    }

    /// Resolves the ADV to use for `date`.
    ///
    /// Only finite, strictly positive values qualify; anything else counts as
    /// undefined.
    #[must_use]
    pub fn resolve(&self, date: NaiveDate) -> Option<(f64, AdvSource)> {
        let exact = self.adv.get(date).filter(|adv| is_usable(*adv));
        if let Some(adv) = exact {
            return Some((adv, AdvSource::Exact));
        }
        match self.policy {
            AdvPolicy::Skip => None,
            AdvPolicy::CarryForward => self
                .adv
                .latest_usable_on_or_before(date)
                .map(|(from, adv)| (adv, AdvSource::CarriedForward { from })),
        }
    }

    /// Returns the thresholds for `date`, or `None` if the day must be
    /// skipped for every target.
    ///
    /// A day is also skipped when any target's threshold is not finite and
    /// strictly positive, e.g. when a tiny ADV underflows.
    #[must_use]
    pub fn schedule<T>(&self, date: NaiveDate, targets: &TargetTable<T>) -> Option<DaySchedule> {
        let Some((adv, source)) = self.resolve(date) else {
            debug!(%date, policy = %self.policy, "no ADV for day");
            return None;
        };
        let thresholds = thresholds_for(adv, targets);
        if let Some((target, threshold)) = thresholds.iter().find(|(_, t)| !is_usable(**t)) {
            debug!(%date, adv, %target, threshold, "unusable threshold for day");
            return None;
        }
        Some(DaySchedule {
            date,
            adv,
            source,
            thresholds,
        })
    }
}
