//! Bar resolution targets.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::ConfigError;

/// A configured bar resolution.
///
/// The target is the divisor applied to a day's average dollar volume to get
/// that day's bar threshold, so it is roughly the number of bars per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Target(NonZeroU32);

impl Target {
    /// Creates a target from a positive divisor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] for zero, negative, or values
    /// that do not fit in a `u32`.
    pub fn new(divisor: i64) -> Result<Self, ConfigError> {
        u32::try_from(divisor)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(ConfigError::InvalidTarget(divisor))
    }

    /// Creates a target from an already non-zero divisor.
    #[must_use]
    pub const fn from_nonzero(divisor: NonZeroU32) -> Self {
        Self(divisor)
    }

    /// Returns the divisor as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns the divisor as a float, ready to divide an ADV.
    #[must_use]
    pub fn divisor(self) -> f64 {
        f64::from(self.0.get())
    }

    /// Returns the dollar threshold this target derives from `adv`.
    #[must_use]
    pub fn threshold_for(self, adv: f64) -> f64 {
        adv / self.divisor()
    }
}

impl TryFrom<i64> for Target {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Target> for u32 {
    fn from(target: Target) -> Self {
        target.get()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}pd", self.0)
    }
}

/// A table holding exactly one value per configured target.
///
/// The key set is fixed when the table is built; there is no way to add or
/// remove a target afterwards. Iteration follows configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetTable<T> {
    entries: Vec<(Target, T)>,
}

impl<T> TargetTable<T> {
    /// Builds a table from an ordered target list, initialising each value.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or contains a duplicate.
    pub fn try_new<I, F>(targets: I, mut init: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Target>,
        F: FnMut(Target) -> T,
    {
        let mut entries: Vec<(Target, T)> = Vec::new();
        for target in targets {
            if entries.iter().any(|(existing, _)| *existing == target) {
                return Err(ConfigError::DuplicateTarget(target.get()));
            }
            entries.push((target, init(target)));
        }
        if entries.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        Ok(Self { entries })
    }

    /// Returns the value for a target.
    #[must_use]
    pub fn get(&self, target: Target) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| *key == target)
            .map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value for a target.
    pub fn get_mut(&mut self, target: Target) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(key, _)| *key == target)
            .map(|(_, value)| value)
    }

    /// Iterates over `(target, value)` pairs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (Target, &T)> {
        self.entries.iter().map(|(target, value)| (*target, value))
    }

    /// Iterates mutably over `(target, value)` pairs in configuration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Target, &mut T)> {
        self.entries
            .iter_mut()
            .map(|(target, value)| (*target, value))
    }

    /// Iterates over the configured targets.
    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.entries.iter().map(|(target, _)| *target)
    }

    /// Builds a new table with the same keys by transforming every value.
    #[must_use]
    pub fn map<U, F>(&self, mut f: F) -> TargetTable<U>
    where
        F: FnMut(Target, &T) -> U,
    {
        TargetTable {
            entries: self
                .entries
                .iter()
                .map(|(target, value)| (*target, f(*target, value)))
                .collect(),
        }
    }

    /// Consumes the table, transforming every value.
    #[must_use]
    pub fn into_map<U, F>(self, mut f: F) -> TargetTable<U>
    where
        F: FnMut(Target, T) -> U,
    {
        TargetTable {
            entries: self
                .entries
                .into_iter()
                .map(|(target, value)| (target, f(target, value)))
                .collect(),
        }
    }

    /// Builds a table with the same keys from values given in configuration
    /// order.
    ///
    /// Returns `None` unless exactly one value per target is supplied.
    #[must_use]
    pub fn with_values<U>(&self, values: Vec<U>) -> Option<TargetTable<U>> {
        if values.len() != self.entries.len() {
            return None;
        }
        Some(TargetTable {
            entries: self.targets().zip(values).collect(),
        })
    }

    /// Builds a table from this one and `other`, combining the values of
    /// each target.
    ///
    /// Returns `None` unless both tables hold the same targets in the same
    /// order.
    #[must_use]
    pub fn zip_map<U, V, F>(&self, other: &TargetTable<U>, mut f: F) -> Option<TargetTable<V>>
    where
        F: FnMut(Target, &T, &U) -> V,
    {
        if !self.targets().eq(other.targets()) {
            return None;
        }
        Some(TargetTable {
            entries: self
                .entries
                .iter()
                .zip(&other.entries)
                .map(|((target, left), (_, right))| (*target, f(*target, left, right)))
                .collect(),
        })
    }

    /// Consumes the table, returning its pairs in configuration order.
    #[must_use]
    pub fn into_entries(self) -> Vec<(Target, T)> {
        self.entries
    }

    /// Returns the number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a table built by [`TargetTable::try_new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
