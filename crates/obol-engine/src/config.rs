//! Engine configuration.

use std::num::{NonZeroU32, NonZeroUsize};
use std::path::Path;

use obol_adv::AdvPolicy;
use obol_types::{ConfigError, Target};
use serde::{Deserialize, Serialize};

/// Bar resolutions used when none are configured.
pub const DEFAULT_TARGETS: [u32; 6] = [10_000, 4_000, 2_000, 1_000, 500, 200];

/// Rolling ADV window used when none is configured.
pub const DEFAULT_WINDOW_DAYS: NonZeroUsize = NonZeroUsize::new(30).unwrap();

const DEFAULT_SYMBOL: &str = "BTCUSDC";
const DEFAULT_MARKET: &str = "futures";

/// Validated engine configuration.
///
/// Every `EngineConfig` value has at least one target, no duplicate or
/// non-positive targets, a window of at least one day, and non-empty names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEngineConfig")]
pub struct EngineConfig {
    targets: Vec<Target>,
    rolling_window_days: NonZeroUsize,
    symbol: String,
    market: String,
    adv_policy: AdvPolicy,
}

impl EngineConfig {
    /// Creates a configuration with the default names and ADV policy.
    ///
    /// # Errors
    ///
    /// Returns an error for empty, duplicate, or non-positive targets, or a
    /// window below one day.
    pub fn new(targets: &[i64], rolling_window_days: i64) -> Result<Self, ConfigError> {
        RawEngineConfig {
            targets: targets.to_vec(),
            rolling_window_days,
            ..RawEngineConfig::default()
        }
        .try_into()
    }

    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any value is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawEngineConfig = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }

    /// Sets the symbol used in output names.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is blank.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Result<Self, ConfigError> {
        self.symbol = non_empty(symbol.into(), "symbol")?;
        Ok(self)
    }

    /// Sets the market used in output names.
    ///
    /// # Errors
    ///
    /// Returns an error if the market is blank.
    pub fn with_market(mut self, market: impl Into<String>) -> Result<Self, ConfigError> {
        self.market = non_empty(market.into(), "market")?;
        Ok(self)
    }

    /// Sets the policy for days without an ADV.
    #[must_use]
    pub fn with_adv_policy(mut self, policy: AdvPolicy) -> Self {
        self.adv_policy = policy;
        self
    }

    /// Returns the configured targets in order.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Returns the rolling ADV window.
    #[must_use]
    pub const fn rolling_window(&self) -> NonZeroUsize {
        self.rolling_window_days
    }

    /// Returns the symbol used in output names.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the market used in output names.
    #[must_use]
    pub fn market(&self) -> &str {
        &self.market
    }

    /// Returns the policy for days without an ADV.
    #[must_use]
    pub const fn adv_policy(&self) -> AdvPolicy {
        self.adv_policy
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS
                .iter()
                .filter_map(|t| NonZeroU32::new(*t))
                .map(Target::from_nonzero)
                .collect(),
            rolling_window_days: DEFAULT_WINDOW_DAYS,
            symbol: DEFAULT_SYMBOL.to_string(),
            market: DEFAULT_MARKET.to_string(),
            adv_policy: AdvPolicy::default(),
        }
    }
}

/// Configuration as written, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawEngineConfig {
    targets: Vec<i64>,
    rolling_window_days: i64,
    symbol: String,
    market: String,
    adv_policy: AdvPolicy,
}

impl Default for RawEngineConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS.iter().map(|t| i64::from(*t)).collect(),
            rolling_window_days: DEFAULT_WINDOW_DAYS.get() as i64,
            symbol: DEFAULT_SYMBOL.to_string(),
            market: DEFAULT_MARKET.to_string(),
            adv_policy: AdvPolicy::default(),
        }
    }
}

impl TryFrom<RawEngineConfig> for EngineConfig {
    type Error = ConfigError;

    fn try_from(raw: RawEngineConfig) -> Result<Self, Self::Error> {
        let mut targets: Vec<Target> = Vec::with_capacity(raw.targets.len());
        for value in raw.targets {
            let target = Target::new(value)?;
            if targets.contains(&target) {
                return Err(ConfigError::DuplicateTarget(target.get()));
            }
            targets.push(target);
        }
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let rolling_window_days = usize::try_from(raw.rolling_window_days)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::InvalidWindow(raw.rolling_window_days))?;

        Ok(Self {
            targets,
            rolling_window_days,
            symbol: non_empty(raw.symbol, "symbol")?,
            market: non_empty(raw.market, "market")?,
            adv_policy: raw.adv_policy,
        })
    }
}

fn non_empty(value: String, field: &'static str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::EmptyName(field))
    } else {
        Ok(value)
    }
}
