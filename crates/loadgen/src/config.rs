//! Configuration for a load run.

use crate::mix::{MixError, WeightTable};
use crate::sampler::SampleRanges;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tpcc_client::ClientConfig;
use tpcc_types::TransactionKind;
use tracing::info;

/// Errors loading or validating a load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse run file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Mix(#[from] MixError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How virtual users pick transaction kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixMode {
    /// Every VU draws a kind from the weight table on each iteration.
    #[default]
    Weighted,

    /// VUs are split across kinds in proportion to the weights and each VU
    /// runs only its kind.
    Dedicated,
}

impl FromStr for MixMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weighted" | "mixed" => Ok(MixMode::Weighted),
            "dedicated" | "per-kind" | "per_kind" => Ok(MixMode::Dedicated),
            other => Err(format!("Unknown mix mode: {}", other)),
        }
    }
}

impl fmt::Display for MixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixMode::Weighted => f.write_str("weighted"),
            MixMode::Dedicated => f.write_str("dedicated"),
        }
    }
}

/// Configuration for a load run.
///
/// Immutable once the run starts; every VU shares it.
#[derive(Clone, Debug)]
pub struct LoadConfig {
    /// HTTP client settings.
    pub client: ClientConfig,

    /// Relative weight of each transaction kind.
    pub weights: WeightTable,

    /// Parameter ranges, including the warehouse count.
    pub ranges: SampleRanges,

    /// Number of concurrent virtual users.
    pub vus: usize,

    /// How long VUs keep starting new iterations.
    pub duration: Duration,

    /// How long in-flight iterations may finish after `duration` before
    /// they are abandoned.
    pub graceful_stop: Duration,

    /// Pause between iterations of one VU. Zero runs back to back.
    pub think_time: Duration,

    pub mix_mode: MixMode,

    /// Whether successful responses must also carry their kind's required
    /// fields.
    pub check_fields: bool,

    /// Base seed; VU `i` uses `seed + i`.
    pub seed: u64,
}

impl LoadConfig {
    /// Create a configuration for the given client with the full TPC-C mix.
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            weights: WeightTable::tpcc(),
            ranges: SampleRanges::default(),
            vus: 10,
            duration: Duration::from_secs(15),
            graceful_stop: Duration::from_secs(5),
            think_time: Duration::ZERO,
            mix_mode: MixMode::Weighted,
            check_fields: false,
            seed: 12345,
        }
    }

    /// Set the number of warehouses sampled from.
    pub fn with_warehouses(mut self, warehouses: u16) -> Self {
        self.ranges.warehouses = warehouses;
        self
    }

    pub fn with_ranges(mut self, ranges: SampleRanges) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn with_weights(mut self, weights: WeightTable) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_vus(mut self, vus: usize) -> Self {
        self.vus = vus;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_graceful_stop(mut self, graceful_stop: Duration) -> Self {
        self.graceful_stop = graceful_stop;
        self
    }

    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn with_mix_mode(mut self, mode: MixMode) -> Self {
        self.mix_mode = mode;
        self
    }

    pub fn with_check_fields(mut self, check_fields: bool) -> Self {
        self.check_fields = check_fields;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client.timeout = timeout;
        self
    }

    /// Check the configuration before a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vus == 0 {
            return Err(ConfigError::Invalid("vus must be at least 1".into()));
        }
        if self.duration.is_zero() {
            return Err(ConfigError::Invalid("duration must be positive".into()));
        }
        if self.client.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be positive".into()));
        }
        self.ranges.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

/// Canned run shapes matching the classic TPC-C HTTP scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// 10 VUs for 15s, weighted TPC-C mix, no think time.
    FullMix,
    /// 45 VUs for 1m split across kinds by weight, 2s think time.
    PerKind,
    /// 5 VUs for 10s of Payment only, 1s think time, field checks on.
    Payment,
    /// 3 VUs for 10s of Delivery only, 1s think time, field checks on.
    Delivery,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::FullMix,
        Scenario::PerKind,
        Scenario::Payment,
        Scenario::Delivery,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::FullMix => "full-mix",
            Scenario::PerKind => "per-kind",
            Scenario::Payment => "payment",
            Scenario::Delivery => "delivery",
        }
    }

    /// Apply this scenario's shape to `config`, keeping its client and
    /// ranges.
    pub fn apply(self, config: LoadConfig) -> LoadConfig {
        match self {
            Scenario::FullMix => config
                .with_weights(WeightTable::tpcc())
                .with_mix_mode(MixMode::Weighted)
                .with_vus(10)
                .with_duration(Duration::from_secs(15))
                .with_think_time(Duration::ZERO),
            Scenario::PerKind => config
                .with_weights(WeightTable::tpcc())
                .with_mix_mode(MixMode::Dedicated)
                .with_vus(45)
                .with_duration(Duration::from_secs(60))
                .with_think_time(Duration::from_secs(2)),
            Scenario::Payment => config
                .with_weights(WeightTable::single(TransactionKind::Payment))
                .with_mix_mode(MixMode::Weighted)
                .with_vus(5)
                .with_duration(Duration::from_secs(10))
                .with_think_time(Duration::from_secs(1))
                .with_check_fields(true),
            Scenario::Delivery => config
                .with_weights(WeightTable::single(TransactionKind::Delivery))
                .with_mix_mode(MixMode::Weighted)
                .with_vus(3)
                .with_duration(Duration::from_secs(10))
                .with_think_time(Duration::from_secs(1))
                .with_check_fields(true),
        }
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == normalized)
            .ok_or_else(|| format!("Unknown scenario: {}", s))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional TOML run file. Every field overrides the corresponding
/// [`LoadConfig`] value when present.
///
/// ```toml
/// api_base = "http://localhost:8080"
/// warehouses = 10
/// vus = 20
/// duration = "2m"
/// think_time = "500ms"
/// mix_mode = "weighted"
///
/// [weights]
/// new_order = 45
/// payment = 43
/// order_status = 4
/// delivery = 4
/// stock_level = 4
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    pub api_base: Option<String>,
    pub warehouses: Option<u16>,
    pub vus: Option<usize>,
    #[serde(default, deserialize_with = "humantime_opt")]
    pub duration: Option<Duration>,
    #[serde(default, deserialize_with = "humantime_opt")]
    pub graceful_stop: Option<Duration>,
    #[serde(default, deserialize_with = "humantime_opt")]
    pub think_time: Option<Duration>,
    #[serde(default, deserialize_with = "humantime_opt")]
    pub timeout: Option<Duration>,
    pub mix_mode: Option<MixMode>,
    pub check_fields: Option<bool>,
    pub seed: Option<u64>,
    pub weights: Option<WeightTable>,
}

fn humantime_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
        .transpose()
}

impl RunFile {
    /// Read and parse a run file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RunFile = toml::from_str(&text)?;
        info!(path = %path.display(), "Loaded run file");
        Ok(file)
    }

    /// Overlay the file's values onto `config`.
    pub fn apply(&self, mut config: LoadConfig) -> LoadConfig {
        if let Some(base) = &self.api_base {
            config.client = config.client.with_base_url(base.as_str());
        }
        if let Some(warehouses) = self.warehouses {
            config = config.with_warehouses(warehouses);
        }
        if let Some(vus) = self.vus {
            config = config.with_vus(vus);
        }
        if let Some(duration) = self.duration {
            config = config.with_duration(duration);
        }
        if let Some(graceful_stop) = self.graceful_stop {
            config = config.with_graceful_stop(graceful_stop);
        }
        if let Some(think_time) = self.think_time {
            config = config.with_think_time(think_time);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(mode) = self.mix_mode {
            config = config.with_mix_mode(mode);
        }
        if let Some(check_fields) = self.check_fields {
            config = config.with_check_fields(check_fields);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(weights) = self.weights {
            config = config.with_weights(weights);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = LoadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weights, WeightTable::tpcc());
        assert_eq!(config.ranges.warehouses, 10);
    }

    #[test]
    fn test_validate_rejects_zero_vus_and_duration() {
        assert!(LoadConfig::default().with_vus(0).validate().is_err());
        assert!(LoadConfig::default()
            .with_duration(Duration::ZERO)
            .validate()
            .is_err());
        assert!(LoadConfig::default().with_warehouses(0).validate().is_err());
    }

    #[test]
    fn test_scenarios() {
        let per_kind = Scenario::PerKind.apply(LoadConfig::default());
        assert_eq!(per_kind.vus, 45);
        assert_eq!(per_kind.mix_mode, MixMode::Dedicated);
        assert_eq!(per_kind.think_time, Duration::from_secs(2));

        let payment = Scenario::Payment.apply(LoadConfig::default().with_warehouses(3));
        assert_eq!(payment.weights, WeightTable::single(TransactionKind::Payment));
        assert!(payment.check_fields);
        assert_eq!(payment.ranges.warehouses, 3);
        assert_eq!(payment.vus, 5);

        let delivery = Scenario::Delivery.apply(LoadConfig::default());
        assert_eq!(delivery.vus, 3);
        assert_eq!(delivery.duration, Duration::from_secs(10));
    }

    #[test]
    fn test_scenario_parsing() {
        assert_eq!("full-mix".parse::<Scenario>(), Ok(Scenario::FullMix));
        assert_eq!("per_kind".parse::<Scenario>(), Ok(Scenario::PerKind));
        assert_eq!("Payment".parse::<Scenario>(), Ok(Scenario::Payment));
        assert!("bogus".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_mix_mode_parsing() {
        assert_eq!("weighted".parse::<MixMode>(), Ok(MixMode::Weighted));
        assert_eq!("per-kind".parse::<MixMode>(), Ok(MixMode::Dedicated));
        assert!("random".parse::<MixMode>().is_err());
    }

    #[test]
    fn test_run_file_overlays_config() {
        let file: RunFile = toml::from_str(
            r#"
            api_base = "http://tpcc.internal:9000/"
            warehouses = 4
            vus = 8
            duration = "2m"
            think_time = "250ms"
            timeout = "3s"
            mix_mode = "dedicated"
            check_fields = true
            seed = 7

            [weights]
            new_order = 1
            payment = 1
            "#,
        )
        .unwrap();

        let config = file.apply(LoadConfig::default());
        assert_eq!(config.client.base_url, "http://tpcc.internal:9000");
        assert_eq!(config.client.timeout, Duration::from_secs(3));
        assert_eq!(config.ranges.warehouses, 4);
        assert_eq!(config.vus, 8);
        assert_eq!(config.duration, Duration::from_secs(120));
        assert_eq!(config.think_time, Duration::from_millis(250));
        assert_eq!(config.mix_mode, MixMode::Dedicated);
        assert!(config.check_fields);
        assert_eq!(config.seed, 7);
        assert_eq!(config.weights.weight(TransactionKind::Payment), 1);
        assert_eq!(config.weights.weight(TransactionKind::Delivery), 0);
    }

    #[test]
    fn test_run_file_base_url_keeps_client_tuning() {
        let file: RunFile = toml::from_str(r#"api_base = "http://tpcc.internal:9000""#).unwrap();
        let mut config = LoadConfig::default().with_timeout(Duration::from_millis(750));
        config.client = config.client.with_pool_max_idle_per_host(4);

        let config = file.apply(config);
        assert_eq!(config.client.base_url, "http://tpcc.internal:9000");
        assert_eq!(config.client.timeout, Duration::from_millis(750));
        assert_eq!(config.client.pool_max_idle_per_host, 4);
    }

    #[test]
    fn test_run_file_rejects_unknown_keys_and_bad_durations() {
        assert!(toml::from_str::<RunFile>("threads = 4").is_err());
        assert!(toml::from_str::<RunFile>(r#"duration = "soon""#).is_err());
    }

    #[test]
    fn test_run_file_rejects_zero_weight_table() {
        let result = toml::from_str::<RunFile>(
            r#"
            [weights]
            new_order = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_run_file_changes_nothing() {
        let file: RunFile = toml::from_str("").unwrap();
        let config = file.apply(LoadConfig::default());
        assert_eq!(config.vus, LoadConfig::default().vus);
        assert_eq!(config.seed, LoadConfig::default().seed);
    }
}
