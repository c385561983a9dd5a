//! Serializable run configuration.
//!
//! A `RunConfig` captures everything needed to reproduce a run: where the
//! market data comes from and the strategy parameters handed to the
//! engine. Loads from TOML; every field has a default, so a partial file
//! (or an empty one) is valid.

use anyhow::{Context, Result};
use flashlab_core::engine::BacktestConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where market data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// Seeded random-walk generator.
    Synthetic,
    /// Polymarket Gamma + CLOB APIs.
    Live,
    /// Previously saved JSON cache file.
    Cached,
}

impl Default for DataSourceKind {
    fn default() -> Self {
        DataSourceKind::Synthetic
    }
}

/// Data-acquisition settings for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: DataSourceKind,
    /// Coin for live fetches (BTC, ETH, SOL, XRP).
    pub coin: String,
    /// How many markets to fetch or generate.
    pub num_markets: usize,
    /// Probability of injecting a crash per synthetic market.
    pub crash_probability: f64,
    /// Seed for the synthetic generator.
    pub seed: u64,
    /// Optional JSON cache file: loaded when present, written after a
    /// live fetch.
    pub cache_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSourceKind::Synthetic,
            coin: "ETH".to_string(),
            num_markets: 30,
            crash_probability: 0.3,
            seed: 42,
            cache_path: None,
        }
    }
}

/// Full configuration for a single backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub data: DataConfig,
    pub strategy: BacktestConfig,
}

impl RunConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse run config TOML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run config {}", path.display()))?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = RunConfig::from_toml("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.data.coin, "ETH");
        assert_eq!(config.strategy.drop_threshold, 0.30);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let text = r#"
            [data]
            source = "live"
            coin = "BTC"
            num_markets = 10

            [strategy]
            drop_threshold = 0.25
            take_profit = 0.15
        "#;
        let config = RunConfig::from_toml(text).unwrap();
        assert_eq!(config.data.source, DataSourceKind::Live);
        assert_eq!(config.data.coin, "BTC");
        assert_eq!(config.data.num_markets, 10);
        assert_eq!(config.data.seed, 42);
        assert_eq!(config.strategy.drop_threshold, 0.25);
        assert_eq!(config.strategy.take_profit, 0.15);
        assert_eq!(config.strategy.stop_loss, 0.05);
    }

    #[test]
    fn bad_source_kind_is_rejected() {
        let text = r#"
            [data]
            source = "oracle"
        "#;
        assert!(RunConfig::from_toml(text).is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = RunConfig::default();
        config.data.cache_path = Some(PathBuf::from("data/eth.json"));
        config.strategy.stop_loss = 0.03;
        let text = toml::to_string(&config).unwrap();
        let back = RunConfig::from_toml(&text).unwrap();
        assert_eq!(back, config);
    }
}
