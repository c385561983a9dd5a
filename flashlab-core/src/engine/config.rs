//! Strategy configuration for a backtest run.

use serde::{Deserialize, Serialize};

/// All strategy parameters for one backtest run.
///
/// `max_positions` is fixed at 1 by the engine's single-position state
/// machine; the field is carried so reports echo the full configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Flash-crash drop threshold in price units.
    pub drop_threshold: f64,
    /// Detector lookback window in seconds.
    pub lookback_seconds: u64,
    /// Take-profit delta above entry price.
    pub take_profit: f64,
    /// Stop-loss delta below entry price.
    pub stop_loss: f64,
    /// Notional trade size in USDC.
    pub size: f64,
    /// Maximum simultaneously open positions (always 1).
    pub max_positions: usize,
    /// Starting account equity in USDC.
    pub starting_equity: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            drop_threshold: 0.30,
            lookback_seconds: 10,
            take_profit: 0.10,
            stop_loss: 0.05,
            size: 5.0,
            max_positions: 1,
            starting_equity: 100.0,
        }
    }
}

impl BacktestConfig {
    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs share a run id, which makes result
    /// artifacts comparable across invocations.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
