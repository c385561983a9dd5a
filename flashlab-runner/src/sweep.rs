//! Parameter sweep: grid search over strategy parameters.
//!
//! Candidates run in parallel over the same market set. Output order is
//! deterministic regardless of thread scheduling: rows sort by total pnl
//! descending, ties broken by the parameters themselves.

use flashlab_core::detector::PriceTrackerFactory;
use flashlab_core::domain::MarketData;
use flashlab_core::engine::{run_backtest, BacktestConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metrics::PerformanceStats;

/// Parameter ranges to sweep. Empty lists fall back to the base config's
/// value for that parameter.
#[derive(Debug, Clone, Default)]
pub struct SweepGrid {
    pub drop_thresholds: Vec<f64>,
    pub take_profits: Vec<f64>,
    pub stop_losses: Vec<f64>,
}

impl SweepGrid {
    /// Number of candidate configs the grid expands to.
    pub fn size(&self) -> usize {
        self.axis_len(&self.drop_thresholds)
            * self.axis_len(&self.take_profits)
            * self.axis_len(&self.stop_losses)
    }

    fn axis_len(&self, axis: &[f64]) -> usize {
        axis.len().max(1)
    }

    /// Expand the grid to the cartesian product of its axes.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let drops = axis_or(&self.drop_thresholds, base.drop_threshold);
        let tps = axis_or(&self.take_profits, base.take_profit);
        let sls = axis_or(&self.stop_losses, base.stop_loss);

        let mut configs = Vec::with_capacity(drops.len() * tps.len() * sls.len());
        for &drop_threshold in &drops {
            for &take_profit in &tps {
                for &stop_loss in &sls {
                    configs.push(BacktestConfig {
                        drop_threshold,
                        take_profit,
                        stop_loss,
                        ..base.clone()
                    });
                }
            }
        }
        configs
    }
}

fn axis_or(axis: &[f64], fallback: f64) -> Vec<f64> {
    if axis.is_empty() {
        vec![fallback]
    } else {
        axis.to_vec()
    }
}

/// One leaderboard row of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub drop_threshold: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub total_pnl: f64,
    pub total_trades: usize,
    pub win_rate: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
}

/// Evaluate every candidate in the grid over the same markets.
pub fn run_sweep(grid: &SweepGrid, base: &BacktestConfig, markets: &[MarketData]) -> Vec<SweepRow> {
    let configs = grid.generate_configs(base);

    let mut rows: Vec<SweepRow> = configs
        .par_iter()
        .map(|config| {
            let output = run_backtest(config, markets, &PriceTrackerFactory);
            let stats = PerformanceStats::compute(
                &output.trades,
                &output.equity_curve,
                config.starting_equity,
            );
            SweepRow {
                drop_threshold: config.drop_threshold,
                take_profit: config.take_profit,
                stop_loss: config.stop_loss,
                total_pnl: stats.total_pnl,
                total_trades: stats.total_trades,
                win_rate: stats.win_rate,
                max_drawdown_pct: stats.max_drawdown_pct,
                sharpe_ratio: stats.sharpe_ratio,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_pnl
            .total_cmp(&a.total_pnl)
            .then(a.drop_threshold.total_cmp(&b.drop_threshold))
            .then(a.take_profit.total_cmp(&b.take_profit))
            .then(a.stop_loss.total_cmp(&b.stop_loss))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashlab_core::domain::PricePoint;

    fn crash_market() -> MarketData {
        let mut up_prices: Vec<PricePoint> =
            (0..900).map(|i| PricePoint { t: i as f64, p: 0.5 }).collect();
        for pt in up_prices.iter_mut().skip(450) {
            pt.p = 0.15;
        }
        for pt in up_prices.iter_mut().skip(470) {
            pt.p = 0.40;
        }
        MarketData {
            slug: "sweep-crash".into(),
            start_ts: 0.0,
            end_ts: 900.0,
            up_prices,
            down_prices: vec![],
        }
    }

    #[test]
    fn grid_expands_to_cartesian_product() {
        let grid = SweepGrid {
            drop_thresholds: vec![0.2, 0.3],
            take_profits: vec![0.05, 0.10, 0.15],
            stop_losses: vec![],
        };
        assert_eq!(grid.size(), 6);
        let configs = grid.generate_configs(&BacktestConfig::default());
        assert_eq!(configs.len(), 6);
        // The empty axis keeps the base value.
        assert!(configs.iter().all(|c| c.stop_loss == 0.05));
    }

    #[test]
    fn sweep_is_deterministic_and_sorted() {
        let grid = SweepGrid {
            drop_thresholds: vec![0.2, 0.3, 0.6],
            take_profits: vec![0.05, 0.10],
            stop_losses: vec![0.05],
        };
        let base = BacktestConfig::default();
        let markets = vec![crash_market()];

        let first = run_sweep(&grid, &base, &markets);
        let second = run_sweep(&grid, &base, &markets);
        assert_eq!(first.len(), 6);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.drop_threshold, b.drop_threshold);
            assert_eq!(a.take_profit, b.take_profit);
            assert_eq!(a.total_pnl, b.total_pnl);
        }
        for pair in first.windows(2) {
            assert!(pair[0].total_pnl >= pair[1].total_pnl);
        }
    }

    #[test]
    fn impossible_threshold_yields_zero_trades() {
        let grid = SweepGrid {
            drop_thresholds: vec![0.99],
            ..SweepGrid::default()
        };
        let rows = run_sweep(&grid, &BacktestConfig::default(), &[crash_market()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_trades, 0);
    }
}
