//! Performance statistics — pure functions over the trade log and equity
//! curve.
//!
//! Every metric is a pure function: trades and/or curve in, scalar out.
//! Zero-trade and empty-curve cases all fall back to 0.0 rather than NaN,
//! with one deliberate exception: `profit_factor` is `+inf` when there are
//! profits and no losses.

use flashlab_core::domain::Trade;
use flashlab_core::engine::EquityPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_pnl: f64,
    pub return_pct: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
    pub max_drawdown_pct: f64,
    pub max_drawdown_dollars: f64,
    pub sharpe_ratio: f64,
    /// Trade count per exit reason, keyed by the reason's wire name.
    pub exit_counts: BTreeMap<String, usize>,
}

impl PerformanceStats {
    /// Compute all statistics from a trade log and equity curve.
    pub fn compute(trades: &[Trade], equity_curve: &[EquityPoint], starting_equity: f64) -> Self {
        let mut exit_counts = BTreeMap::new();
        for trade in trades {
            *exit_counts.entry(trade.exit_reason.to_string()).or_insert(0) += 1;
        }
        Self {
            total_pnl: total_pnl(trades),
            return_pct: return_pct(trades, starting_equity),
            total_trades: trades.len(),
            winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
            losing_trades: trades.iter().filter(|t| !t.is_winner()).count(),
            win_rate: win_rate(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            profit_factor: profit_factor(trades),
            max_drawdown_pct: max_drawdown_pct(equity_curve),
            max_drawdown_dollars: max_drawdown_dollars(equity_curve),
            sharpe_ratio: sharpe_ratio(trades),
            exit_counts,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_pnl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

/// Total pnl as a percentage of starting equity.
pub fn return_pct(trades: &[Trade], starting_equity: f64) -> f64 {
    total_pnl(trades) / starting_equity * 100.0
}

/// Winning trades as a percentage of all trades. 0.0 with no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.is_winner()).count();
    wins as f64 / trades.len() as f64 * 100.0
}

/// Mean pnl over winning trades (pnl > 0). 0.0 when there are none.
pub fn avg_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl).collect();
    if wins.is_empty() {
        return 0.0;
    }
    wins.iter().sum::<f64>() / wins.len() as f64
}

/// Mean pnl over losing trades (pnl <= 0). 0.0 when there are none.
pub fn avg_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades.iter().filter(|t| !t.is_winner()).map(|t| t.pnl).collect();
    if losses.is_empty() {
        return 0.0;
    }
    losses.iter().sum::<f64>() / losses.len() as f64
}

/// Gross profit over absolute gross loss.
///
/// `+inf` when there are profits and no losses, 0.0 when there is
/// neither.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl)
        .sum::<f64>()
        .abs();
    if gross_loss == 0.0 {
        if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        gross_profit / gross_loss
    }
}

/// Largest peak-to-trough decline, as a percent of the running peak.
pub fn max_drawdown_pct(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        let dd = if peak > 0.0 {
            (peak - point.equity) / peak * 100.0
        } else {
            0.0
        };
        max_dd = max_dd.max(dd);
    }
    max_dd
}

/// Largest peak-to-trough decline in dollars.
pub fn max_drawdown_dollars(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        max_dd = max_dd.max(peak - point.equity);
    }
    max_dd
}

/// Per-trade Sharpe ratio: mean trade pnl over its Bessel-corrected
/// standard deviation. Not annualized. 0.0 for fewer than 2 trades or
/// zero dispersion.
pub fn sharpe_ratio(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
    let mean = pnls.iter().sum::<f64>() / pnls.len() as f64;
    let variance =
        pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (pnls.len() - 1) as f64;
    if variance <= 0.0 {
        return 0.0;
    }
    mean / variance.sqrt()
}
