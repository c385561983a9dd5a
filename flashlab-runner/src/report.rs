//! Report assembly — the terminal aggregate of a run.
//!
//! A `BacktestReport` is derived data only: it holds the config, the trade
//! log, the equity curve, and statistics computed from them. `summary()`
//! renders the human-readable block; `to_json_value()` produces the
//! persisted JSON shape with display rounding. Internal values stay
//! unrounded.

use flashlab_core::domain::Trade;
use flashlab_core::engine::{BacktestConfig, EquityPoint};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Write as _;

use crate::metrics::PerformanceStats;

/// Version stamped into persisted report JSON.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete results of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub config: BacktestConfig,
    /// "live", "synthetic", or "cached".
    pub data_source: String,
    /// Markets handed to the engine, including ones with no price data.
    pub markets_analyzed: usize,
    pub stats: PerformanceStats,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestReport {
    /// Render the human-readable results block.
    pub fn summary(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "BACKTEST RESULTS");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Data Source:      {}", self.data_source);
        let _ = writeln!(out, "Markets Analyzed: {}", self.markets_analyzed);
        let _ = writeln!(out, "Starting Equity:  ${:.2}", self.config.starting_equity);
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Strategy Parameters ---");
        let _ = writeln!(out, "Drop Threshold:   {:.2}", self.config.drop_threshold);
        let _ = writeln!(out, "Lookback Window:  {}s", self.config.lookback_seconds);
        let _ = writeln!(out, "Take Profit:      +${:.2}", self.config.take_profit);
        let _ = writeln!(out, "Stop Loss:        -${:.2}", self.config.stop_loss);
        let _ = writeln!(out, "Trade Size:       ${:.2} USDC", self.config.size);
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Performance ---");
        let _ = writeln!(out, "Total PnL:        ${:+.4}", self.stats.total_pnl);
        let _ = writeln!(out, "Return:           {:+.2}%", self.stats.return_pct);
        let _ = writeln!(out, "Total Trades:     {}", self.stats.total_trades);
        let _ = writeln!(out, "Winning Trades:   {}", self.stats.winning_trades);
        let _ = writeln!(out, "Losing Trades:    {}", self.stats.losing_trades);
        let _ = writeln!(out, "Win Rate:         {:.1}%", self.stats.win_rate);
        let _ = writeln!(out, "Avg Win:          ${:+.4}", self.stats.avg_win);
        let _ = writeln!(out, "Avg Loss:         ${:+.4}", self.stats.avg_loss);
        let _ = writeln!(out, "Profit Factor:    {:.2}", self.stats.profit_factor);
        let _ = writeln!(
            out,
            "Max Drawdown:     {:.2}% (${:.2})",
            self.stats.max_drawdown_pct, self.stats.max_drawdown_dollars
        );
        let _ = writeln!(out, "Sharpe Ratio:     {:.2}", self.stats.sharpe_ratio);
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Exit Types ---");
        for (reason, count) in &self.stats.exit_counts {
            let _ = writeln!(out, "  {reason:<15}: {count}");
        }
        let _ = write!(out, "{rule}");
        out
    }

    /// The persisted JSON shape, rounded for display.
    ///
    /// An infinite profit factor has no JSON number; it serializes as
    /// `null`.
    pub fn to_json_value(&self) -> Value {
        let trades: Vec<Value> = self
            .trades
            .iter()
            .map(|t| {
                json!({
                    "market_slug": &t.market_slug,
                    "side": t.side,
                    "entry_price": round_to(t.entry_price, 4),
                    "exit_price": round_to(t.exit_price, 4),
                    "entry_time": t.entry_time,
                    "exit_time": t.exit_time,
                    "size_usdc": round_to(t.size_usdc, 2),
                    "size_shares": round_to(t.size_shares, 2),
                    "pnl": round_to(t.pnl, 4),
                    "exit_type": t.exit_reason,
                })
            })
            .collect();

        let curve: Vec<Value> = self
            .equity_curve
            .iter()
            .map(|p| {
                json!({
                    "time": round_to(p.time, 2),
                    "equity": round_to(p.equity, 4),
                })
            })
            .collect();

        let profit_factor = if self.stats.profit_factor.is_finite() {
            Value::from(round_to(self.stats.profit_factor, 2))
        } else {
            Value::Null
        };

        json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": self.config.run_id(),
            "config": &self.config,
            "data_source": &self.data_source,
            "markets_analyzed": self.markets_analyzed,
            "summary": {
                "total_pnl": round_to(self.stats.total_pnl, 4),
                "return_pct": round_to(self.stats.return_pct, 2),
                "total_trades": self.stats.total_trades,
                "winning_trades": self.stats.winning_trades,
                "losing_trades": self.stats.losing_trades,
                "win_rate": round_to(self.stats.win_rate, 1),
                "avg_win": round_to(self.stats.avg_win, 4),
                "avg_loss": round_to(self.stats.avg_loss, 4),
                "profit_factor": profit_factor,
                "max_drawdown_pct": round_to(self.stats.max_drawdown_pct, 2),
                "max_drawdown_dollars": round_to(self.stats.max_drawdown_dollars, 2),
                "sharpe_ratio": round_to(self.stats.sharpe_ratio, 2),
                "exit_counts": &self.stats.exit_counts,
            },
            "trades": trades,
            "equity_curve": curve,
        })
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashlab_core::domain::{ExitReason, Side};

    fn report_with(trades: Vec<Trade>, equity_curve: Vec<EquityPoint>) -> BacktestReport {
        let config = BacktestConfig::default();
        let stats = PerformanceStats::compute(&trades, &equity_curve, config.starting_equity);
        BacktestReport {
            config,
            data_source: "synthetic".to_string(),
            markets_analyzed: 3,
            stats,
            trades,
            equity_curve,
        }
    }

    fn one_trade(pnl: f64) -> Trade {
        Trade {
            market_slug: "eth-updown-15m-1000".into(),
            side: Side::Up,
            entry_price: 0.123456,
            exit_price: 0.223456,
            entry_time: 12.5,
            exit_time: 40.0,
            size_usdc: 5.0,
            size_shares: 40.500123,
            pnl,
            exit_reason: ExitReason::TakeProfit,
        }
    }

    #[test]
    fn summary_lists_exit_types_alphabetically() {
        let report = report_with(
            vec![one_trade(2.0), one_trade(-1.0)],
            vec![EquityPoint { time: 0.0, equity: 100.0 }],
        );
        let text = report.summary();
        assert!(text.contains("BACKTEST RESULTS"));
        assert!(text.contains("Data Source:      synthetic"));
        assert!(text.contains("Markets Analyzed: 3"));
        assert!(text.contains("take_profit    : 2"));
    }

    #[test]
    fn json_rounds_for_display_only() {
        let report = report_with(
            vec![one_trade(2.0)],
            vec![EquityPoint { time: 0.123, equity: 100.123456 }],
        );
        let value = report.to_json_value();
        assert_eq!(value["trades"][0]["entry_price"], 0.1235);
        assert_eq!(value["trades"][0]["size_shares"], 40.5);
        assert_eq!(value["equity_curve"][0]["time"], 0.12);
        assert_eq!(value["equity_curve"][0]["equity"], 100.1235);
        // The report itself keeps full precision.
        assert_eq!(report.trades[0].entry_price, 0.123456);
    }

    #[test]
    fn infinite_profit_factor_serializes_as_null() {
        let report = report_with(
            vec![one_trade(2.0)],
            vec![EquityPoint { time: 0.0, equity: 100.0 }],
        );
        assert!(report.stats.profit_factor.is_infinite());
        let value = report.to_json_value();
        assert!(value["summary"]["profit_factor"].is_null());
    }

    #[test]
    fn json_carries_schema_version_and_run_id() {
        let report = report_with(vec![], vec![]);
        let value = report.to_json_value();
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(
            value["run_id"].as_str().unwrap(),
            report.config.run_id()
        );
    }
}
