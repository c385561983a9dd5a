//! Single-run orchestration: validate markets, run the engine, assemble
//! the report.

use anyhow::{bail, Context, Result};
use flashlab_core::detector::PriceTrackerFactory;
use flashlab_core::domain::MarketData;
use flashlab_core::engine::run_backtest;

use crate::config::RunConfig;
use crate::metrics::PerformanceStats;
use crate::report::BacktestReport;

/// Run one backtest over `markets` and build the report.
///
/// Every market is validated up front; a malformed market fails the run
/// before any simulation happens. `data_source` is a label for the report
/// ("live", "synthetic", "cached").
pub fn run(config: &RunConfig, markets: &[MarketData], data_source: &str) -> Result<BacktestReport> {
    if markets.is_empty() {
        bail!("no market data available");
    }
    for market in markets {
        market
            .validate()
            .with_context(|| format!("invalid market data for '{}'", market.slug))?;
    }

    let output = run_backtest(&config.strategy, markets, &PriceTrackerFactory);
    let stats = PerformanceStats::compute(
        &output.trades,
        &output.equity_curve,
        config.strategy.starting_equity,
    );

    Ok(BacktestReport {
        config: config.strategy.clone(),
        data_source: data_source.to_string(),
        markets_analyzed: output.markets_analyzed,
        stats,
        trades: output.trades,
        equity_curve: output.equity_curve,
    })
}
