//! The per-market tick loop and cross-market orchestration.

use crate::detector::DetectorFactory;
use crate::domain::{merge_ticks, ExitReason, MarketData, OpenPosition, Side, Trade};

use super::accumulator::{Accumulator, EquityPoint};
use super::config::BacktestConfig;

/// Everything the engine produces: the trade log, the equity curve, and
/// the count of markets it was handed (including skipped ones).
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub markets_analyzed: usize,
}

/// Replay all markets through the strategy, in input order.
///
/// Each market gets a fresh detector from the factory — signal state never
/// crosses a market boundary. Within a market the tick phases run in the
/// fixed order documented on [`crate::engine`]; TP is checked before SL so
/// take-profit wins a threshold straddle, and an entry is permitted on the
/// same tick a position closed. After all markets the equity curve is
/// anchored at the configured starting equity.
pub fn run_backtest(
    config: &BacktestConfig,
    markets: &[MarketData],
    factory: &dyn DetectorFactory,
) -> RunOutput {
    let mut acc = Accumulator::new(config.starting_equity);

    for market in markets {
        if market.is_empty() {
            continue;
        }

        let mut detector = factory.create(config);
        let mut position: Option<OpenPosition> = None;
        let ticks = merge_ticks(&market.up_prices, &market.down_prices);

        for tick in &ticks {
            // Phase 1: feed observations. Sides with no price or a
            // non-positive price are skipped.
            if let Some(p) = tick.up.filter(|&p| p > 0.0) {
                detector.record(Side::Up, p, tick.t);
            }
            if let Some(p) = tick.down.filter(|&p| p > 0.0) {
                detector.record(Side::Down, p, tick.t);
            }

            // Phase 2: exit checks. No price for the held side this tick
            // means no exit evaluation this tick.
            if let Some(pos) = position {
                if let Some(current) = tick.price(pos.side).filter(|&p| p > 0.0) {
                    let tp_price = pos.entry_price + config.take_profit;
                    let sl_price = pos.entry_price - config.stop_loss;

                    // TP first: it wins when one tick straddles both levels.
                    let exit = if current >= tp_price {
                        Some((tp_price, ExitReason::TakeProfit))
                    } else if current <= sl_price {
                        Some((sl_price, ExitReason::StopLoss))
                    } else {
                        None
                    };

                    if let Some((exit_price, reason)) = exit {
                        acc.record_trade(close(&market.slug, &pos, exit_price, tick.t, reason, config));
                        position = None;
                    }
                }
            }

            // Phase 3: entry. Runs when flat, including the tick that just
            // closed a position, so at most one position is ever open.
            if position.is_none() {
                if let Some(event) = detector.detect_flash_crash() {
                    if let Some(entry_price) = tick.price(event.side).filter(|&p| p > 0.0) {
                        position = Some(OpenPosition::open(event.side, entry_price, tick.t, config.size));
                    }
                }
            }

            // Phase 4: equity sampling on the global cadence.
            acc.on_tick(tick.t);
        }

        // Market end: force-close at the last recorded price for the held
        // side. With no valid last price the position is dropped without a
        // trade — deliberate quirk, preserved as-is.
        if let Some(pos) = position.take() {
            match market.last_price(pos.side) {
                Some(last) if last > 0.0 => {
                    acc.record_trade(close(
                        &market.slug,
                        &pos,
                        last,
                        market.end_ts,
                        ExitReason::MarketEnd,
                        config,
                    ));
                }
                _ => {}
            }
        }

        acc.sample_market_boundary(market.end_ts);
    }

    if let Some(first) = markets.first() {
        acc.ensure_baseline(config.starting_equity, first.start_ts);
    }

    let (trades, equity_curve) = acc.into_logs();
    RunOutput {
        trades,
        equity_curve,
        markets_analyzed: markets.len(),
    }
}

fn close(
    slug: &str,
    pos: &OpenPosition,
    exit_price: f64,
    exit_time: f64,
    exit_reason: ExitReason,
    config: &BacktestConfig,
) -> Trade {
    Trade {
        market_slug: slug.to_string(),
        side: pos.side,
        entry_price: pos.entry_price,
        exit_price,
        entry_time: pos.entry_time,
        exit_time,
        size_usdc: config.size,
        size_shares: pos.size_shares,
        pnl: (exit_price - pos.entry_price) * pos.size_shares,
        exit_reason,
    }
}
