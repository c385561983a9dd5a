//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Tick merge — every timestamp from either side appears exactly once,
//!    in ascending order, carrying the right per-side price
//! 2. Single position — trades never overlap, whatever the price path
//! 3. Equity identity — final curve equity equals starting + sum of pnl

use proptest::prelude::*;
use flashlab_core::detector::PriceTrackerFactory;
use flashlab_core::domain::{merge_ticks, MarketData, PricePoint};
use flashlab_core::engine::{run_backtest, BacktestConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (0.02..0.98_f64).prop_map(|p| (p * 10_000.0).round() / 10_000.0)
}

fn arb_side_series(max_len: usize) -> impl Strategy<Value = Vec<PricePoint>> {
    prop::collection::vec((0u32..3_000, arb_price()), 0..max_len).prop_map(|raw| {
        let mut points: Vec<PricePoint> = raw
            .into_iter()
            .map(|(t, p)| PricePoint { t: t as f64, p })
            .collect();
        points.sort_by(|a, b| a.t.total_cmp(&b.t));
        points.dedup_by(|a, b| a.t == b.t);
        points
    })
}

// ── 1. Tick merge ────────────────────────────────────────────────────

proptest! {
    /// Merging two sorted per-side series yields one tick per distinct
    /// timestamp, ascending, with each side's price attached where that
    /// side printed.
    #[test]
    fn merge_covers_union_exactly_once(
        up in arb_side_series(60),
        down in arb_side_series(60),
    ) {
        let ticks = merge_ticks(&up, &down);

        let mut expected: Vec<f64> =
            up.iter().chain(down.iter()).map(|p| p.t).collect();
        expected.sort_by(f64::total_cmp);
        expected.dedup();

        prop_assert_eq!(ticks.len(), expected.len());
        for (tick, t) in ticks.iter().zip(&expected) {
            prop_assert_eq!(tick.t, *t);
        }
        for pair in ticks.windows(2) {
            prop_assert!(pair[0].t < pair[1].t);
        }

        for point in &up {
            let tick = ticks.iter().find(|k| k.t == point.t).unwrap();
            prop_assert_eq!(tick.up, Some(point.p));
        }
        for point in &down {
            let tick = ticks.iter().find(|k| k.t == point.t).unwrap();
            prop_assert_eq!(tick.down, Some(point.p));
        }
    }
}

// ── 2 & 3. Engine invariants on arbitrary price paths ────────────────

fn arb_market(index: usize) -> impl Strategy<Value = MarketData> {
    let start = (index * 1_000) as f64;
    (arb_side_series(120), arb_side_series(120)).prop_map(move |(mut up, mut down)| {
        for p in up.iter_mut().chain(down.iter_mut()) {
            p.t += start;
        }
        MarketData {
            slug: format!("prop-{index}"),
            start_ts: start,
            end_ts: start + 3_000.0,
            up_prices: up,
            down_prices: down,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn trades_never_overlap((a, b) in (arb_market(0), arb_market(5))) {
        let out = run_backtest(&BacktestConfig::default(), &[a, b], &PriceTrackerFactory);
        for pair in out.trades.windows(2) {
            prop_assert!(pair[1].entry_time >= pair[0].exit_time);
        }
        for trade in &out.trades {
            prop_assert!(trade.exit_time >= trade.entry_time);
        }
    }

    #[test]
    fn equity_identity_holds(market in arb_market(1)) {
        let cfg = BacktestConfig::default();
        let out = run_backtest(&cfg, &[market], &PriceTrackerFactory);
        let total_pnl: f64 = out.trades.iter().map(|t| t.pnl).sum();
        if let Some(last) = out.equity_curve.last() {
            prop_assert!((last.equity - (cfg.starting_equity + total_pnl)).abs() < 1e-6);
        } else {
            // No curve means no market produced a tick, so no trades either.
            prop_assert!(out.trades.is_empty());
        }
    }
}
