//! Equity and trade accumulation across the whole run.

use crate::domain::Trade;
use serde::{Deserialize, Serialize};

/// Equity is sampled every Nth processed tick, counted across the whole
/// run rather than per market. The curve is a coarse trace; market
/// boundaries are always sampled regardless of where the cadence lands.
pub const EQUITY_SAMPLE_EVERY: u64 = 10;

/// One sample of cumulative account equity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub time: f64,
    pub equity: f64,
}

/// Running equity scalar plus the append-only trade and equity-curve logs.
///
/// The only state that crosses market boundaries.
#[derive(Debug, Clone)]
pub struct Accumulator {
    equity: f64,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    global_tick: u64,
}

impl Accumulator {
    pub fn new(starting_equity: f64) -> Self {
        Self {
            equity: starting_equity,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            global_tick: 0,
        }
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Apply a closed trade: equity moves by its pnl, the record is appended.
    pub fn record_trade(&mut self, trade: Trade) {
        self.equity += trade.pnl;
        self.trades.push(trade);
    }

    /// Count one processed tick; sample equity on the cadence.
    pub fn on_tick(&mut self, timestamp: f64) {
        self.global_tick += 1;
        if self.global_tick % EQUITY_SAMPLE_EVERY == 0 {
            self.equity_curve.push(EquityPoint {
                time: timestamp,
                equity: self.equity,
            });
        }
    }

    /// Unconditional sample at a market boundary, guaranteeing at least one
    /// point per processed market regardless of tick density.
    pub fn sample_market_boundary(&mut self, timestamp: f64) {
        self.equity_curve.push(EquityPoint {
            time: timestamp,
            equity: self.equity,
        });
    }

    /// If the first sample does not sit at the starting equity, prepend a
    /// synthetic leading point so the curve always begins at the baseline.
    /// A fully empty curve (all markets skipped) stays empty.
    pub fn ensure_baseline(&mut self, starting_equity: f64, start_time: f64) {
        if let Some(first) = self.equity_curve.first() {
            if first.equity != starting_equity {
                self.equity_curve.insert(
                    0,
                    EquityPoint {
                        time: start_time,
                        equity: starting_equity,
                    },
                );
            }
        }
    }

    pub fn into_logs(self) -> (Vec<Trade>, Vec<EquityPoint>) {
        (self.trades, self.equity_curve)
    }
}
