//! Open position state for the single-position state machine.

use super::market::Side;
use serde::{Deserialize, Serialize};

/// The OPEN state of the per-market position state machine.
///
/// At most one of these exists at any time; the engine refuses to open a
/// second position while one is held. Shares are `notional / entry_price`,
/// fixed at entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: f64,
    pub size_shares: f64,
}

impl OpenPosition {
    /// Open a position sized `notional / entry_price` shares.
    pub fn open(side: Side, entry_price: f64, entry_time: f64, notional: f64) -> Self {
        Self {
            side,
            entry_price,
            entry_time,
            size_shares: notional / entry_price,
        }
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        (current_price - self.entry_price) * self.size_shares
    }
}
