//! Trade — an immutable completed record: entry → exit.

use super::market::Side;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    MarketEnd,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TakeProfit => write!(f, "take_profit"),
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::MarketEnd => write!(f, "market_end"),
        }
    }
}

/// A completed trade. Created exactly once per closed position and never
/// mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub market_slug: String,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: f64,
    pub exit_time: f64,
    pub size_usdc: f64,
    pub size_shares: f64,
    pub pnl: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
