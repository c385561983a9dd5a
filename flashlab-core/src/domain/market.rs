//! Market data: one bounded window of a binary-outcome market.

use crate::data::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two binary outcomes of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Up,
    Down,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Up => write!(f, "up"),
            Side::Down => write!(f, "down"),
        }
    }
}

/// One timestamped price observation. `t` is unix seconds, `p` is a
/// probability-like price in (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub t: f64,
    pub p: f64,
}

/// One bounded market window with its two price sequences.
///
/// Markets are independent: no engine state carries across them except
/// cumulative equity and the trade/equity-curve logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    pub slug: String,
    pub start_ts: f64,
    pub end_ts: f64,
    #[serde(default)]
    pub up_prices: Vec<PricePoint>,
    #[serde(default)]
    pub down_prices: Vec<PricePoint>,
}

impl MarketData {
    /// A market with no observations on either side is skipped by the engine.
    pub fn is_empty(&self) -> bool {
        self.up_prices.is_empty() && self.down_prices.is_empty()
    }

    pub fn prices(&self, side: Side) -> &[PricePoint] {
        match side {
            Side::Up => &self.up_prices,
            Side::Down => &self.down_prices,
        }
    }

    /// Last recorded price for a side, used for market-end force-closes.
    pub fn last_price(&self, side: Side) -> Option<f64> {
        self.prices(side).last().map(|pt| pt.p)
    }

    /// Structural validation, run before simulation begins.
    ///
    /// Partial simulation over corrupt input is unrecoverable, so malformed
    /// markets fail fast here. Degenerate-but-well-formed inputs (empty
    /// sides, out-of-band prices) are engine policy, not errors.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.slug.is_empty() {
            return Err(DataError::Validation("market slug is empty".into()));
        }
        if self.end_ts <= self.start_ts {
            return Err(DataError::Validation(format!(
                "market '{}': end_ts {} is not after start_ts {}",
                self.slug, self.end_ts, self.start_ts
            )));
        }
        for (name, prices) in [("up", &self.up_prices), ("down", &self.down_prices)] {
            for pair in prices.windows(2) {
                if pair[1].t < pair[0].t {
                    return Err(DataError::Validation(format!(
                        "market '{}': {name} prices are not chronological at t={}",
                        self.slug, pair[1].t
                    )));
                }
            }
        }
        Ok(())
    }
}
