//! Data acquisition: synthetic generation, Polymarket fetch, JSON cache.
//!
//! Both sources produce the same `Vec<MarketData>` shape so the engine and
//! runner never care where a market came from.

pub mod cache;
pub mod polymarket;
pub mod synthetic;

pub use cache::{load_markets, save_markets};
pub use polymarket::{fetch_market_history, PolymarketClient};
pub use synthetic::{generate_synthetic_markets, SyntheticConfig};

use thiserror::Error;

/// Structured errors for data operations.
///
/// Displayable as-is in CLI output; the runner wraps them with anyhow
/// context where call-site detail helps.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed market data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Progress callback for multi-market fetch operations.
pub trait FetchProgress {
    /// Called when a market window is about to be queried.
    fn on_window(&self, slug: &str);

    /// Called when a window yielded usable price data.
    fn on_market(&self, slug: &str, up_ticks: usize, down_ticks: usize);

    /// Called when a window was skipped (no market, no tokens, no prices).
    fn on_skip(&self, slug: &str, reason: &str);

    /// Called when the whole fetch is done.
    fn on_done(&self, fetched: usize, checked: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_window(&self, slug: &str) {
        println!("  Fetching market: {slug} ...");
    }

    fn on_market(&self, _slug: &str, up_ticks: usize, down_ticks: usize) {
        println!("    Got {up_ticks} up ticks, {down_ticks} down ticks");
    }

    fn on_skip(&self, _slug: &str, reason: &str) {
        println!("    Skipped: {reason}");
    }

    fn on_done(&self, fetched: usize, checked: usize) {
        println!("  Fetched {fetched} markets (checked {checked} windows)");
    }
}
