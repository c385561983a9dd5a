//! JSON market-data cache.
//!
//! Live fetches are slow and rate-limited; a fetched batch is saved to a
//! single JSON file and replayed from there on subsequent runs. Malformed
//! cache content fails fast rather than seeding a partial simulation.

use super::DataError;
use crate::domain::MarketData;
use std::fs;
use std::path::Path;

/// Save a market batch as pretty-printed JSON, creating parent directories.
pub fn save_markets(markets: &[MarketData], path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(markets)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a market batch, validating every market before returning.
pub fn load_markets(path: &Path) -> Result<Vec<MarketData>, DataError> {
    let content = fs::read_to_string(path)?;
    let markets: Vec<MarketData> = serde_json::from_str(&content)?;
    for market in &markets {
        market.validate()?;
    }
    Ok(markets)
}
