//! Polymarket data fetch: Gamma market lookup + CLOB price history.
//!
//! The strategy trades 15-minute crypto up/down markets. Historical price
//! series come from the CLOB `/prices-history` endpoint, one request per
//! token; market metadata (token ids per outcome) comes from the Gamma
//! API by slug. Individual window failures are reported through
//! `FetchProgress` and skipped — a half-missing history is normal this
//! close to the live edge.

use super::{DataError, FetchProgress};
use crate::domain::{MarketData, PricePoint};
use chrono::{Timelike, Utc};
use serde::Deserialize;
use std::time::Duration;

pub const CLOB_HOST: &str = "https://clob.polymarket.com";
pub const GAMMA_HOST: &str = "https://gamma-api.polymarket.com";

/// Seconds per 15-minute market window.
const WINDOW_SECS: i64 = 900;

/// Map a coin symbol to its recurring market slug prefix.
pub fn coin_slug_prefix(coin: &str) -> Option<&'static str> {
    match coin.to_ascii_uppercase().as_str() {
        "BTC" => Some("btc-updown-15m"),
        "ETH" => Some("eth-updown-15m"),
        "SOL" => Some("sol-updown-15m"),
        "XRP" => Some("xrp-updown-15m"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<PricePoint>,
}

/// Gamma market payload, reduced to the fields we read. `clobTokenIds`
/// and `outcomes` arrive either as JSON arrays or as JSON-encoded strings
/// depending on endpoint version.
#[derive(Debug, Deserialize)]
struct GammaMarket {
    #[serde(rename = "clobTokenIds", default)]
    clob_token_ids: Option<serde_json::Value>,
    #[serde(default)]
    outcomes: Option<serde_json::Value>,
}

/// Blocking HTTP client for the Gamma and CLOB APIs.
pub struct PolymarketClient {
    client: reqwest::blocking::Client,
    gamma_host: String,
    clob_host: String,
}

impl Default for PolymarketClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PolymarketClient {
    pub fn new() -> Self {
        Self::with_hosts(GAMMA_HOST, CLOB_HOST)
    }

    /// Host override for tests against a local stub server.
    pub fn with_hosts(gamma_host: &str, clob_host: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            gamma_host: gamma_host.to_string(),
            clob_host: clob_host.to_string(),
        }
    }

    /// Price history for one token. Missing history deserializes as empty.
    pub fn price_history(
        &self,
        token_id: &str,
        start_ts: i64,
        end_ts: i64,
        fidelity: u32,
    ) -> Result<Vec<PricePoint>, DataError> {
        let url = format!("{}/prices-history", self.clob_host);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("market", token_id),
                ("startTs", &start_ts.to_string()),
                ("endTs", &end_ts.to_string()),
                ("fidelity", &fidelity.to_string()),
            ])
            .send()?;

        if !resp.status().is_success() {
            return Err(DataError::HttpStatus {
                status: resp.status().as_u16(),
                url,
            });
        }
        let body: HistoryResponse = resp.json()?;
        Ok(body.history)
    }

    /// Gamma market lookup by slug. `None` when the window has no market.
    fn market_by_slug(&self, slug: &str) -> Result<Option<GammaMarket>, DataError> {
        let url = format!("{}/markets/slug/{}", self.gamma_host, slug);
        let resp = self.client.get(&url).send()?;
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(DataError::HttpStatus {
                status: resp.status().as_u16(),
                url,
            });
        }
        Ok(Some(resp.json()?))
    }
}

/// Fetch up to `num_markets` recent 15-minute windows for one coin.
///
/// Walks back one window at a time from the current 15-minute boundary,
/// checking up to `3 × num_markets` windows so occasional gaps do not
/// starve the result. Per-window failures are skipped, not fatal.
pub fn fetch_market_history(
    client: &PolymarketClient,
    coin: &str,
    num_markets: usize,
    fidelity: u32,
    progress: &dyn FetchProgress,
) -> Result<Vec<MarketData>, DataError> {
    let prefix = coin_slug_prefix(coin).ok_or_else(|| {
        DataError::Validation(format!("unsupported coin: {coin} (use BTC, ETH, SOL, or XRP)"))
    })?;

    let now = Utc::now();
    let window_start = now
        .with_minute(now.minute() / 15 * 15)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("15-minute window floor is always representable");
    let current_ts = window_start.timestamp();

    let mut markets = Vec::new();
    let mut checked = 0usize;
    let max_attempts = num_markets * 3;

    for i in 1..=max_attempts {
        if markets.len() >= num_markets {
            break;
        }
        checked += 1;

        let start_ts = current_ts - (i as i64) * WINDOW_SECS;
        let end_ts = start_ts + WINDOW_SECS;
        let slug = format!("{prefix}-{start_ts}");
        progress.on_window(&slug);

        let market = match client.market_by_slug(&slug) {
            Ok(Some(m)) => m,
            Ok(None) => {
                progress.on_skip(&slug, "no market for this window");
                continue;
            }
            Err(err) => {
                progress.on_skip(&slug, &err.to_string());
                continue;
            }
        };

        let Some((up_id, down_id)) = parse_token_ids(&market) else {
            progress.on_skip(&slug, "missing up/down token ids");
            continue;
        };

        let up_prices = client
            .price_history(&up_id, start_ts, end_ts, fidelity)
            .unwrap_or_default();
        let down_prices = client
            .price_history(&down_id, start_ts, end_ts, fidelity)
            .unwrap_or_default();

        if up_prices.is_empty() && down_prices.is_empty() {
            progress.on_skip(&slug, "no price data available");
            continue;
        }

        progress.on_market(&slug, up_prices.len(), down_prices.len());
        markets.push(MarketData {
            slug,
            start_ts: start_ts as f64,
            end_ts: end_ts as f64,
            up_prices,
            down_prices,
        });

        // Light rate limiting between windows.
        std::thread::sleep(Duration::from_millis(200));
    }

    progress.on_done(markets.len(), checked);
    Ok(markets)
}

/// A Gamma field that is either a JSON array or a JSON-encoded string.
fn parse_json_list(value: &serde_json::Value) -> Option<Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(items) => Some(items.clone()),
        serde_json::Value::String(s) => serde_json::from_str(s).ok(),
        _ => None,
    }
}

/// Extract `(up_token_id, down_token_id)` by pairing `outcomes` with
/// `clobTokenIds` positionally.
fn parse_token_ids(market: &GammaMarket) -> Option<(String, String)> {
    let token_ids = parse_json_list(market.clob_token_ids.as_ref()?)?;
    let outcomes = parse_json_list(market.outcomes.as_ref()?)?;

    let mut up = None;
    let mut down = None;
    for (outcome, token) in outcomes.iter().zip(&token_ids) {
        let name = outcome.as_str()?.to_ascii_lowercase();
        let id = token.as_str()?.to_string();
        match name.as_str() {
            "up" => up = Some(id),
            "down" => down = Some(id),
            _ => {}
        }
    }
    Some((up?, down?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coin_prefixes() {
        assert_eq!(coin_slug_prefix("eth"), Some("eth-updown-15m"));
        assert_eq!(coin_slug_prefix("BTC"), Some("btc-updown-15m"));
        assert_eq!(coin_slug_prefix("DOGE"), None);
    }

    #[test]
    fn token_ids_from_json_arrays() {
        let market = GammaMarket {
            clob_token_ids: Some(json!(["tok-up", "tok-down"])),
            outcomes: Some(json!(["Up", "Down"])),
        };
        assert_eq!(
            parse_token_ids(&market),
            Some(("tok-up".into(), "tok-down".into()))
        );
    }

    #[test]
    fn token_ids_from_encoded_strings() {
        // Gamma sometimes double-encodes these fields.
        let market = GammaMarket {
            clob_token_ids: Some(json!("[\"tok-up\", \"tok-down\"]")),
            outcomes: Some(json!("[\"Up\", \"Down\"]")),
        };
        assert_eq!(
            parse_token_ids(&market),
            Some(("tok-up".into(), "tok-down".into()))
        );
    }

    #[test]
    fn token_ids_missing_outcome() {
        let market = GammaMarket {
            clob_token_ids: Some(json!(["tok-yes", "tok-no"])),
            outcomes: Some(json!(["Yes", "No"])),
        };
        assert_eq!(parse_token_ids(&market), None);
    }

    #[test]
    fn token_ids_absent_fields() {
        let market = GammaMarket {
            clob_token_ids: None,
            outcomes: Some(json!(["Up", "Down"])),
        };
        assert_eq!(parse_token_ids(&market), None);
    }

    #[test]
    fn history_response_tolerates_missing_field() {
        let body: HistoryResponse = serde_json::from_str("{}").unwrap();
        assert!(body.history.is_empty());

        let body: HistoryResponse =
            serde_json::from_str(r#"{"history":[{"t":1.0,"p":0.55}]}"#).unwrap();
        assert_eq!(body.history.len(), 1);
        assert_eq!(body.history[0].p, 0.55);
    }
}
