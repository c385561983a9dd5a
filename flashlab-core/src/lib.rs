//! FlashLab Core — engine, domain types, crash detection, data acquisition.
//!
//! This crate contains the heart of the flash-crash backtester:
//! - Domain types (markets, ticks, positions, trades)
//! - Tick merger: two side streams into one causal timeline
//! - Crash detector contract and the default sliding-window `PriceTracker`
//! - Tick-by-tick engine with TP/SL/market-end exits and equity accounting
//! - Data sources (synthetic generator, Polymarket fetch, JSON cache)

pub mod data;
pub mod detector;
pub mod domain;
pub mod engine;
