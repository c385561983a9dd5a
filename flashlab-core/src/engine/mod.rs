//! Tick-by-tick backtest engine.
//!
//! Per-tick phases, in fixed order:
//! 1. Feed observed side prices into the crash detector
//! 2. Exit checks for an open position (TP before SL)
//! 3. Entry check when flat (re-entry allowed on the close tick)
//! 4. Equity sampling on the global tick cadence

pub mod accumulator;
pub mod config;
pub mod loop_runner;

pub use accumulator::{Accumulator, EquityPoint, EQUITY_SAMPLE_EVERY};
pub use config::BacktestConfig;
pub use loop_runner::{run_backtest, RunOutput};
