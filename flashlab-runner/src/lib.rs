//! FlashLab Runner — backtest orchestration, statistics, export, sweeps.
//!
//! This crate builds on `flashlab-core` to provide:
//! - TOML-loadable run configuration (data source + strategy)
//! - Performance statistics computed from the trade log and equity curve
//! - Report assembly with a human-readable summary and display-rounded JSON
//! - JSON/CSV artifact export
//! - Parallel parameter sweeps with a deterministic leaderboard

pub mod config;
pub mod export;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sweep;

pub use config::{DataConfig, DataSourceKind, RunConfig};
pub use export::{export_equity_csv, export_trades_csv, save_artifacts};
pub use metrics::PerformanceStats;
pub use report::{BacktestReport, SCHEMA_VERSION};
pub use runner::run;
pub use sweep::{run_sweep, SweepGrid, SweepRow};
