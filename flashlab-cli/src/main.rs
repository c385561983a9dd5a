//! FlashLab CLI — run, fetch, and sweep commands.
//!
//! Commands:
//! - `run` — backtest the flash-crash strategy over synthetic, live, or
//!   cached market data and write the artifact set
//! - `fetch` — download recent Polymarket 15-minute markets to a JSON file
//! - `sweep` — grid-search strategy parameters and print a leaderboard

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use flashlab_core::data::{cache, polymarket, synthetic, StdoutProgress};
use flashlab_core::domain::MarketData;
use flashlab_runner::{run, run_sweep, save_artifacts, DataConfig, DataSourceKind, RunConfig, SweepGrid};

#[derive(Parser)]
#[command(name = "flashlab", about = "FlashLab — flash-crash strategy backtester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the strategy and write report.json, trades.csv, equity.csv.
    Run {
        /// Path to a TOML run config. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data source: synthetic or live.
        #[arg(long)]
        source: Option<String>,

        /// Coin for live data: BTC, ETH, SOL, XRP.
        #[arg(long)]
        coin: Option<String>,

        /// Number of markets to fetch or generate.
        #[arg(long)]
        markets: Option<usize>,

        /// Crash probability per market (synthetic mode).
        #[arg(long)]
        crash_prob: Option<f64>,

        /// Seed for synthetic data.
        #[arg(long)]
        seed: Option<u64>,

        /// Flash-crash drop threshold.
        #[arg(long)]
        drop: Option<f64>,

        /// Lookback window in seconds.
        #[arg(long)]
        lookback: Option<u64>,

        /// Take-profit delta above entry.
        #[arg(long)]
        tp: Option<f64>,

        /// Stop-loss delta below entry.
        #[arg(long)]
        sl: Option<f64>,

        /// Trade size in USDC.
        #[arg(long)]
        size: Option<f64>,

        /// Starting equity in USDC.
        #[arg(long)]
        equity: Option<f64>,

        /// Market-data JSON cache: loaded when present, written otherwise.
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Output directory for the artifact set.
        #[arg(long, default_value = "results")]
        output: PathBuf,
    },
    /// Download recent Polymarket markets and save them as JSON.
    Fetch {
        /// Coin: BTC, ETH, SOL, XRP.
        #[arg(long, default_value = "ETH")]
        coin: String,

        /// Number of markets to fetch.
        #[arg(long, default_value_t = 30)]
        markets: usize,

        /// Output JSON file.
        #[arg(long, default_value = "data/markets.json")]
        out: PathBuf,
    },
    /// Grid-search strategy parameters and print a leaderboard.
    Sweep {
        /// Comma-separated drop thresholds (e.g. 0.2,0.25,0.3).
        #[arg(long, value_delimiter = ',')]
        drop: Vec<f64>,

        /// Comma-separated take-profit deltas.
        #[arg(long, value_delimiter = ',')]
        tp: Vec<f64>,

        /// Comma-separated stop-loss deltas.
        #[arg(long, value_delimiter = ',')]
        sl: Vec<f64>,

        /// Number of synthetic markets to evaluate over.
        #[arg(long, default_value_t = 30)]
        markets: usize,

        /// Crash probability per market.
        #[arg(long, default_value_t = 0.3)]
        crash_prob: f64,

        /// Seed for synthetic data.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Market-data JSON cache to evaluate over instead of synthetic.
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Optional JSON file for the full leaderboard.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            source,
            coin,
            markets,
            crash_prob,
            seed,
            drop,
            lookback,
            tp,
            sl,
            size,
            equity,
            cache,
            output,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::from_file(&path)?,
                None => RunConfig::default(),
            };
            if let Some(source) = source {
                run_config.data.source = parse_source(&source)?;
            }
            if let Some(coin) = coin {
                run_config.data.coin = coin;
            }
            if let Some(markets) = markets {
                run_config.data.num_markets = markets;
            }
            if let Some(crash_prob) = crash_prob {
                run_config.data.crash_probability = crash_prob;
            }
            if let Some(seed) = seed {
                run_config.data.seed = seed;
            }
            if let Some(cache) = cache {
                run_config.data.cache_path = Some(cache);
            }
            if let Some(drop) = drop {
                run_config.strategy.drop_threshold = drop;
            }
            if let Some(lookback) = lookback {
                run_config.strategy.lookback_seconds = lookback;
            }
            if let Some(tp) = tp {
                run_config.strategy.take_profit = tp;
            }
            if let Some(sl) = sl {
                run_config.strategy.stop_loss = sl;
            }
            if let Some(size) = size {
                run_config.strategy.size = size;
            }
            if let Some(equity) = equity {
                run_config.strategy.starting_equity = equity;
            }
            run_cmd(&run_config, &output)
        }
        Commands::Fetch { coin, markets, out } => fetch_cmd(&coin, markets, &out),
        Commands::Sweep {
            drop,
            tp,
            sl,
            markets,
            crash_prob,
            seed,
            cache,
            output,
        } => sweep_cmd(drop, tp, sl, markets, crash_prob, seed, cache, output),
    }
}

fn parse_source(s: &str) -> Result<DataSourceKind> {
    match s {
        "synthetic" => Ok(DataSourceKind::Synthetic),
        "live" => Ok(DataSourceKind::Live),
        "cached" => Ok(DataSourceKind::Cached),
        other => bail!("unknown data source '{other}' (use synthetic, live, or cached)"),
    }
}

/// Load or generate markets per the data config. Returns the markets and
/// the source label for the report.
fn load_markets(data: &DataConfig) -> Result<(Vec<MarketData>, &'static str)> {
    // An existing cache file wins over fetching or generating.
    if let Some(path) = &data.cache_path {
        if path.exists() {
            println!("Loading cached data from {} ...", path.display());
            let markets = cache::load_markets(path)?;
            return Ok((markets, "cached"));
        }
    }

    let (markets, label) = match data.source {
        DataSourceKind::Live => {
            println!(
                "Fetching live data from Polymarket ({}, {} markets) ...",
                data.coin, data.num_markets
            );
            let client = polymarket::PolymarketClient::new();
            let markets = polymarket::fetch_market_history(
                &client,
                &data.coin,
                data.num_markets,
                1,
                &StdoutProgress,
            )?;
            (markets, "live")
        }
        DataSourceKind::Synthetic => {
            println!(
                "Generating synthetic data ({} markets, crash_prob={}) ...",
                data.num_markets, data.crash_probability
            );
            let config = synthetic::SyntheticConfig {
                num_markets: data.num_markets,
                crash_probability: data.crash_probability,
                seed: data.seed,
                ..synthetic::SyntheticConfig::default()
            };
            let base_ts = chrono::Utc::now().timestamp() as f64;
            (synthetic::generate_synthetic_markets(&config, base_ts), "synthetic")
        }
        DataSourceKind::Cached => {
            let path = data
                .cache_path
                .as_ref()
                .context("source 'cached' requires a cache path")?;
            bail!("cache file {} does not exist", path.display());
        }
    };

    if let Some(path) = &data.cache_path {
        cache::save_markets(&markets, path)?;
        println!("Saved market data to {}", path.display());
    }
    Ok((markets, label))
}

fn run_cmd(config: &RunConfig, output: &Path) -> Result<()> {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("POLYMARKET FLASH CRASH STRATEGY BACKTEST");
    println!("{rule}");

    let (markets, label) = load_markets(&config.data)?;
    if markets.is_empty() {
        eprintln!("ERROR: No market data available. Exiting.");
        std::process::exit(1);
    }

    println!("\nRunning backtest engine ({} markets) ...\n", markets.len());
    let report = run(config, &markets, label)?;
    println!("{}", report.summary());

    let paths = save_artifacts(&report, output)?;
    println!("\nResults saved to {}", paths[0].display());
    Ok(())
}

fn fetch_cmd(coin: &str, markets: usize, out: &Path) -> Result<()> {
    let client = polymarket::PolymarketClient::new();
    let fetched = polymarket::fetch_market_history(&client, coin, markets, 1, &StdoutProgress)?;
    if fetched.is_empty() {
        eprintln!("ERROR: No market data available. Exiting.");
        std::process::exit(1);
    }
    cache::save_markets(&fetched, out)?;
    println!("Saved {} markets to {}", fetched.len(), out.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sweep_cmd(
    drop: Vec<f64>,
    tp: Vec<f64>,
    sl: Vec<f64>,
    markets: usize,
    crash_prob: f64,
    seed: u64,
    cache_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let data = DataConfig {
        num_markets: markets,
        crash_probability: crash_prob,
        seed,
        cache_path,
        ..DataConfig::default()
    };
    let (market_data, label) = load_markets(&data)?;
    if market_data.is_empty() {
        eprintln!("ERROR: No market data available. Exiting.");
        std::process::exit(1);
    }

    let grid = SweepGrid {
        drop_thresholds: drop,
        take_profits: tp,
        stop_losses: sl,
    };
    println!(
        "Sweeping {} configs over {} {} markets ...\n",
        grid.size(),
        market_data.len(),
        label
    );
    let rows = run_sweep(&grid, &RunConfig::default().strategy, &market_data);

    println!(
        "{:>6} {:>6} {:>6} {:>12} {:>8} {:>9} {:>8} {:>8}",
        "drop", "tp", "sl", "total_pnl", "trades", "win_rate", "max_dd%", "sharpe"
    );
    for row in &rows {
        println!(
            "{:>6.2} {:>6.2} {:>6.2} {:>12.4} {:>8} {:>8.1}% {:>8.2} {:>8.2}",
            row.drop_threshold,
            row.take_profit,
            row.stop_loss,
            row.total_pnl,
            row.total_trades,
            row.win_rate,
            row.max_drawdown_pct,
            row.sharpe_ratio,
        );
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&rows)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nLeaderboard saved to {}", path.display());
    }
    Ok(())
}
