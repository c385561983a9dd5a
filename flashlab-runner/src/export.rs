//! Artifact export — JSON report plus CSV trade tape and equity curve.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flashlab_core::domain::Trade;
use flashlab_core::engine::EquityPoint;

use crate::report::BacktestReport;

/// Export the trade tape as CSV.
///
/// Columns: market_slug, side, entry_price, exit_price, entry_time,
/// exit_time, size_usdc, size_shares, pnl, exit_type
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "market_slug",
        "side",
        "entry_price",
        "exit_price",
        "entry_time",
        "exit_time",
        "size_usdc",
        "size_shares",
        "pnl",
        "exit_type",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.market_slug,
            &t.side.to_string(),
            &format!("{:.4}", t.entry_price),
            &format!("{:.4}", t.exit_price),
            &format!("{:.2}", t.entry_time),
            &format!("{:.2}", t.exit_time),
            &format!("{:.2}", t.size_usdc),
            &format!("{:.2}", t.size_shares),
            &format!("{:.4}", t.pnl),
            &t.exit_reason.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the equity curve as CSV with `time,equity` columns.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["time", "equity"])?;
    for point in equity_curve {
        wtr.write_record([
            &format!("{:.2}", point.time),
            &format!("{:.4}", point.equity),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write `report.json`, `trades.csv`, and `equity.csv` under `dir`,
/// creating it if needed. Returns the written paths.
pub fn save_artifacts(report: &BacktestReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create artifact dir {}", dir.display()))?;

    let report_path = dir.join("report.json");
    let json = serde_json::to_string_pretty(&report.to_json_value())
        .context("failed to serialize report JSON")?;
    fs::write(&report_path, json)
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    let trades_path = dir.join("trades.csv");
    fs::write(&trades_path, export_trades_csv(&report.trades)?)
        .with_context(|| format!("failed to write {}", trades_path.display()))?;

    let equity_path = dir.join("equity.csv");
    fs::write(&equity_path, export_equity_csv(&report.equity_curve)?)
        .with_context(|| format!("failed to write {}", equity_path.display()))?;

    Ok(vec![report_path, trades_path, equity_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashlab_core::domain::{ExitReason, Side};

    fn sample_trade() -> Trade {
        Trade {
            market_slug: "eth-updown-15m-1000".into(),
            side: Side::Down,
            entry_price: 0.15,
            exit_price: 0.25,
            entry_time: 450.0,
            exit_time: 470.0,
            size_usdc: 5.0,
            size_shares: 33.333333,
            pnl: 3.333333,
            exit_reason: ExitReason::TakeProfit,
        }
    }

    #[test]
    fn trades_csv_has_header_and_one_row_per_trade() {
        let csv = export_trades_csv(&[sample_trade(), sample_trade()]).unwrap();
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("market_slug,side,entry_price"));
        assert!(lines[1].contains("eth-updown-15m-1000,down,0.1500,0.2500"));
        assert!(lines[1].ends_with("take_profit"));
    }

    #[test]
    fn equity_csv_round_trips_through_reader() {
        let curve = vec![
            EquityPoint { time: 0.0, equity: 100.0 },
            EquityPoint { time: 10.0, equity: 103.3333 },
        ];
        let csv_text = export_equity_csv(&curve).unwrap();
        let mut rdr = csv::Reader::from_reader(csv_text.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "10.00");
        assert_eq!(&rows[1][1], "103.3333");
    }
}
