//! Position reconciliation CLI command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use fno_desk_core::{AppConfig, PositionSource};
use fno_desk_data::{CsvPositionSource, CsvStorage};
use fno_desk_reconciliation::{
    FutureMismatch, MatchState, ReconciliationEngine, ReconciliationReport, ReportFormatter,
    StrikeMismatch,
};

const STRIKE_MISMATCH_FILE: &str = "strike_mismatches.csv";
const FUTURE_MISMATCH_FILE: &str = "future_mismatches.csv";

/// Arguments for the reconcile command.
#[derive(Args, Debug, Clone)]
pub struct ReconcileArgs {
    /// Position ledger CSV (Stock, Type, Strike, NetQty, ...)
    #[arg(long)]
    pub positions: PathBuf,

    /// Directory for strike_mismatches.csv and future_mismatches.csv (not-matched books only)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Runs the reconcile command.
///
/// # Errors
/// Returns an error if the ledger cannot be loaded or an export cannot be written.
pub async fn run_reconcile(args: ReconcileArgs, config: &AppConfig) -> Result<()> {
    let source = CsvPositionSource::new(&args.positions);
    let rows = source
        .load_positions()
        .await
        .with_context(|| format!("Failed to load positions from {}", args.positions.display()))?;
    tracing::info!(source = source.name(), rows = rows.len(), "Loaded position ledger");

    let engine = ReconciliationEngine::new(config.reconciliation.clone());
    let report = engine.reconcile(&rows);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", ReportFormatter::format(&report));
    }

    if report.state == MatchState::NotMatched {
        tracing::warn!(records = report.mismatches.len(), "Book does not reconcile");
    }

    if let Some(dir) = &args.out_dir {
        if export_mismatches(dir, &report)? {
            tracing::info!(dir = %dir.display(), "Wrote mismatch tables");
        } else {
            tracing::info!("Book matched, no mismatch tables written");
        }
    }

    Ok(())
}

/// Writes both mismatch tables into `dir` for a not-matched book.
///
/// Returns `false` without touching the filesystem when the book matched.
fn export_mismatches(dir: &Path, report: &ReconciliationReport) -> Result<bool> {
    if report.state == MatchState::Matched {
        return Ok(false);
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    CsvStorage::write_records(
        &dir.join(STRIKE_MISMATCH_FILE),
        &StrikeMismatch::HEADERS,
        &report.mismatches.strikes,
    )?;
    CsvStorage::write_records(
        &dir.join(FUTURE_MISMATCH_FILE),
        &FutureMismatch::HEADERS,
        &report.mismatches.futures,
    )?;
    Ok(true)
}
