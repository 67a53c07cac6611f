//! ATM position report CLI command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fno_desk_core::{AppConfig, PositionSource};
use fno_desk_data::{CsvPositionSource, CsvStorage};
use fno_desk_reconciliation::{find_atm_positions, AtmPosition, ReportFormatter};
use rust_decimal::Decimal;

/// Arguments for the atm-positions command.
#[derive(Args, Debug, Clone)]
pub struct AtmPositionsArgs {
    /// Position ledger CSV; futures rows need an LTP column
    #[arg(long)]
    pub positions: PathBuf,

    /// Price distance from the future's LTP (defaults to config)
    #[arg(long)]
    pub range: Option<Decimal>,

    /// Write the matching positions to CSV
    #[arg(long)]
    pub csv_out: Option<PathBuf>,
}

/// Runs the atm-positions command.
///
/// # Errors
/// Returns an error if the ledger cannot be loaded or the export cannot be written.
pub async fn run_atm_positions(args: AtmPositionsArgs, config: &AppConfig) -> Result<()> {
    let range = args.range.unwrap_or(config.atm_position.range);
    let rows = CsvPositionSource::new(&args.positions)
        .load_positions()
        .await
        .with_context(|| format!("Failed to load positions from {}", args.positions.display()))?;

    let positions = find_atm_positions(&rows, range);
    tracing::info!(%range, found = positions.len(), "Scanned for ATM options");
    print!("{}", ReportFormatter::format_atm(&positions, range));

    if let Some(path) = &args.csv_out {
        CsvStorage::write_records(path, &AtmPosition::HEADERS, &positions)?;
        tracing::info!(path = %path.display(), "Wrote ATM positions");
    }

    Ok(())
}
