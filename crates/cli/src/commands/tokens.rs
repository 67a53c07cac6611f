//! Token selection CLI command.
//!
//! Loads the day's bhavcopy (with optional fallback), runs the selector and
//! prints the cleaned token list with a per-class summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use fno_desk_core::{AppConfig, ExpiryMonth, SortOrder};
use fno_desk_data::{is_trading_day, snapshot_source_from_config, CsvStorage};
use fno_desk_token_selector::{SelectionDetail, TokenSelectionCriteria, TokenSelector, TokenSummary};
use rust_decimal::Decimal;

/// Arguments for the tokens command.
#[derive(Args, Debug, Clone)]
pub struct TokensArgs {
    /// Bhavcopy CSV to read instead of the configured snapshot directory
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Bhavcopy CSV used when the primary snapshot is missing or empty
    #[arg(long)]
    pub fallback: Option<PathBuf>,

    /// Trading date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Expiry month code (e.g. "JAN"). Defaults to config, then the current month.
    #[arg(long)]
    pub month: Option<ExpiryMonth>,

    /// Far-from-money rows need OI per lot strictly above this
    #[arg(long)]
    pub oi_threshold: Option<Decimal>,

    /// Width of the near-the-money band, in percent of the underlying
    #[arg(long)]
    pub atm_pct: Option<Decimal>,

    /// Sort tokens in descending order
    #[arg(long)]
    pub descending: bool,

    /// Write tokens to a CSV file with a `token` header
    #[arg(long)]
    pub csv_out: Option<PathBuf>,

    /// Write tokens to a newline-separated text file
    #[arg(long)]
    pub txt_out: Option<PathBuf>,

    /// Print the per-row selection breakdown before the token list
    #[arg(long)]
    pub details: bool,
}

impl TokensArgs {
    fn criteria(&self, config: &AppConfig) -> Result<TokenSelectionCriteria> {
        let mut selector_config = config.token_selector.clone();
        if let Some(month) = self.month {
            selector_config.month = Some(month);
        }
        if let Some(threshold) = self.oi_threshold {
            selector_config.oi_threshold = threshold;
        }
        if let Some(atm_pct) = self.atm_pct {
            selector_config.atm_pct = atm_pct;
        }
        if self.descending {
            selector_config.sort = SortOrder::Descending;
        }
        Ok(TokenSelectionCriteria::try_from(&selector_config)?)
    }
}

/// Runs the tokens command.
///
/// # Errors
/// Returns an error if the snapshot cannot be loaded, a selection stage comes
/// up empty, or an export cannot be written.
pub async fn run_tokens(args: TokensArgs, config: &AppConfig) -> Result<()> {
    let criteria = args.criteria(config)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    if !is_trading_day(date) {
        tracing::warn!(%date, "Requested date falls on a weekend");
    }

    let mut sources = config.sources.clone();
    if let Some(fallback) = &args.fallback {
        sources.fallback_snapshot = Some(fallback.display().to_string());
    }
    let source = snapshot_source_from_config(&sources, args.snapshot.as_deref())?;

    tracing::info!(
        source = source.name(),
        %date,
        month = %criteria.month,
        oi_threshold = %criteria.oi_threshold,
        atm_pct = %criteria.atm_pct,
        "Running token selection"
    );
    let snapshot = source
        .load_snapshot(date)
        .await
        .with_context(|| format!("Failed to load snapshot for {date}"))?;

    let selector = TokenSelector::new(criteria);
    if args.details {
        print_details(&selector.get_selection_details(&snapshot)?);
    }

    let tokens = selector.select_tokens(&snapshot)?;
    let summary = TokenSummary::from_tokens(&tokens);

    println!("\n{}", "=".repeat(60));
    println!("Selected Tokens - {}", selector.criteria().month);
    println!("{}", "=".repeat(60));
    for token in &tokens {
        println!("{token}");
    }
    println!("{}", "-".repeat(60));
    println!("{summary}");
    println!();

    if let Some(path) = &args.csv_out {
        CsvStorage::write_tokens_csv(path, &tokens)?;
        tracing::info!(path = %path.display(), "Wrote token CSV");
    }
    if let Some(path) = &args.txt_out {
        CsvStorage::write_tokens_txt(path, &tokens)?;
        tracing::info!(path = %path.display(), "Wrote token list");
    }

    Ok(())
}

fn print_details(details: &[SelectionDetail]) {
    println!("\n{}", "=".repeat(100));
    println!("Selection Details");
    println!("{}", "=".repeat(100));
    println!(
        "{:<28} {:<12} {:>10} {:>12} {:>12} {:<20} {:>8}",
        "Instrument", "Symbol", "Strike", "Underlying", "OI/Lot", "Outcome", "Selected"
    );
    println!("{}", "-".repeat(100));

    for detail in details {
        let strike = detail
            .strike
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        let selected_mark = if detail.outcome.is_selected() { "✓" } else { "✗" };
        println!(
            "{:<28} {:<12} {:>10} {:>12} {:>12.2} {:<20} {:>8}",
            detail.instrument_name,
            detail.symbol,
            strike,
            detail.underlying_price,
            detail.oi_per_lot,
            format!("{:?}", detail.outcome),
            selected_mark
        );
    }

    println!("{}", "=".repeat(100));
    let selected = details.iter().filter(|d| d.outcome.is_selected()).count();
    println!("Selected before cleaning: {}/{} rows", selected, details.len());
}
