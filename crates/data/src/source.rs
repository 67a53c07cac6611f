//! File-backed snapshot and position sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use fno_desk_core::{
    ContractRow, DeskError, DeskResult, PositionRow, PositionSource, SnapshotSource, SourceConfig,
};
use tracing::{info, warn};

use crate::bhavcopy::parse_bhavcopy;
use crate::positions::parse_positions;

/// Weekends carry no bhavcopy. Exchange holidays are not modelled.
#[must_use]
pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

async fn read_file(path: &Path) -> DeskResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| DeskError::SourceUnavailable(format!("{}: {e}", path.display())))
}

/// A single bhavcopy file, used regardless of the requested date.
#[derive(Debug, Clone)]
pub struct CsvSnapshotSource {
    path: PathBuf,
    label: String,
}

impl CsvSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("csv:{}", path.display());
        Self { path, label }
    }
}

#[async_trait]
impl SnapshotSource for CsvSnapshotSource {
    async fn load_snapshot(&self, _date: NaiveDate) -> DeskResult<Vec<ContractRow>> {
        let bytes = read_file(&self.path).await?;
        parse_bhavcopy(bytes.as_slice())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Bhavcopy files in one directory, named by a `chrono` strftime pattern.
#[derive(Debug, Clone)]
pub struct DatedDirectorySource {
    dir: PathBuf,
    pattern: String,
    label: String,
}

impl DatedDirectorySource {
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        let dir = dir.into();
        let label = format!("dir:{}", dir.display());
        Self {
            dir,
            pattern: pattern.into(),
            label,
        }
    }

    /// File the source reads for `date`.
    #[must_use]
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(date.format(&self.pattern).to_string())
    }
}

#[async_trait]
impl SnapshotSource for DatedDirectorySource {
    async fn load_snapshot(&self, date: NaiveDate) -> DeskResult<Vec<ContractRow>> {
        if !is_trading_day(date) {
            return Err(DeskError::SourceUnavailable(format!(
                "{date} is not a trading day"
            )));
        }
        let path = self.path_for(date);
        let bytes = read_file(&path).await?;
        parse_bhavcopy(bytes.as_slice())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Tries `primary` first and `secondary` when the primary is unavailable or
/// returns an empty table.
///
/// Schema errors from the primary are not masked: a table that arrived
/// malformed is reported rather than silently replaced.
pub struct FallbackSource {
    primary: Box<dyn SnapshotSource>,
    secondary: Box<dyn SnapshotSource>,
}

impl FallbackSource {
    pub fn new(primary: Box<dyn SnapshotSource>, secondary: Box<dyn SnapshotSource>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl SnapshotSource for FallbackSource {
    async fn load_snapshot(&self, date: NaiveDate) -> DeskResult<Vec<ContractRow>> {
        let primary_failure = match self.primary.load_snapshot(date).await {
            Ok(rows) if !rows.is_empty() => {
                info!(source = self.primary.name(), rows = rows.len(), "Loaded snapshot");
                return Ok(rows);
            }
            Ok(_) => format!("{} returned an empty table", self.primary.name()),
            Err(DeskError::SourceUnavailable(reason)) => reason,
            Err(e) => return Err(e),
        };
        warn!(
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            reason = %primary_failure,
            "Primary snapshot unavailable, falling back"
        );

        match self.secondary.load_snapshot(date).await {
            Ok(rows) if !rows.is_empty() => {
                info!(source = self.secondary.name(), rows = rows.len(), "Loaded snapshot");
                Ok(rows)
            }
            Ok(_) => Err(DeskError::SourceUnavailable(format!(
                "{primary_failure}; {} returned an empty table",
                self.secondary.name()
            ))),
            Err(DeskError::SourceUnavailable(reason)) => Err(DeskError::SourceUnavailable(
                format!("{primary_failure}; {reason}"),
            )),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

/// Builds the snapshot source described by configuration.
///
/// `snapshot_override` (a single file) takes the place of the dated directory;
/// `fallback_snapshot` is layered behind whichever primary is chosen.
///
/// # Errors
/// Returns [`DeskError::InvalidParameter`] if no primary source is configured.
pub fn snapshot_source_from_config(
    config: &SourceConfig,
    snapshot_override: Option<&Path>,
) -> DeskResult<Box<dyn SnapshotSource>> {
    let primary: Box<dyn SnapshotSource> = match (snapshot_override, &config.snapshot_dir) {
        (Some(path), _) => Box::new(CsvSnapshotSource::new(path)),
        (None, Some(dir)) => Box::new(DatedDirectorySource::new(dir, &config.snapshot_pattern)),
        (None, None) => {
            return Err(DeskError::InvalidParameter(
                "no snapshot file or snapshot directory configured".to_string(),
            ))
        }
    };

    Ok(match &config.fallback_snapshot {
        Some(fallback) => Box::new(FallbackSource::new(
            primary,
            Box::new(CsvSnapshotSource::new(fallback)),
        )),
        None => primary,
    })
}

/// A position ledger exported as CSV.
#[derive(Debug, Clone)]
pub struct CsvPositionSource {
    path: PathBuf,
    label: String,
}

impl CsvPositionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("csv:{}", path.display());
        Self { path, label }
    }
}

#[async_trait]
impl PositionSource for CsvPositionSource {
    async fn load_positions(&self) -> DeskResult<Vec<PositionRow>> {
        let bytes = read_file(&self.path).await?;
        parse_positions(bytes.as_slice())
    }

    fn name(&self) -> &str {
        &self.label
    }
}
