use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contract::ExpiryMonth;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub token_selector: TokenSelectorConfig,
    pub reconciliation: ReconciliationConfig,
    pub atm_position: AtmPositionConfig,
    pub sources: SourceConfig,
}

/// Ordering of the final token list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSelectorConfig {
    /// Target expiry month; `None` means the current calendar month.
    pub month: Option<ExpiryMonth>,
    /// Far-from-money rows need normalized OI strictly above this.
    pub oi_threshold: Decimal,
    /// ATM exclusion band in percent of the underlying (0-100).
    pub atm_pct: Decimal,
    pub sort: SortOrder,
    /// Index underlyings dropped from the final list.
    pub index_exclusions: Vec<String>,
    /// Order-type tag prefixed to every token.
    pub product: String,
}

impl Default for TokenSelectorConfig {
    fn default() -> Self {
        Self {
            month: None,
            oi_threshold: Decimal::from(4),
            atm_pct: Decimal::from(8),
            sort: SortOrder::Ascending,
            index_exclusions: vec!["NIFTY".to_string()],
            product: "NRML".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Divisor for the reported futures exposure (100000 = lakhs).
    pub exposure_unit: Decimal,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            exposure_unit: Decimal::from(100_000),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmPositionConfig {
    /// Options within this many price points of the future's LTP are at the money.
    pub range: Decimal,
}

impl Default for AtmPositionConfig {
    fn default() -> Self {
        Self {
            range: Decimal::from(5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding one bhavcopy per trading day.
    pub snapshot_dir: Option<String>,
    /// File name inside `snapshot_dir`, with chrono date specifiers.
    pub snapshot_pattern: String,
    /// Snapshot used when the dated file is missing.
    pub fallback_snapshot: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: None,
            snapshot_pattern: "BhavCopy_NSE_FO_0_0_0_%Y%m%d_F_0000.csv".to_string(),
            fallback_snapshot: None,
        }
    }
}
