//! Contract rows from the daily F&O settlement file (bhavcopy).

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DeskError;

/// Option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKind {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionKind {
    /// Exchange suffix for this side.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "CE",
            Self::Put => "PE",
        }
    }

    /// Parses the `CE`/`PE` exchange code. Anything else is not an option side.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CE" => Some(Self::Call),
            "PE" => Some(Self::Put),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// What a row refers to. Strike and side travel together, so a future can
/// never carry a strike and an option can never lack one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instrument {
    Future,
    Option { strike: Decimal, kind: OptionKind },
}

impl Instrument {
    #[must_use]
    pub const fn is_future(&self) -> bool {
        matches!(self, Self::Future)
    }

    #[must_use]
    pub const fn strike(&self) -> Option<Decimal> {
        match self {
            Self::Future => None,
            Self::Option { strike, .. } => Some(*strike),
        }
    }

    #[must_use]
    pub const fn option_kind(&self) -> Option<OptionKind> {
        match self {
            Self::Future => None,
            Self::Option { kind, .. } => Some(*kind),
        }
    }

    /// Builds an instrument from the optional strike/side pair of a raw row.
    ///
    /// # Errors
    /// Returns a schema error naming the missing half when exactly one of
    /// strike and side is present.
    pub fn from_parts(strike: Option<Decimal>, kind: Option<OptionKind>) -> Result<Self, DeskError> {
        match (strike, kind) {
            (None, None) => Ok(Self::Future),
            (Some(strike), Some(kind)) => Ok(Self::Option { strike, kind }),
            (Some(_), None) => Err(DeskError::schema("OptnTp")),
            (None, Some(_)) => Err(DeskError::schema("StrkPric")),
        }
    }
}

/// One instrument on one trading day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRow {
    /// Full exchange name, e.g. `RELIANCE25JAN2500CE` or `RELIANCE25JANFUT`.
    pub instrument_name: String,
    /// Underlying ticker, e.g. `RELIANCE`.
    pub symbol: String,
    pub instrument: Instrument,
    pub underlying_price: Decimal,
    /// Open interest in units of the underlying.
    pub open_interest: i64,
    pub lot_size: i64,
    pub expiry: Option<NaiveDate>,
    pub settlement_price: Option<Decimal>,
    pub traded_volume: Option<i64>,
    pub change_in_oi: Option<i64>,
}

impl ContractRow {
    /// Creates a futures row with no optional market fields.
    #[must_use]
    pub fn future(
        instrument_name: impl Into<String>,
        symbol: impl Into<String>,
        underlying_price: Decimal,
        open_interest: i64,
        lot_size: i64,
    ) -> Self {
        Self {
            instrument_name: instrument_name.into(),
            symbol: symbol.into(),
            instrument: Instrument::Future,
            underlying_price,
            open_interest,
            lot_size,
            expiry: None,
            settlement_price: None,
            traded_volume: None,
            change_in_oi: None,
        }
    }

    /// Creates an options row with no optional market fields.
    #[must_use]
    pub fn option(
        instrument_name: impl Into<String>,
        symbol: impl Into<String>,
        strike: Decimal,
        kind: OptionKind,
        underlying_price: Decimal,
        open_interest: i64,
        lot_size: i64,
    ) -> Self {
        Self {
            instrument: Instrument::Option { strike, kind },
            ..Self::future(instrument_name, symbol, underlying_price, open_interest, lot_size)
        }
    }
}

/// Expiry month code as it appears inside instrument names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpiryMonth {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl ExpiryMonth {
    pub const ALL: [Self; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Jan => "JAN",
            Self::Feb => "FEB",
            Self::Mar => "MAR",
            Self::Apr => "APR",
            Self::May => "MAY",
            Self::Jun => "JUN",
            Self::Jul => "JUL",
            Self::Aug => "AUG",
            Self::Sep => "SEP",
            Self::Oct => "OCT",
            Self::Nov => "NOV",
            Self::Dec => "DEC",
        }
    }

    /// Month from its 1-based calendar number.
    #[must_use]
    pub fn from_number(month: u32) -> Option<Self> {
        month
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx as usize))
            .copied()
    }

    /// The current local calendar month.
    #[must_use]
    pub fn current() -> Self {
        Self::from_number(Local::now().month()).unwrap_or(Self::Jan)
    }

    /// Code of the futures contract for this month, e.g. `JANFUT`.
    #[must_use]
    pub fn futures_marker(self) -> String {
        format!("{}FUT", self.code())
    }
}

impl FromStr for ExpiryMonth {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.code() == upper)
            .ok_or_else(|| DeskError::InvalidParameter(format!("unknown month code `{s}`")))
    }
}

impl std::fmt::Display for ExpiryMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.code())
    }
}
