//! Error taxonomy shared by every pipeline stage.
//!
//! Each empty-stage outcome has its own variant so the caller can tell a wrong
//! month apart from an over-strict OI threshold or an empty position file.

use thiserror::Error;

/// Errors surfaced by loaders, the token selector, and the reconciliation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    /// The snapshot or position source could not produce a table at all.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// A required column is absent or has the wrong shape.
    #[error("schema error: field `{field}` is missing or malformed")]
    Schema { field: String },

    /// No instrument name contains the requested expiry month code.
    #[error("no contracts found for {month}")]
    NoContractsForMonth { month: String },

    /// The moneyness mask removed every option row.
    #[error("no data after applying CE/PE moneyness filter")]
    NoItmRows,

    /// The ATM band and OI threshold together removed every row.
    #[error("no data after OI filtering")]
    NoRowsAfterOiFilter,

    /// Open interest could not be normalized because the lot size is not positive.
    #[error("invalid lot size {lot_size} for {instrument}")]
    InvalidLotSize { instrument: String, lot_size: i64 },

    /// The position ledger has no futures, call, or put rows.
    #[error("no rows found containing CE, PE, or FX")]
    NoOpenPositions,

    /// A caller-supplied parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl DeskError {
    /// Shorthand for a schema error on `field`.
    #[must_use]
    pub fn schema(field: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
        }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_field() {
        let err = DeskError::schema("OpnIntrst");
        assert_eq!(
            err.to_string(),
            "schema error: field `OpnIntrst` is missing or malformed"
        );
    }

    #[test]
    fn empty_stage_errors_are_distinct() {
        let month = DeskError::NoContractsForMonth {
            month: "JAN".to_string(),
        };
        assert_ne!(month, DeskError::NoItmRows);
        assert_ne!(DeskError::NoItmRows, DeskError::NoRowsAfterOiFilter);
        assert_eq!(month.to_string(), "no contracts found for JAN");
    }
}
