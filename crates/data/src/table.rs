//! Header lookup and cell parsing shared by the CSV loaders.

use chrono::NaiveDate;
use csv::StringRecord;
use fno_desk_core::{DeskError, DeskResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Column positions of a CSV header row, validated up front.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Indexes `headers` and checks that every `required` column is present.
    ///
    /// # Errors
    /// Returns a schema error naming the first missing required column.
    pub fn new(headers: &StringRecord, required: &[&str]) -> DeskResult<Self> {
        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect();

        if let Some(missing) = required.iter().find(|name| !columns.contains_key(**name)) {
            return Err(DeskError::schema(*missing));
        }
        Ok(Self { columns })
    }

    #[must_use]
    pub fn has(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Trimmed cell text; `None` for absent columns and blank or NaN cells.
    #[must_use]
    pub fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let value = record.get(*self.columns.get(column)?)?.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("nan") || value == "-" {
            None
        } else {
            Some(value)
        }
    }

    /// Text cell that must be present.
    ///
    /// # Errors
    /// Returns a schema error if the cell is blank.
    pub fn text(&self, record: &StringRecord, column: &str) -> DeskResult<String> {
        self.cell(record, column)
            .map(str::to_string)
            .ok_or_else(|| DeskError::schema(column))
    }

    /// Optional decimal cell.
    ///
    /// # Errors
    /// Returns a schema error if the cell is present but not a number.
    pub fn decimal(&self, record: &StringRecord, column: &str) -> DeskResult<Option<Decimal>> {
        self.cell(record, column)
            .map(|raw| parse_decimal(raw).ok_or_else(|| DeskError::schema(column)))
            .transpose()
    }

    /// Decimal cell that must be present.
    ///
    /// # Errors
    /// Returns a schema error if the cell is blank or not a number.
    pub fn required_decimal(&self, record: &StringRecord, column: &str) -> DeskResult<Decimal> {
        self.decimal(record, column)?
            .ok_or_else(|| DeskError::schema(column))
    }

    /// Optional whole-number cell. `1000.0` is accepted, `1000.5` is not.
    ///
    /// # Errors
    /// Returns a schema error if the cell is present but not a whole number.
    pub fn integer(&self, record: &StringRecord, column: &str) -> DeskResult<Option<i64>> {
        self.decimal(record, column)?
            .map(|d| {
                if d.fract().is_zero() {
                    d.to_i64().ok_or_else(|| DeskError::schema(column))
                } else {
                    Err(DeskError::schema(column))
                }
            })
            .transpose()
    }

    /// Whole-number cell that must be present.
    ///
    /// # Errors
    /// Returns a schema error if the cell is blank or not a whole number.
    pub fn required_integer(&self, record: &StringRecord, column: &str) -> DeskResult<i64> {
        self.integer(record, column)?
            .ok_or_else(|| DeskError::schema(column))
    }

    /// Optional date cell in `2025-01-30` or `30-Jan-2025` form.
    ///
    /// # Errors
    /// Returns a schema error if the cell is present but not a date.
    pub fn date(&self, record: &StringRecord, column: &str) -> DeskResult<Option<NaiveDate>> {
        self.cell(record, column)
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%b-%Y"))
                    .map_err(|_| DeskError::schema(column))
            })
            .transpose()
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}
