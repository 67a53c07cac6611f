//! Parser for broker net-position exports.
//!
//! Required columns: `Stock`, `Type`, `Strike`, `NetQty`. `NetValue`, `MTM`,
//! `LTP` and `Expiry` are read when present. Rows whose `Type` is not a
//! futures or options marker (cash lines, totals) are skipped.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use fno_desk_core::{
    DeskError, DeskResult, Instrument, InstrumentClass, OptionKind, PositionRow,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::table::HeaderIndex;

pub const STOCK: &str = "Stock";
pub const TYPE: &str = "Type";
pub const STRIKE: &str = "Strike";
pub const NET_QTY: &str = "NetQty";

const NET_VALUE: &str = "NetValue";
const MTM: &str = "MTM";
const LAST_PRICE: &str = "LTP";
const EXPIRY: &str = "Expiry";

pub const REQUIRED_COLUMNS: [&str; 4] = [STOCK, TYPE, STRIKE, NET_QTY];

/// Parses a position ledger.
///
/// # Errors
/// - [`DeskError::Schema`] for a missing required column or a malformed cell
/// - [`DeskError::NoOpenPositions`] if no futures or options row survives
/// - [`DeskError::SourceUnavailable`] if the underlying reader fails
pub fn parse_positions<R: Read>(reader: R) -> DeskResult<Vec<PositionRow>> {
    let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| DeskError::SourceUnavailable(format!("position header: {e}")))?
        .clone();
    let index = HeaderIndex::new(&headers, &REQUIRED_COLUMNS)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in csv.records() {
        let record =
            record.map_err(|e| DeskError::SourceUnavailable(format!("position record: {e}")))?;
        match parse_row(&index, &record)? {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    debug!(rows = rows.len(), skipped, "Parsed position ledger");
    if rows.is_empty() {
        return Err(DeskError::NoOpenPositions);
    }
    Ok(rows)
}

fn parse_row(index: &HeaderIndex, record: &StringRecord) -> DeskResult<Option<PositionRow>> {
    let Some(class) = index
        .cell(record, TYPE)
        .and_then(InstrumentClass::from_marker)
    else {
        return Ok(None);
    };

    let instrument = match class {
        InstrumentClass::Future => Instrument::Future,
        InstrumentClass::Call | InstrumentClass::Put => Instrument::Option {
            strike: index.required_decimal(record, STRIKE)?,
            kind: if class == InstrumentClass::Call {
                OptionKind::Call
            } else {
                OptionKind::Put
            },
        },
    };

    Ok(Some(PositionRow {
        stock: index.text(record, STOCK)?,
        instrument,
        net_qty: index.required_integer(record, NET_QTY)?,
        net_value: index.decimal(record, NET_VALUE)?.unwrap_or(Decimal::ZERO),
        mtm: index.decimal(record, MTM)?.unwrap_or(Decimal::ZERO),
        last_price: index.decimal(record, LAST_PRICE)?,
        expiry: index.cell(record, EXPIRY).map(str::to_string),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "Stock,Type,Strike,NetQty,NetValue,MTM,LTP,Expiry";

    fn parse(body: &str) -> DeskResult<Vec<PositionRow>> {
        parse_positions(format!("{HEADER}\n{body}").as_bytes())
    }

    #[test]
    fn parses_every_class_marker() {
        let rows = parse(
            "TCS,FX,0,-150,-540000,1200,3600,30-Jan-2025\n\
             TCS,CE,3600,150,0,-300,,30-Jan-2025\n\
             TCS,PE,3600,-150,0,150,,30-Jan-2025\n\
             INFY,FUT,,75,135000,0,1800,\n",
        )
        .unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].class(), InstrumentClass::Future);
        assert_eq!(rows[0].net_value, dec!(-540000));
        assert_eq!(rows[0].last_price, Some(dec!(3600)));
        assert_eq!(rows[0].expiry.as_deref(), Some("30-Jan-2025"));
        assert_eq!(
            rows[1],
            PositionRow::call("TCS", dec!(3600), 150)
                .with_mtm(dec!(-300))
                .with_expiry("30-Jan-2025")
        );
        assert_eq!(rows[2].class(), InstrumentClass::Put);
        assert_eq!(rows[3].class(), InstrumentClass::Future);
    }

    #[test]
    fn unknown_markers_are_skipped() {
        let rows = parse("TCS,EQ,0,100,0,0,,\nTCS,CE,3600,50,0,0,,\n").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn only_unknown_markers_means_no_open_positions() {
        assert_eq!(parse("TCS,EQ,0,100,0,0,,\n"), Err(DeskError::NoOpenPositions));
        assert_eq!(parse(""), Err(DeskError::NoOpenPositions));
    }

    #[test]
    fn option_without_strike_is_rejected() {
        assert_eq!(parse("TCS,CE,,50,0,0,,\n"), Err(DeskError::schema(STRIKE)));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let rows = parse_positions("Stock,Type,Strike,NetQty\nTCS,FF,0,25\n".as_bytes()).unwrap();
        assert_eq!(rows, vec![PositionRow::future("TCS", 25)]);
    }

    #[test]
    fn missing_required_column_is_named() {
        let err = parse_positions("Stock,Type,Strike\nTCS,CE,3600\n".as_bytes()).unwrap_err();
        assert_eq!(err, DeskError::schema(NET_QTY));
    }
}
