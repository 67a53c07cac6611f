//! Parser for the exchange's daily F&O bhavcopy.
//!
//! Required columns: `FinInstrmNm`, `TckrSymb`, `StrkPric`, `OptnTp`,
//! `UndrlygPric`, `OpnIntrst`, `NewBrdLotQty`. `XpryDt`, `SttlmPric`,
//! `TtlTradgVol` and `ChngInOpnIntrst` are read when present.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use fno_desk_core::{ContractRow, DeskError, DeskResult, Instrument, OptionKind};
use tracing::debug;

use crate::table::HeaderIndex;

pub const INSTRUMENT_NAME: &str = "FinInstrmNm";
pub const SYMBOL: &str = "TckrSymb";
pub const STRIKE: &str = "StrkPric";
pub const OPTION_TYPE: &str = "OptnTp";
pub const UNDERLYING_PRICE: &str = "UndrlygPric";
pub const OPEN_INTEREST: &str = "OpnIntrst";
pub const LOT_SIZE: &str = "NewBrdLotQty";

const EXPIRY: &str = "XpryDt";
const SETTLEMENT_PRICE: &str = "SttlmPric";
const TRADED_VOLUME: &str = "TtlTradgVol";
const CHANGE_IN_OI: &str = "ChngInOpnIntrst";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    INSTRUMENT_NAME,
    SYMBOL,
    STRIKE,
    OPTION_TYPE,
    UNDERLYING_PRICE,
    OPEN_INTEREST,
    LOT_SIZE,
];

/// Parses a bhavcopy table.
///
/// A row with neither strike nor option type is a future. A row with exactly
/// one of the two is malformed and fails the whole load.
///
/// # Errors
/// - [`DeskError::Schema`] for a missing required column or a malformed cell
/// - [`DeskError::SourceUnavailable`] if the underlying reader fails
pub fn parse_bhavcopy<R: Read>(reader: R) -> DeskResult<Vec<ContractRow>> {
    let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| DeskError::SourceUnavailable(format!("bhavcopy header: {e}")))?
        .clone();
    let index = HeaderIndex::new(&headers, &REQUIRED_COLUMNS)?;

    let mut rows = Vec::new();
    for record in csv.records() {
        let record =
            record.map_err(|e| DeskError::SourceUnavailable(format!("bhavcopy record: {e}")))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(parse_row(&index, &record)?);
    }

    debug!(rows = rows.len(), "Parsed bhavcopy");
    Ok(rows)
}

fn parse_row(index: &HeaderIndex, record: &StringRecord) -> DeskResult<ContractRow> {
    let strike = index.decimal(record, STRIKE)?;
    let kind = index
        .cell(record, OPTION_TYPE)
        .map(|code| OptionKind::from_code(code).ok_or_else(|| DeskError::schema(OPTION_TYPE)))
        .transpose()?;
    let instrument = Instrument::from_parts(strike, kind)?;

    Ok(ContractRow {
        instrument_name: index.text(record, INSTRUMENT_NAME)?,
        symbol: index.text(record, SYMBOL)?,
        instrument,
        underlying_price: index.required_decimal(record, UNDERLYING_PRICE)?,
        open_interest: index.required_integer(record, OPEN_INTEREST)?,
        lot_size: index.required_integer(record, LOT_SIZE)?,
        expiry: index.date(record, EXPIRY)?,
        settlement_price: index.decimal(record, SETTLEMENT_PRICE)?,
        traded_volume: index.integer(record, TRADED_VOLUME)?,
        change_in_oi: index.integer(record, CHANGE_IN_OI)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const HEADER: &str =
        "TradDt,TckrSymb,XpryDt,StrkPric,OptnTp,FinInstrmNm,UndrlygPric,OpnIntrst,NewBrdLotQty,SttlmPric";

    fn parse(body: &str) -> DeskResult<Vec<ContractRow>> {
        parse_bhavcopy(format!("{HEADER}\n{body}").as_bytes())
    }

    #[test]
    fn parses_options_and_futures() {
        let rows = parse(
            "2025-01-10,TCS,2025-01-30,3600,CE,TCS25JAN3600CE,3700,10000,175,120.5\n\
             2025-01-10,TCS,2025-01-30,,,TCS25JANFUT,3700,350000,175,3712.4\n",
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].instrument,
            Instrument::Option {
                strike: dec!(3600),
                kind: OptionKind::Call
            }
        );
        assert_eq!(rows[0].expiry, NaiveDate::from_ymd_opt(2025, 1, 30));
        assert_eq!(rows[0].settlement_price, Some(dec!(120.5)));
        assert_eq!(rows[1].instrument, Instrument::Future);
        assert_eq!(rows[1].open_interest, 350000);
        assert_eq!(rows[1].traded_volume, None);
    }

    #[test]
    fn nan_strike_with_blank_type_is_future() {
        let rows = parse("2025-01-10,TCS,2025-01-30,NaN,,TCS25JANFUT,3700,100,175,\n").unwrap();
        assert!(rows[0].instrument.is_future());
    }

    #[test]
    fn strike_without_type_is_rejected() {
        let err = parse("2025-01-10,TCS,2025-01-30,3600,,TCS25JAN3600CE,3700,100,175,\n")
            .unwrap_err();
        assert_eq!(err, DeskError::schema(OPTION_TYPE));
    }

    #[test]
    fn unknown_option_type_is_rejected() {
        let err = parse("2025-01-10,TCS,2025-01-30,3600,XX,TCS25JAN3600XX,3700,100,175,\n")
            .unwrap_err();
        assert_eq!(err, DeskError::schema(OPTION_TYPE));
    }

    #[test]
    fn missing_column_is_named() {
        let err = parse_bhavcopy("TckrSymb,StrkPric\nTCS,3600\n".as_bytes()).unwrap_err();
        assert_eq!(err, DeskError::schema(INSTRUMENT_NAME));
    }

    #[test]
    fn blank_lines_are_skipped_and_empty_table_is_ok() {
        assert!(parse(",,,,,,,,,\n").unwrap().is_empty());
        assert!(parse_bhavcopy(HEADER.as_bytes()).unwrap().is_empty());
    }
}
