//! In-the-money option positions sitting close to their future's price.

use fno_desk_core::{Instrument, OptionKind, PositionRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtmPosition {
    pub stock: String,
    pub kind: OptionKind,
    pub expiry: Option<String>,
    pub strike: Decimal,
    pub net_qty: i64,
    /// LTP of the stock's future used for the comparison.
    pub future_ltp: Decimal,
}

impl AtmPosition {
    /// CSV column names, in field order.
    pub const HEADERS: [&'static str; 6] =
        ["stock", "kind", "expiry", "strike", "net_qty", "future_ltp"];
}

/// Lists open option positions within `range` price points of the stock's
/// future LTP that are in the money against it.
///
/// Zero-quantity lines are ignored on both sides. The first open future of a
/// stock supplies its reference price; stocks without one are skipped.
#[must_use]
pub fn find_atm_positions(rows: &[PositionRow], range: Decimal) -> Vec<AtmPosition> {
    let mut future_ltp: HashMap<&str, Option<Decimal>> = HashMap::new();
    for row in rows.iter().filter(|r| r.net_qty != 0 && r.instrument.is_future()) {
        future_ltp.entry(row.stock.as_str()).or_insert(row.last_price);
    }

    let positions: Vec<AtmPosition> = rows
        .iter()
        .filter(|r| r.net_qty != 0)
        .filter_map(|row| {
            let Instrument::Option { strike, kind } = row.instrument else {
                return None;
            };
            let ltp = future_ltp.get(row.stock.as_str()).copied().flatten()?;
            let in_the_money = match kind {
                OptionKind::Call => strike < ltp,
                OptionKind::Put => strike > ltp,
            };
            ((strike - ltp).abs() < range && in_the_money).then(|| AtmPosition {
                stock: row.stock.clone(),
                kind,
                expiry: row.expiry.clone(),
                strike,
                net_qty: row.net_qty,
                future_ltp: ltp,
            })
        })
        .collect();

    debug!("{} ATM positions within ±{}", positions.len(), range);
    positions
}
