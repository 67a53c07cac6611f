use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contract::{Instrument, OptionKind};

/// Instrument class of a ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentClass {
    Future,
    Call,
    Put,
}

impl InstrumentClass {
    /// Parses the class marker of a broker position export.
    ///
    /// `FX`, `FF` and `FUT` mark futures; `CE`/`PE` mark options.
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim().to_ascii_uppercase().as_str() {
            "FX" | "FF" | "FUT" => Some(Self::Future),
            "CE" => Some(Self::Call),
            "PE" => Some(Self::Put),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Future => "FX",
            Self::Call => "CE",
            Self::Put => "PE",
        }
    }
}

impl From<OptionKind> for InstrumentClass {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Call => Self::Call,
            OptionKind::Put => Self::Put,
        }
    }
}

/// One line of a trader's net position ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRow {
    pub stock: String,
    pub instrument: Instrument,
    /// Signed quantity; negative is short.
    pub net_qty: i64,
    /// Net traded value, used for futures exposure.
    pub net_value: Decimal,
    /// Mark-to-market value.
    pub mtm: Decimal,
    /// Last traded price, populated for futures in exports that carry it.
    pub last_price: Option<Decimal>,
    pub expiry: Option<String>,
}

impl PositionRow {
    #[must_use]
    pub fn future(stock: impl Into<String>, net_qty: i64) -> Self {
        Self {
            stock: stock.into(),
            instrument: Instrument::Future,
            net_qty,
            net_value: Decimal::ZERO,
            mtm: Decimal::ZERO,
            last_price: None,
            expiry: None,
        }
    }

    #[must_use]
    pub fn call(stock: impl Into<String>, strike: Decimal, net_qty: i64) -> Self {
        Self {
            instrument: Instrument::Option {
                strike,
                kind: OptionKind::Call,
            },
            ..Self::future(stock, net_qty)
        }
    }

    #[must_use]
    pub fn put(stock: impl Into<String>, strike: Decimal, net_qty: i64) -> Self {
        Self {
            instrument: Instrument::Option {
                strike,
                kind: OptionKind::Put,
            },
            ..Self::future(stock, net_qty)
        }
    }

    #[must_use]
    pub fn with_net_value(mut self, net_value: Decimal) -> Self {
        self.net_value = net_value;
        self
    }

    #[must_use]
    pub fn with_mtm(mut self, mtm: Decimal) -> Self {
        self.mtm = mtm;
        self
    }

    #[must_use]
    pub fn with_last_price(mut self, last_price: Decimal) -> Self {
        self.last_price = Some(last_price);
        self
    }

    #[must_use]
    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    #[must_use]
    pub fn class(&self) -> InstrumentClass {
        match self.instrument {
            Instrument::Future => InstrumentClass::Future,
            Instrument::Option { kind, .. } => kind.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn markers_map_to_classes() {
        assert_eq!(InstrumentClass::from_marker("FX"), Some(InstrumentClass::Future));
        assert_eq!(InstrumentClass::from_marker("ff"), Some(InstrumentClass::Future));
        assert_eq!(InstrumentClass::from_marker("CE"), Some(InstrumentClass::Call));
        assert_eq!(InstrumentClass::from_marker("PE"), Some(InstrumentClass::Put));
        assert_eq!(InstrumentClass::from_marker("TOTAL"), None);
    }

    #[test]
    fn future_rows_have_no_strike() {
        let fut = PositionRow::future("TCS", -50);
        assert_eq!(fut.class(), InstrumentClass::Future);
        assert_eq!(fut.instrument.strike(), None);

        let put = PositionRow::put("TCS", dec!(3500), 50).with_mtm(dec!(120.5));
        assert_eq!(put.class(), InstrumentClass::Put);
        assert_eq!(put.instrument.strike(), Some(dec!(3500)));
        assert_eq!(put.mtm, dec!(120.5));
    }
}
