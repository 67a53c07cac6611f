//! Net position reconciliation across futures, calls, and puts.
//!
//! A ledger moves through `LOADED -> AGGREGATED -> {MATCHED | NOT_MATCHED}`.
//! Each state is its own type, so localization can only run on an
//! aggregated ledger and a terminal outcome cannot be reconciled again.
//!
//! # Example
//!
//! ```ignore
//! use fno_desk_reconciliation::LoadedLedger;
//!
//! let outcome = LoadedLedger::new(&rows).aggregate().resolve();
//! if let ReconciliationOutcome::NotMatched { mismatches, .. } = outcome {
//!     for record in mismatches.strikes { /* ... */ }
//! }
//! ```

use fno_desk_core::{Instrument, InstrumentClass, OptionKind, PositionRow, ReconciliationConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

// =============================================================================
// Aggregates
// =============================================================================

/// Signed quantity per instrument class across the whole ledger.
///
/// Sums are kept in `i128` so no ledger of `i64` quantities can overflow them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTotals {
    pub future: i128,
    pub call: i128,
    pub put: i128,
}

impl ClassTotals {
    fn add(&mut self, class: InstrumentClass, qty: i64) {
        let qty = i128::from(qty);
        match class {
            InstrumentClass::Future => self.future += qty,
            InstrumentClass::Call => self.call += qty,
            InstrumentClass::Put => self.put += qty,
        }
    }

    /// True when the absolute futures, call, and put sums are all equal.
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        let future = self.future.unsigned_abs();
        future == self.call.unsigned_abs() && future == self.put.unsigned_abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    Matched,
    NotMatched,
}

impl MatchState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "Matched",
            Self::NotMatched => "Not Matched",
        }
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Mismatch records
// =============================================================================

/// Calls and puts at one strike that do not net to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeMismatch {
    pub stock: String,
    pub strike: Decimal,
    pub call_qty: i128,
    pub put_qty: i128,
    /// Total futures quantity of the stock, for context.
    pub future_qty: i128,
}

impl StrikeMismatch {
    /// CSV column names, in field order.
    pub const HEADERS: [&'static str; 5] =
        ["stock", "strike", "call_qty", "put_qty", "future_qty"];
}

/// Strikes net out but the futures hedge does not cover the calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureMismatch {
    pub stock: String,
    pub future_qty: i128,
    pub call_qty: i128,
}

impl FutureMismatch {
    /// CSV column names, in field order.
    pub const HEADERS: [&'static str; 3] = ["stock", "future_qty", "call_qty"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MismatchRecord {
    Strike(StrikeMismatch),
    Future(FutureMismatch),
}

/// Localized mismatches of a not-matched ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchReport {
    pub strikes: Vec<StrikeMismatch>,
    pub futures: Vec<FutureMismatch>,
}

impl MismatchReport {
    #[must_use]
    pub fn len(&self) -> usize {
        self.strikes.len() + self.futures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Strike-level records first, then stock-level ones.
    #[must_use]
    pub fn records(&self) -> Vec<MismatchRecord> {
        self.strikes
            .iter()
            .cloned()
            .map(MismatchRecord::Strike)
            .chain(self.futures.iter().cloned().map(MismatchRecord::Future))
            .collect()
    }
}

// =============================================================================
// Ledger states
// =============================================================================

/// A ledger snapshot that has not been summed yet.
#[derive(Debug, Clone, Copy)]
pub struct LoadedLedger<'a> {
    rows: &'a [PositionRow],
}

impl<'a> LoadedLedger<'a> {
    #[must_use]
    pub const fn new(rows: &'a [PositionRow]) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn aggregate(self) -> AggregatedLedger<'a> {
        let totals = self.rows.iter().fold(ClassTotals::default(), |mut acc, row| {
            acc.add(row.class(), row.net_qty);
            acc
        });
        debug!(
            "Aggregated {} rows: FX {} CE {} PE {}",
            self.rows.len(),
            totals.future,
            totals.call,
            totals.put
        );
        AggregatedLedger {
            rows: self.rows,
            totals,
        }
    }
}

/// A ledger with per-class totals computed.
#[derive(Debug, Clone, Copy)]
pub struct AggregatedLedger<'a> {
    rows: &'a [PositionRow],
    totals: ClassTotals,
}

impl AggregatedLedger<'_> {
    #[must_use]
    pub const fn totals(&self) -> ClassTotals {
        self.totals
    }

    /// Decides the terminal state, localizing mismatches when the totals disagree.
    #[must_use]
    pub fn resolve(self) -> ReconciliationOutcome {
        if self.totals.is_matched() {
            return ReconciliationOutcome::Matched {
                totals: self.totals,
            };
        }
        ReconciliationOutcome::NotMatched {
            totals: self.totals,
            mismatches: localize_mismatches(self.rows),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Matched {
        totals: ClassTotals,
    },
    NotMatched {
        totals: ClassTotals,
        mismatches: MismatchReport,
    },
}

impl ReconciliationOutcome {
    #[must_use]
    pub const fn state(&self) -> MatchState {
        match self {
            Self::Matched { .. } => MatchState::Matched,
            Self::NotMatched { .. } => MatchState::NotMatched,
        }
    }

    #[must_use]
    pub const fn totals(&self) -> ClassTotals {
        match self {
            Self::Matched { totals } | Self::NotMatched { totals, .. } => *totals,
        }
    }
}

// =============================================================================
// Localization
// =============================================================================

#[derive(Default)]
struct StockBook {
    future_qty: i128,
    call_qty: i128,
    /// Strike -> (call, put).
    strikes: BTreeMap<Decimal, (i128, i128)>,
}

/// Checks, per stock, that calls and puts net out strike by strike and,
/// separately, that futures offset the stock's total calls.
///
/// Stocks are reported in ledger order and strikes in ascending order.
#[must_use]
pub fn localize_mismatches(rows: &[PositionRow]) -> MismatchReport {
    let mut order: Vec<&str> = Vec::new();
    let mut books: HashMap<&str, StockBook> = HashMap::new();

    for row in rows {
        let book = books.entry(row.stock.as_str()).or_insert_with(|| {
            order.push(row.stock.as_str());
            StockBook::default()
        });
        let qty = i128::from(row.net_qty);
        match row.instrument {
            Instrument::Future => book.future_qty += qty,
            Instrument::Option { strike, kind } => {
                let leg = book.strikes.entry(strike).or_default();
                match kind {
                    OptionKind::Call => {
                        leg.0 += qty;
                        book.call_qty += qty;
                    }
                    OptionKind::Put => leg.1 += qty,
                }
            }
        }
    }

    let mut report = MismatchReport::default();
    for stock in order {
        let Some(book) = books.get(stock) else {
            continue;
        };
        let before = report.strikes.len();
        report.strikes.extend(
            book.strikes
                .iter()
                .filter(|(_, (call, put))| call + put != 0)
                .map(|(strike, (call, put))| StrikeMismatch {
                    stock: stock.to_string(),
                    strike: *strike,
                    call_qty: *call,
                    put_qty: *put,
                    future_qty: book.future_qty,
                }),
        );

        if report.strikes.len() == before && book.future_qty + book.call_qty != 0 {
            report.futures.push(FutureMismatch {
                stock: stock.to_string(),
                future_qty: book.future_qty,
                call_qty: book.call_qty,
            });
        }
    }

    report
}

// =============================================================================
// Engine
// =============================================================================

/// Futures line for the M2M listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureMtm {
    pub stock: String,
    pub net_qty: i64,
    pub mtm: Decimal,
}

/// Everything a trader needs from one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub totals: ClassTotals,
    pub state: MatchState,
    pub mismatches: MismatchReport,
    /// Futures net value in units of `exposure_unit`, rounded half to even.
    pub exposure: Decimal,
    pub futures_mtm: Vec<FutureMtm>,
}

pub struct ReconciliationEngine {
    config: ReconciliationConfig,
}

impl ReconciliationEngine {
    #[must_use]
    pub const fn new(config: ReconciliationConfig) -> Self {
        Self { config }
    }

    /// Runs the ledger through the state machine and collects the report.
    #[must_use]
    pub fn reconcile(&self, rows: &[PositionRow]) -> ReconciliationReport {
        let outcome = LoadedLedger::new(rows).aggregate().resolve();
        let state = outcome.state();
        let totals = outcome.totals();
        let mismatches = match outcome {
            ReconciliationOutcome::Matched { .. } => MismatchReport::default(),
            ReconciliationOutcome::NotMatched { mismatches, .. } => mismatches,
        };

        match state {
            MatchState::Matched => info!(
                "Position matched: FX {} CE {} PE {}",
                totals.future, totals.call, totals.put
            ),
            MatchState::NotMatched => warn!(
                "Position not matched: FX {} CE {} PE {} ({} strike, {} future mismatches)",
                totals.future,
                totals.call,
                totals.put,
                mismatches.strikes.len(),
                mismatches.futures.len()
            ),
        }

        ReconciliationReport {
            totals,
            state,
            mismatches,
            exposure: self.exposure(rows),
            futures_mtm: futures_mtm(rows),
        }
    }

    /// Futures net value scaled by the configured unit.
    #[must_use]
    pub fn exposure(&self, rows: &[PositionRow]) -> Decimal {
        if self.config.exposure_unit.is_zero() {
            return Decimal::ZERO;
        }
        let total: Decimal = rows
            .iter()
            .filter(|r| r.instrument.is_future())
            .map(|r| r.net_value)
            .sum();
        (total / self.config.exposure_unit).round()
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(ReconciliationConfig::default())
    }
}

/// Open futures lines sorted by ascending mark-to-market.
#[must_use]
pub fn futures_mtm(rows: &[PositionRow]) -> Vec<FutureMtm> {
    let mut lines: Vec<FutureMtm> = rows
        .iter()
        .filter(|r| r.instrument.is_future() && r.net_qty != 0)
        .map(|r| FutureMtm {
            stock: r.stock.clone(),
            net_qty: r.net_qty,
            mtm: r.mtm,
        })
        .collect();
    lines.sort_by(|a, b| a.mtm.cmp(&b.mtm));
    lines
}
