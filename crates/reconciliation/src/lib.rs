//! Position reconciliation for futures/options hedge books.
//!
//! # Modules
//!
//! - [`engine`]: per-class totals, match predicate, and mismatch localization
//! - [`atm`]: in-the-money options close to their future's price
//! - [`formatter`]: plain-text rendering of reports

pub mod atm;
pub mod engine;
pub mod formatter;

pub use atm::{find_atm_positions, AtmPosition};
pub use engine::{
    futures_mtm, localize_mismatches, AggregatedLedger, ClassTotals, FutureMismatch, FutureMtm,
    LoadedLedger, MatchState, MismatchRecord, MismatchReport, ReconciliationEngine,
    ReconciliationOutcome, ReconciliationReport, StrikeMismatch,
};
pub use formatter::ReportFormatter;
