//! Reconciliation scenarios over realistic multi-stock ledgers.

use fno_desk_core::{PositionRow, ReconciliationConfig};
use fno_desk_reconciliation::{
    LoadedLedger, MatchState, MismatchRecord, ReconciliationEngine, ReconciliationOutcome,
};
use rust_decimal_macros::dec;

fn conversion(stock: &str, strike: rust_decimal::Decimal, lots: i64) -> Vec<PositionRow> {
    vec![
        PositionRow::future(stock, -lots),
        PositionRow::call(stock, strike, lots),
        PositionRow::put(stock, strike, -lots),
    ]
}

#[test]
fn single_leg_imbalance_yields_exactly_one_record() {
    let rows = vec![
        PositionRow::future("RELIANCE", 100),
        PositionRow::call("RELIANCE", dec!(2500), -100),
        PositionRow::put("RELIANCE", dec!(2500), 0),
    ];
    let report = ReconciliationEngine::default().reconcile(&rows);
    assert_eq!(report.state, MatchState::NotMatched);
    assert_eq!(report.mismatches.records().len(), 1);
    assert!(matches!(
        report.mismatches.records()[0],
        MismatchRecord::Strike(_)
    ));
}

#[test]
fn book_of_conversions_matches() {
    let mut rows = conversion("TCS", dec!(3500), 50);
    rows.extend(conversion("INFY", dec!(1800), 50));
    rows.extend(conversion("SBIN", dec!(800), 50));
    // Aggregates are -150 / 150 / -150.
    let outcome = LoadedLedger::new(&rows).aggregate().resolve();
    assert_eq!(outcome.state(), MatchState::Matched);
    assert!(matches!(outcome, ReconciliationOutcome::Matched { .. }));
}

#[test]
fn wrong_strike_and_wrong_hedge_are_reported_separately() {
    let mut rows = conversion("TCS", dec!(3500), 50);
    // Put booked at the wrong strike.
    rows.push(PositionRow::call("INFY", dec!(1800), 25));
    rows.push(PositionRow::put("INFY", dec!(1820), -25));
    rows.push(PositionRow::future("INFY", -25));
    // Strikes fine, hedge one lot short.
    rows.push(PositionRow::call("SBIN", dec!(800), 30));
    rows.push(PositionRow::put("SBIN", dec!(800), -30));
    rows.push(PositionRow::future("SBIN", -20));

    let report = ReconciliationEngine::default().reconcile(&rows);
    assert_eq!(report.state, MatchState::NotMatched);

    let strikes: Vec<(&str, i128, i128)> = report
        .mismatches
        .strikes
        .iter()
        .map(|m| (m.stock.as_str(), m.call_qty, m.put_qty))
        .collect();
    assert_eq!(strikes, vec![("INFY", 25, 0), ("INFY", 0, -25)]);

    assert_eq!(report.mismatches.futures.len(), 1);
    assert_eq!(report.mismatches.futures[0].stock, "SBIN");
    assert_eq!(report.mismatches.futures[0].future_qty, -20);
    assert_eq!(report.mismatches.futures[0].call_qty, 30);
}

#[test]
fn locally_balanced_books_always_match() {
    // When every strike nets out and every hedge covers its calls, puts equal
    // minus calls and futures equal minus calls, whatever the mix of sizes.
    let mut rows = conversion("TCS", dec!(3500), 50);
    rows.extend(conversion("INFY", dec!(1800), 75));
    let report = ReconciliationEngine::default().reconcile(&rows);
    assert_eq!(report.state, MatchState::Matched);

    let mut rows = conversion("TCS", dec!(3500), 50);
    rows.extend(conversion("INFY", dec!(1800), -75));
    let report = ReconciliationEngine::default().reconcile(&rows);
    assert_eq!(report.state, MatchState::Matched);
    assert!(report.mismatches.is_empty());
}

#[test]
fn exposure_uses_configured_unit() {
    let rows = vec![PositionRow::future("TCS", -150).with_net_value(dec!(-54000000))];
    let engine = ReconciliationEngine::new(ReconciliationConfig {
        exposure_unit: dec!(10000000),
    });
    assert_eq!(engine.reconcile(&rows).exposure, dec!(-5));
}
