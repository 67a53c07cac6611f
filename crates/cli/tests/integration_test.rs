use chrono::NaiveDate;
use fno_desk_core::{
    DeskError, ExpiryMonth, PositionSource, SnapshotSource, SourceConfig,
};
use fno_desk_data::{snapshot_source_from_config, CsvPositionSource, CsvStorage};
use fno_desk_reconciliation::{MatchState, ReconciliationEngine, ReportFormatter, StrikeMismatch};
use fno_desk_token_selector::{TokenSelectionCriteria, TokenSelector, TokenSummary};
use rust_decimal_macros::dec;
use std::fs;
use tempfile::tempdir;

const BHAVCOPY: &str = "\
TradDt,TckrSymb,XpryDt,StrkPric,OptnTp,FinInstrmNm,UndrlygPric,OpnIntrst,NewBrdLotQty
2025-01-10,TCS,2025-01-30,3600,CE,TCS25JAN3600CE,4000,1750,175
2025-01-10,TCS,2025-01-30,4000,PE,TCS25JAN4000PE,4000,1750,175
2025-01-10,TCS,2025-01-30,,,TCS25JANFUT,4000,350000,175
2025-01-10,NIFTY,2025-01-30,23000,CE,NIFTY25JAN23000CE,23500,100000,25
2025-01-10,NIFTY,2025-01-30,,,NIFTY25JANFUT,23500,100000,25
2025-01-10,TCS,2025-02-27,3600,CE,TCS25FEB3600CE,4000,1750,175
";

#[tokio::test]
async fn snapshot_to_token_files() {
    let dir = tempdir().unwrap();
    let snapshot = dir.path().join("bhav.csv");
    fs::write(&snapshot, BHAVCOPY).unwrap();

    let source = snapshot_source_from_config(&SourceConfig::default(), Some(snapshot.as_path())).unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    let rows = source.load_snapshot(date).await.unwrap();

    let criteria = TokenSelectionCriteria::new(ExpiryMonth::Jan, dec!(4), dec!(8)).unwrap();
    let tokens = TokenSelector::new(criteria).select_tokens(&rows).unwrap();
    let listed: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
    assert_eq!(
        listed,
        vec![
            "NRML|TCS25JAN3600CE",
            "NRML|TCS25JAN3600PE",
            "NRML|TCS25JAN4000CE",
            "NRML|TCS25JAN4000PE",
            "NRML|TCS25JANFUT",
        ]
    );

    let summary = TokenSummary::from_tokens(&tokens);
    assert_eq!(summary.to_string(), "Total: 5 | Futures: 1 | CE: 2 | PE: 2");

    let txt = dir.path().join("tokens.txt");
    CsvStorage::write_tokens_txt(&txt, &tokens).unwrap();
    assert!(fs::read_to_string(&txt).unwrap().ends_with("NRML|TCS25JANFUT"));
}

#[tokio::test]
async fn ledger_to_report_and_mismatch_tables() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("positions.csv");
    fs::write(
        &ledger,
        "Stock,Type,Strike,NetQty,NetValue,MTM,LTP,Expiry\n\
         TCS,FX,0,-50,-2000000,1500,4000,30-Jan-2025\n\
         TCS,CE,3600,50,0,0,,30-Jan-2025\n\
         TCS,PE,3600,-50,0,0,,30-Jan-2025\n\
         INFY,FX,0,-20,-450000,-200,1800,30-Jan-2025\n\
         INFY,CE,1800,25,0,0,,30-Jan-2025\n\
         INFY,PE,1820,-25,0,0,,30-Jan-2025\n\
         CASH,EQ,0,100,0,0,,\n",
    )
    .unwrap();

    let rows = CsvPositionSource::new(&ledger).load_positions().await.unwrap();
    assert_eq!(rows.len(), 6);

    let report = ReconciliationEngine::default().reconcile(&rows);
    assert_eq!(report.state, MatchState::NotMatched);
    // INFY has a put at the wrong strike, so only its strikes are reported.
    assert_eq!(report.mismatches.strikes.len(), 2);
    assert!(report.mismatches.futures.is_empty());
    // -24.5 lakh rounds half to even.
    assert_eq!(report.exposure, dec!(-24));

    let text = ReportFormatter::format(&report);
    assert!(text.contains("-24 Lac"));
    assert!(text.contains("Mis-Match in CE, PE"));

    let out = dir.path().join("strike_mismatches.csv");
    CsvStorage::write_records(&out, &StrikeMismatch::HEADERS, &report.mismatches.strikes)
        .unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("stock,strike,call_qty,put_qty,future_qty\n"));
    assert!(written.contains("INFY,1800,25,0,-20"));
    assert!(written.contains("INFY,1820,0,-25,-20"));
}

#[tokio::test]
async fn cash_only_ledger_is_rejected() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("positions.csv");
    fs::write(&ledger, "Stock,Type,Strike,NetQty\nCASH,EQ,0,100\n").unwrap();

    let result = CsvPositionSource::new(&ledger).load_positions().await;
    assert_eq!(result, Err(DeskError::NoOpenPositions));
}
