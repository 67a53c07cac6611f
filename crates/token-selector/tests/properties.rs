//! Property-based tests for the selection pipeline invariants.

use fno_desk_core::{ContractRow, ExpiryMonth, OptionKind, SortOrder};
use fno_desk_token_selector::selector::passes_moneyness;
use fno_desk_token_selector::{
    SelectionOutcome, Token, TokenCleaner, TokenSelectionCriteria, TokenSelector,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn symbol() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("TCS".to_string()),
        Just("INFY".to_string()),
        Just("NIFTY".to_string()),
        Just("BANKNIFTY".to_string()),
        Just("M&M".to_string()),
    ]
}

prop_compose! {
    fn option_row()(
        symbol in symbol(),
        strike in 50u32..200,
        underlying in 50u32..200,
        is_call in any::<bool>(),
        oi in 0i64..10_000,
        lot in 1i64..500,
    ) -> ContractRow {
        let kind = if is_call { OptionKind::Call } else { OptionKind::Put };
        ContractRow::option(
            format!("{symbol}25JAN{strike}{}", kind.as_str()),
            symbol,
            Decimal::from(strike),
            kind,
            Decimal::from(underlying),
            oi,
            lot,
        )
    }
}

fn snapshot() -> impl Strategy<Value = Vec<ContractRow>> {
    prop::collection::vec(option_row(), 1..40)
}

fn token_list() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(
        "[A-Z]{1,9}25(JAN|FEB)[0-9]{0,4}(\\.5)?(CE|PE|FUT)".prop_map(|name| Token::new("NRML", &name)),
        0..50,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn cleaner_is_idempotent(tokens in token_list(), descending in any::<bool>()) {
        let sort = if descending { SortOrder::Descending } else { SortOrder::Ascending };
        let cleaner = TokenCleaner::new(vec!["NIFTY".to_string()], sort);
        let once = cleaner.clean(&tokens);
        prop_assert_eq!(cleaner.clean(&once), once);
    }

    #[test]
    fn puts_below_underlying_never_pass(
        strike in 1u32..1000,
        gap in 1u32..500,
        atm_pct in 0u32..=100,
        oi in 0i64..1_000_000,
    ) {
        let row = ContractRow::option(
            format!("TCS25JAN{strike}PE"),
            "TCS",
            Decimal::from(strike),
            OptionKind::Put,
            Decimal::from(strike + gap),
            oi,
            1,
        );
        prop_assert!(!passes_moneyness(&row));

        let criteria = TokenSelectionCriteria::new(ExpiryMonth::Jan, Decimal::ONE, Decimal::from(atm_pct)).unwrap();
        let details = TokenSelector::new(criteria).get_selection_details(&[row]).unwrap();
        prop_assert_eq!(details[0].outcome, SelectionOutcome::OutOfTheMoney);
    }

    #[test]
    fn every_surviving_row_yields_both_legs(rows in snapshot(), atm_pct in 0u32..=20) {
        let criteria = TokenSelectionCriteria::new(ExpiryMonth::Jan, Decimal::from(4), Decimal::from(atm_pct)).unwrap();
        if let Ok(combined) = TokenSelector::new(criteria).combine(&rows) {
            prop_assert_eq!(combined.calls.len(), combined.puts.len());
            for (call, put) in combined.calls.iter().zip(&combined.puts) {
                prop_assert!(call.is_call());
                prop_assert!(put.is_put());
                let call_stem = &call.as_str()[..call.as_str().len() - 2];
                let put_stem = &put.as_str()[..put.as_str().len() - 2];
                prop_assert_eq!(call_stem, put_stem);
            }
        }
    }

    #[test]
    fn index_products_never_reach_output(rows in snapshot(), atm_pct in 0u32..=20) {
        let criteria = TokenSelectionCriteria::new(ExpiryMonth::Jan, Decimal::from(4), Decimal::from(atm_pct)).unwrap();
        if let Ok(tokens) = TokenSelector::new(criteria).select_tokens(&rows) {
            prop_assert!(tokens.iter().all(|t| !t.as_str().contains("NIFTY")));
        }
    }
}
