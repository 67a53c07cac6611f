#![allow(clippy::format_push_string)]

use crate::atm::AtmPosition;
use crate::engine::{MatchState, ReconciliationReport};

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────\n";

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(report: &ReconciliationReport) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("                    POSITION MATCHING                          \n");
        output.push_str(RULE);
        output.push('\n');

        output.push_str("Summary\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Total Exposure:        {} Lac\n", report.exposure));
        output.push_str(&format!("Sum for FX:            {}\n", report.totals.future));
        output.push_str(&format!("Sum for CE:            {}\n", report.totals.call));
        output.push_str(&format!("Sum for PE:            {}\n", report.totals.put));
        output.push_str(&format!("Position:              {}\n", report.state));
        output.push('\n');

        if !report.futures_mtm.is_empty() {
            output.push_str("Futures M2M\n");
            output.push_str(THIN_RULE);
            for line in &report.futures_mtm {
                output.push_str(&format!(
                    "{:<20} {:>10} {:>15}\n",
                    line.stock, line.net_qty, line.mtm
                ));
            }
            output.push('\n');
        }

        if report.state == MatchState::Matched {
            output.push_str("NO Mis-Match Data\n");
            output.push_str(RULE);
            return output;
        }

        output.push_str("Mis-Match in CE, PE\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!(
            "{:<20} {:>10} {:>12} {:>12} {:>12}\n",
            "Stock", "Strike", "CE Quantity", "PE Quantity", "FX Quantity"
        ));
        for m in &report.mismatches.strikes {
            output.push_str(&format!(
                "{:<20} {:>10} {:>12} {:>12} {:>12}\n",
                m.stock, m.strike, m.call_qty, m.put_qty, m.future_qty
            ));
        }
        output.push('\n');

        output.push_str("Mis-Match in FX\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!(
            "{:<20} {:>16} {:>16}\n",
            "Stock", "Net FX Quantity", "Net CE Quantity"
        ));
        for m in &report.mismatches.futures {
            output.push_str(&format!(
                "{:<20} {:>16} {:>16}\n",
                m.stock, m.future_qty, m.call_qty
            ));
        }
        output.push_str(RULE);

        output
    }

    #[must_use]
    pub fn format_atm(positions: &[AtmPosition], range: rust_decimal::Decimal) -> String {
        if positions.is_empty() {
            return format!("No ATM options found within ±{range} of future price.\n");
        }

        let mut output = String::new();
        output.push_str("At Money Position\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!(
            "{:<20} {:<8} {:<14} {:>10} {:>10}\n",
            "Scrip", "Call/Put", "Exp Date", "STK", "BF Qty"
        ));
        for p in positions {
            output.push_str(&format!(
                "{:<20} {:<8} {:<14} {:>10} {:>10}\n",
                p.stock,
                p.kind,
                p.expiry.as_deref().unwrap_or("-"),
                p.strike,
                p.net_qty
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReconciliationEngine;
    use fno_desk_core::PositionRow;
    use rust_decimal_macros::dec;

    #[test]
    fn matched_report_has_no_mismatch_tables() {
        let rows = vec![
            PositionRow::future("TCS", -50),
            PositionRow::call("TCS", dec!(3500), 50),
            PositionRow::put("TCS", dec!(3500), -50),
        ];
        let text = ReportFormatter::format(&ReconciliationEngine::default().reconcile(&rows));
        assert!(text.contains("Position:              Matched"));
        assert!(text.contains("NO Mis-Match Data"));
        assert!(!text.contains("Mis-Match in CE, PE"));
    }

    #[test]
    fn not_matched_report_lists_strikes() {
        let rows = vec![
            PositionRow::future("TCS", 100),
            PositionRow::call("TCS", dec!(3500), -100),
        ];
        let text = ReportFormatter::format(&ReconciliationEngine::default().reconcile(&rows));
        assert!(text.contains("Not Matched"));
        assert!(text.contains("Mis-Match in CE, PE"));
        assert!(text.contains("3500"));
    }

    #[test]
    fn empty_atm_listing_names_range() {
        assert_eq!(
            ReportFormatter::format_atm(&[], dec!(5)),
            "No ATM options found within ±5 of future price.\n"
        );
    }
}
