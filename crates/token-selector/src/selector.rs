use fno_desk_core::{
    ContractRow, DeskError, DeskResult, ExpiryMonth, Instrument, OptionKind, SortOrder,
    TokenSelectorConfig,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::cleaner::TokenCleaner;
use crate::token::{with_option_suffix, Token};

#[derive(Debug, Clone)]
pub struct TokenSelectionCriteria {
    pub month: ExpiryMonth,
    pub oi_threshold: Decimal,
    /// ATM band in percent, 0-100.
    pub atm_pct: Decimal,
    pub product: String,
    pub index_exclusions: Vec<String>,
    pub sort: SortOrder,
}

impl TokenSelectionCriteria {
    /// Creates criteria with the default `NRML` tag, `NIFTY` exclusion, and ascending order.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the OI threshold is not positive or the
    /// ATM percentage is outside 0-100.
    pub fn new(month: ExpiryMonth, oi_threshold: Decimal, atm_pct: Decimal) -> DeskResult<Self> {
        if oi_threshold <= Decimal::ZERO {
            return Err(DeskError::InvalidParameter(format!(
                "OI threshold must be positive, got {oi_threshold}"
            )));
        }
        if atm_pct < Decimal::ZERO || atm_pct > Decimal::ONE_HUNDRED {
            return Err(DeskError::InvalidParameter(format!(
                "ATM percentage must be within 0-100, got {atm_pct}"
            )));
        }
        let defaults = TokenSelectorConfig::default();
        Ok(Self {
            month,
            oi_threshold,
            atm_pct,
            product: defaults.product,
            index_exclusions: defaults.index_exclusions,
            sort: defaults.sort,
        })
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    #[must_use]
    pub fn with_index_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.index_exclusions = exclusions;
        self
    }

    /// ATM band as a fraction of the underlying.
    #[must_use]
    pub fn atm_fraction(&self) -> Decimal {
        self.atm_pct / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<&TokenSelectorConfig> for TokenSelectionCriteria {
    type Error = DeskError;

    fn try_from(config: &TokenSelectorConfig) -> DeskResult<Self> {
        Ok(Self::new(
            config.month.unwrap_or_else(ExpiryMonth::current),
            config.oi_threshold,
            config.atm_pct,
        )?
        .with_sort(config.sort)
        .with_product(config.product.clone())
        .with_index_exclusions(config.index_exclusions.clone()))
    }
}

/// A contract row with its open interest expressed in lots.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedRow<'a> {
    pub row: &'a ContractRow,
    pub oi_per_lot: Decimal,
}

/// Distance of a strike from the underlying relative to the ATM band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoneynessBand {
    NearTheMoney,
    FarFromMoney,
}

/// Restricts the snapshot to rows whose instrument name carries the month code.
///
/// The code is matched anywhere in the name, ticker included.
///
/// # Errors
/// Returns `NoContractsForMonth` if nothing matches.
pub fn filter_month(snapshot: &[ContractRow], month: ExpiryMonth) -> DeskResult<Vec<&ContractRow>> {
    let rows: Vec<&ContractRow> = snapshot
        .iter()
        .filter(|r| r.instrument_name.contains(month.code()))
        .collect();

    if rows.is_empty() {
        return Err(DeskError::NoContractsForMonth {
            month: month.code().to_string(),
        });
    }
    Ok(rows)
}

/// Divides open interest by lot size for every row.
///
/// # Errors
/// Returns `InvalidLotSize` on the first row with a non-positive lot size.
pub fn normalize_open_interest<'a>(rows: &[&'a ContractRow]) -> DeskResult<Vec<NormalizedRow<'a>>> {
    rows.iter()
        .map(|&row| {
            if row.lot_size <= 0 {
                return Err(DeskError::InvalidLotSize {
                    instrument: row.instrument_name.clone(),
                    lot_size: row.lot_size,
                });
            }
            Ok(NormalizedRow {
                row,
                oi_per_lot: Decimal::from(row.open_interest) / Decimal::from(row.lot_size),
            })
        })
        .collect()
}

/// Instrument names of the month's futures contracts.
#[must_use]
pub fn futures_for_month<'a>(rows: &[NormalizedRow<'a>], month: ExpiryMonth) -> Vec<&'a str> {
    let marker = month.futures_marker();
    rows.iter()
        .filter(|n| n.row.instrument_name.contains(&marker))
        .map(|n| n.row.instrument_name.as_str())
        .collect()
}

/// True for puts struck at or above the underlying and calls struck at or below it.
#[must_use]
pub fn passes_moneyness(row: &ContractRow) -> bool {
    match row.instrument {
        Instrument::Option {
            strike,
            kind: OptionKind::Put,
        } => strike >= row.underlying_price,
        Instrument::Option {
            strike,
            kind: OptionKind::Call,
        } => strike <= row.underlying_price,
        Instrument::Future => false,
    }
}

/// Keeps only rows passing [`passes_moneyness`].
///
/// # Errors
/// Returns `NoItmRows` if nothing survives.
pub fn apply_moneyness_mask<'a>(rows: &[NormalizedRow<'a>]) -> DeskResult<Vec<NormalizedRow<'a>>> {
    let kept: Vec<NormalizedRow<'a>> = rows
        .iter()
        .filter(|n| passes_moneyness(n.row))
        .copied()
        .collect();

    if kept.is_empty() {
        return Err(DeskError::NoItmRows);
    }
    Ok(kept)
}

/// Classifies a strike against the ATM band. Both band edges count as far.
#[must_use]
pub fn classify_band(strike: Decimal, underlying: Decimal, atm_fraction: Decimal) -> MoneynessBand {
    let lower = underlying * (Decimal::ONE - atm_fraction);
    let upper = underlying * (Decimal::ONE + atm_fraction);
    if strike <= lower || strike >= upper {
        MoneynessBand::FarFromMoney
    } else {
        MoneynessBand::NearTheMoney
    }
}

fn band_of(n: &NormalizedRow<'_>, atm_fraction: Decimal) -> Option<MoneynessBand> {
    n.row
        .instrument
        .strike()
        .map(|strike| classify_band(strike, n.row.underlying_price, atm_fraction))
}

/// Keeps near-the-money rows unconditionally and far-from-money rows whose
/// normalized OI is strictly above the threshold.
///
/// # Errors
/// Returns `NoRowsAfterOiFilter` if nothing survives.
pub fn apply_atm_oi_filter<'a>(
    rows: &[NormalizedRow<'a>],
    criteria: &TokenSelectionCriteria,
) -> DeskResult<Vec<NormalizedRow<'a>>> {
    let atm_fraction = criteria.atm_fraction();
    let kept: Vec<NormalizedRow<'a>> = rows
        .iter()
        .filter(|n| match band_of(n, atm_fraction) {
            Some(MoneynessBand::NearTheMoney) => true,
            Some(MoneynessBand::FarFromMoney) => n.oi_per_lot > criteria.oi_threshold,
            None => false,
        })
        .copied()
        .collect();

    if kept.is_empty() {
        return Err(DeskError::NoRowsAfterOiFilter);
    }
    Ok(kept)
}

/// Pre-cleanup token sequence: one CE and one PE per surviving row, plus futures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedTokens {
    pub calls: Vec<Token>,
    pub puts: Vec<Token>,
    pub futures: Vec<Token>,
}

impl CombinedTokens {
    /// Concatenates calls, then puts, then futures.
    #[must_use]
    pub fn into_sequence(self) -> Vec<Token> {
        let mut all = self.calls;
        all.extend(self.puts);
        all.extend(self.futures);
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len() + self.futures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Emits both legs for every row, whichever side passed the mask.
#[must_use]
pub fn derive_token_pairs(rows: &[NormalizedRow<'_>], product: &str) -> (Vec<Token>, Vec<Token>) {
    rows.iter()
        .map(|n| {
            let name = &n.row.instrument_name;
            (
                Token::new(product, &with_option_suffix(name, OptionKind::Call.as_str())),
                Token::new(product, &with_option_suffix(name, OptionKind::Put.as_str())),
            )
        })
        .unzip()
}

/// How a row fared in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionOutcome {
    /// Month future, carried through unfiltered.
    Future,
    /// Failed the moneyness mask.
    OutOfTheMoney,
    NearTheMoney,
    FarFromMoneyKept,
    FarFromMoneyLowOi,
}

impl SelectionOutcome {
    #[must_use]
    pub const fn is_selected(self) -> bool {
        matches!(self, Self::Future | Self::NearTheMoney | Self::FarFromMoneyKept)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionDetail {
    pub instrument_name: String,
    pub symbol: String,
    pub strike: Option<Decimal>,
    pub underlying_price: Decimal,
    pub oi_per_lot: Decimal,
    pub outcome: SelectionOutcome,
}

pub struct TokenSelector {
    criteria: TokenSelectionCriteria,
}

impl TokenSelector {
    #[must_use]
    pub const fn new(criteria: TokenSelectionCriteria) -> Self {
        Self { criteria }
    }

    #[must_use]
    pub const fn criteria(&self) -> &TokenSelectionCriteria {
        &self.criteria
    }

    /// Runs every selection stage and returns the uncleaned token sequence.
    ///
    /// # Errors
    /// Returns the named empty-stage error of the first stage that produced
    /// nothing, or `InvalidLotSize`.
    pub fn combine(&self, snapshot: &[ContractRow]) -> DeskResult<CombinedTokens> {
        let month = self.criteria.month;
        let month_rows = filter_month(snapshot, month)?;
        debug!("{} rows for {}", month_rows.len(), month);

        let normalized = normalize_open_interest(&month_rows)?;
        let futures = futures_for_month(&normalized, month);
        debug!("{} futures carried through", futures.len());

        let itm = apply_moneyness_mask(&normalized)?;
        debug!("{} rows after moneyness mask", itm.len());

        let kept = apply_atm_oi_filter(&itm, &self.criteria)?;
        debug!("{} rows after ATM/OI filter", kept.len());

        let (calls, puts) = derive_token_pairs(&kept, &self.criteria.product);
        let futures = futures
            .into_iter()
            .map(|name| Token::new(&self.criteria.product, name))
            .collect();

        Ok(CombinedTokens {
            calls,
            puts,
            futures,
        })
    }

    /// Selects, cleans, and sorts tokens for the configured month.
    ///
    /// # Errors
    /// Propagates any stage error from [`Self::combine`].
    pub fn select_tokens(&self, snapshot: &[ContractRow]) -> DeskResult<Vec<Token>> {
        let combined = self.combine(snapshot)?;
        let raw_count = combined.len();
        let tokens = TokenCleaner::from(&self.criteria).clean(&combined.into_sequence());

        info!(
            "Token selection complete: {} tokens kept out of {} emitted for {}",
            tokens.len(),
            raw_count,
            self.criteria.month
        );

        Ok(tokens)
    }

    /// Per-row decisions for display.
    ///
    /// # Errors
    /// Returns `NoContractsForMonth` or `InvalidLotSize` from the first two stages.
    pub fn get_selection_details(&self, snapshot: &[ContractRow]) -> DeskResult<Vec<SelectionDetail>> {
        let month = self.criteria.month;
        let marker = month.futures_marker();
        let atm_fraction = self.criteria.atm_fraction();
        let month_rows = filter_month(snapshot, month)?;
        let normalized = normalize_open_interest(&month_rows)?;

        Ok(normalized
            .iter()
            .filter(|n| !n.row.instrument.is_future() || n.row.instrument_name.contains(&marker))
            .map(|n| {
                let outcome = if n.row.instrument.is_future() {
                    SelectionOutcome::Future
                } else if !passes_moneyness(n.row) {
                    SelectionOutcome::OutOfTheMoney
                } else {
                    match band_of(n, atm_fraction) {
                        Some(MoneynessBand::NearTheMoney) => SelectionOutcome::NearTheMoney,
                        _ if n.oi_per_lot > self.criteria.oi_threshold => {
                            SelectionOutcome::FarFromMoneyKept
                        }
                        _ => SelectionOutcome::FarFromMoneyLowOi,
                    }
                };
                SelectionDetail {
                    instrument_name: n.row.instrument_name.clone(),
                    symbol: n.row.symbol.clone(),
                    strike: n.row.instrument.strike(),
                    underlying_price: n.row.underlying_price,
                    oi_per_lot: n.oi_per_lot,
                    outcome,
                }
            })
            .collect())
    }
}
