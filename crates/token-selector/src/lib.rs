//! Watchlist token selection from a daily F&O bhavcopy.
//!
//! The pipeline restricts the snapshot to one expiry month, keeps the
//! in-the-money leaning side of each strike, filters far-from-money strikes
//! by open interest per lot, and emits a `CE`/`PE` token pair per surviving
//! strike plus the month's futures. [`TokenCleaner`] then removes index
//! products, malformed names, and duplicates before sorting.
//!
//! # Example
//!
//! ```ignore
//! use fno_desk_core::ExpiryMonth;
//! use fno_desk_token_selector::{TokenSelectionCriteria, TokenSelector};
//! use rust_decimal_macros::dec;
//!
//! let criteria = TokenSelectionCriteria::new(ExpiryMonth::Jan, dec!(4), dec!(8))?;
//! let tokens = TokenSelector::new(criteria).select_tokens(&snapshot)?;
//! ```

pub mod cleaner;
pub mod selector;
pub mod token;

pub use cleaner::TokenCleaner;
pub use selector::{
    CombinedTokens, MoneynessBand, SelectionDetail, SelectionOutcome, TokenSelectionCriteria,
    TokenSelector,
};
pub use token::{Token, TokenSummary};
