//! Final cleanup of the selector's token sequence.
//!
//! Drops index products and malformed names, removes duplicates keeping the
//! first occurrence, and sorts. Running it on its own output changes nothing.

use fno_desk_core::SortOrder;
use std::collections::HashSet;
use tracing::debug;

use crate::selector::TokenSelectionCriteria;
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct TokenCleaner {
    index_exclusions: Vec<String>,
    sort: SortOrder,
}

impl TokenCleaner {
    #[must_use]
    pub const fn new(index_exclusions: Vec<String>, sort: SortOrder) -> Self {
        Self {
            index_exclusions,
            sort,
        }
    }

    #[must_use]
    pub fn clean(&self, tokens: &[Token]) -> Vec<Token> {
        let mut seen = HashSet::new();
        let mut cleaned: Vec<Token> = tokens
            .iter()
            .filter(|t| !self.is_index_product(t))
            .filter(|t| !is_malformed(t))
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();

        match self.sort {
            SortOrder::Ascending => cleaned.sort(),
            SortOrder::Descending => cleaned.sort_by(|a, b| b.cmp(a)),
        }

        debug!("Cleaner kept {} of {} tokens", cleaned.len(), tokens.len());
        cleaned
    }

    fn is_index_product(&self, token: &Token) -> bool {
        self.index_exclusions
            .iter()
            .any(|index| token.instrument_name().contains(index.as_str()))
    }
}

impl From<&TokenSelectionCriteria> for TokenCleaner {
    fn from(criteria: &TokenSelectionCriteria) -> Self {
        Self::new(criteria.index_exclusions.clone(), criteria.sort)
    }
}

/// A `.` only shows up when a strike was rendered as a decimal upstream.
fn is_malformed(token: &Token) -> bool {
    token.as_str().contains('.')
}
