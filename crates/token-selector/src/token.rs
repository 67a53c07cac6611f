use serde::{Deserialize, Serialize};

/// Broker-ready instrument identifier, `<ORDER-TYPE>|<INSTRUMENT-NAME>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(product: &str, instrument_name: &str) -> Self {
        Self(format!("{product}|{instrument_name}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The instrument name after the order-type tag.
    #[must_use]
    pub fn instrument_name(&self) -> &str {
        self.0.split_once('|').map_or(self.0.as_str(), |(_, name)| name)
    }

    #[must_use]
    pub fn is_future(&self) -> bool {
        self.0.ends_with("FUT")
    }

    #[must_use]
    pub fn is_call(&self) -> bool {
        self.0.ends_with("CE")
    }

    #[must_use]
    pub fn is_put(&self) -> bool {
        self.0.ends_with("PE")
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Replaces the trailing two-character option suffix of `instrument_name`.
///
/// Names shorter than two characters get the suffix appended.
#[must_use]
pub fn with_option_suffix(instrument_name: &str, suffix: &str) -> String {
    let cut = instrument_name
        .char_indices()
        .rev()
        .nth(1)
        .map_or(0, |(idx, _)| idx);
    format!("{}{suffix}", &instrument_name[..cut])
}

/// Counts of the final token list by instrument class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSummary {
    pub total: usize,
    pub futures: usize,
    pub calls: usize,
    pub puts: usize,
}

impl TokenSummary {
    #[must_use]
    pub fn from_tokens(tokens: &[Token]) -> Self {
        tokens.iter().fold(
            Self {
                total: tokens.len(),
                ..Self::default()
            },
            |mut acc, token| {
                if token.is_future() {
                    acc.futures += 1;
                } else if token.is_call() {
                    acc.calls += 1;
                } else if token.is_put() {
                    acc.puts += 1;
                }
                acc
            },
        )
    }
}

impl std::fmt::Display for TokenSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total: {} | Futures: {} | CE: {} | PE: {}",
            self.total, self.futures, self.calls, self.puts
        )
    }
}
