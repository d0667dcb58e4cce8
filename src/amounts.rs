use regex::Regex;
use std::collections::BTreeSet;

use crate::models::Amount;

pub const GBP_SYMBOL: &str = "£";

/// Extracts the set of monetary amounts present in a block of free text.
///
/// Recognizes a currency symbol, optional whitespace, one to five integer
/// digits and an optional two-digit fraction. Matches that fail numeric
/// parsing are dropped silently; noise is expected in page text.
#[derive(Debug, Clone)]
pub struct AmountScanner {
    pattern: Regex,
}

impl Default for AmountScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl AmountScanner {
    pub fn new() -> Self {
        Self::with_symbol(GBP_SYMBOL)
    }

    pub fn with_symbol(symbol: &str) -> Self {
        let pattern = format!(
            r"(?i){}\s*([0-9]{{1,5}}(?:\.[0-9]{{2}})?)",
            regex::escape(symbol)
        );
        AmountScanner {
            pattern: Regex::new(&pattern).unwrap(),
        }
    }

    /// Scan `text` and return the amounts found, deduplicated by their
    /// two-decimal value and sorted ascending.
    pub fn scan(&self, text: &str) -> Vec<Amount> {
        let mut found = BTreeSet::new();
        for captures in self.pattern.captures_iter(text) {
            if let Some(amount) = captures.get(1).and_then(|m| Amount::parse(m.as_str())) {
                found.insert(amount);
            }
        }
        found.into_iter().collect()
    }
}
