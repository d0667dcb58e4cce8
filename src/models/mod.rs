use serde::{Deserialize, Serialize};
use std::fmt;

pub mod amount;
pub mod history;
pub mod state;
pub mod target;

// Re-exports for convenience
pub use amount::*;
pub use history::*;
pub use state::*;
pub use target::*;

/// Which extraction strategy produced the canonical price for a check.
/// Recorded in every history row for later auditing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    RateControl,
    RenderedText,
    RawMarkup,
    FallbackHeuristic,
    None,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::RateControl => "rate_control",
            PriceSource::RenderedText => "rendered_text",
            PriceSource::RawMarkup => "raw_markup",
            PriceSource::FallbackHeuristic => "fallback_heuristic",
            PriceSource::None => "none",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
