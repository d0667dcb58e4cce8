use tracing::debug;

use crate::amounts::AmountScanner;
use crate::models::{Amount, PriceSource};

/// A structured rate-selection control on the page, supplied by the
/// automation layer in selector-priority order (most trusted first).
///
/// Every capability returns `None` on failure; implementations must swallow
/// their own extraction errors (missing sub-parts, detached nodes, timeouts).
pub trait RateCandidate {
    /// The separately rendered integer and fractional parts of the price
    /// display, when the control splits them into two sub-elements.
    fn split_parts(&self) -> Option<(String, String)>;

    /// The control's visible text.
    fn rendered_text(&self) -> Option<String>;

    /// The underlying markup text, including content hidden by styling.
    fn raw_markup(&self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRate {
    pub amount: Amount,
    pub source: PriceSource,
}

/// Resolves a high-confidence price from rate controls before any free-text
/// heuristics run.
///
/// Strategies are tried per candidate, in a fixed order, and short-circuit on
/// the first hit:
///   1. split sub-part extraction (`rate_control`)
///   2. visible-text scan, taking the maximum (`rendered_text`)
///   3. raw-markup scan, taking the maximum (`raw_markup`)
///
/// Strategies 2 and 3 prefer the maximum because a rate control showing a
/// nightly rate next to a total keeps the total as the larger figure.
/// The resolver never fails: the worst outcome is `None`.
#[derive(Debug, Clone)]
pub struct RateResolver {
    scanner: AmountScanner,
}

impl Default for RateResolver {
    fn default() -> Self {
        Self::new(AmountScanner::new())
    }
}

impl RateResolver {
    pub fn new(scanner: AmountScanner) -> Self {
        RateResolver { scanner }
    }

    /// Try each candidate in the order supplied and return the first price
    /// any strategy yields. Candidates are never aggregated.
    pub fn resolve(&self, candidates: &[&dyn RateCandidate]) -> Option<ResolvedRate> {
        for (index, candidate) in candidates.iter().enumerate() {
            if let Some(rate) = self.resolve_one(*candidate) {
                debug!(candidate = index, source = %rate.source, "rate control resolved");
                return Some(rate);
            }
        }
        None
    }

    fn resolve_one(&self, candidate: &dyn RateCandidate) -> Option<ResolvedRate> {
        self.from_split(candidate)
            .or_else(|| self.from_rendered(candidate))
            .or_else(|| self.from_raw(candidate))
    }

    fn from_split(&self, candidate: &dyn RateCandidate) -> Option<ResolvedRate> {
        let (int_part, dec_part) = candidate.split_parts()?;
        let amount = Amount::from_parts(int_part.trim(), dec_part.trim())?;
        Some(ResolvedRate {
            amount,
            source: PriceSource::RateControl,
        })
    }

    fn from_rendered(&self, candidate: &dyn RateCandidate) -> Option<ResolvedRate> {
        self.max_of(&candidate.rendered_text()?, PriceSource::RenderedText)
    }

    fn from_raw(&self, candidate: &dyn RateCandidate) -> Option<ResolvedRate> {
        self.max_of(&candidate.raw_markup()?, PriceSource::RawMarkup)
    }

    fn max_of(&self, text: &str, source: PriceSource) -> Option<ResolvedRate> {
        // scan output is ascending, so the last amount is the maximum
        let amount = *self.scanner.scan(text).last()?;
        Some(ResolvedRate { amount, source })
    }
}
