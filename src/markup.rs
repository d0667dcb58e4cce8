use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::rate_resolver::RateCandidate;

/// Rate-control selectors in priority order, most specific first. A selected
/// saver rate is the strongest signal; the looser attribute matches catch
/// markup variants the booking engine has shipped over time.
pub const RATE_CONTROL_SELECTORS: &[&str] = &[
    r#"button[data-rate-plan-code="SAVER"].selected"#,
    r#"button[data-rate-plan-code="SAVER"][aria-pressed="true"]"#,
    r#"button[data-rate-plan-code="SAVER"]"#,
    r#"button[data-room-rate-type-name="Saver"]"#,
    r#"button[data-ratename="Saver rate"]"#,
    r#"button[data-ratename*="Saver" i]"#,
];

/// Sub-elements carrying the split integer/fraction price display.
pub const SPLIT_INT_SELECTOR: &str = ".rate-int";
pub const SPLIT_DEC_SELECTOR: &str = ".rate-dec";

/// A rate control lifted out of parsed page markup. Used when no live
/// element was located: the page content is still available as a string, so
/// the same selector list is applied to a parsed document instead.
///
/// The snapshot is taken eagerly; a candidate owns plain strings and cannot
/// fail after construction.
#[derive(Debug, Clone)]
pub struct FragmentCandidate {
    int_part: Option<String>,
    dec_part: Option<String>,
    text: String,
    raw: String,
}

impl FragmentCandidate {
    fn from_element(element: ElementRef<'_>) -> Self {
        let int_part = select_text(element, SPLIT_INT_SELECTOR);
        let dec_part = select_text(element, SPLIT_DEC_SELECTOR);
        let text = element.text().collect::<Vec<_>>().join(" ").trim().to_string();
        FragmentCandidate {
            int_part,
            dec_part,
            text,
            raw: element.html(),
        }
    }
}

impl RateCandidate for FragmentCandidate {
    fn split_parts(&self) -> Option<(String, String)> {
        Some((self.int_part.clone()?, self.dec_part.clone()?))
    }

    fn rendered_text(&self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.clone())
        }
    }

    fn raw_markup(&self) -> Option<String> {
        if self.raw.is_empty() {
            None
        } else {
            Some(self.raw.clone())
        }
    }
}

/// Locate rate controls in raw markup, returning one candidate per matching
/// selector in priority order.
pub fn fragment_candidates(markup: &str, selectors: &[&str]) -> Vec<FragmentCandidate> {
    if markup.is_empty() {
        return Vec::new();
    }
    let document = Html::parse_document(markup);
    let mut candidates = Vec::new();
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            debug!(selector = selector_str, "unparseable rate selector");
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            candidates.push(FragmentCandidate::from_element(element));
        }
    }
    candidates
}

fn select_text(element: ElementRef<'_>, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let part = element.select(&selector).next()?;
    let text = part.text().collect::<String>().trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}
