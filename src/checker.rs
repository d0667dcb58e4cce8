use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::info;

use crate::amounts::AmountScanner;
use crate::change_detector::{AlertReason, detect};
use crate::models::{Amount, HistoryRecord, MonitorState, MonitorTarget, PriceSource};
use crate::price_chooser::choose_price;
use crate::rate_resolver::{RateCandidate, RateResolver};

/// What the automation layer managed to read off the page. Empty strings are
/// fine; a failed page load is just empty input to the core.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Visible body text.
    pub text: String,
    /// Full page markup.
    pub markup: String,
}

/// Everything one check produced: the decision, the audit row and the state
/// to persist (`None` means keep the prior state).
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub chosen: Option<Amount>,
    pub source: PriceSource,
    pub amounts: Vec<Amount>,
    pub alerts: Vec<AlertReason>,
    pub new_state: Option<MonitorState>,
    pub history: HistoryRecord,
}

impl CheckOutcome {
    /// Human-readable alert lines for the notification sink.
    pub fn alert_lines(&self, target: &MonitorTarget) -> Vec<String> {
        self.alerts
            .iter()
            .map(|alert| format!("{}: {}", target.name, alert))
            .collect()
    }
}

/// Runs the full price-resolution pipeline for one target: rate controls
/// first, free-text scanning as fallback, then change detection.
#[derive(Debug, Clone)]
pub struct PriceChecker {
    scanner: AmountScanner,
    resolver: RateResolver,
}

impl Default for PriceChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceChecker {
    pub fn new() -> Self {
        let scanner = AmountScanner::new();
        let resolver = RateResolver::new(scanner.clone());
        PriceChecker { scanner, resolver }
    }

    pub fn run_check(
        &self,
        target: &MonitorTarget,
        prior: Option<&MonitorState>,
        page: &PageContent,
        candidates: &[&dyn RateCandidate],
        now: DateTime<Utc>,
    ) -> CheckOutcome {
        // All amounts on the page go into history even when a rate control
        // resolves; they are the audit trail for the fallback heuristics.
        let amounts = self.collect_amounts(page);

        let (chosen, source) = match self.resolver.resolve(candidates) {
            Some(rate) => (Some(rate.amount), rate.source),
            None => {
                let last_price = prior.map(|state| state.last_price_gbp);
                match choose_price(&amounts, last_price, target.expected) {
                    Some(amount) => (Some(amount), PriceSource::FallbackHeuristic),
                    None => (None, PriceSource::None),
                }
            }
        };

        let detection = detect(chosen, prior, target.target, target.drop_threshold(), now);

        info!(
            name = %target.name,
            chosen = %chosen.map(|c| format!("£{c}")).unwrap_or_else(|| "-".to_string()),
            source = %source,
            found = amounts.len(),
            "check complete"
        );

        let history = HistoryRecord {
            timestamp_utc: now,
            chosen_price_gbp: chosen,
            source,
            amounts: amounts.clone(),
            url: target.url.clone(),
        };

        CheckOutcome {
            chosen,
            source,
            amounts,
            alerts: detection.alerts,
            new_state: detection.new_state,
            history,
        }
    }

    fn collect_amounts(&self, page: &PageContent) -> Vec<Amount> {
        let mut all: BTreeSet<Amount> = self.scanner.scan(&page.text).into_iter().collect();
        all.extend(self.scanner.scan(&page.markup));
        all.into_iter().collect()
    }
}
