use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Amount, PriceSource};

pub const HISTORY_HEADER: [&str; 5] = [
    "timestamp_utc",
    "chosen_price_gbp",
    "source",
    "all_gbp_amounts_found",
    "url",
];

/// One append-only audit row per check. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub timestamp_utc: DateTime<Utc>,
    pub chosen_price_gbp: Option<Amount>,
    pub source: PriceSource,
    /// Every amount seen on the page, deduplicated and ascending.
    pub amounts: Vec<Amount>,
    pub url: String,
}

impl HistoryRecord {
    pub fn csv_row(&self) -> [String; 5] {
        [
            self.timestamp_utc
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            self.chosen_price_gbp
                .map(|p| p.to_string())
                .unwrap_or_default(),
            self.source.to_string(),
            self.amounts
                .iter()
                .map(Amount::to_string)
                .collect::<Vec<_>>()
                .join(","),
            self.url.clone(),
        ]
    }
}
