use serde::{Deserialize, Serialize};

use crate::models::Amount;

pub const DEFAULT_DROP_PCT: f64 = 5.0;

/// One monitored booking page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorTarget {
    pub name: String,
    pub url: String,
    /// Price the user believes the page should show; anchors the fallback
    /// chooser on the first ever check.
    #[serde(default)]
    pub expected: Option<Amount>,
    /// Alert ceiling: checks at or below this price raise an alert.
    #[serde(default)]
    pub target: Option<Amount>,
    /// Per-target drop threshold; falls back to the run-wide default.
    #[serde(default)]
    pub drop_pct: Option<f64>,
}

impl MonitorTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            expected: None,
            target: None,
            drop_pct: None,
        }
    }

    pub fn drop_threshold(&self) -> f64 {
        self.drop_pct.unwrap_or(DEFAULT_DROP_PCT)
    }

    /// Filename-safe key derived from the display name, used to name the
    /// per-target state and history files.
    pub fn key(&self) -> String {
        let mut key = String::new();
        let mut last_was_sep = true;
        for c in self.name.trim().chars() {
            if c.is_ascii_alphanumeric() {
                key.push(c.to_ascii_lowercase());
                last_was_sep = false;
            } else if !last_was_sep {
                key.push('_');
                last_was_sep = true;
            }
        }
        let key = key.trim_matches('_');
        if key.is_empty() {
            "item".to_string()
        } else {
            key.chars().take(80).collect()
        }
    }
}
