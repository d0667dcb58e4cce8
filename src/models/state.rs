use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Amount;

/// Per-target persisted state. Read once before a check, written once after;
/// absent on the first ever run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorState {
    pub last_price_gbp: Amount,
    pub last_checked_utc: DateTime<Utc>,
}

impl MonitorState {
    pub fn new(last_price_gbp: Amount, last_checked_utc: DateTime<Utc>) -> Self {
        Self {
            last_price_gbp,
            last_checked_utc,
        }
    }
}
