use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;

use crate::models::{Amount, MonitorState};

/// Why a check raised an alert, with the numeric evidence attached.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertReason {
    /// Chosen price is at or below the configured ceiling.
    BelowTarget { chosen: Amount, target: Amount },
    /// Price fell by at least the drop threshold since the last check.
    PriceDrop {
        prior: Amount,
        chosen: Amount,
        drop_pct: f64,
    },
    /// No price could be resolved this round.
    Undetected,
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertReason::BelowTarget { chosen, target } => {
                write!(f, "<= target (£{chosen} <= £{target})")
            }
            AlertReason::PriceDrop {
                prior,
                chosen,
                drop_pct,
            } => {
                write!(f, "dropped {drop_pct:.1}% (£{prior} -> £{chosen})")
            }
            AlertReason::Undetected => write!(f, "ERROR no price detected"),
        }
    }
}

/// Outcome of one change-detection pass. `new_state` of `None` means the
/// persisted state must be preserved as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub alerts: Vec<AlertReason>,
    pub new_state: Option<MonitorState>,
}

/// Decide which alerts fire for a chosen price, and what state to persist.
///
/// The rules are independent and non-exclusive: a check can breach the target
/// ceiling and cross the drop threshold at the same time, and both alerts are
/// emitted. A missing price emits `Undetected` and leaves the prior state
/// untouched so a transient extraction failure does not erase context.
pub fn detect(
    chosen: Option<Amount>,
    prior: Option<&MonitorState>,
    target: Option<Amount>,
    drop_threshold_pct: f64,
    now: DateTime<Utc>,
) -> Detection {
    let Some(chosen) = chosen else {
        return Detection {
            alerts: vec![AlertReason::Undetected],
            new_state: None,
        };
    };

    let mut alerts = Vec::new();

    if let Some(target) = target {
        if chosen <= target {
            alerts.push(AlertReason::BelowTarget { chosen, target });
        }
    }

    if let Some(prior_state) = prior {
        let prior_price = prior_state.last_price_gbp;
        if prior_price > Amount::ZERO {
            let drop_pct = drop_percentage(prior_price, chosen);
            if drop_pct >= drop_threshold_pct {
                alerts.push(AlertReason::PriceDrop {
                    prior: prior_price,
                    chosen,
                    drop_pct,
                });
            }
        }
    }

    Detection {
        alerts,
        new_state: Some(MonitorState::new(chosen, now)),
    }
}

/// `(prior - current) / prior * 100`; positive values are decreases.
pub fn drop_percentage(prior: Amount, current: Amount) -> f64 {
    let ratio = (prior.value() - current.value()) / prior.value();
    (ratio * Decimal::from(100)).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn amount(value: &str) -> Amount {
        Amount::parse(value).unwrap()
    }

    fn prior(value: &str) -> MonitorState {
        MonitorState::new(amount(value), Utc::now())
    }

    #[rstest]
    #[case("100.00", "92.00", 5.0, true, 8.0)]
    #[case("100.00", "96.00", 5.0, false, 4.0)]
    #[case("100.00", "95.00", 5.0, true, 5.0)] // threshold is inclusive
    fn test_drop_threshold(
        #[case] last: &str,
        #[case] current: &str,
        #[case] threshold: f64,
        #[case] fires: bool,
        #[case] expected_pct: f64,
    ) {
        let state = prior(last);
        let detection = detect(Some(amount(current)), Some(&state), None, threshold, Utc::now());
        let drop = detection.alerts.iter().find_map(|a| match a {
            AlertReason::PriceDrop { drop_pct, .. } => Some(*drop_pct),
            _ => None,
        });
        assert_eq!(drop.is_some(), fires);
        if let Some(pct) = drop {
            assert!((pct - expected_pct).abs() < 1e-9);
        }
    }

    #[test]
    fn test_price_increase_never_fires() {
        let state = prior("100.00");
        let detection = detect(Some(amount("130.00")), Some(&state), None, 5.0, Utc::now());
        assert!(detection.alerts.is_empty());
    }

    #[test]
    fn test_target_boundary_is_inclusive() {
        let detection = detect(Some(amount("90.00")), None, Some(amount("90.00")), 5.0, Utc::now());
        assert_eq!(
            detection.alerts,
            vec![AlertReason::BelowTarget {
                chosen: amount("90.00"),
                target: amount("90.00"),
            }]
        );

        let detection = detect(Some(amount("90.01")), None, Some(amount("90.00")), 5.0, Utc::now());
        assert!(detection.alerts.is_empty());
    }

    #[test]
    fn test_undetected_preserves_state() {
        let state = prior("50.00");
        let detection = detect(None, Some(&state), Some(amount("40.00")), 5.0, Utc::now());
        assert_eq!(detection.alerts, vec![AlertReason::Undetected]);
        assert!(detection.new_state.is_none());
    }

    #[test]
    fn test_both_alerts_can_fire_in_one_check() {
        let state = prior("100.00");
        let detection = detect(
            Some(amount("85.00")),
            Some(&state),
            Some(amount("90.00")),
            5.0,
            Utc::now(),
        );
        assert_eq!(detection.alerts.len(), 2);
        assert!(matches!(detection.alerts[0], AlertReason::BelowTarget { .. }));
        assert!(matches!(detection.alerts[1], AlertReason::PriceDrop { .. }));
    }

    #[test]
    fn test_state_overwritten_even_without_alerts() {
        let state = prior("100.00");
        let now = Utc::now();
        let detection = detect(Some(amount("99.00")), Some(&state), None, 5.0, now);
        assert!(detection.alerts.is_empty());
        let new_state = detection.new_state.unwrap();
        assert_eq!(new_state.last_price_gbp, amount("99.00"));
        assert_eq!(new_state.last_checked_utc, now);
    }

    #[test]
    fn test_zero_prior_price_is_ignored() {
        let state = prior("0.00");
        let detection = detect(Some(amount("10.00")), Some(&state), None, 5.0, Utc::now());
        assert!(detection.alerts.is_empty());
    }

    #[test]
    fn test_first_run_has_no_drop_alert() {
        let detection = detect(Some(amount("75.00")), None, None, 5.0, Utc::now());
        assert!(detection.alerts.is_empty());
        assert!(detection.new_state.is_some());
    }

    #[test]
    fn test_alert_messages() {
        assert_eq!(
            AlertReason::BelowTarget {
                chosen: amount("88.00"),
                target: amount("90.00"),
            }
            .to_string(),
            "<= target (£88.00 <= £90.00)"
        );
        assert_eq!(
            AlertReason::PriceDrop {
                prior: amount("100.00"),
                chosen: amount("92.00"),
                drop_pct: 8.0,
            }
            .to_string(),
            "dropped 8.0% (£100.00 -> £92.00)"
        );
        assert_eq!(AlertReason::Undetected.to_string(), "ERROR no price detected");
    }
}
