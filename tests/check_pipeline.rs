// End-to-end pipeline tests: parsed markup in, alerts and files out.
// Chrome is not involved; candidates come from the markup fallback path.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use stay_watcher::change_detector::AlertReason;
use stay_watcher::checker::{PageContent, PriceChecker};
use stay_watcher::markup::{RATE_CONTROL_SELECTORS, fragment_candidates};
use stay_watcher::models::{Amount, MonitorTarget, PriceSource};
use stay_watcher::rate_resolver::RateCandidate;
use stay_watcher::store::TargetStore;

const BOOKING_PAGE: &str = r#"
    <html><body>
        <main>
            <h1>Double room, 1 night</h1>
            <p>Book now from £45.00 deposit</p>
            <button data-rate-plan-code="SAVER" class="selected">
                Saver rate
                <span class="rate-int">92</span><span class="rate-dec">50</span>
            </button>
            <button data-rate-plan-code="FLEX">Flexible rate £120.00</button>
        </main>
    </body></html>
"#;

const GRIDLESS_PAGE: &str = r#"
    <html><body>
        <main>
            <h1>Double room, 1 night</h1>
            <p>Rooms from £45.00, tonight £84.00, two nights £168.00</p>
        </main>
    </body></html>
"#;

fn page_from(markup: &str) -> PageContent {
    // visible text approximated by the markup itself; the scanner only
    // cares about the currency matches either way
    PageContent {
        text: String::new(),
        markup: markup.to_string(),
    }
}

fn run(
    checker: &PriceChecker,
    store: &TargetStore,
    target: &MonitorTarget,
    markup: &str,
    now: chrono::DateTime<Utc>,
) -> stay_watcher::CheckOutcome {
    let prior = store.load_state(target);
    let page = page_from(markup);
    let fragments = fragment_candidates(&page.markup, RATE_CONTROL_SELECTORS);
    let candidates: Vec<&dyn RateCandidate> =
        fragments.iter().map(|c| c as &dyn RateCandidate).collect();

    let outcome = checker.run_check(target, prior.as_ref(), &page, &candidates, now);

    store.append_history(target, &outcome.history).unwrap();
    if let Some(state) = &outcome.new_state {
        store.save_state(target, state).unwrap();
    }
    outcome
}

#[test]
fn first_check_resolves_rate_control_and_persists_state() {
    let dir = TempDir::new().unwrap();
    let store = TargetStore::new(dir.path()).unwrap();
    let checker = PriceChecker::new();
    let target = MonitorTarget::new("Leeds Central", "https://example.com/leeds");

    let outcome = run(&checker, &store, &target, BOOKING_PAGE, Utc::now());

    assert_eq!(outcome.chosen.unwrap().to_string(), "92.50");
    assert_eq!(outcome.source, PriceSource::RateControl);
    assert!(outcome.alerts.is_empty());

    let state = store.load_state(&target).unwrap();
    assert_eq!(state.last_price_gbp, Amount::parse("92.50").unwrap());

    let history = std::fs::read_to_string(store.history_path(&target)).unwrap();
    assert_eq!(history.lines().count(), 2); // header + one row
    assert!(history.contains("rate_control"));
}

#[test]
fn price_drop_fires_against_persisted_state() {
    let dir = TempDir::new().unwrap();
    let store = TargetStore::new(dir.path()).unwrap();
    let checker = PriceChecker::new();
    let target = MonitorTarget::new("Leeds Central", "https://example.com/leeds");

    let first = Utc::now() - Duration::days(1);
    run(&checker, &store, &target, BOOKING_PAGE, first);

    // next day the saver rate shows £80.00
    let cheaper = BOOKING_PAGE.replace(
        r#"<span class="rate-int">92</span><span class="rate-dec">50</span>"#,
        r#"<span class="rate-int">80</span><span class="rate-dec">00</span>"#,
    );
    let outcome = run(&checker, &store, &target, &cheaper, Utc::now());

    assert_eq!(outcome.chosen.unwrap().to_string(), "80.00");
    let lines = outcome.alert_lines(&target);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Leeds Central: dropped 13.5%"));

    let state = store.load_state(&target).unwrap();
    assert_eq!(state.last_price_gbp, Amount::parse("80.00").unwrap());
}

#[test]
fn gridless_page_falls_back_to_nearest_known_price() {
    let dir = TempDir::new().unwrap();
    let store = TargetStore::new(dir.path()).unwrap();
    let checker = PriceChecker::new();
    let target = MonitorTarget::new("Leeds Central", "https://example.com/leeds");

    run(&checker, &store, &target, BOOKING_PAGE, Utc::now() - Duration::days(1));
    let outcome = run(&checker, &store, &target, GRIDLESS_PAGE, Utc::now());

    // nearest to the persisted £92.50 out of 45.00 / 84.00 / 168.00
    assert_eq!(outcome.chosen.unwrap().to_string(), "84.00");
    assert_eq!(outcome.source, PriceSource::FallbackHeuristic);
}

#[test]
fn empty_page_reports_undetected_and_preserves_state() {
    let dir = TempDir::new().unwrap();
    let store = TargetStore::new(dir.path()).unwrap();
    let checker = PriceChecker::new();
    let target = MonitorTarget::new("Leeds Central", "https://example.com/leeds");

    run(&checker, &store, &target, BOOKING_PAGE, Utc::now() - Duration::days(1));
    let outcome = run(&checker, &store, &target, "", Utc::now());

    assert!(outcome.chosen.is_none());
    assert_eq!(outcome.alerts, vec![AlertReason::Undetected]);
    assert_eq!(
        outcome.alert_lines(&target),
        vec!["Leeds Central: ERROR no price detected"]
    );

    // the stale price survives the failed round
    let state = store.load_state(&target).unwrap();
    assert_eq!(state.last_price_gbp, Amount::parse("92.50").unwrap());

    let history = std::fs::read_to_string(store.history_path(&target)).unwrap();
    assert_eq!(history.lines().count(), 3);
    assert!(history.lines().last().unwrap().contains("none"));
}

#[test]
fn target_ceiling_alert_with_markup_candidates() {
    let dir = TempDir::new().unwrap();
    let store = TargetStore::new(dir.path()).unwrap();
    let checker = PriceChecker::new();
    let mut target = MonitorTarget::new("Leeds Central", "https://example.com/leeds");
    target.target = Some(Amount::parse("95.00").unwrap());

    let outcome = run(&checker, &store, &target, BOOKING_PAGE, Utc::now());

    let lines = outcome.alert_lines(&target);
    assert_eq!(lines, vec!["Leeds Central: <= target (£92.50 <= £95.00)"]);
}
