use anyhow::{Result, bail};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use stay_watcher::browser::PageFetcher;
use stay_watcher::checker::{CheckOutcome, PageContent, PriceChecker};
use stay_watcher::config::{AppConfig, load_targets, validate_target};
use stay_watcher::markup::{RATE_CONTROL_SELECTORS, fragment_candidates};
use stay_watcher::models::{Amount, MonitorTarget};
use stay_watcher::notify::{Notifier, TelegramNotifier};
use stay_watcher::rate_resolver::RateCandidate;
use stay_watcher::store::TargetStore;

/// Monitor hotel booking pages and alert on target or drop-threshold prices.
#[derive(Debug, Parser)]
#[command(name = "stay-watcher", version, about)]
struct Cli {
    /// JSON config file listing the targets to monitor
    #[arg(long, conflicts_with = "url")]
    config: Option<PathBuf>,

    /// Single booking page URL to monitor
    #[arg(long)]
    url: Option<String>,

    /// Expected price for the single URL
    #[arg(long, requires = "url")]
    expected: Option<f64>,

    /// Target price (alert ceiling) for the single URL
    #[arg(long, requires = "url")]
    target: Option<f64>,

    /// Default price-drop percentage threshold
    #[arg(long)]
    drop_pct: Option<f64>,

    /// Output directory for state and history files
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stay_watcher=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let targets = resolve_targets(&cli, cli.drop_pct.unwrap_or(config.monitor.default_drop_pct))?;

    let out_dir = cli
        .out_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.monitor.out_dir));
    let store = TargetStore::new(out_dir)?;
    let checker = PriceChecker::new();
    let fetcher = PageFetcher::new(config.fetch.clone())?;
    let notifier = TelegramNotifier::from_config(&config.telegram);

    let mut all_alerts = Vec::new();
    for target in &targets {
        let outcome = check_target(&fetcher, &checker, &store, target)?;
        for line in outcome.alert_lines(target) {
            all_alerts.push(format!("{line}\n{}", target.url));
        }
    }

    if !all_alerts.is_empty() {
        let message = format!("Stay watcher alerts\n\n{}", all_alerts.join("\n\n"));
        println!("ALERTS:\n{}", all_alerts.join("\n"));
        if let Some(notifier) = &notifier {
            if let Err(error) = notifier.notify(&message).await {
                warn!(%error, "alert notification failed");
            }
        }
    }

    Ok(())
}

fn resolve_targets(cli: &Cli, default_drop_pct: f64) -> Result<Vec<MonitorTarget>> {
    let mut targets = if let Some(path) = &cli.config {
        load_targets(path)?
    } else if let Some(url) = &cli.url {
        let target = MonitorTarget {
            name: "single".to_string(),
            url: url.clone(),
            expected: cli.expected.and_then(Amount::from_f64),
            target: cli.target.and_then(Amount::from_f64),
            drop_pct: None,
        };
        validate_target(&target)?;
        vec![target]
    } else {
        bail!("provide --config targets.json or --url ...");
    };

    for target in &mut targets {
        target.drop_pct.get_or_insert(default_drop_pct);
    }
    Ok(targets)
}

/// One full check for one target: fetch, resolve, detect, persist. A failed
/// page load is not fatal; the core sees empty input and reports Undetected.
fn check_target(
    fetcher: &PageFetcher,
    checker: &PriceChecker,
    store: &TargetStore,
    target: &MonitorTarget,
) -> Result<CheckOutcome> {
    let prior = store.load_state(target);
    let now = Utc::now();

    let outcome = match fetcher.load(&target.url) {
        Ok(page) => {
            let content = page.content();
            let live = page.rate_candidates();
            // When no live control is found the same selectors are applied
            // to the captured markup, which sometimes still holds the grid.
            let fragments = if live.is_empty() {
                fragment_candidates(&content.markup, RATE_CONTROL_SELECTORS)
            } else {
                Vec::new()
            };
            let candidates: Vec<&dyn RateCandidate> = if live.is_empty() {
                fragments.iter().map(|c| c as &dyn RateCandidate).collect()
            } else {
                live.iter().map(|c| c as &dyn RateCandidate).collect()
            };
            checker.run_check(target, prior.as_ref(), &content, &candidates, now)
        }
        Err(error) => {
            warn!(name = %target.name, %error, "page load failed");
            checker.run_check(target, prior.as_ref(), &PageContent::default(), &[], now)
        }
    };

    store.append_history(target, &outcome.history)?;
    if let Some(state) = &outcome.new_state {
        store.save_state(target, state)?;
    } else {
        info!(name = %target.name, "state preserved");
    }

    Ok(outcome)
}
