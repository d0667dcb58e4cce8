use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use url::Url;

use crate::models::{DEFAULT_DROP_PCT, MonitorTarget};
use crate::notify::TelegramConfig;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub fetch: FetchConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Directory for per-target state and history files.
    pub out_dir: String,
    /// Drop threshold applied when a target does not set its own.
    pub default_drop_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub nav_timeout_ms: u64,
    /// Pause after navigation before reading anything; booking pages render
    /// their rate grid late.
    pub settle_ms: u64,
    pub scroll_pause_ms: u64,
    pub rate_attach_timeout_ms: u64,
    pub chrome_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("monitor.out_dir", ".")?
            .set_default("monitor.default_drop_pct", DEFAULT_DROP_PCT)?
            .set_default("fetch.nav_timeout_ms", 45_000i64)?
            .set_default("fetch.settle_ms", 1_500i64)?
            .set_default("fetch.scroll_pause_ms", 400i64)?
            .set_default("fetch.rate_attach_timeout_ms", 6_000i64)?
            // Optional config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Environment variables with prefix "STAY_"
            .add_source(Environment::with_prefix("STAY").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Fall back to the conventional plain env vars when unset
        if config.fetch.chrome_path.is_none() {
            config.fetch.chrome_path = env::var("CHROME_PATH").ok();
        }
        if config.telegram.bot_token.is_none() {
            config.telegram.bot_token = env::var("TELEGRAM_BOT_TOKEN").ok();
        }
        if config.telegram.chat_id.is_none() {
            config.telegram.chat_id = env::var("TELEGRAM_CHAT_ID").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.out_dir.is_empty() {
            return Err(ConfigError::Message("monitor.out_dir must not be empty".into()));
        }

        if !self.monitor.default_drop_pct.is_finite() || self.monitor.default_drop_pct < 0.0 {
            return Err(ConfigError::Message(
                "monitor.default_drop_pct must be a non-negative number".into(),
            ));
        }

        if self.fetch.nav_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "fetch.nav_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.fetch.rate_attach_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "fetch.rate_attach_timeout_ms must be greater than 0".into(),
            ));
        }

        // Half-configured credentials are a setup mistake, not a disabled channel
        let token_set = self.telegram.bot_token.as_deref().is_some_and(|s| !s.trim().is_empty());
        let chat_set = self.telegram.chat_id.as_deref().is_some_and(|s| !s.trim().is_empty());
        if token_set != chat_set {
            return Err(ConfigError::Message(
                "telegram.bot_token and telegram.chat_id must be set together".into(),
            ));
        }

        Ok(())
    }
}

/// Load the monitored targets from a JSON config file: a non-empty list of
/// target objects, each with at least a name and a URL.
pub fn load_targets(path: &Path) -> crate::Result<Vec<MonitorTarget>> {
    let raw = std::fs::read_to_string(path)?;
    let targets: Vec<MonitorTarget> = serde_json::from_str(&raw)?;

    if targets.is_empty() {
        return Err(AppError::Validation(
            "config JSON must be a non-empty list".to_string(),
        ));
    }
    for target in &targets {
        validate_target(target)?;
    }
    Ok(targets)
}

pub fn validate_target(target: &MonitorTarget) -> crate::Result<()> {
    if target.name.trim().is_empty() {
        return Err(AppError::Validation("target name must not be empty".to_string()));
    }
    if Url::parse(&target.url).is_err() {
        return Err(AppError::Validation(format!("invalid URL: {}", target.url)));
    }
    if let Some(drop_pct) = target.drop_pct {
        if !drop_pct.is_finite() || drop_pct < 0.0 {
            return Err(AppError::Validation(format!(
                "{}: drop_pct must be a non-negative number",
                target.name
            )));
        }
    }
    Ok(())
}
