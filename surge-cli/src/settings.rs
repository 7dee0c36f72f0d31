//! Layered attack settings: flags over `SURGE_*` environment variables over
//! the JSON config file over built-in defaults

use crate::Args;
use anyhow::{Context, Result};
use attack_engine::AttackSettings;
use std::path::Path;
use std::str::FromStr;

pub const ENV_ROUNDS: &str = "SURGE_ROUNDS";
pub const ENV_TIMEOUT_MS: &str = "SURGE_TIMEOUT_MS";
pub const ENV_STATS_SECS: &str = "SURGE_STATS_SECS";
pub const ENV_PACE_MS: &str = "SURGE_PACE_MS";
pub const ENV_MAX_IN_FLIGHT: &str = "SURGE_MAX_IN_FLIGHT";

/// Resolve settings from the process environment
pub fn load_settings(args: &Args) -> Result<AttackSettings> {
    load_settings_with(args, |key| std::env::var(key).ok())
}

/// Resolve settings with an explicit environment lookup
pub fn load_settings_with<F>(args: &Args, env: F) -> Result<AttackSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match &args.config {
        Some(path) => read_config_file(path)?,
        None => AttackSettings::default(),
    };

    if let Some(rounds) = env_value(&env, ENV_ROUNDS)? {
        settings.rounds = rounds;
    }
    if let Some(timeout) = env_value(&env, ENV_TIMEOUT_MS)? {
        settings.timeout_ms = timeout;
    }
    if let Some(stats) = env_value(&env, ENV_STATS_SECS)? {
        settings.stats_secs = stats;
    }
    if let Some(pace) = env_value(&env, ENV_PACE_MS)? {
        settings.pace_ms = pace;
    }
    if let Some(cap) = env_value(&env, ENV_MAX_IN_FLIGHT)? {
        settings.max_in_flight = Some(cap);
    }

    if let Some(rounds) = args.rounds {
        settings.rounds = rounds;
    }
    if let Some(timeout) = args.timeout {
        settings.timeout_ms = timeout;
    }
    if let Some(stats) = args.stats {
        settings.stats_secs = stats;
    }
    if let Some(pace) = args.pace {
        settings.pace_ms = pace;
    }
    if args.max_in_flight.is_some() {
        settings.max_in_flight = args.max_in_flight;
    }

    Ok(settings)
}

fn read_config_file(path: &Path) -> Result<AttackSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Blank values are treated as unset
fn env_value<T, F>(env: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value {:?} for {}", raw, key)),
        _ => Ok(None),
    }
}
