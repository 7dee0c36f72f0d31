//! Surge command line front end
//!
//! Loads targets and layered settings, then runs the attack engine until
//! the caller's cancellation token fires, rendering snapshots either on a
//! live spinner or as plain text.

use anyhow::{Context, Result};
use attack_engine::{
    AttackConfig, AttackEngine, AttackError, AttackSummary, PlainSink, TerminalSink,
};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

pub mod logging;
pub mod settings;
pub mod targets;


pub use logging::{init_logging, LoggingConfig};
pub use settings::{load_settings, load_settings_with};
pub use targets::{load_targets, parse_targets};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "surge", author, version, about, long_about = None)]
pub struct Args {
    /// File with one target URL per line
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Rounds per target in every wave
    #[arg(short = 'r', long)]
    pub rounds: Option<u32>,

    /// Single request timeout in milliseconds (must be below the pace)
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Stats window length in seconds
    #[arg(short = 's', long)]
    pub stats: Option<u64>,

    /// Time between waves in milliseconds
    #[arg(short = 'p', long)]
    pub pace: Option<u64>,

    /// Cap on concurrently running requests (unbounded when unset)
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// JSON file with attack settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print every window as plain text instead of the live spinner
    #[arg(long)]
    pub plain: bool,

    /// Also write logs to this file, rotated daily
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = logging::DEFAULT_LEVEL)]
    pub log_level: String,
}

/// Validate everything up front and build a ready-to-run engine
pub fn prepare_engine(args: &Args) -> Result<AttackEngine> {
    let settings = load_settings(args)?;
    let config = AttackConfig::from_settings(&settings).context("invalid attack settings")?;
    let targets = load_targets(&args.file)?;

    tracing::info!(
        targets = targets.len(),
        rounds = settings.rounds,
        timeout_ms = settings.timeout_ms,
        stats_secs = settings.stats_secs,
        pace_ms = settings.pace_ms,
        "Loaded attack settings"
    );

    AttackEngine::with_reqwest(targets, config).context("failed to set up HTTP client")
}

/// Run an attack until `cancel` fires
pub async fn run_attack(args: Args, cancel: CancellationToken) -> Result<AttackSummary> {
    let engine = prepare_engine(&args)?;
    tracing::info!(run_id = %engine.run_id(), "Starting surge");

    let summary = if args.plain {
        engine.run(PlainSink::stdout(), cancel).await?
    } else {
        engine.run(TerminalSink::new(), cancel).await?
    };
    Ok(summary)
}

/// Remediation advice for an engine error anywhere in the context chain
pub fn remediation_hint(err: &anyhow::Error) -> Option<String> {
    err.downcast_ref::<AttackError>().map(AttackError::remediation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_rejected_settings_carry_a_hint() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "http://a.test").unwrap();
        let args = Args {
            file: file.path().to_path_buf(),
            timeout: Some(3000),
            pace: Some(1000),
            ..Default::default()
        };

        let err = prepare_engine(&args).err().unwrap();
        let hint = remediation_hint(&err).unwrap();
        assert!(hint.contains("--timeout"));
    }

    #[test]
    fn test_io_errors_have_no_hint() {
        let args = Args {
            file: "/definitely/not/here.txt".into(),
            ..Default::default()
        };
        let err = prepare_engine(&args).err().unwrap();
        assert_eq!(remediation_hint(&err), None);
    }
}
