//! Surge binary entry point

use clap::Parser;
use surge_cli::{init_logging, remediation_hint, run_attack, Args, LoggingConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Held until exit so buffered file logs are flushed
    let _guard = init_logging(&LoggingConfig::new(&args.log_level, args.log_file.clone()))?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received, stopping attack...");
                signal_cancel.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    match run_attack(args, cancel).await {
        Ok(summary) => {
            tracing::info!(
                run_id = %summary.run_id,
                waves = summary.waves,
                windows = summary.windows,
                "Attack stopped"
            );
            Ok(())
        }
        // Returning the error prints it once; only the hint is added here
        Err(e) => {
            if let Some(hint) = remediation_hint(&e) {
                eprintln!("{}", hint);
            }
            Err(e)
        }
    }
}
