use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the live table on stdout readable
pub const DEFAULT_LEVEL: &str = "warn";

/// Logging configuration for the command line tool
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`
    pub level: String,

    /// Whether to enable colored output on stderr
    pub enable_colors: bool,

    /// Log file path (optional, if None logs only go to stderr)
    pub log_file: Option<PathBuf>,

    /// Module-specific log levels
    pub module_levels: Vec<(String, String)>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            enable_colors: true,
            log_file: None,
            module_levels: vec![
                ("hyper".to_string(), "warn".to_string()),
                ("reqwest".to_string(), "warn".to_string()),
            ],
        }
    }
}

impl LoggingConfig {
    pub fn new(level: &str, log_file: Option<PathBuf>) -> Self {
        Self {
            level: level.to_string(),
            log_file,
            ..Default::default()
        }
    }

    fn filter(&self) -> Result<EnvFilter> {
        if !levels::is_valid_level(&self.level) {
            return Err(anyhow!(
                "invalid log level '{}', expected one of {}",
                self.level,
                levels::valid_levels().join(", ")
            ));
        }

        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        let mut filter = EnvFilter::new(&self.level);
        for (module, level) in &self.module_levels {
            let directive = format!("{}={}", module, level);
            filter = filter.add_directive(
                directive
                    .parse()
                    .with_context(|| format!("invalid log directive {}", directive))?,
            );
        }
        Ok(filter)
    }
}

/// Initialize logging to stderr and, when configured, a daily rolling file.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the program.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = config.filter()?;

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_ansi(config.enable_colors)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let appender = create_file_appender(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Try to initialize logging, ignore if already initialized
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    match result {
        Ok(_) => tracing::debug!("Logging initialized with level: {}", config.level),
        Err(_) => tracing::debug!("Logging already initialized, skipping"),
    }

    Ok(guard)
}

/// Create a daily rolling file appender next to `log_file`
fn create_file_appender(log_file: &Path) -> Result<tracing_appender::rolling::RollingFileAppender> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    let directory = match log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let filename = log_file
        .file_name()
        .ok_or_else(|| anyhow!("invalid log file name {}", log_file.display()))?;

    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;

    Ok(RollingFileAppender::new(Rotation::DAILY, directory, filename))
}

/// Log level utilities
pub mod levels {
    /// Check if a log level string is valid
    pub fn is_valid_level(level: &str) -> bool {
        matches!(
            level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        )
    }

    /// Get all valid log levels
    pub fn valid_levels() -> Vec<&'static str> {
        vec!["trace", "debug", "info", "warn", "error", "off"]
    }
}
