use crate::error::SearchError;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Log file name inside `LOG_DIR`
pub const LOG_FILE_NAME: &str = "expertsearch.log";

/// Server logging: console plus an append-only file in `log_dir`
///
/// `log_level` is a plain level or a full filter directive; `RUST_LOG`
/// overrides both.
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<(), SearchError> {
    // Create log directory
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).map_err(|e| {
            SearchError::config(format!(
                "Failed to create log directory {}: {}",
                log_dir.display(),
                e
            ))
        })?;
    }

    let log_file_path = log_dir.join(LOG_FILE_NAME);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| {
            SearchError::config(format!(
                "Failed to open log file {}: {}",
                log_file_path.display(),
                e
            ))
        })?;

    // RUST_LOG env var takes precedence
    let env_filter = default_filter(log_level);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());

    let file_layer = fmt::layer()
        .with_writer(log_file)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SearchError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!("Logging initialized: level={}, log_file={}", log_level, log_file_path.display());

    Ok(())
}

/// Simple logging setup (console only)
///
/// Used by the one-shot CLI commands, which write results to stdout, so
/// log lines go to stderr.
pub fn setup_console_logging(log_level: &str) -> Result<(), SearchError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_env_filter(default_filter(log_level))
        .try_init()
        .map_err(|e| SearchError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!("Console logging initialized: level={}", log_level);

    Ok(())
}

fn default_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)))
}

/// Turn a `LOG_LEVEL` value into an `EnvFilter` directive
///
/// Plain level names are normalised (`WARNING` becomes `warn`); per-crate
/// directives such as `expertsearch_vector=debug,info` pass through.
/// Anything unrecognised falls back to `info`.
pub fn filter_directive(log_level: &str) -> String {
    if let Some(level) = parse_log_level(log_level) {
        return level.to_string().to_lowercase();
    }

    let directive = log_level.trim();
    if directive.contains('=') && EnvFilter::try_new(directive).is_ok() {
        return directive.to_string();
    }

    eprintln!("Invalid log level '{}', defaulting to info", log_level);
    "info".to_string()
}

/// Parse a plain level name
pub fn parse_log_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}
