//! # Observability
//!
//! Centralized tracing setup for the docchat workspace.
//!
//! Binaries are **log producers**, not log consumers. They call
//! [`init`] once at startup and use standard `tracing` macros everywhere
//! else; they have no knowledge of where the log lines end up.
//!
//! By default all processes append structured JSONL to a single file,
//! `~/.docchat/logs/docchat.jsonl`, which keeps the terminal free for the
//! TUI and still allows `tail -f ... | jq` while debugging. Passing
//! `also_stderr: true` switches to a compact human-readable stream on
//! stderr instead, which is what the one-shot CLI commands use.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init("cli");
//!     tracing::info!("ready");
//! }
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the process (e.g., "cli", "tui").
    /// Included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by the `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.docchat/logs/docchat.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Emit compact logs to stderr instead of JSONL to the log file.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize the observability layer with default settings.
///
/// This is the zero-config entry point. Binaries call this once at startup.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize the observability layer with custom configuration.
///
/// ```rust,ignore
/// observability::init_with_config(observability::LogConfig {
///     service_name: "cli".into(),
///     default_level: "debug".into(),
///     also_stderr: true,
///     ..Default::default()
/// });
/// ```
pub fn init_with_config(config: LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    if config.also_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
        return;
    }

    let path = config
        .log_path
        .clone()
        .unwrap_or_else(|| default_log_file(&config.service_name));

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .json()
                .init();
        }
        Err(e) => {
            // Log file unavailable (read-only home, missing HOME, ...):
            // keep the process alive and fall back to stderr.
            eprintln!("observability: cannot open {}: {e}", path.display());
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact()
                .init();
        }
    }

    tracing::debug!(service = %config.service_name, "logging initialized");
}

/// Default log file path: `~/.docchat/logs/docchat.jsonl`.
///
/// Falls back to a file in the temp directory when no home directory can
/// be determined.
pub fn default_log_file(service_name: &str) -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".docchat").join("logs").join("docchat.jsonl"),
        None => std::env::temp_dir().join(format!("docchat-{service_name}.jsonl")),
    }
}

/// Re-export tracing macros for convenience.
/// Binaries can use `observability::info!()` or `tracing::info!()`.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export the span macro for structured context.
pub use tracing::span;

/// Re-export Level for advanced filtering.
pub use tracing::Level;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }

    #[test]
    fn test_default_log_file_has_jsonl_extension() {
        let path = default_log_file("cli");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jsonl"));
    }
}
