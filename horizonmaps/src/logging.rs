//! Tracing subscriber setup.
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! When a log directory is configured, a second layer writes plain-text
//! events to a daily-rolling file through a non-blocking writer.
//!
//! The filter comes from `[logging] level` unless `RUST_LOG` is set.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// Log file name prefix; the appender adds the date.
pub const LOG_FILE_PREFIX: &str = "horizonmaps.log";

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {message}")]
    Filter { directive: String, message: String },

    #[error("Failed to create log directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

/// Keeps the file writer flushing. Hold until exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    file: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether events are also written to a file.
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

/// Pick the filter directive: a non-empty override wins over the configured level.
pub fn filter_directive(level: &str, env_override: Option<String>) -> String {
    env_override
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| level.trim().to_string())
}

/// Build an `EnvFilter` from the configured level and `RUST_LOG`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = filter_directive(level, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::Filter {
        directive,
        message: e.to_string(),
    })
}

fn ensure_directory(path: &Path) -> Result<(), LoggingError> {
    std::fs::create_dir_all(path).map_err(|e| LoggingError::Directory {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Install the global subscriber.
pub fn init_logging(settings: &LoggingSettings) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&settings.level)?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::new(time::format_description::well_known::Rfc3339))
        .with_target(false);

    let (file_layer, file_guard) = match &settings.directory {
        Some(dir) => {
            ensure_directory(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::new(time::format_description::well_known::Rfc3339));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;

    if let Some(dir) = &settings.directory {
        tracing::debug!(directory = %dir.display(), "File logging enabled");
    }

    Ok(LoggingGuard { file: file_guard })
}
