//! Logging Module
//!
//! tracing-based logging with two sinks:
//! - a plain-text log file with a fixed name (no rotation)
//! - a colored live stream on stderr
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! let _guard = init_logging("png2webp", LogConfig::default()).expect("Failed to initialize logging");
//! info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default log file name, written into `LogConfig::log_dir`.
pub const DEFAULT_LOG_FILE: &str = "png2webp_conversion.log";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory holding the log file (defaults to the working directory).
    pub log_dir: PathBuf,
    /// Log file name inside `log_dir`.
    pub file_name: String,
    /// Level used when `RUST_LOG` is not set.
    pub level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            file_name: DEFAULT_LOG_FILE.to_string(),
            level: Level::INFO,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Full path of the log file this config writes to.
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }
}

/// Initialize the global subscriber.
///
/// Must be called once, before the first event is emitted. The returned guard
/// flushes the file writer on drop, so keep it alive until the process exits.
///
/// `program_name` scopes the default filter to the program's own targets plus
/// `shared_utils`; `RUST_LOG` replaces the filter entirely.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let file_appender = tracing_appender::rolling::never(&config.log_dir, &config.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(default_directive(program_name, config.level))
    });

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    tracing::debug!(
        program = program_name,
        log_file = ?config.log_path(),
        level = ?config.level,
        "Logging system initialized"
    );

    Ok(guard)
}

fn default_directive(program_name: &str, level: Level) -> String {
    // crate targets use underscores even when the binary name has dashes
    let target = program_name.replace('-', "_");
    format!("{}={},shared_utils={}", target, level, level)
}
