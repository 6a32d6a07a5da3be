//! Logging bootstrap for provider processes
//!
//! The host captures the provider's stderr, so all output goes there. The
//! level is taken from `TF_LOG_PROVIDER`, then `TF_LOG`, then defaults to
//! `INFO`. Installing the subscriber is idempotent.

use crate::error::{Result, TfplugError};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log level for the provider process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Resolve the level from the host's environment variables
    pub fn from_env() -> Self {
        ["TF_LOG_PROVIDER", "TF_LOG"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find_map(|value| value.parse().ok())
            .unwrap_or(LogLevel::Info)
    }
}

impl FromStr for LogLevel {
    type Err = TfplugError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(TfplugError::LoggingError(format!(
                "unknown log level '{}'",
                other
            ))),
        }
    }
}

/// Install a stderr subscriber at the given level.
/// Returns false when a global subscriber was already set.
pub fn init(level: LogLevel) -> bool {
    let filter = EnvFilter::try_new(level.as_str()).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

/// Install a stderr subscriber using the host's log environment variables
pub fn init_from_env() -> bool {
    init(LogLevel::from_env())
}
