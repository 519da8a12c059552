//! File logging for agent runs.
//!
//! Events go to a daily-rolling file under the XDG data directory so that
//! stdout stays reserved for the agent's answer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Application name used for the log directory and file name.
const APP_NAME: &str = "sandbox-agent";

/// Configuration for file logging.
///
/// By default logs go to `~/.local/share/sandbox-agent/logs/sandbox-agent.log.<date>`.
///
/// # Example
///
/// ```rust
/// use sandbox_agent::logging::{LogLevel, LoggingConfig};
///
/// let config = LoggingConfig::new()
///     .with_log_dir("/tmp/agent-logs")
///     .with_level(LogLevel::Debug);
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether file logging is enabled.
    pub enabled: bool,
    /// Log files are named `{file_name}.log` with daily rotation.
    pub file_name: String,
    /// Custom log directory. If None, uses the XDG data dir.
    pub log_dir: Option<PathBuf>,
    /// Log level filter.
    pub level: LogLevel,
}

impl LoggingConfig {
    /// Creates a new LoggingConfig with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a disabled logging configuration.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Sets a custom log directory.
    #[must_use]
    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(path.into());
        self
    }

    /// Sets the log level filter.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_name: APP_NAME.to_string(),
            log_dir: None,
            level: LogLevel::default(),
        }
    }
}

/// Log level filter for file logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Resolution and dispatch details.
    Debug,
    /// Loop transitions.
    #[default]
    Info,
    /// Containment rejections and timeouts.
    Warn,
    /// Least verbose.
    Error,
}

impl LogLevel {
    /// Converts to tracing_subscriber LevelFilter.
    #[must_use]
    pub fn to_filter(self) -> tracing_subscriber::filter::LevelFilter {
        match self {
            Self::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            Self::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            Self::Info => tracing_subscriber::filter::LevelFilter::INFO,
            Self::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            Self::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

/// Guard that must be held to keep file logging active.
///
/// When dropped, flushes pending logs.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingGuard").finish_non_exhaustive()
    }
}

/// Why file logging could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingError {
    /// What went wrong
    pub kind: LoggingErrorKind,
}

/// Logging setup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingErrorKind {
    /// No `log_dir` was configured and the platform has no data directory
    NoLogDir,
    /// The log directory could not be created
    CreateDir {
        /// Directory that was attempted
        path: PathBuf,
        /// Underlying I/O message
        reason: String,
    },
    /// Another global subscriber is already installed
    AlreadyInstalled {
        /// Message from tracing-subscriber
        reason: String,
    },
}

impl LoggingError {
    /// Wraps a kind.
    #[must_use]
    pub fn new(kind: LoggingErrorKind) -> Self {
        Self { kind }
    }

    /// No usable log directory.
    #[must_use]
    pub fn no_log_dir() -> Self {
        Self::new(LoggingErrorKind::NoLogDir)
    }

    /// Directory creation failed.
    #[must_use]
    pub fn create_dir(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::CreateDir {
            path,
            reason: reason.into(),
        })
    }

    /// A subscriber was already set.
    #[must_use]
    pub fn already_installed(reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::AlreadyInstalled {
            reason: reason.into(),
        })
    }
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LoggingErrorKind::NoLogDir => write!(
                f,
                "no data directory for log files; set [logging] log_dir in the config"
            ),
            LoggingErrorKind::CreateDir { path, reason } => write!(
                f,
                "cannot create log directory '{}': {}",
                path.display(),
                reason
            ),
            LoggingErrorKind::AlreadyInstalled { reason } => {
                write!(f, "a tracing subscriber is already installed: {}", reason)
            }
        }
    }
}

impl std::error::Error for LoggingError {}

/// Returns the directory log files are written to.
///
/// # Errors
///
/// Returns [`LoggingErrorKind::NoLogDir`] when no custom directory is set
/// and the platform data directory is unknown.
pub fn log_dir(config: &LoggingConfig) -> Result<PathBuf, LoggingError> {
    if let Some(ref custom_dir) = config.log_dir {
        return Ok(custom_dir.clone());
    }

    dirs::data_local_dir()
        .map(|dir| dir.join(APP_NAME).join("logs"))
        .ok_or_else(LoggingError::no_log_dir)
}

/// Installs the global file subscriber.
///
/// `RUST_LOG` directives, when set, refine `config.level`. Returns
/// `Ok(None)` when logging is disabled. The returned guard must be held for
/// as long as events should be flushed to disk.
///
/// # Errors
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init_file_logging(config: &LoggingConfig) -> Result<Option<LoggingGuard>, LoggingError> {
    if !config.enabled {
        return Ok(None);
    }

    let dir = log_dir(config)?;
    std::fs::create_dir_all(&dir)
        .map_err(|e| LoggingError::create_dir(dir.clone(), e.to_string()))?;

    let file_appender = tracing_appender::rolling::daily(&dir, format!("{}.log", config.file_name));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(config.level.to_filter().into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|e| LoggingError::already_installed(e.to_string()))?;

    Ok(Some(LoggingGuard { _guard: guard }))
}
