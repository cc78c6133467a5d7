//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Validate logging configuration (level + absolute directory).
//! - Start the rolling file logger at most once per process.
//! - Route panics through the logger with sanitized payloads.
//!
//! # Invariants
//! - Initialization is idempotent for an identical configuration.
//! - A conflicting re-initialization is rejected, never applied.
//! - Initialization never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "pagegraph";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    config: LogConfig,
    _handle: LoggerHandle,
}

/// Logging setup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    /// Logging is already running with a different configuration.
    Conflict {
        active: LogConfig,
        requested: LogConfig,
    },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "invalid log directory: {message}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already initialized with level `{}` at `{}`; refusing to switch to level `{}` at `{}`",
                active.level,
                active.log_dir.display(),
                requested.level,
                requested.log_dir.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Validated logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    level: &'static str,
    log_dir: PathBuf,
}

impl LogConfig {
    /// Normalizes `level` (case-insensitive, `warning` accepted) and checks
    /// that `log_dir` is a non-empty absolute path.
    pub fn new(level: &str, log_dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        Ok(Self {
            level: normalize_level(level)?,
            log_dir: normalize_log_dir(log_dir.as_ref())?,
        })
    }

    /// Uses [`default_log_level`] for the current build mode.
    pub fn with_default_level(log_dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        Self::new(default_log_level(), log_dir)
    }

    pub fn level(&self) -> &'static str {
        self.level
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Starts file logging for the process.
///
/// # Errors
/// - `LoggingError::Conflict` when already running with another config.
/// - `LoggingError::InvalidDirectory` when the directory cannot be created.
/// - `LoggingError::Backend` when the logger backend fails to start.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(config))?;
    if &active.config != config {
        return Err(LoggingError::Conflict {
            active: active.config.clone(),
            requested: config.clone(),
        });
    }
    Ok(())
}

/// Returns the active configuration, or `None` before initialization.
pub fn logging_status() -> Option<LogConfig> {
    ACTIVE_LOGGER.get().map(|active| active.config.clone())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(config: &LogConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|err| {
        LoggingError::InvalidDirectory(format!(
            "failed to create `{}`: {err}",
            config.log_dir.display()
        ))
    })?;

    let handle = Logger::try_with_str(config.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook_once();

    info!(
        "event=core_init module=logging status=ok level={} version={} platform={}",
        config.level,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        config: config.clone(),
        _handle: handle,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    if log_dir.as_os_str().is_empty() {
        return Err(LoggingError::InvalidDirectory(
            "log_dir cannot be empty".to_string(),
        ));
    }
    if !log_dir.is_absolute() {
        return Err(LoggingError::InvalidDirectory(format!(
            "log_dir must be an absolute path, got `{}`",
            log_dir.display()
        )));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location,
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, sanitize_message, LogConfig, LoggingError};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Outlives the test: the logger keeps its files open for the process.
    fn unique_temp_dir(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pagegraph-logging-{suffix}-{}-{nanos}",
            std::process::id()
        ))
    }

    #[test]
    fn config_normalizes_level() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig::new(" WARNING ", dir.path()).unwrap();
        assert_eq!(config.level(), "warn");
    }

    #[test]
    fn config_rejects_relative_dir_and_unknown_level() {
        let err = LogConfig::new("info", "logs/dev").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidDirectory(_)));

        let dir = tempfile::tempdir().unwrap();
        let err = LogConfig::new("loud", dir.path()).unwrap_err();
        assert_eq!(err, LoggingError::UnsupportedLevel("loud".to_string()));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let dir = unique_temp_dir("idempotent");
        let other_dir = unique_temp_dir("different");
        let config = LogConfig::new("info", &dir).unwrap();

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let louder = LogConfig::new("debug", &dir).unwrap();
        let err = init_logging(&louder).unwrap_err();
        assert!(err.to_string().contains("refusing to switch"));

        let moved = LogConfig::new("info", &other_dir).unwrap();
        assert!(matches!(
            init_logging(&moved),
            Err(LoggingError::Conflict { .. })
        ));

        assert_eq!(logging_status(), Some(config));
    }
}
