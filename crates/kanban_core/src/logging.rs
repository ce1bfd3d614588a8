//! File logging for the board core.
//!
//! # Responsibility
//! - Start one rolling `flexi_logger` file sink per process.
//! - Keep task text out of log files: board events carry ids and counts only,
//!   and panic payloads are redacted before they are written.
//!
//! # Invariants
//! - Starting twice with the same settings is a no-op; different settings
//!   are rejected with [`LoggingError::AlreadyActive`].
//! - Nothing in this module panics.

use crate::config::BoardConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "kanban";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_SUMMARY_CHARS: usize = 160;
const REDACTED_TEXT: &str = "\"<text>\"";

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    EmptyLogDir,
    RelativeLogDir(PathBuf),
    NonUtf8LogDir(PathBuf),
    CreateLogDir { dir: PathBuf, source: std::io::Error },
    Backend(String),
    /// A logger with different settings is already running.
    AlreadyActive { active: LogSettings },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyLogDir => write!(f, "log_dir cannot be empty"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
            Self::NonUtf8LogDir(dir) => {
                write!(f, "log_dir `{}` is not valid UTF-8", dir.display())
            }
            Self::CreateLogDir { dir, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::AlreadyActive { active } => write!(
                f,
                "logging already active with level `{}` at `{}`",
                active.level,
                active.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateLogDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Validated level and directory for the file sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: &'static str,
    pub dir: PathBuf,
}

impl LogSettings {
    pub fn new(level: &str, log_dir: &str) -> Result<Self, LoggingError> {
        let level = normalize_level(level)?;
        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err(LoggingError::EmptyLogDir);
        }
        let dir = PathBuf::from(trimmed);
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeLogDir(dir));
        }
        Ok(Self { level, dir })
    }

    /// `None` when the config leaves file logging off.
    pub fn from_config(config: &BoardConfig) -> Result<Option<Self>, LoggingError> {
        let Some(dir) = config.log_dir.as_deref() else {
            return Ok(None);
        };
        let dir = dir
            .to_str()
            .ok_or_else(|| LoggingError::NonUtf8LogDir(dir.to_path_buf()))?;
        Self::new(&config.log_level, dir).map(Some)
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts file logging with `level` under `log_dir`.
///
/// # Errors
/// Rejects unknown levels, empty or relative directories, and settings that
/// differ from an already running logger.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    start(LogSettings::new(level, log_dir)?)
}

/// Starts file logging when `config.log_dir` is set.
///
/// Returns whether a logger is running afterwards.
pub fn init_logging_from_config(config: &BoardConfig) -> Result<bool, LoggingError> {
    match LogSettings::from_config(config)? {
        Some(settings) => start(settings).map(|()| true),
        None => Ok(false),
    }
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(settings: LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE_LOGGER.get_or_try_init(|| open_file_sink(settings.clone()))?;
    if active.settings != settings {
        return Err(LoggingError::AlreadyActive {
            active: active.settings.clone(),
        });
    }
    Ok(())
}

fn open_file_sink(settings: LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::CreateLogDir {
        dir: settings.dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
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
        "event=app_start module=core status=ok platform={} version={} level={} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        settings.level,
        settings.dir.display()
    );

    Ok(ActiveLogger {
        settings,
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
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            redact_task_text(&payload)
        );
        previous_hook(panic_info);
    }));
}

/// First line of `message` with quoted segments masked and length capped.
///
/// Board and task `Debug` output quotes every string field, so masking quoted
/// segments removes task content and descriptions.
fn redact_task_text(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default();
    let mut redacted = String::with_capacity(first_line.len());
    let mut in_quote = false;
    let mut escaped = false;
    for ch in first_line.chars() {
        if in_quote {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
        } else if ch == '"' {
            in_quote = true;
            redacted.push_str(REDACTED_TEXT);
        } else {
            redacted.push(ch);
        }
    }

    if redacted.chars().count() > MAX_PANIC_SUMMARY_CHARS {
        redacted = redacted.chars().take(MAX_PANIC_SUMMARY_CHARS).collect();
        redacted.push_str("...");
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::{init_logging, init_logging_from_config, redact_task_text, LogSettings, LoggingError};
    use crate::config::BoardConfig;
    use std::path::PathBuf;

    #[test]
    fn settings_normalize_level_and_trim_dir() {
        let settings = LogSettings::new(" WARNING ", " /var/log/kanban ").unwrap();
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.dir, PathBuf::from("/var/log/kanban"));
    }

    #[test]
    fn settings_reject_bad_input() {
        assert!(matches!(
            LogSettings::new("verbose", "/tmp"),
            Err(LoggingError::UnsupportedLevel(_))
        ));
        assert!(matches!(
            LogSettings::new("info", "  "),
            Err(LoggingError::EmptyLogDir)
        ));
        assert!(matches!(
            LogSettings::new("info", "logs/dev"),
            Err(LoggingError::RelativeLogDir(_))
        ));
    }

    #[test]
    fn config_without_log_dir_skips_init() {
        let config = BoardConfig {
            log_dir: None,
            ..BoardConfig::default()
        };
        assert!(matches!(init_logging_from_config(&config), Ok(false)));
    }

    #[test]
    fn redaction_masks_task_text_and_keeps_structure() {
        let message = "invalid board: Task { id: TaskId(\"t1\"), content: \"call \\\"Bob\\\"\" }\nsecond line";
        assert_eq!(
            redact_task_text(message),
            "invalid board: Task { id: TaskId(\"<text>\"), content: \"<text>\" }"
        );
    }

    #[test]
    fn redaction_caps_long_messages() {
        let redacted = redact_task_text(&"x".repeat(500));
        assert!(redacted.ends_with("..."));
        assert_eq!(redacted.chars().count(), 163);
    }

    #[test]
    fn second_start_must_match_running_settings() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().to_str().unwrap().to_string();
        let other = dir.path().join("other");

        init_logging("info", &log_dir).unwrap();
        init_logging("info", &log_dir).unwrap();

        let conflict = init_logging("debug", &log_dir).unwrap_err();
        assert!(matches!(conflict, LoggingError::AlreadyActive { .. }));
        let conflict = init_logging("info", other.to_str().unwrap()).unwrap_err();
        let LoggingError::AlreadyActive { active } = conflict else {
            panic!("expected conflict, got {conflict}");
        };
        assert_eq!(active.dir, dir.path());
    }
}
