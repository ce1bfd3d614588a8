//! Runtime configuration for board sessions.
//!
//! # Responsibility
//! - Provide defaults for board id, database path and logging.
//! - Apply `KANBAN_*` environment overrides.
//!
//! # Invariants
//! - Blank environment values are ignored, never applied.
//! - `db_path` is always set; `log_dir` is optional and file logging stays
//!   off without it.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DEFAULT_BOARD_ID: &str = "main-board";
pub const DEFAULT_DB_FILE_NAME: &str = "kanban_board.sqlite3";

pub const ENV_BOARD_ID: &str = "KANBAN_BOARD_ID";
pub const ENV_DB_PATH: &str = "KANBAN_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "KANBAN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "KANBAN_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Key of the board document in the store.
    pub board_id: String,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_id: DEFAULT_BOARD_ID.to_string(),
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl BoardConfig {
    /// Defaults overridden by process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(board_id) = non_blank(ENV_BOARD_ID) {
            config.board_id = board_id;
        }
        if let Some(db_path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = non_blank(ENV_LOG_DIR).map(PathBuf::from);
        config
    }
}
