//! Core domain logic for the Kanban board.
//! This crate is the single source of truth for board invariants.

pub mod config;
pub mod db;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use config::BoardConfig;
pub use interaction::drag_drop::{DragDropCoordinator, DragSource};
pub use interaction::form::{DraftSlot, FormController};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, LogSettings, LoggingError,
};
pub use model::board::{Board, BoardValidationError, RepairReport};
pub use model::column::{Column, ColumnId, DEFAULT_COLUMNS};
pub use model::document::{decode_board, encode_board, DecodedBoard, DocumentError};
pub use model::task::{Priority, Task, TaskId, TaskValidationError};
pub use reconcile::action::{BoardAction, NewTask, NoopReason, TaskPatch};
pub use reconcile::reducer::{reduce, Reduction};
pub use repo::board_store::{BoardDocumentStore, RepoError, RepoResult, SqliteBoardStore};
pub use repo::memory_store::MemoryBoardStore;
pub use service::board_session::{
    ActionOutcome, BoardSession, LoadOutcome, LoadState, SyncState,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
