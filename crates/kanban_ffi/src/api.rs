//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board UI events (drag, drop, form input, clicks) to Dart via FRB.
//! - Hold the single process-wide board session behind a mutex.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutating call returns an envelope; store failures never surface as
//!   errors, only as `sync_pending` in the snapshot.

use kanban_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ActionOutcome, BoardConfig, BoardSession, ColumnId, LoadOutcome, Priority, SqliteBoardStore,
    SyncState, TaskId,
};
use log::error;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static BOARD_CONFIG: OnceLock<BoardConfig> = OnceLock::new();
static SESSION: Mutex<Option<BoardSession<SqliteBoardStore>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One task card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: String,
    pub content: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    /// `low|medium|high`.
    pub priority: String,
}

/// One column with its cards in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub id: String,
    pub title: String,
    pub tasks: Vec<TaskView>,
}

/// Everything the board screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// `true` until the first load finishes; the UI shows a spinner.
    pub loading: bool,
    /// Last change has not reached the store yet.
    pub sync_pending: bool,
    pub columns: Vec<ColumnView>,
    pub adding_to_column: Option<String>,
    pub add_draft: Option<String>,
    pub editing_task_id: Option<String>,
    pub edit_draft: Option<String>,
}

/// Envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    /// Call reached an open session.
    pub ok: bool,
    /// Board changed.
    pub changed: bool,
    pub task_id: Option<String>,
    pub message: String,
}

impl BoardActionResponse {
    fn from_outcome(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Applied { task_id, persisted } => Self {
                ok: true,
                changed: true,
                task_id: Some(task_id.to_string()),
                message: if persisted {
                    "Saved.".to_string()
                } else {
                    "Changed locally; not saved yet.".to_string()
                },
            },
            ActionOutcome::Ignored(reason) => Self {
                ok: true,
                changed: false,
                task_id: None,
                message: reason.to_string(),
            },
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed: false,
            task_id: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Opens the board store and loads the board document.
///
/// # FFI contract
/// - Replaces any session opened earlier in this process.
/// - Store read failures still open a usable session (`sync_pending=true`).
#[flutter_rust_bridge::frb(sync)]
pub fn board_open() -> BoardActionResponse {
    let config = resolve_config();
    let store = match SqliteBoardStore::open(&config.db_path) {
        Ok(store) => store,
        Err(err) => {
            error!(
                "event=board_open module=ffi status=error error_code=store_open_failed error={}",
                err
            );
            return BoardActionResponse::failure(format!("board_open failed: {err}"));
        }
    };

    let mut session = BoardSession::new(store, config.board_id.clone());
    let outcome = session.load();
    *lock_session() = Some(session);

    let message = match outcome {
        LoadOutcome::Loaded => "Board loaded.",
        LoadOutcome::Seeded => "New board created.",
        LoadOutcome::Repaired(_) => "Board repaired and loaded.",
        LoadOutcome::Unavailable => "Board store unavailable; changes are kept locally until the board is read again.",
    };
    BoardActionResponse::unchanged(message)
}

/// Current board snapshot plus open-form state.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardView {
    let guard = lock_session();
    let Some(session) = guard.as_ref() else {
        return BoardView {
            loading: true,
            sync_pending: false,
            columns: Vec::new(),
            adding_to_column: None,
            add_draft: None,
            editing_task_id: None,
            edit_draft: None,
        };
    };

    let board = session.board();
    let columns = board
        .ordered_columns()
        .into_iter()
        .map(|column| ColumnView {
            id: column.id.to_string(),
            title: column.title.clone(),
            tasks: board
                .tasks_in(&column.id)
                .into_iter()
                .map(|task| TaskView {
                    id: task.id.to_string(),
                    content: task.content.clone(),
                    description: task.description.clone(),
                    due_date: task.due_date.clone(),
                    priority: task.priority.as_str().to_string(),
                })
                .collect(),
        })
        .collect();

    let forms = session.forms();
    BoardView {
        loading: session.is_loading(),
        sync_pending: session.sync_state() != SyncState::Synced,
        columns,
        adding_to_column: forms.add_slot().target().map(ToString::to_string),
        add_draft: forms.add_slot().draft().map(str::to_string),
        editing_task_id: forms.edit_slot().target().map(ToString::to_string),
        edit_draft: forms.edit_slot().draft().map(str::to_string),
    }
}

/// `dragstart` on a task card.
#[flutter_rust_bridge::frb(sync)]
pub fn task_drag_start(task_id: String, column_id: String) -> BoardActionResponse {
    with_session(|session| {
        session.begin_drag(TaskId::new(task_id.trim()), ColumnId::new(column_id.trim()));
        BoardActionResponse::unchanged("Drag started.")
    })
}

/// `dragover` on a column; `true` means the UI should accept the drop.
#[flutter_rust_bridge::frb(sync)]
pub fn column_drag_over(column_id: String) -> bool {
    lock_session()
        .as_ref()
        .is_some_and(|session| session.drag_over(&ColumnId::new(column_id.trim())))
}

/// `drop` on a column.
#[flutter_rust_bridge::frb(sync)]
pub fn column_drop(column_id: String) -> BoardActionResponse {
    with_session(|session| {
        BoardActionResponse::from_outcome(session.drop_on(&ColumnId::new(column_id.trim())))
    })
}

/// `dragend` without a drop.
#[flutter_rust_bridge::frb(sync)]
pub fn task_drag_cancel() -> BoardActionResponse {
    with_session(|session| {
        session.cancel_drag();
        BoardActionResponse::unchanged("Drag cancelled.")
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn add_task_open(column_id: String) -> BoardActionResponse {
    with_session(|session| {
        if session.open_add_form(ColumnId::new(column_id.trim())) {
            BoardActionResponse::unchanged("Add form opened.")
        } else {
            BoardActionResponse::unchanged(format!("column {column_id} does not exist"))
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn add_task_input(text: String) -> BoardActionResponse {
    with_session(|session| draft_response(session.update_add_draft(text)))
}

#[flutter_rust_bridge::frb(sync)]
pub fn add_task_submit() -> BoardActionResponse {
    with_session(|session| BoardActionResponse::from_outcome(session.submit_add_form()))
}

#[flutter_rust_bridge::frb(sync)]
pub fn add_task_cancel() -> BoardActionResponse {
    with_session(|session| {
        session.cancel_add_form();
        BoardActionResponse::unchanged("Add form closed.")
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn edit_task_open(task_id: String) -> BoardActionResponse {
    with_session(|session| {
        if session.open_edit_form(&TaskId::new(task_id.trim())) {
            BoardActionResponse::unchanged("Edit form opened.")
        } else {
            BoardActionResponse::unchanged(format!("task {task_id} is not on the board"))
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn edit_task_input(text: String) -> BoardActionResponse {
    with_session(|session| draft_response(session.update_edit_draft(text)))
}

#[flutter_rust_bridge::frb(sync)]
pub fn edit_task_submit() -> BoardActionResponse {
    with_session(|session| BoardActionResponse::from_outcome(session.submit_edit_form()))
}

#[flutter_rust_bridge::frb(sync)]
pub fn edit_task_cancel() -> BoardActionResponse {
    with_session(|session| {
        session.cancel_edit_form();
        BoardActionResponse::unchanged("Edit form closed.")
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> BoardActionResponse {
    with_session(|session| {
        BoardActionResponse::from_outcome(session.delete_task(TaskId::new(task_id.trim())))
    })
}

/// Priority selector change; `priority` is `low|medium|high`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_set_priority(task_id: String, priority: String) -> BoardActionResponse {
    let Some(priority) = Priority::parse(&priority) else {
        return BoardActionResponse::failure(format!(
            "unsupported priority `{priority}`; expected low|medium|high"
        ));
    };
    with_session(|session| {
        BoardActionResponse::from_outcome(
            session.change_priority(TaskId::new(task_id.trim()), priority),
        )
    })
}

/// Re-sends the board after a failed save.
#[flutter_rust_bridge::frb(sync)]
pub fn board_flush() -> BoardActionResponse {
    with_session(|session| {
        if session.flush() {
            BoardActionResponse::unchanged("Board saved.")
        } else {
            BoardActionResponse::unchanged("Board store still unavailable.")
        }
    })
}

fn draft_response(updated: bool) -> BoardActionResponse {
    if updated {
        BoardActionResponse::unchanged("Draft updated.")
    } else {
        BoardActionResponse::unchanged("no form is open")
    }
}

fn resolve_config() -> BoardConfig {
    BOARD_CONFIG.get_or_init(BoardConfig::from_env).clone()
}

fn lock_session() -> MutexGuard<'static, Option<BoardSession<SqliteBoardStore>>> {
    // A panic mid-call leaves the session in a consistent snapshot state.
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_session(
    f: impl FnOnce(&mut BoardSession<SqliteBoardStore>) -> BoardActionResponse,
) -> BoardActionResponse {
    let mut guard = lock_session();
    match guard.as_mut() {
        Some(session) => f(session),
        None => BoardActionResponse::failure("board is not open; call board_open first"),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        add_task_input, add_task_open, add_task_submit, board_open, board_snapshot,
        column_drag_over, column_drop, core_version, edit_task_input, edit_task_open,
        edit_task_submit, init_logging, ping, task_delete, task_drag_start, task_set_priority,
    };
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Tests share the process-wide session.
    static SERIAL: Mutex<()> = Mutex::new(());

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn add_drag_drop_and_delete_through_ffi() {
        let _serial = SERIAL.lock().unwrap_or_else(|err| err.into_inner());
        assert!(board_open().ok);

        let content = unique_token("ffi-task");
        assert!(add_task_open("todo".to_string()).ok);
        add_task_input(content.clone());
        let added = add_task_submit();
        assert!(added.changed, "{}", added.message);
        let task_id = added.task_id.expect("add should return task_id");

        assert!(task_drag_start(task_id.clone(), "todo".to_string()).ok);
        assert!(column_drag_over("done".to_string()));
        assert!(column_drop("done".to_string()).changed);

        let snapshot = board_snapshot();
        let done = snapshot
            .columns
            .iter()
            .find(|column| column.id == "done")
            .expect("done column");
        assert!(done.tasks.iter().any(|task| task.id == task_id));

        assert!(task_set_priority(task_id.clone(), "HIGH".to_string()).changed);
        assert!(task_delete(task_id.clone()).changed);
        assert!(!task_delete(task_id).changed);
    }

    #[test]
    fn edit_flow_and_invalid_priority() {
        let _serial = SERIAL.lock().unwrap_or_else(|err| err.into_inner());
        assert!(board_open().ok);

        add_task_open("review".to_string());
        add_task_input(unique_token("ffi-edit"));
        let task_id = add_task_submit().task_id.expect("task_id");

        assert!(edit_task_open(task_id.clone()).ok);
        assert!(board_snapshot().edit_draft.is_some());
        edit_task_input("   ".to_string());
        assert!(!edit_task_submit().changed);
        edit_task_input("renamed".to_string());
        assert!(edit_task_submit().changed);

        let response = task_set_priority(task_id.clone(), "urgent".to_string());
        assert!(!response.ok);
        assert!(task_delete(task_id).changed);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
