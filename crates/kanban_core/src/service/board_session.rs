//! Board session: one loaded board plus its interaction state.
//!
//! # Responsibility
//! - Load the board document on mount, seeding or repairing it when needed.
//! - Route UI events through the drag/drop coordinator, form controller and
//!   reducer, then persist the full snapshot after every change.
//!
//! # Invariants
//! - While `Loading`, no action is applied and nothing is written, so an
//!   empty default board can never overwrite stored data.
//! - Every write carries the complete snapshot captured at call time; the
//!   store keeps whichever write arrives last.
//! - Store failures are logged and absorbed; the in-memory board stays
//!   usable and `SyncState::Pending` records that the store is behind.
//! - After a failed read nothing is written until a read succeeds
//!   (`SyncState::Unread`), so a local board never replaces a stored one
//!   it has not seen.

use crate::interaction::drag_drop::DragDropCoordinator;
use crate::interaction::form::FormController;
use crate::model::board::{Board, RepairReport};
use crate::model::column::ColumnId;
use crate::model::document::{decode_board, encode_board};
use crate::model::task::{Priority, TaskId};
use crate::reconcile::action::{BoardAction, NewTask, NoopReason, TaskPatch};
use crate::reconcile::reducer::{reduce, Reduction};
use crate::repo::board_store::BoardDocumentStore;
use log::{debug, error, info, warn};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Last snapshot reached the store.
    Synced,
    /// Store missed at least one snapshot.
    Pending,
    /// Last read failed; writes are held until a read succeeds.
    Unread,
}

/// What `load` found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Document was absent or malformed; a default board was written.
    Seeded,
    /// Document was inconsistent; the repaired board was written back.
    Repaired(RepairReport),
    /// Read failed; the in-memory board was kept and writes are held.
    Unavailable,
}

/// Result of one UI-driven operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied { task_id: TaskId, persisted: bool },
    Ignored(NoopReason),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

pub struct BoardSession<S: BoardDocumentStore> {
    store: S,
    board_id: String,
    board: Board,
    load_state: LoadState,
    sync_state: SyncState,
    drag: DragDropCoordinator,
    form: FormController,
}

impl<S: BoardDocumentStore> BoardSession<S> {
    /// Creates a session in `Loading` state on the default board.
    pub fn new(store: S, board_id: impl Into<String>) -> Self {
        Self {
            store,
            board_id: board_id.into(),
            board: Board::default(),
            load_state: LoadState::Loading,
            sync_state: SyncState::Synced,
            drag: DragDropCoordinator::new(),
            form: FormController::new(),
        }
    }

    /// Reads the board document and adopts it as current state.
    ///
    /// Can be called again later to pick up the stored board after a failed
    /// read.
    pub fn load(&mut self) -> LoadOutcome {
        let started_at = Instant::now();
        self.load_state = LoadState::Loading;
        info!(
            "event=board_load module=service status=start board_id={}",
            self.board_id
        );

        let read = self.store.read_document(&self.board_id);
        if read.is_ok() {
            self.sync_state = SyncState::Synced;
        }
        let outcome = match read {
            Ok(Some(body)) => match decode_board(&body) {
                Ok(decoded) if decoded.repair.is_clean() => {
                    self.board = decoded.board;
                    LoadOutcome::Loaded
                }
                Ok(decoded) => {
                    warn!(
                        "event=board_load module=service status=repaired board_id={} fixed_records={} restored_columns={} dropped_tasks={} dropped_references={} rehomed_tasks={}",
                        self.board_id,
                        decoded.repair.fixed_records,
                        decoded.repair.restored_columns.len(),
                        decoded.repair.dropped_tasks,
                        decoded.repair.dropped_references,
                        decoded.repair.rehomed_tasks
                    );
                    self.board = decoded.board;
                    self.persist();
                    LoadOutcome::Repaired(decoded.repair)
                }
                Err(err) => {
                    warn!(
                        "event=board_load module=service status=malformed board_id={} error={}",
                        self.board_id, err
                    );
                    self.seed()
                }
            },
            Ok(None) => self.seed(),
            Err(err) => {
                error!(
                    "event=board_load module=service status=error board_id={} error_code=store_read_failed error={}",
                    self.board_id, err
                );
                self.sync_state = SyncState::Unread;
                LoadOutcome::Unavailable
            }
        };

        self.load_state = LoadState::Ready;
        self.drag.cancel_drag();
        self.drop_stale_edit();
        info!(
            "event=board_load module=service status=ok board_id={} outcome={} tasks={} duration_ms={}",
            self.board_id,
            outcome_label(&outcome),
            self.board.task_count(),
            started_at.elapsed().as_millis()
        );
        outcome
    }

    /// Applies one action and persists the resulting snapshot.
    pub fn dispatch(&mut self, action: BoardAction) -> ActionOutcome {
        if self.is_loading() {
            return self.ignore(action.name(), NoopReason::BoardLoading);
        }
        let reduction = reduce(&self.board, &action);
        self.apply(action.name(), action.task_id().clone(), reduction)
    }

    pub fn add_task(&mut self, request: NewTask) -> ActionOutcome {
        self.dispatch(BoardAction::AddTask(request))
    }

    pub fn edit_task(&mut self, id: TaskId, patch: TaskPatch) -> ActionOutcome {
        self.dispatch(BoardAction::EditTask { id, patch })
    }

    pub fn delete_task(&mut self, id: TaskId) -> ActionOutcome {
        self.dispatch(BoardAction::DeleteTask { id })
    }

    pub fn change_priority(&mut self, id: TaskId, priority: Priority) -> ActionOutcome {
        self.dispatch(BoardAction::ChangePriority { id, priority })
    }

    /// Drag start: records the task and its origin column.
    pub fn begin_drag(&mut self, task_id: TaskId, source: ColumnId) {
        debug!(
            "event=drag_start module=service task_id={} column_id={}",
            task_id, source
        );
        self.drag.begin_drag(task_id, source);
    }

    /// Drag over: whether a drop on `target` would be accepted.
    pub fn drag_over(&self, target: &ColumnId) -> bool {
        !self.is_loading() && self.drag.drag_over(&self.board, target)
    }

    /// Drop: moves the dragged task to the end of `target`.
    pub fn drop_on(&mut self, target: &ColumnId) -> ActionOutcome {
        if self.is_loading() {
            self.drag.cancel_drag();
            return self.ignore("move_task", NoopReason::BoardLoading);
        }
        let Some(task_id) = self.drag.pending().map(|source| source.task_id.clone()) else {
            return self.ignore("move_task", NoopReason::NoDragInProgress);
        };
        let reduction = self.drag.drop_on(&self.board, target);
        self.apply("move_task", task_id, reduction)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel_drag();
    }

    /// Opens the add form; `false` for unknown columns.
    pub fn open_add_form(&mut self, column: ColumnId) -> bool {
        if self.board.column(&column).is_none() {
            return false;
        }
        self.form.open_add(column);
        true
    }

    pub fn update_add_draft(&mut self, text: impl Into<String>) -> bool {
        self.form.update_add_draft(text)
    }

    /// Commits the add form.
    ///
    /// The form closes only when the task was added; blank or rejected drafts
    /// stay open.
    pub fn submit_add_form(&mut self) -> ActionOutcome {
        if self.is_loading() {
            return self.ignore("add_task", NoopReason::BoardLoading);
        }
        if !self.form.add_slot().is_active() {
            return self.ignore("add_task", NoopReason::NoFormOpen);
        }
        let Some(action) = self.form.add_action() else {
            return self.ignore("add_task", NoopReason::BlankContent);
        };
        let outcome = self.dispatch(action);
        if outcome.is_applied() {
            self.form.cancel_add();
        }
        outcome
    }

    pub fn cancel_add_form(&mut self) {
        self.form.cancel_add();
    }

    /// Opens the edit form pre-filled with current content; `false` for
    /// unknown tasks.
    pub fn open_edit_form(&mut self, task_id: &TaskId) -> bool {
        self.form.open_edit(&self.board, task_id)
    }

    pub fn update_edit_draft(&mut self, text: impl Into<String>) -> bool {
        self.form.update_edit_draft(text)
    }

    /// Commits the edit form.
    ///
    /// The form closes when the edit was applied or changed nothing; blank or
    /// rejected drafts stay open.
    pub fn submit_edit_form(&mut self) -> ActionOutcome {
        if self.is_loading() {
            return self.ignore("edit_task", NoopReason::BoardLoading);
        }
        if !self.form.edit_slot().is_active() {
            return self.ignore("edit_task", NoopReason::NoFormOpen);
        }
        let Some(action) = self.form.edit_action() else {
            return self.ignore("edit_task", NoopReason::BlankContent);
        };
        let outcome = self.dispatch(action);
        if matches!(
            outcome,
            ActionOutcome::Applied { .. } | ActionOutcome::Ignored(NoopReason::NothingChanged)
        ) {
            self.form.cancel_edit();
        }
        outcome
    }

    pub fn cancel_edit_form(&mut self) {
        self.form.cancel_edit();
    }

    /// Re-sends the current snapshot when an earlier write failed.
    ///
    /// After a failed read this re-reads instead; the stored board replaces
    /// local changes made while the store was unreadable.
    ///
    /// Returns whether the store is in sync afterwards.
    pub fn flush(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        match self.sync_state {
            SyncState::Synced => true,
            SyncState::Pending => self.persist(),
            SyncState::Unread => {
                self.load();
                self.sync_state == SyncState::Synced
            }
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    pub fn forms(&self) -> &FormController {
        &self.form
    }

    pub fn drag(&self) -> &DragDropCoordinator {
        &self.drag
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn seed(&mut self) -> LoadOutcome {
        self.board = Board::default();
        self.persist();
        LoadOutcome::Seeded
    }

    fn apply(&mut self, action: &'static str, task_id: TaskId, reduction: Reduction) -> ActionOutcome {
        match reduction {
            Reduction::Changed(board) => {
                self.board = board;
                self.drop_stale_edit();
                let persisted = self.persist();
                info!(
                    "event=board_action module=service status=ok action={} board_id={} task_id={} persisted={}",
                    action, self.board_id, task_id, persisted
                );
                ActionOutcome::Applied { task_id, persisted }
            }
            Reduction::Unchanged(reason) => self.ignore(action, reason),
        }
    }

    fn ignore(&self, action: &'static str, reason: NoopReason) -> ActionOutcome {
        debug!(
            "event=board_action module=service status=noop action={} board_id={} reason={}",
            action, self.board_id, reason
        );
        ActionOutcome::Ignored(reason)
    }

    fn drop_stale_edit(&mut self) {
        let stale = self
            .form
            .edit_slot()
            .target()
            .filter(|task_id| self.board.task(task_id).is_none())
            .cloned();
        if let Some(task_id) = stale {
            self.form.forget_task(&task_id);
        }
    }

    fn persist(&mut self) -> bool {
        if self.sync_state == SyncState::Unread {
            debug!(
                "event=board_save module=service status=held board_id={} reason=store_unread",
                self.board_id
            );
            return false;
        }
        let body = match encode_board(&self.board) {
            Ok(body) => body,
            Err(err) => {
                error!(
                    "event=board_save module=service status=error board_id={} error_code=encode_failed error={}",
                    self.board_id, err
                );
                self.sync_state = SyncState::Pending;
                return false;
            }
        };

        match self.store.write_document(&self.board_id, &body) {
            Ok(()) => {
                self.sync_state = SyncState::Synced;
                debug!(
                    "event=board_save module=service status=ok board_id={} bytes={}",
                    self.board_id,
                    body.len()
                );
                true
            }
            Err(err) => {
                self.sync_state = SyncState::Pending;
                error!(
                    "event=board_save module=service status=error board_id={} error_code=store_write_failed error={}",
                    self.board_id, err
                );
                false
            }
        }
    }
}

fn outcome_label(outcome: &LoadOutcome) -> &'static str {
    match outcome {
        LoadOutcome::Loaded => "loaded",
        LoadOutcome::Seeded => "seeded",
        LoadOutcome::Repaired(_) => "repaired",
        LoadOutcome::Unavailable => "unavailable",
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionOutcome, BoardSession, LoadOutcome, LoadState};
    use crate::model::column::ColumnId;
    use crate::reconcile::action::{NewTask, NoopReason};
    use crate::repo::memory_store::MemoryBoardStore;

    #[test]
    fn actions_are_ignored_until_loaded() {
        let mut session = BoardSession::new(MemoryBoardStore::new(), "main");
        assert_eq!(session.load_state(), LoadState::Loading);

        let outcome = session.add_task(NewTask::new("todo", "A"));
        assert_eq!(outcome, ActionOutcome::Ignored(NoopReason::BoardLoading));
        assert_eq!(session.store().write_count(), 0);

        session.begin_drag("t1".into(), "todo".into());
        assert!(!session.drag_over(&ColumnId::new("done")));
        assert_eq!(
            session.drop_on(&ColumnId::new("done")),
            ActionOutcome::Ignored(NoopReason::BoardLoading)
        );
        assert!(session.drag().pending().is_none());
    }

    #[test]
    fn first_load_seeds_default_document() {
        let mut session = BoardSession::new(MemoryBoardStore::new(), "main");
        assert_eq!(session.load(), LoadOutcome::Seeded);
        assert_eq!(session.load_state(), LoadState::Ready);
        assert_eq!(session.store().write_count(), 1);
        assert!(session.store().document("main").is_some());
    }

    #[test]
    fn submit_without_open_form_is_ignored() {
        let mut session = BoardSession::new(MemoryBoardStore::new(), "main");
        session.load();
        assert_eq!(
            session.submit_add_form(),
            ActionOutcome::Ignored(NoopReason::NoFormOpen)
        );
        assert_eq!(
            session.submit_edit_form(),
            ActionOutcome::Ignored(NoopReason::NoFormOpen)
        );
    }
}
