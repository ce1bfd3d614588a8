//! Add/edit form controller.
//!
//! # Invariants
//! - Each slot is either idle or active with a target and a draft.
//! - A blank draft never commits; the slot stays active so the user can
//!   keep typing.
//! - Building an action never closes a slot; the owner closes it once the
//!   board accepted the action, so a rejected submit keeps the draft.

use crate::model::board::Board;
use crate::model::column::ColumnId;
use crate::model::task::{is_blank, TaskId};
use crate::reconcile::action::{BoardAction, NewTask, TaskPatch};

/// One interaction slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSlot<T> {
    Idle,
    Active { target: T, draft: String },
}

impl<T> Default for DraftSlot<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> DraftSlot<T> {
    pub fn target(&self) -> Option<&T> {
        match self {
            Self::Idle => None,
            Self::Active { target, .. } => Some(target),
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Active { draft, .. } => Some(draft.as_str()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    fn set_draft(&mut self, text: String) -> bool {
        match self {
            Self::Idle => false,
            Self::Active { draft, .. } => {
                *draft = text;
                true
            }
        }
    }

    /// `(target, draft)` when the draft is non-blank.
    fn committable(&self) -> Option<(&T, &str)> {
        match self {
            Self::Active { target, draft } if !is_blank(draft) => Some((target, draft.as_str())),
            _ => None,
        }
    }
}

/// Transient "adding to column X" / "editing task Y" state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormController {
    add: DraftSlot<ColumnId>,
    edit: DraftSlot<TaskId>,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_slot(&self) -> &DraftSlot<ColumnId> {
        &self.add
    }

    pub fn edit_slot(&self) -> &DraftSlot<TaskId> {
        &self.edit
    }

    /// Opens the add form on `column` with an empty draft, discarding any
    /// add draft open elsewhere.
    pub fn open_add(&mut self, column: impl Into<ColumnId>) {
        self.add = DraftSlot::Active {
            target: column.into(),
            draft: String::new(),
        };
    }

    /// Returns `false` when no add form is open.
    pub fn update_add_draft(&mut self, text: impl Into<String>) -> bool {
        self.add.set_draft(text.into())
    }

    /// `AddTask` for a non-blank add draft; the form stays open.
    pub fn add_action(&self) -> Option<BoardAction> {
        let (column, draft) = self.add.committable()?;
        Some(BoardAction::AddTask(NewTask::new(column.clone(), draft)))
    }

    /// [`Self::add_action`], closing the form when there is one.
    pub fn commit_add(&mut self) -> Option<BoardAction> {
        let action = self.add_action()?;
        self.cancel_add();
        Some(action)
    }

    pub fn cancel_add(&mut self) {
        self.add = DraftSlot::Idle;
    }

    /// Opens the edit form pre-filled with the task's current content.
    ///
    /// Returns `false` and leaves the slot untouched for unknown tasks.
    pub fn open_edit(&mut self, board: &Board, task_id: &TaskId) -> bool {
        let Some(task) = board.task(task_id) else {
            return false;
        };
        self.edit = DraftSlot::Active {
            target: task_id.clone(),
            draft: task.content.clone(),
        };
        true
    }

    /// Returns `false` when no edit form is open.
    pub fn update_edit_draft(&mut self, text: impl Into<String>) -> bool {
        self.edit.set_draft(text.into())
    }

    /// Content-only `EditTask` for a non-blank edit draft; the form stays
    /// open.
    pub fn edit_action(&self) -> Option<BoardAction> {
        let (id, draft) = self.edit.committable()?;
        Some(BoardAction::EditTask {
            id: id.clone(),
            patch: TaskPatch::content(draft),
        })
    }

    /// [`Self::edit_action`], closing the form when there is one.
    pub fn commit_edit(&mut self) -> Option<BoardAction> {
        let action = self.edit_action()?;
        self.cancel_edit();
        Some(action)
    }

    pub fn cancel_edit(&mut self) {
        self.edit = DraftSlot::Idle;
    }

    /// Closes the edit form if it targets `task_id`.
    pub fn forget_task(&mut self, task_id: &TaskId) {
        if self.edit.target() == Some(task_id) {
            self.edit = DraftSlot::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FormController;
    use crate::model::board::Board;
    use crate::model::column::ColumnId;
    use crate::model::task::{Task, TaskId};
    use crate::reconcile::action::{BoardAction, TaskPatch};

    #[test]
    fn add_commit_produces_action_and_goes_idle() {
        let mut form = FormController::new();
        form.open_add("todo");
        assert!(form.update_add_draft("write tests"));

        let Some(BoardAction::AddTask(request)) = form.commit_add() else {
            panic!("expected add action");
        };
        assert_eq!(request.column, ColumnId::new("todo"));
        assert_eq!(request.content, "write tests");
        assert!(!form.add_slot().is_active());
    }

    #[test]
    fn blank_add_draft_stays_active() {
        let mut form = FormController::new();
        form.open_add("todo");
        form.update_add_draft("   ");
        assert!(form.commit_add().is_none());
        assert_eq!(form.add_slot().target(), Some(&ColumnId::new("todo")));
    }

    #[test]
    fn reopening_add_on_other_column_resets_draft() {
        let mut form = FormController::new();
        form.open_add("todo");
        form.update_add_draft("half typed");
        form.open_add("done");
        assert_eq!(form.add_slot().target(), Some(&ColumnId::new("done")));
        assert_eq!(form.add_slot().draft(), Some(""));
    }

    #[test]
    fn update_without_open_form_is_rejected() {
        let mut form = FormController::new();
        assert!(!form.update_add_draft("x"));
        assert!(!form.update_edit_draft("x"));
        assert!(form.commit_edit().is_none());
    }

    #[test]
    fn edit_prefills_and_commits_content_patch() {
        let board =
            Board::with_tasks([(ColumnId::new("todo"), Task::with_id(TaskId::new("t1"), "A"))])
                .unwrap();
        let mut form = FormController::new();
        assert!(form.open_edit(&board, &TaskId::new("t1")));
        assert_eq!(form.edit_slot().draft(), Some("A"));

        form.update_edit_draft("A2");
        assert_eq!(
            form.commit_edit(),
            Some(BoardAction::EditTask {
                id: TaskId::new("t1"),
                patch: TaskPatch::content("A2"),
            })
        );
        assert!(!form.edit_slot().is_active());
    }

    #[test]
    fn building_actions_keeps_forms_open() {
        let board =
            Board::with_tasks([(ColumnId::new("todo"), Task::with_id(TaskId::new("t1"), "A"))])
                .unwrap();
        let mut form = FormController::new();
        form.open_add("todo");
        form.update_add_draft("B");
        form.open_edit(&board, &TaskId::new("t1"));

        assert!(matches!(form.add_action(), Some(BoardAction::AddTask(_))));
        assert!(form.edit_action().is_some());
        assert_eq!(form.add_slot().draft(), Some("B"));
        assert_eq!(form.edit_slot().draft(), Some("A"));
    }

    #[test]
    fn cancel_discards_draft() {
        let board =
            Board::with_tasks([(ColumnId::new("todo"), Task::with_id(TaskId::new("t1"), "A"))])
                .unwrap();
        let mut form = FormController::new();
        form.open_edit(&board, &TaskId::new("t1"));
        form.cancel_edit();
        assert!(form.edit_slot().draft().is_none());
        assert!(!form.open_edit(&board, &TaskId::new("ghost")));
    }
}
