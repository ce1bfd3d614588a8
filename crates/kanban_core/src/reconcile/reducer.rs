//! Pure state transitions over [`Board`] snapshots.
//!
//! # Invariants
//! - `reduce` clones before mutating; the caller's snapshot stays intact.
//! - A `Changed` result always satisfies `Board::validate()`.
//! - `MoveTask` locates the task through the placement index; the `from`
//!   column in the action only decides the same-column short circuit.

use crate::model::board::Board;
use crate::model::column::ColumnId;
use crate::model::task::{is_blank, is_valid_due_date, Priority, Task, TaskId};
use crate::reconcile::action::{BoardAction, NewTask, NoopReason, TaskPatch};
use log::debug;

/// Outcome of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reduction {
    Changed(Board),
    Unchanged(NoopReason),
}

impl Reduction {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// New snapshot, or `None` when nothing changed.
    pub fn into_board(self) -> Option<Board> {
        match self {
            Self::Changed(board) => Some(board),
            Self::Unchanged(_) => None,
        }
    }

    pub fn noop_reason(&self) -> Option<&NoopReason> {
        match self {
            Self::Changed(_) => None,
            Self::Unchanged(reason) => Some(reason),
        }
    }
}

/// Applies `action` to `board` and returns the resulting snapshot.
pub fn reduce(board: &Board, action: &BoardAction) -> Reduction {
    match action {
        BoardAction::AddTask(request) => add_task(board, request),
        BoardAction::EditTask { id, patch } => edit_task(board, id, patch),
        BoardAction::DeleteTask { id } => delete_task(board, id),
        BoardAction::ChangePriority { id, priority } => change_priority(board, id, *priority),
        BoardAction::MoveTask { id, from, to } => move_task(board, id, from, to),
    }
}

fn add_task(board: &Board, request: &NewTask) -> Reduction {
    if is_blank(&request.content) {
        return Reduction::Unchanged(NoopReason::BlankContent);
    }
    if board.column(&request.column).is_none() {
        return Reduction::Unchanged(NoopReason::UnknownColumn(request.column.clone()));
    }
    if board.task(&request.id).is_some() {
        return Reduction::Unchanged(NoopReason::DuplicateTask(request.id.clone()));
    }
    let due_date = match normalize_due_date(request.due_date.as_deref()) {
        Ok(value) => value,
        Err(reason) => return Reduction::Unchanged(reason),
    };

    let task = Task {
        id: request.id.clone(),
        content: request.content.clone(),
        description: normalize_description(request.description.as_deref()),
        due_date,
        priority: request.priority,
    };

    let mut next = board.clone();
    if !next.insert_task(&request.column, task) {
        return Reduction::Unchanged(NoopReason::DuplicateTask(request.id.clone()));
    }
    Reduction::Changed(next)
}

fn edit_task(board: &Board, id: &TaskId, patch: &TaskPatch) -> Reduction {
    let Some(current) = board.task(id) else {
        return Reduction::Unchanged(NoopReason::UnknownTask(id.clone()));
    };

    let mut updated = current.clone();
    if let Some(content) = patch.content.as_deref() {
        if is_blank(content) {
            return Reduction::Unchanged(NoopReason::BlankContent);
        }
        updated.content = content.to_string();
    }
    if let Some(description) = &patch.description {
        updated.description = normalize_description(description.as_deref());
    }
    if let Some(due_date) = &patch.due_date {
        updated.due_date = match normalize_due_date(due_date.as_deref()) {
            Ok(value) => value,
            Err(reason) => return Reduction::Unchanged(reason),
        };
    }
    if let Some(priority) = patch.priority {
        updated.priority = priority;
    }

    replace(board, current, updated)
}

fn change_priority(board: &Board, id: &TaskId, priority: Priority) -> Reduction {
    let Some(current) = board.task(id) else {
        return Reduction::Unchanged(NoopReason::UnknownTask(id.clone()));
    };
    let mut updated = current.clone();
    updated.priority = priority;
    replace(board, current, updated)
}

fn delete_task(board: &Board, id: &TaskId) -> Reduction {
    let mut next = board.clone();
    match next.remove_task(id) {
        Some(_) => Reduction::Changed(next),
        None => Reduction::Unchanged(NoopReason::UnknownTask(id.clone())),
    }
}

fn move_task(board: &Board, id: &TaskId, from: &ColumnId, to: &ColumnId) -> Reduction {
    if from == to {
        return Reduction::Unchanged(NoopReason::SameColumn);
    }
    if board.column(to).is_none() {
        return Reduction::Unchanged(NoopReason::UnknownColumn(to.clone()));
    }
    let Some(current) = board.column_of(id) else {
        return Reduction::Unchanged(NoopReason::UnknownTask(id.clone()));
    };
    if current == to {
        return Reduction::Unchanged(NoopReason::AlreadyInColumn(to.clone()));
    }
    if current != from {
        debug!(
            "event=move_task module=reconcile status=stale_source task_id={} from={} actual={}",
            id,
            from,
            current
        );
    }

    let mut next = board.clone();
    if !next.move_task(id, to) {
        return Reduction::Unchanged(NoopReason::NothingChanged);
    }
    Reduction::Changed(next)
}

fn replace(board: &Board, current: &Task, updated: Task) -> Reduction {
    if *current == updated {
        return Reduction::Unchanged(NoopReason::NothingChanged);
    }
    let mut next = board.clone();
    next.replace_task(updated);
    Reduction::Changed(next)
}

fn normalize_description(value: Option<&str>) -> Option<String> {
    value.filter(|text| !is_blank(text)).map(str::to_string)
}

fn normalize_due_date(value: Option<&str>) -> Result<Option<String>, NoopReason> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(date) if is_valid_due_date(date) => Ok(Some(date.to_string())),
        Some(date) => Err(NoopReason::InvalidDueDate(date.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, Reduction};
    use crate::model::board::Board;
    use crate::model::column::ColumnId;
    use crate::model::task::{Priority, Task, TaskId};
    use crate::reconcile::action::{BoardAction, NewTask, NoopReason, TaskPatch};

    fn board() -> Board {
        Board::with_tasks([
            (ColumnId::new("todo"), Task::with_id(TaskId::new("t1"), "A")),
            (ColumnId::new("todo"), Task::with_id(TaskId::new("t2"), "B")),
            (ColumnId::new("done"), Task::with_id(TaskId::new("t3"), "C")),
        ])
        .unwrap()
    }

    fn changed(reduction: Reduction) -> Board {
        let board = reduction.into_board().expect("action should change the board");
        board.validate().expect("reduced board must stay consistent");
        board
    }

    #[test]
    fn add_appends_to_target_column() {
        let request = NewTask::new("todo", "D").with_priority(Priority::High);
        let id = request.id.clone();
        let next = changed(reduce(&board(), &BoardAction::AddTask(request)));

        let todo = next.column(&ColumnId::new("todo")).unwrap();
        assert_eq!(todo.task_ids.last(), Some(&id));
        assert_eq!(next.task(&id).unwrap().priority, Priority::High);
    }

    #[test]
    fn add_rejects_invalid_requests() {
        let start = board();
        let cases = [
            (NewTask::new("todo", "   "), NoopReason::BlankContent),
            (
                NewTask::new("archive", "D"),
                NoopReason::UnknownColumn(ColumnId::new("archive")),
            ),
            (
                NewTask::new("todo", "D").with_due_date("31/01/2025"),
                NoopReason::InvalidDueDate("31/01/2025".to_string()),
            ),
        ];
        for (request, reason) in cases {
            assert_eq!(
                reduce(&start, &BoardAction::AddTask(request)),
                Reduction::Unchanged(reason)
            );
        }
    }

    #[test]
    fn edit_replaces_only_patched_fields() {
        let patch = TaskPatch {
            description: Some(Some("details".to_string())),
            due_date: Some(Some("2025-03-01".to_string())),
            ..TaskPatch::default()
        };
        let next = changed(reduce(
            &board(),
            &BoardAction::EditTask {
                id: TaskId::new("t2"),
                patch,
            },
        ));
        let task = next.task(&TaskId::new("t2")).unwrap();
        assert_eq!(task.content, "B");
        assert_eq!(task.description.as_deref(), Some("details"));
        assert_eq!(task.due_date.as_deref(), Some("2025-03-01"));
        assert_eq!(next.column_of(&TaskId::new("t2")), Some(&ColumnId::new("todo")));
    }

    #[test]
    fn edit_with_blank_content_is_noop() {
        let start = board();
        let action = BoardAction::EditTask {
            id: TaskId::new("t1"),
            patch: TaskPatch::content(" \n"),
        };
        assert_eq!(
            reduce(&start, &action),
            Reduction::Unchanged(NoopReason::BlankContent)
        );
    }

    #[test]
    fn priority_change_with_same_value_is_noop() {
        let action = BoardAction::ChangePriority {
            id: TaskId::new("t1"),
            priority: Priority::Medium,
        };
        assert_eq!(
            reduce(&board(), &action),
            Reduction::Unchanged(NoopReason::NothingChanged)
        );
    }

    #[test]
    fn delete_removes_task_and_reference() {
        let next = changed(reduce(
            &board(),
            &BoardAction::DeleteTask {
                id: TaskId::new("t1"),
            },
        ));
        assert!(next.task(&TaskId::new("t1")).is_none());
        assert_eq!(
            next.column(&ColumnId::new("todo")).unwrap().task_ids,
            vec![TaskId::new("t2")]
        );
    }

    #[test]
    fn move_leaves_input_snapshot_untouched() {
        let start = board();
        let before = start.clone();
        let next = changed(reduce(
            &start,
            &BoardAction::MoveTask {
                id: TaskId::new("t1"),
                from: ColumnId::new("todo"),
                to: ColumnId::new("review"),
            },
        ));
        assert_eq!(start, before);
        assert_eq!(
            next.column(&ColumnId::new("review")).unwrap().task_ids,
            vec![TaskId::new("t1")]
        );
    }

    #[test]
    fn move_with_stale_source_uses_actual_column() {
        let next = changed(reduce(
            &board(),
            &BoardAction::MoveTask {
                id: TaskId::new("t3"),
                from: ColumnId::new("todo"),
                to: ColumnId::new("in_progress"),
            },
        ));
        assert!(next.column(&ColumnId::new("done")).unwrap().task_ids.is_empty());
        assert_eq!(
            next.column_of(&TaskId::new("t3")),
            Some(&ColumnId::new("in_progress"))
        );
    }

    #[test]
    fn duplicate_move_is_noop() {
        let action = BoardAction::MoveTask {
            id: TaskId::new("t1"),
            from: ColumnId::new("todo"),
            to: ColumnId::new("done"),
        };
        let once = changed(reduce(&board(), &action));
        assert_eq!(
            reduce(&once, &action),
            Reduction::Unchanged(NoopReason::AlreadyInColumn(ColumnId::new("done")))
        );
    }
}
