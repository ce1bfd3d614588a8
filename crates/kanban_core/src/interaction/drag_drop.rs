//! Drag/drop coordinator.
//!
//! A drag records the task and the column it left; the drop turns that
//! record into a `MoveTask` action against the current snapshot.

use crate::model::board::Board;
use crate::model::column::ColumnId;
use crate::model::task::TaskId;
use crate::reconcile::action::{BoardAction, NoopReason};
use crate::reconcile::reducer::{reduce, Reduction};

/// Identity and origin of the task being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSource {
    pub task_id: TaskId,
    pub column_id: ColumnId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragDropCoordinator {
    pending: Option<DragSource>,
}

impl DragDropCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the dragged task. Replaces any drag that never dropped.
    pub fn begin_drag(&mut self, task_id: impl Into<TaskId>, source: impl Into<ColumnId>) {
        self.pending = Some(DragSource {
            task_id: task_id.into(),
            column_id: source.into(),
        });
    }

    pub fn pending(&self) -> Option<&DragSource> {
        self.pending.as_ref()
    }

    /// Whether dropping on `target` right now would be accepted.
    pub fn drag_over(&self, board: &Board, target: &ColumnId) -> bool {
        self.pending.is_some() && board.column(target).is_some()
    }

    /// Completes the drag on `target`.
    ///
    /// The recorded source is consumed whatever the outcome, so a repeated
    /// drop event without a new drag start is a no-op.
    pub fn drop_on(&mut self, board: &Board, target: &ColumnId) -> Reduction {
        let Some(source) = self.pending.take() else {
            return Reduction::Unchanged(NoopReason::NoDragInProgress);
        };
        reduce(
            board,
            &BoardAction::MoveTask {
                id: source.task_id,
                from: source.column_id,
                to: target.clone(),
            },
        )
    }

    pub fn cancel_drag(&mut self) -> Option<DragSource> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::DragDropCoordinator;
    use crate::model::board::Board;
    use crate::model::column::ColumnId;
    use crate::model::task::{Task, TaskId};
    use crate::reconcile::action::NoopReason;
    use crate::reconcile::reducer::Reduction;

    fn board() -> Board {
        Board::with_tasks([
            (ColumnId::new("todo"), Task::with_id(TaskId::new("t1"), "A")),
            (ColumnId::new("done"), Task::with_id(TaskId::new("t2"), "B")),
        ])
        .unwrap()
    }

    #[test]
    fn begin_drag_records_source_without_touching_board() {
        let board = board();
        let mut coordinator = DragDropCoordinator::new();
        coordinator.begin_drag("t1", "todo");

        let pending = coordinator.pending().unwrap();
        assert_eq!(pending.task_id, TaskId::new("t1"));
        assert_eq!(pending.column_id, ColumnId::new("todo"));
        assert!(coordinator.drag_over(&board, &ColumnId::new("done")));
        assert!(!coordinator.drag_over(&board, &ColumnId::new("archive")));
    }

    #[test]
    fn drop_moves_task_to_end_of_target() {
        let board = board();
        let mut coordinator = DragDropCoordinator::new();
        coordinator.begin_drag("t1", "todo");

        let next = coordinator
            .drop_on(&board, &ColumnId::new("done"))
            .into_board()
            .unwrap();
        assert_eq!(
            next.column(&ColumnId::new("done")).unwrap().task_ids,
            vec![TaskId::new("t2"), TaskId::new("t1")]
        );
        assert!(coordinator.pending().is_none());
    }

    #[test]
    fn drop_on_source_column_is_noop() {
        let board = board();
        let mut coordinator = DragDropCoordinator::new();
        coordinator.begin_drag("t1", "todo");
        assert_eq!(
            coordinator.drop_on(&board, &ColumnId::new("todo")),
            Reduction::Unchanged(NoopReason::SameColumn)
        );
    }

    #[test]
    fn drop_without_drag_is_noop() {
        let mut coordinator = DragDropCoordinator::new();
        assert_eq!(
            coordinator.drop_on(&board(), &ColumnId::new("done")),
            Reduction::Unchanged(NoopReason::NoDragInProgress)
        );
    }

    #[test]
    fn drop_of_unknown_task_or_column_is_noop() {
        let board = board();
        let mut coordinator = DragDropCoordinator::new();

        coordinator.begin_drag("ghost", "todo");
        assert_eq!(
            coordinator.drop_on(&board, &ColumnId::new("done")),
            Reduction::Unchanged(NoopReason::UnknownTask(TaskId::new("ghost")))
        );

        coordinator.begin_drag("t1", "todo");
        assert_eq!(
            coordinator.drop_on(&board, &ColumnId::new("archive")),
            Reduction::Unchanged(NoopReason::UnknownColumn(ColumnId::new("archive")))
        );
    }

    #[test]
    fn cancel_clears_pending_drag() {
        let mut coordinator = DragDropCoordinator::new();
        coordinator.begin_drag("t1", "todo");
        assert!(coordinator.cancel_drag().is_some());
        assert!(coordinator.pending().is_none());
    }
}
