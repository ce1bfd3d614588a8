//! Action vocabulary consumed by the reducer.

use crate::model::column::ColumnId;
use crate::model::task::{Priority, TaskId};
use std::fmt::{Display, Formatter};

/// Request to create one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Generated at request construction so callers know the id up front.
    pub id: TaskId,
    pub column: ColumnId,
    pub content: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Priority,
}

impl NewTask {
    /// Creates a request with a fresh id and `Medium` priority.
    pub fn new(column: impl Into<ColumnId>, content: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            column: column.into(),
            content: content.into(),
            description: None,
            due_date: None,
            priority: Priority::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial replacement of task fields. `None` leaves a field untouched.
///
/// `description` and `due_date` use `Some(None)` to clear the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub content: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<String>>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
    }
}

/// Every state-changing operation on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardAction {
    AddTask(NewTask),
    EditTask { id: TaskId, patch: TaskPatch },
    DeleteTask { id: TaskId },
    ChangePriority { id: TaskId, priority: Priority },
    MoveTask { id: TaskId, from: ColumnId, to: ColumnId },
}

impl BoardAction {
    /// Stable label used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddTask(_) => "add_task",
            Self::EditTask { .. } => "edit_task",
            Self::DeleteTask { .. } => "delete_task",
            Self::ChangePriority { .. } => "change_priority",
            Self::MoveTask { .. } => "move_task",
        }
    }

    /// The single task every action targets.
    pub fn task_id(&self) -> &TaskId {
        match self {
            Self::AddTask(request) => &request.id,
            Self::EditTask { id, .. }
            | Self::DeleteTask { id }
            | Self::ChangePriority { id, .. }
            | Self::MoveTask { id, .. } => id,
        }
    }
}

/// Why an action left the board untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoopReason {
    BlankContent,
    InvalidDueDate(String),
    DuplicateTask(TaskId),
    UnknownTask(TaskId),
    UnknownColumn(ColumnId),
    SameColumn,
    AlreadyInColumn(ColumnId),
    NothingChanged,
    NoDragInProgress,
    NoFormOpen,
    BoardLoading,
}

impl Display for NoopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankContent => write!(f, "content is blank"),
            Self::InvalidDueDate(value) => write!(f, "invalid due date `{value}`"),
            Self::DuplicateTask(id) => write!(f, "task {id} already exists"),
            Self::UnknownTask(id) => write!(f, "task {id} is not on the board"),
            Self::UnknownColumn(id) => write!(f, "column {id} does not exist"),
            Self::SameColumn => write!(f, "source and target column are the same"),
            Self::AlreadyInColumn(id) => write!(f, "task already in column {id}"),
            Self::NothingChanged => write!(f, "nothing changed"),
            Self::NoDragInProgress => write!(f, "no drag in progress"),
            Self::NoFormOpen => write!(f, "no form is open"),
            Self::BoardLoading => write!(f, "board is still loading"),
        }
    }
}
