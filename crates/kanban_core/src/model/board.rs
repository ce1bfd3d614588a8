//! Board aggregate: all columns plus all tasks.
//!
//! # Responsibility
//! - Hold one consistent `{columns, tasks}` snapshot.
//! - Maintain the task -> column placement index used for membership lookups.
//! - Validate or repair snapshots built from external documents.
//!
//! # Invariants
//! - The union of all `Column::task_ids` equals the key set of `tasks`.
//! - A task id appears at most once across all columns.
//! - `placement` mirrors column membership exactly; it is never persisted and
//!   is rebuilt whenever a board is constructed.
//! - Every id in `DEFAULT_COLUMNS` is present.

use crate::model::column::{default_columns, Column, ColumnId, DEFAULT_COLUMNS};
use crate::model::task::{is_blank, is_valid_due_date, Task, TaskId, TaskValidationError};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invariant violations detected in a board snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardValidationError {
    MissingColumn(ColumnId),
    ColumnKeyMismatch { key: ColumnId, id: ColumnId },
    TaskKeyMismatch { key: TaskId, id: TaskId },
    InvalidTask(TaskValidationError),
    DanglingReference { task: TaskId, column: ColumnId },
    DuplicateReference { task: TaskId, first: ColumnId, second: ColumnId },
    OrphanTask(TaskId),
}

impl Display for BoardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(id) => write!(f, "required column `{id}` is missing"),
            Self::ColumnKeyMismatch { key, id } => {
                write!(f, "column stored under `{key}` carries id `{id}`")
            }
            Self::TaskKeyMismatch { key, id } => {
                write!(f, "task stored under `{key}` carries id `{id}`")
            }
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::DanglingReference { task, column } => {
                write!(f, "column `{column}` references unknown task `{task}`")
            }
            Self::DuplicateReference {
                task,
                first,
                second,
            } => write!(
                f,
                "task `{task}` is referenced by both `{first}` and `{second}`"
            ),
            Self::OrphanTask(id) => write!(f, "task `{id}` is not placed in any column"),
        }
    }
}

impl Error for BoardValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for BoardValidationError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

/// Summary of the fixes applied by [`Board::repaired`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Records whose embedded id or due date was corrected in place.
    pub fixed_records: usize,
    /// Default columns that were missing and re-added empty.
    pub restored_columns: Vec<ColumnId>,
    /// Tasks discarded because their content was blank.
    pub dropped_tasks: usize,
    /// Column references discarded as dangling or duplicate.
    pub dropped_references: usize,
    /// Unplaced tasks appended to the first column.
    pub rehomed_tasks: usize,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.fixed_records == 0
            && self.restored_columns.is_empty()
            && self.dropped_tasks == 0
            && self.dropped_references == 0
            && self.rehomed_tasks == 0
    }
}

/// One consistent board snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: BTreeMap<ColumnId, Column>,
    tasks: BTreeMap<TaskId, Task>,
    placement: BTreeMap<TaskId, ColumnId>,
}

impl Default for Board {
    /// Default columns, no tasks.
    fn default() -> Self {
        let columns = default_columns()
            .into_iter()
            .map(|column| (column.id.clone(), column))
            .collect();
        Self {
            columns,
            tasks: BTreeMap::new(),
            placement: BTreeMap::new(),
        }
    }
}

impl Board {
    /// Builds a board from raw maps, rejecting any invariant violation.
    ///
    /// # Errors
    /// Returns the first [`BoardValidationError`] found.
    pub fn from_parts(
        columns: BTreeMap<ColumnId, Column>,
        tasks: BTreeMap<TaskId, Task>,
    ) -> Result<Self, BoardValidationError> {
        let placement = check_parts(&columns, &tasks)?;
        Ok(Self {
            columns,
            tasks,
            placement,
        })
    }

    /// Builds a default board and places `entries` in order.
    ///
    /// # Errors
    /// Fails on unknown columns, duplicate ids and invalid task fields.
    pub fn with_tasks(
        entries: impl IntoIterator<Item = (ColumnId, Task)>,
    ) -> Result<Self, BoardValidationError> {
        let mut board = Self::default();
        for (column_id, task) in entries {
            task.validate()?;
            if !board.columns.contains_key(&column_id) {
                return Err(BoardValidationError::MissingColumn(column_id));
            }
            if let Some(first) = board.placement.get(&task.id) {
                return Err(BoardValidationError::DuplicateReference {
                    task: task.id.clone(),
                    first: first.clone(),
                    second: column_id,
                });
            }
            board.insert_task(&column_id, task);
        }
        Ok(board)
    }

    /// Builds a board from raw maps, normalising whatever is inconsistent.
    ///
    /// Repair rules, applied in order:
    /// - embedded column/task ids are overwritten by their map keys;
    /// - missing default columns are re-added empty after the last position;
    /// - tasks with blank content are dropped, invalid due dates are cleared;
    /// - references to unknown tasks, and second references to an already
    ///   placed task (in display order), are dropped;
    /// - tasks left unplaced are appended to the first column.
    pub fn repaired(
        mut columns: BTreeMap<ColumnId, Column>,
        mut tasks: BTreeMap<TaskId, Task>,
    ) -> (Self, RepairReport) {
        let mut report = RepairReport::default();

        for (key, column) in columns.iter_mut() {
            if column.id != *key {
                column.id = key.clone();
                report.fixed_records += 1;
            }
        }

        let mut next_position = columns
            .values()
            .map(|column| column.position)
            .max()
            .map_or(0, |position| position.saturating_add(1));
        for (id, title) in DEFAULT_COLUMNS {
            let column_id = ColumnId::new(*id);
            if !columns.contains_key(&column_id) {
                columns.insert(
                    column_id.clone(),
                    Column::new(column_id.clone(), *title, next_position),
                );
                report.restored_columns.push(column_id);
                next_position = next_position.saturating_add(1);
            }
        }

        tasks.retain(|key, task| {
            if is_blank(key.as_str()) || is_blank(&task.content) {
                report.dropped_tasks += 1;
                return false;
            }
            if task.id != *key {
                task.id = key.clone();
                report.fixed_records += 1;
            }
            if task
                .due_date
                .as_deref()
                .is_some_and(|value| !is_valid_due_date(value))
            {
                task.due_date = None;
                report.fixed_records += 1;
            }
            true
        });

        let order = display_order(&columns);
        let mut placement = BTreeMap::new();
        for column_id in &order {
            let Some(column) = columns.get_mut(column_id) else {
                continue;
            };
            column.task_ids.retain(|task_id| {
                if !tasks.contains_key(task_id) || placement.contains_key(task_id) {
                    report.dropped_references += 1;
                    return false;
                }
                placement.insert(task_id.clone(), column_id.clone());
                true
            });
        }

        let orphans: Vec<TaskId> = tasks
            .keys()
            .filter(|task_id| !placement.contains_key(*task_id))
            .cloned()
            .collect();
        if let Some(first) = order.first() {
            if let Some(column) = columns.get_mut(first) {
                for task_id in orphans {
                    column.task_ids.push(task_id.clone());
                    placement.insert(task_id, first.clone());
                    report.rehomed_tasks += 1;
                }
            }
        }

        let board = Self {
            columns,
            tasks,
            placement,
        };
        (board, report)
    }

    /// Re-checks every invariant, including the placement index.
    pub fn validate(&self) -> Result<(), BoardValidationError> {
        let placement = check_parts(&self.columns, &self.tasks)?;
        debug_assert_eq!(placement, self.placement);
        Ok(())
    }

    /// Columns sorted by `position`, then id.
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.values().collect();
        columns.sort_by(|left, right| {
            left.position
                .cmp(&right.position)
                .then_with(|| left.id.cmp(&right.id))
        });
        columns
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Column currently holding `task_id`.
    pub fn column_of(&self, task_id: &TaskId) -> Option<&ColumnId> {
        self.placement.get(task_id)
    }

    /// Tasks of one column in column order.
    pub fn tasks_in(&self, column_id: &ColumnId) -> Vec<&Task> {
        self.columns
            .get(column_id)
            .map(|column| {
                column
                    .task_ids
                    .iter()
                    .filter_map(|task_id| self.tasks.get(task_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn columns(&self) -> &BTreeMap<ColumnId, Column> {
        &self.columns
    }

    pub fn tasks(&self) -> &BTreeMap<TaskId, Task> {
        &self.tasks
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of references across all columns; equals `task_count()`.
    pub fn placed_count(&self) -> usize {
        self.columns.values().map(|column| column.task_ids.len()).sum()
    }

    pub(crate) fn insert_task(&mut self, column_id: &ColumnId, task: Task) -> bool {
        if self.tasks.contains_key(&task.id) {
            return false;
        }
        let Some(column) = self.columns.get_mut(column_id) else {
            return false;
        };
        column.task_ids.push(task.id.clone());
        self.placement.insert(task.id.clone(), column_id.clone());
        self.tasks.insert(task.id.clone(), task);
        true
    }

    pub(crate) fn replace_task(&mut self, task: Task) -> bool {
        match self.tasks.get_mut(&task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_task(&mut self, task_id: &TaskId) -> Option<(Task, ColumnId)> {
        let column_id = self.placement.remove(task_id)?;
        if let Some(column) = self.columns.get_mut(&column_id) {
            column.task_ids.retain(|id| id != task_id);
        }
        let task = self.tasks.remove(task_id)?;
        Some((task, column_id))
    }

    /// Moves `task_id` to the end of `target`.
    ///
    /// Returns `false` without touching the board when the task is unplaced,
    /// the target is unknown, or the task already sits in the target.
    pub(crate) fn move_task(&mut self, task_id: &TaskId, target: &ColumnId) -> bool {
        let Some(source) = self.placement.get(task_id).cloned() else {
            return false;
        };
        if source == *target || !self.columns.contains_key(target) {
            return false;
        }

        if let Some(column) = self.columns.get_mut(&source) {
            column.task_ids.retain(|id| id != task_id);
        }
        if let Some(column) = self.columns.get_mut(target) {
            if !column.contains(task_id) {
                column.task_ids.push(task_id.clone());
            }
        }
        self.placement.insert(task_id.clone(), target.clone());
        true
    }
}

fn display_order(columns: &BTreeMap<ColumnId, Column>) -> Vec<ColumnId> {
    let mut order: Vec<(u32, ColumnId)> = columns
        .values()
        .map(|column| (column.position, column.id.clone()))
        .collect();
    order.sort();
    order.into_iter().map(|(_, id)| id).collect()
}

fn check_parts(
    columns: &BTreeMap<ColumnId, Column>,
    tasks: &BTreeMap<TaskId, Task>,
) -> Result<BTreeMap<TaskId, ColumnId>, BoardValidationError> {
    for (key, column) in columns {
        if column.id != *key {
            return Err(BoardValidationError::ColumnKeyMismatch {
                key: key.clone(),
                id: column.id.clone(),
            });
        }
    }
    for (id, _) in DEFAULT_COLUMNS {
        let column_id = ColumnId::new(*id);
        if !columns.contains_key(&column_id) {
            return Err(BoardValidationError::MissingColumn(column_id));
        }
    }
    for (key, task) in tasks {
        if task.id != *key {
            return Err(BoardValidationError::TaskKeyMismatch {
                key: key.clone(),
                id: task.id.clone(),
            });
        }
        task.validate()?;
    }

    let mut placement: BTreeMap<TaskId, ColumnId> = BTreeMap::new();
    for column_id in display_order(columns) {
        let Some(column) = columns.get(&column_id) else {
            continue;
        };
        for task_id in &column.task_ids {
            if !tasks.contains_key(task_id) {
                return Err(BoardValidationError::DanglingReference {
                    task: task_id.clone(),
                    column: column_id.clone(),
                });
            }
            if let Some(first) = placement.get(task_id) {
                return Err(BoardValidationError::DuplicateReference {
                    task: task_id.clone(),
                    first: first.clone(),
                    second: column_id.clone(),
                });
            }
            placement.insert(task_id.clone(), column_id.clone());
        }
    }

    if let Some(orphan) = tasks.keys().find(|id| !placement.contains_key(*id)) {
        return Err(BoardValidationError::OrphanTask(orphan.clone()));
    }

    Ok(placement)
}
