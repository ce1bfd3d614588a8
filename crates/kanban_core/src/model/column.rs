//! Column domain model.
//!
//! Columns are a fixed set of workflow stages; users move tasks between
//! them but never create or remove columns.

use crate::model::task::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Ids and titles of the stages every board starts with, in display order.
pub const DEFAULT_COLUMNS: &[(&str, &str)] = &[
    ("todo", "To Do"),
    ("in_progress", "In Progress"),
    ("review", "In Review"),
    ("done", "Done"),
];

/// Opaque column identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ColumnId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ColumnId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Named, ordered bucket of task references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    /// Display order among columns; ties are broken by id.
    #[serde(default)]
    pub position: u32,
    pub task_ids: Vec<TaskId>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position,
            task_ids: Vec::new(),
        }
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.task_ids.contains(task_id)
    }
}

/// Builds the empty default column set.
pub fn default_columns() -> Vec<Column> {
    DEFAULT_COLUMNS
        .iter()
        .zip(0u32..)
        .map(|((id, title), position)| Column::new(*id, *title, position))
        .collect()
}

/// Returns whether `id` belongs to the fixed default column set.
pub fn is_default_column(id: &ColumnId) -> bool {
    DEFAULT_COLUMNS
        .iter()
        .any(|(default_id, _)| *default_id == id.as_str())
}

#[cfg(test)]
mod tests {
    use super::{default_columns, is_default_column, ColumnId};

    #[test]
    fn default_columns_are_empty_and_ordered() {
        let columns = default_columns();
        let ids: Vec<&str> = columns.iter().map(|column| column.id.as_str()).collect();
        assert_eq!(ids, vec!["todo", "in_progress", "review", "done"]);
        assert!(columns.iter().all(|column| column.task_ids.is_empty()));
        assert!(columns.windows(2).all(|pair| pair[0].position < pair[1].position));
    }

    #[test]
    fn default_column_membership() {
        assert!(is_default_column(&ColumnId::new("done")));
        assert!(!is_default_column(&ColumnId::new("archive")));
    }
}
