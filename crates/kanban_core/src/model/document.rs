//! Persisted board document codec.
//!
//! # Responsibility
//! - Map a [`Board`] to and from the JSON document stored per board id.
//! - Classify unreadable documents so callers can fall back to a seed board.
//!
//! # Invariants
//! - The document shape is `{"columns": {id: Column}, "tasks": {id: Task}}`;
//!   both top-level fields are required.
//! - Decoding never yields an inconsistent board: parseable documents that
//!   violate board invariants are repaired and the repair is reported.

use crate::model::board::{Board, RepairReport};
use crate::model::column::{Column, ColumnId};
use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Serialize, Deserialize)]
struct BoardDocument {
    columns: BTreeMap<ColumnId, Column>,
    tasks: BTreeMap<TaskId, Task>,
}

/// Codec failures.
#[derive(Debug)]
pub enum DocumentError {
    /// Body is not JSON or lacks required fields.
    Malformed(serde_json::Error),
    /// Board could not be serialized.
    Encode(serde_json::Error),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed board document: {err}"),
            Self::Encode(err) => write!(f, "failed to encode board document: {err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) | Self::Encode(err) => Some(err),
        }
    }
}

/// Decoded board plus the repairs needed to make it consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBoard {
    pub board: Board,
    pub repair: RepairReport,
}

/// Serializes the full board snapshot.
pub fn encode_board(board: &Board) -> Result<String, DocumentError> {
    let document = BoardDocument {
        columns: board.columns().clone(),
        tasks: board.tasks().clone(),
    };
    serde_json::to_string(&document).map_err(DocumentError::Encode)
}

/// Parses a stored document.
///
/// # Errors
/// Returns `Malformed` when the body is not a JSON object with `columns`
/// and `tasks`, or when any record lacks required fields.
pub fn decode_board(body: &str) -> Result<DecodedBoard, DocumentError> {
    let document: BoardDocument = serde_json::from_str(body).map_err(DocumentError::Malformed)?;
    let (board, repair) = Board::repaired(document.columns, document.tasks);
    Ok(DecodedBoard { board, repair })
}

#[cfg(test)]
mod tests {
    use super::{decode_board, encode_board, DocumentError};
    use crate::model::board::Board;
    use crate::model::column::ColumnId;
    use crate::model::task::{Priority, Task, TaskId};
    use serde_json::Value;

    #[test]
    fn encode_uses_camel_case_document_shape() {
        let mut task = Task::with_id(TaskId::new("t1"), "A");
        task.due_date = Some("2025-01-31".to_string());
        task.priority = Priority::High;
        let board = Board::with_tasks([(ColumnId::new("todo"), task)]).unwrap();

        let value: Value = serde_json::from_str(&encode_board(&board).unwrap()).unwrap();
        assert_eq!(value["columns"]["todo"]["taskIds"][0], "t1");
        assert_eq!(value["tasks"]["t1"]["dueDate"], "2025-01-31");
        assert_eq!(value["tasks"]["t1"]["priority"], "high");
        assert!(value["tasks"]["t1"].get("description").is_none());
    }

    #[test]
    fn decode_accepts_missing_optional_fields() {
        let body = r#"{
            "columns": {
                "todo": {"id": "todo", "title": "To Do", "taskIds": ["t1"]},
                "in_progress": {"id": "in_progress", "title": "In Progress", "position": 1, "taskIds": []},
                "review": {"id": "review", "title": "In Review", "position": 2, "taskIds": []},
                "done": {"id": "done", "title": "Done", "position": 3, "taskIds": []}
            },
            "tasks": {"t1": {"id": "t1", "content": "A"}}
        }"#;
        let decoded = decode_board(body).unwrap();
        assert!(decoded.repair.is_clean());
        assert_eq!(
            decoded.board.task(&TaskId::new("t1")).unwrap().priority,
            Priority::Medium
        );
    }

    #[test]
    fn decode_rejects_missing_required_fields() {
        for body in ["", "[]", r#"{"columns": {}}"#, r#"{"tasks": {}}"#] {
            let err = decode_board(body).unwrap_err();
            assert!(matches!(err, DocumentError::Malformed(_)), "body {body:?}");
        }
    }

    #[test]
    fn decode_repairs_empty_column_map() {
        let decoded = decode_board(r#"{"columns": {}, "tasks": {}}"#).unwrap();
        assert_eq!(decoded.repair.restored_columns.len(), 4);
        assert_eq!(decoded.board, Board::default());
    }

    #[test]
    fn decode_restores_columns_after_maximal_position() {
        let body = r#"{
            "columns": {"x": {"id": "x", "title": "X", "position": 4294967295, "taskIds": ["t1"]}},
            "tasks": {"t1": {"id": "t1", "content": "A"}}
        }"#;
        let decoded = decode_board(body).unwrap();
        assert_eq!(decoded.repair.restored_columns.len(), 4);

        let order: Vec<&str> = decoded
            .board
            .ordered_columns()
            .into_iter()
            .map(|column| column.id.as_str())
            .collect();
        assert_eq!(order.len(), 5);
        assert_eq!(
            decoded.board.column_of(&TaskId::new("t1")),
            Some(&ColumnId::new("x"))
        );
        assert!(decoded.board.validate().is_ok());
    }
}
