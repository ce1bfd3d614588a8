//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its identifier and priority tag.
//! - Validate user-facing fields before they reach a board snapshot.
//!
//! # Invariants
//! - `id` is stable for the lifetime of a task and never reused.
//! - `content` is never blank.
//! - `due_date`, when set, is an ISO calendar date (`YYYY-MM-DD`).

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

// chrono accepts short years and unpadded fields; the stored shape is fixed.
static DUE_DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid due date regex"));

/// Opaque task identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an existing identifier, e.g. one read from a stored document.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh identifier of the form `task-<uuid>`.
    pub fn generate() -> Self {
        Self(format!("task-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Priority tag shown on every task card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parses a UI/selector value. Case and surrounding whitespace are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for a single task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyId,
    BlankContent(TaskId),
    InvalidDueDate { id: TaskId, value: String },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::BlankContent(id) => write!(f, "task {id} has blank content"),
            Self::InvalidDueDate { id, value } => {
                write!(f, "task {id} has invalid due date `{value}`; expected YYYY-MM-DD")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Unit of work placed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl Task {
    /// Creates a task with a generated id and `Medium` priority.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(TaskId::generate(), content)
    }

    /// Creates a task with a caller-provided id.
    pub fn with_id(id: TaskId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            description: None,
            due_date: None,
            priority: Priority::default(),
        }
    }

    /// Checks field-level invariants.
    ///
    /// # Errors
    /// - `EmptyId` when the id is blank.
    /// - `BlankContent` when content is empty or whitespace-only.
    /// - `InvalidDueDate` when `due_date` is set but not `YYYY-MM-DD`.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if is_blank(&self.content) {
            return Err(TaskValidationError::BlankContent(self.id.clone()));
        }
        if let Some(value) = self.due_date.as_deref() {
            if !is_valid_due_date(value) {
                return Err(TaskValidationError::InvalidDueDate {
                    id: self.id.clone(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Returns whether `value` is an ISO calendar date (`YYYY-MM-DD`).
pub fn is_valid_due_date(value: &str) -> bool {
    DUE_DATE_SHAPE_RE.is_match(value) && NaiveDate::parse_from_str(value, DUE_DATE_FORMAT).is_ok()
}

/// Blank means empty or whitespace-only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
