//! Board document store contract and SQLite implementation.
//!
//! # Responsibility
//! - Read and write the whole board document keyed by board id.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - A write replaces the stored body wholesale; there is no merge and no
//!   concurrency check, so the last writer wins.
//! - Reads return the raw body; decoding and repair belong to the codec.

use crate::db::migrations::latest_version;
use crate::db::{open_db, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors surfaced by board document stores.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Board id is empty or whitespace-only.
    InvalidBoardId(String),
    /// Store is unreachable (used by non-SQLite adapters).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidBoardId(value) => write!(f, "invalid board id `{value}`"),
            Self::Unavailable(message) => write!(f, "board store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key-value document boundary for persisted boards.
pub trait BoardDocumentStore {
    /// Returns the stored body, or `None` when no document exists yet.
    fn read_document(&self, board_id: &str) -> RepoResult<Option<String>>;
    /// Overwrites the stored body.
    fn write_document(&self, board_id: &str, body: &str) -> RepoResult<()>;
}

/// SQLite-backed document store.
///
/// Owns its connection so a board session can hold it for its whole life.
pub struct SqliteBoardStore {
    conn: Connection,
}

impl SqliteBoardStore {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// Returns `UninitializedConnection` when migrations were not applied.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    /// Opens the database file at `path` and wraps it.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let conn = open_db(path)?;
        Self::try_new(conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of writes applied to `board_id`, `None` when never written.
    pub fn revision(&self, board_id: &str) -> RepoResult<Option<i64>> {
        let board_id = normalize_board_id(board_id)?;
        let revision = self
            .conn
            .query_row(
                "SELECT revision FROM board_documents WHERE board_id = ?1;",
                [board_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision)
    }
}

impl BoardDocumentStore for SqliteBoardStore {
    fn read_document(&self, board_id: &str) -> RepoResult<Option<String>> {
        let board_id = normalize_board_id(board_id)?;
        let body = self
            .conn
            .query_row(
                "SELECT body FROM board_documents WHERE board_id = ?1;",
                [board_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body)
    }

    fn write_document(&self, board_id: &str, body: &str) -> RepoResult<()> {
        let board_id = normalize_board_id(board_id)?;
        self.conn.execute(
            "INSERT INTO board_documents (board_id, body)
             VALUES (?1, ?2)
             ON CONFLICT(board_id) DO UPDATE SET
                body = excluded.body,
                revision = board_documents.revision + 1,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![board_id, body],
        )?;
        Ok(())
    }
}

/// Trims `board_id` and rejects blank ids.
pub fn normalize_board_id(board_id: &str) -> RepoResult<&str> {
    let trimmed = board_id.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidBoardId(board_id.to_string()));
    }
    Ok(trimmed)
}
