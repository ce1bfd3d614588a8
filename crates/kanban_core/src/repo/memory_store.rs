//! In-process document store.
//!
//! Used by tests and embedders that do not want a database file. Read and
//! write failures can be switched on to exercise soft-failure paths.

use crate::repo::board_store::{normalize_board_id, BoardDocumentStore, RepoError, RepoResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryBoardStore {
    documents: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates one document, bypassing the write counter.
    pub fn with_document(board_id: &str, body: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .documents
            .borrow_mut()
            .insert(board_id.trim().to_string(), body.into());
        store
    }

    pub fn document(&self, board_id: &str) -> Option<String> {
        self.documents.borrow().get(board_id.trim()).cloned()
    }

    /// Successful writes since construction.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl BoardDocumentStore for MemoryBoardStore {
    fn read_document(&self, board_id: &str) -> RepoResult<Option<String>> {
        let board_id = normalize_board_id(board_id)?;
        if self.fail_reads.get() {
            return Err(RepoError::Unavailable("read failure injected".to_string()));
        }
        Ok(self.documents.borrow().get(board_id).cloned())
    }

    fn write_document(&self, board_id: &str, body: &str) -> RepoResult<()> {
        let board_id = normalize_board_id(board_id)?;
        if self.fail_writes.get() {
            return Err(RepoError::Unavailable("write failure injected".to_string()));
        }
        self.documents
            .borrow_mut()
            .insert(board_id.to_string(), body.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
