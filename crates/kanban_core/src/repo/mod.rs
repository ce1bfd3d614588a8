//! Document store boundary.
//!
//! # Responsibility
//! - Define the read/write contract for whole-board documents.
//! - Provide the SQLite store used by apps and an in-memory store for tests.
//!
//! # Invariants
//! - Stores deal in opaque document bodies; they never interpret board data.

pub mod board_store;
pub mod memory_store;
