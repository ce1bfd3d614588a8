//! Board domain model.
//!
//! # Responsibility
//! - Define the canonical task/column/board records used by reconciliation.
//! - Own the persisted document shape and its decode/repair rules.
//!
//! # Invariants
//! - Every task is referenced by exactly one column, and every reference
//!   points at an existing task.
//! - Column membership lookups go through the board's placement index, never
//!   through ad-hoc scans.

pub mod board;
pub mod column;
pub mod document;
pub mod task;
