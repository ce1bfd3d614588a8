//! Board reconciliation.
//!
//! # Responsibility
//! - Describe every state-changing user action as a [`BoardAction`].
//! - Map `(snapshot, action)` to a new consistent snapshot with a pure reducer.
//!
//! # Invariants
//! - The input snapshot is never mutated.
//! - Invalid input and unknown ids produce [`Reduction::Unchanged`], never an
//!   error or panic.

pub mod action;
pub mod reducer;
