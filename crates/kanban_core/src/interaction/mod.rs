//! Transient UI interaction state.
//!
//! # Responsibility
//! - Track in-flight drag gestures and open add/edit forms.
//! - Translate completed gestures into reducer actions.
//!
//! # Invariants
//! - Nothing here mutates a board; boards only change through `reduce`.
//! - At most one drag, one add form and one edit form are active at a time.

pub mod drag_drop;
pub mod form;
