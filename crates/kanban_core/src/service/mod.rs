//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate reducer, interaction state and document store into the
//!   session API consumed by UI bridges.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod board_session;
