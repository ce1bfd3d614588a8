//! Flutter bridge for the Kanban board core.

pub mod api;
