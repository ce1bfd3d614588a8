//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `kanban_core` linkage and print the persisted board.
//! - Honour the same `KANBAN_*` environment overrides as the app bridge.

use kanban_core::{init_logging_from_config, BoardConfig, BoardSession, SqliteBoardStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("kanban_core ping={}", kanban_core::ping());
    println!("kanban_core version={}", kanban_core::core_version());

    let config = BoardConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let store = match SqliteBoardStore::open(&config.db_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut session = BoardSession::new(store, config.board_id.clone());
    session.load();
    println!("board={} db={}", session.board_id(), config.db_path.display());

    let board = session.board();
    for column in board.ordered_columns() {
        println!("[{}] {}", column.id, column.title);
        for task in board.tasks_in(&column.id) {
            match task.due_date.as_deref() {
                Some(due) => println!("  - ({}) {} due {}", task.priority, task.content, due),
                None => println!("  - ({}) {}", task.priority, task.content),
            }
        }
    }
    ExitCode::SUCCESS
}
