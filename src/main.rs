//! # todo - Daily To-Do List Manager
//!
//! A small, file-backed to-do list manager with a scriptable CLI and an
//! interactive terminal user interface (TUI).
//!
//! ## Key Features
//!
//! - **One JSON file**: the whole collection lives in a single document,
//!   easy to inspect, back up or source control.
//! - **Filter, search, sort**: completion filter (`all` / `completed` /
//!   `not-completed`), case-insensitive search over subject and text, and
//!   a persisted reorder by due date (`newest` / `oldest`).
//! - **Dual Interface**: full CLI for automation plus an interactive TUI
//!   with add/edit dialogs, delete confirmation and a live clock.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! todo ui
//!
//! # Add a task via CLI
//! todo add Math "Finish exercise sheet 3" --due 2026-09-01
//!
//! # List pending tasks mentioning "exercise"
//! todo list --filter not-completed --search exercise
//!
//! # Complete, edit, reorder, delete
//! todo toggle <ID>
//! todo edit <ID> --due 2026-09-08
//! todo sort oldest
//! todo delete <ID>
//! ```
//!
//! Data is stored in `~/.todo/tasks.json`; pass `--db` to use another
//! file (handy for separate lists or tests).

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod form;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use store::TaskStore;

fn main() {
    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_dir = PathBuf::from(home).join(".todo");
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
        data_dir.join("tasks.json")
    });

    let mut store = TaskStore::open(&db_path);

    match cli.command {
        Commands::Ui => cmd_ui(store),
        Commands::Add { subject, text, due } => cmd_add(&mut store, subject, text, due),
        Commands::List { filter, search } => cmd_list(&store, filter, &search),
        Commands::Toggle { id } => cmd_toggle(&mut store, id),
        Commands::Edit {
            id,
            subject,
            text,
            due,
        } => cmd_edit(&mut store, id, subject, text, due),
        Commands::Delete { id, yes } => cmd_delete(&mut store, id, yes),
        Commands::Sort { order } => cmd_sort(&mut store, order),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}
