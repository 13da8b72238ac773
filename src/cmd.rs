//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers behind each subcommand, from
//! the basic CRUD operations to the persisted reorder and the TUI
//! launcher. Handlers receive the open `TaskStore` from `main`; the store
//! takes care of flushing every mutation itself.

use std::io::{self, Write};

use chrono::NaiveDate;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::store::{SortOrder, TaskStore};
use crate::tui::run::run_tui;
use crate::view::{print_table, visible_tasks, FilterMode};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Add a new task.
    Add {
        /// Subject the task belongs to.
        subject: String,
        /// The task text itself (quoted if it has spaces).
        text: String,
        /// Due date in YYYY-MM-DD.
        #[arg(long)]
        due: String,
    },

    /// List tasks with optional filter and search.
    List {
        /// Completion filter: all | completed | not-completed.
        #[arg(long, value_enum, default_value_t = FilterMode::All)]
        filter: FilterMode,
        /// Case-insensitive substring matched against subject and text.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Toggle a task between done and pending.
    Toggle {
        /// Task id.
        id: i64,
    },

    /// Edit a task's subject, text or due date.
    Edit {
        /// Task id.
        id: i64,
        /// New subject.
        #[arg(long)]
        subject: Option<String>,
        /// New task text.
        #[arg(long)]
        text: Option<String>,
        /// New due date in YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
    },

    /// Delete a task.
    Delete {
        /// Task id.
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Reorder all tasks by due date and persist the new order.
    Sort {
        /// newest (latest due date first) or oldest.
        #[arg(value_enum)]
        order: SortOrder,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(store: TaskStore) {
    if let Err(e) = run_tui(store) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the collection.
pub fn cmd_add(store: &mut TaskStore, subject: String, text: String, due: String) {
    match store.create(&subject, &text, &due) {
        Ok(task) => println!("Added task {} (#{})", task.id, task.number),
        Err(e) => {
            eprintln!("Cannot add task: {e}");
            std::process::exit(1);
        }
    }
}

/// List tasks matching the filter and search, in stored order.
pub fn cmd_list(store: &TaskStore, filter: FilterMode, search: &str) {
    let visible = visible_tasks(store.all(), filter, search);
    if visible.is_empty() {
        println!("No tasks found.");
        return;
    }
    print_table(&visible);
}

/// Toggle completion on a task.
pub fn cmd_toggle(store: &mut TaskStore, id: i64) {
    if store.get(id).is_none() {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    }
    store.toggle_complete(id);
    let done = store.get(id).map(|t| t.completed).unwrap_or(false);
    println!(
        "Task {id} marked as {}.",
        if done { "done" } else { "pending" }
    );
}

/// Edit a task. Unspecified fields keep their current value.
pub fn cmd_edit(
    store: &mut TaskStore,
    id: i64,
    subject: Option<String>,
    text: Option<String>,
    due: Option<String>,
) {
    let Some(current) = store.get(id).cloned() else {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    };

    let due_date = match due {
        Some(d) => match NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                eprintln!("Invalid due date '{}': {}. Use YYYY-MM-DD.", d, e);
                std::process::exit(1);
            }
        },
        None => current.due_date,
    };
    let subject = subject.unwrap_or(current.subject);
    let text = text.unwrap_or(current.text);
    if subject.trim().is_empty() || text.trim().is_empty() {
        eprintln!("Subject and task text cannot be empty.");
        std::process::exit(1);
    }

    store.edit(id, &subject, &text, due_date);
    println!("Task {id} updated.");
}

/// Delete a task after confirmation.
pub fn cmd_delete(store: &mut TaskStore, id: i64, yes: bool) {
    let Some(task) = store.get(id) else {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    };

    if !yes {
        print!(
            "Delete task {} \"{}\"? This cannot be undone. [y/N] ",
            task.number, task.subject
        );
        let mut input = String::new();
        if io::stdout().flush().is_err() || io::stdin().read_line(&mut input).is_err() {
            eprintln!("Aborted.");
            std::process::exit(1);
        }
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }

    store.delete(id);
    println!("Task {id} deleted.");
}

/// Reorder the collection by due date.
pub fn cmd_sort(store: &mut TaskStore, order: SortOrder) {
    store.sort_by(order);
    let label = match order {
        SortOrder::Newest => "newest",
        SortOrder::Oldest => "oldest",
    };
    println!("Tasks reordered by {label} due date.");
}

/// Generate shell completion scripts on stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "todo", &mut io::stdout());
}
