use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed to-do list manager.
/// Storage defaults to ~/.todo/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "todo", version, about = "Daily to-do list manager")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
