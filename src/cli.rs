use std::path::PathBuf;

use clap::Parser;
use task_planner::config::{Config, DIR_ENV};

use crate::cmd::Commands;

/// File-backed task planner.
/// The task list lives in ./tasks.csv unless --dir or --csv says otherwise.
#[derive(Parser)]
#[command(name = "planner", version, about = "Task planner with CSV and JSON storage")]
pub struct Cli {
    /// Directory holding tasks.csv and tasks.json.
    #[arg(long, global = true, env = DIR_ENV, default_value = ".")]
    pub dir: PathBuf,

    /// Path to the CSV file (overrides --dir).
    #[arg(long, global = true)]
    pub csv: Option<PathBuf>,

    /// Path to the JSON file (overrides --dir).
    #[arg(long, global = true)]
    pub json_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::resolve(&self.dir, self.csv.clone(), self.json_file.clone())
    }
}
