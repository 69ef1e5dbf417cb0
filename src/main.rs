//! # planner - task planner CLI
//!
//! One-shot command line front end for the `task_planner` library.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task due on Christmas
//! planner add "Buy presents" --priority high --due 25.12.2024
//!
//! # List tasks, most urgent first
//! planner list
//!
//! # What is due this week?
//! planner upcoming
//!
//! # Keep a JSON copy next to the CSV
//! planner export --format json
//! ```
//!
//! Tasks are kept in `tasks.csv` in the data directory (`--dir`, or the
//! `PLANNER_DIR` environment variable, default `.`). Every command loads that
//! file first and commands that change tasks write it back.
//!
//! Set `RUST_LOG=debug` to see what is loaded and saved.

use clap::Parser;
use task_planner::SystemClock;

mod cli;
mod cmd;

use cli::Cli;
use cmd::*;

fn main() {
    // Default to WARN so skipped records are reported but nothing else is.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CmdResult {
    let config = cli.config();

    let open = || open_store(SystemClock, &config.csv_path);

    match cli.command {
        Commands::Add {
            title,
            desc,
            status,
            priority,
            due,
        } => cmd_add(&mut open()?, &config, title, desc, status, priority, due),

        Commands::List {
            status,
            priority,
            due,
            overdue,
            recent,
            limit,
            json,
        } => cmd_list(&open()?, status, priority, due, overdue, recent, limit, json),

        Commands::View { id, json } => cmd_view(&open()?, id, json),

        Commands::Update {
            id,
            title,
            desc,
            status,
            priority,
            due,
            clear_due,
        } => cmd_update(&mut open()?, &config, id, title, desc, status, priority, due, clear_due),

        Commands::Delete { id } => cmd_delete(&mut open()?, &config, id),

        Commands::Search { query, json } => cmd_search(&open()?, &query, json),

        Commands::Stats { json } => cmd_stats(&open()?, json),

        Commands::Upcoming { json } => cmd_upcoming(&open()?, json),

        Commands::Export { format, output } => cmd_export(&open()?, &config, format, output),

        Commands::Import { format, input } => cmd_import(&mut open()?, &config, format, input),

        // No task file is touched for completions.
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
