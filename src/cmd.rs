//! Command implementations for the CLI interface.
//!
//! Each handler works on a store that `main` has already loaded from the CSV
//! file; handlers that change tasks save it back before returning.

use std::collections::HashSet;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;

use task_planner::query::{self, Filter, Statistics};
use task_planner::{
    parse_deadline_input, Clock, Config, DeadlineState, DeadlineWindow, Error, Format, Priority,
    Status, Task, TaskStore, TaskUpdate,
};

pub type CmdResult = Result<(), Box<dyn StdError>>;

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Status: todo | in-progress | done | cancelled.
        #[arg(long, value_enum, default_value_t = Status::Todo)]
        status: Status,
        /// Priority: high | medium | low.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Deadline: DD.MM.YYYY, YYYY-MM-DD, "today", "tomorrow", "in Nd" or "in Nw".
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks, most urgent first.
    List {
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Deadline window: today | this-week | this-month | none.
        #[arg(long, value_enum)]
        due: Option<DeadlineWindow>,
        /// Only overdue tasks.
        #[arg(long)]
        overdue: bool,
        /// The ten most recently updated tasks, newest first.
        #[arg(long)]
        recent: bool,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// View a single task.
    View {
        id: u64,
        #[arg(long)]
        json: bool,
    },

    /// Update fields on a task.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the deadline.
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task.
    Delete { id: u64 },

    /// Search titles and descriptions (case-insensitive).
    Search {
        query: String,
        #[arg(long)]
        json: bool,
    },

    /// Show counts by status and priority, overdue work and the oldest open tasks.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Show pending tasks due within the next seven days, grouped by day.
    Upcoming {
        #[arg(long)]
        json: bool,
    },

    /// Write all tasks to a CSV or JSON file.
    Export {
        #[arg(long, value_enum)]
        format: Format,
        /// Output path (default: the configured file for the format).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace all tasks with the contents of a CSV or JSON file.
    Import {
        #[arg(long, value_enum)]
        format: Format,
        /// Input path (default: the configured file for the format).
        input: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Add a new task and save.
pub fn cmd_add<C: Clock>(
    store: &mut TaskStore<C>,
    config: &Config,
    title: String,
    desc: Option<String>,
    status: Status,
    priority: Priority,
    due: Option<String>,
) -> CmdResult {
    let today = store.clock().today();
    let deadline = due
        .as_deref()
        .map(|s| parse_deadline_input(s, today))
        .transpose()?;
    if let Some(warning) = past_deadline_warning(deadline, today) {
        eprintln!("{warning}");
    }

    let id = store
        .create(&title, desc.as_deref().unwrap_or(""), status, priority, deadline)?
        .id();
    store.save_to(Format::Csv, &config.csv_path)?;
    println!("Added task {id}");
    Ok(())
}

/// List tasks with optional filtering.
#[allow(clippy::too_many_arguments)]
pub fn cmd_list<C: Clock>(
    store: &TaskStore<C>,
    status: Option<Status>,
    priority: Option<Priority>,
    due: Option<DeadlineWindow>,
    overdue: bool,
    recent: bool,
    limit: Option<usize>,
    json: bool,
) -> CmdResult {
    let today = store.clock().today();
    let tasks = store.snapshot();

    let mut rows = if recent {
        query::recently_updated(tasks)
    } else {
        query::default_order(tasks)
    };

    let filters = [
        status.map(Filter::Status),
        priority.map(Filter::Priority),
        due.map(Filter::Deadline),
        overdue.then_some(Filter::Overdue),
    ];
    for filter in filters.into_iter().flatten() {
        let keep: HashSet<u64> = filter.apply(tasks, today).iter().map(|t| t.id()).collect();
        rows.retain(|t| keep.contains(&t.id()));
    }

    if let Some(n) = limit {
        rows.truncate(n);
    }

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    print_table(&rows, today);

    let overdue_total = query::overdue(tasks, today).len();
    if overdue_total > 0 {
        println!("\nWarning: {overdue_total} task(s) overdue.");
    }
    Ok(())
}

/// View detailed information about a specific task.
pub fn cmd_view<C: Clock>(store: &TaskStore<C>, id: u64, json: bool) -> CmdResult {
    let task = store.find_by_id(id).ok_or(Error::NotFound(id))?;
    if json {
        return print_json(task);
    }
    print_details(task, store.clock().today());
    Ok(())
}

/// Update an existing task's fields and save.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update<C: Clock>(
    store: &mut TaskStore<C>,
    config: &Config,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    status: Option<Status>,
    priority: Option<Priority>,
    due: Option<String>,
    clear_due: bool,
) -> CmdResult {
    let today = store.clock().today();
    let deadline = if clear_due {
        Some(None)
    } else {
        due.as_deref()
            .map(|s| parse_deadline_input(s, today))
            .transpose()?
            .map(Some)
    };
    if let Some(warning) = past_deadline_warning(deadline.flatten(), today) {
        eprintln!("{warning}");
    }

    let changes = TaskUpdate {
        title,
        description: desc,
        status,
        priority,
        deadline,
    };
    if changes.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    store.update(id, changes)?;
    store.save_to(Format::Csv, &config.csv_path)?;
    println!("Updated task {id}");
    Ok(())
}

/// Delete a task and save.
pub fn cmd_delete<C: Clock>(store: &mut TaskStore<C>, config: &Config, id: u64) -> CmdResult {
    if !store.delete(id) {
        return Err(Error::NotFound(id).into());
    }
    store.save_to(Format::Csv, &config.csv_path)?;
    println!("Deleted task {id}");
    Ok(())
}

pub fn cmd_search<C: Clock>(store: &TaskStore<C>, query_text: &str, json: bool) -> CmdResult {
    let found = query::search(store.snapshot(), query_text)?;
    if json {
        return print_json(&found);
    }
    if found.is_empty() {
        println!("No tasks found.");
    } else {
        println!("Found {} task(s):", found.len());
        print_table(&found, store.clock().today());
    }
    Ok(())
}

pub fn cmd_stats<C: Clock>(store: &TaskStore<C>, json: bool) -> CmdResult {
    let today = store.clock().today();
    let stats = query::statistics(store.snapshot(), today);
    if json {
        return print_json(&stats);
    }
    print_stats(&stats);
    Ok(())
}

pub fn cmd_upcoming<C: Clock>(store: &TaskStore<C>, json: bool) -> CmdResult {
    let groups = query::upcoming(store.snapshot(), store.clock().today());
    if json {
        return print_json(&groups);
    }
    if groups.is_empty() {
        println!("Nothing due in the next week.");
        return Ok(());
    }
    for (date, tasks) in &groups {
        println!("{}:", format_day(*date));
        for t in tasks {
            println!(
                "  - [#{}] {} ({}, {})",
                t.id(),
                t.title(),
                t.priority().label(),
                t.status().label()
            );
        }
    }
    Ok(())
}

/// Export tasks to CSV or JSON.
pub fn cmd_export<C: Clock>(
    store: &TaskStore<C>,
    config: &Config,
    format: Format,
    output: Option<PathBuf>,
) -> CmdResult {
    let path = output.unwrap_or_else(|| config.path_for(format).to_path_buf());
    store.save_to(format, &path)?;
    println!("Exported {} task(s) to {}", store.len(), path.display());
    Ok(())
}

/// Replace the task list from CSV or JSON, then save it as the primary CSV.
pub fn cmd_import<C: Clock>(
    store: &mut TaskStore<C>,
    config: &Config,
    format: Format,
    input: Option<PathBuf>,
) -> CmdResult {
    let path = input.unwrap_or_else(|| config.path_for(format).to_path_buf());
    let Some(report) = store.load_from(format, &path)? else {
        println!("File {} not found, nothing imported.", path.display());
        return Ok(());
    };
    store.save_to(Format::Csv, &config.csv_path)?;
    println!(
        "Import completed. {} task(s) loaded, {} skipped.",
        report.loaded,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        eprintln!("  record {}: {}", skipped.position, skipped.error);
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Load the primary CSV into a fresh store.
pub fn open_store<C: Clock>(clock: C, csv_path: &Path) -> Result<TaskStore<C>, Error> {
    let mut store = TaskStore::new(clock);
    if let Some(report) = store.load_from(Format::Csv, csv_path)? {
        if !report.skipped.is_empty() {
            eprintln!(
                "Warning: {} malformed record(s) in {} were skipped.",
                report.skipped.len(),
                csv_path.display()
            );
        }
    }
    Ok(store)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<5} {:<13} {:<12} {:<12} {}",
        "ID", "Status", "Priority", "Due", "Title"
    );
    for t in tasks {
        println!(
            "{:<5} {:<13} {:<12} {:<12} {}",
            t.id(),
            t.status().label(),
            t.priority().label(),
            format_due_relative(t.deadline_state(today)),
            truncate(t.title(), 48)
        );
    }
}

fn print_details(task: &Task, today: NaiveDate) {
    println!("ID:           {}", task.id());
    println!("Title:        {}", task.title());
    println!("Status:       {}", task.status().label());
    println!("Priority:     {}", task.priority().label());
    println!(
        "Deadline:     {}",
        match task.deadline() {
            Some(d) => format!("{} ({})", format_day(d), format_due_relative(task.deadline_state(today))),
            None => "-".into(),
        }
    );
    println!("Created:      {}", task.created_at().format("%d.%m.%Y %H:%M"));
    println!("Updated:      {}", task.updated_at().format("%d.%m.%Y %H:%M"));
    println!(
        "Description:\n{}\n",
        if task.description().is_empty() { "-" } else { task.description() }
    );
}

fn print_stats(stats: &Statistics<'_>) {
    println!("Total:        {}", stats.total);
    println!("Done:         {} ({:.1}%)", stats.done.count, stats.done.percent);
    println!("In progress:  {} ({:.1}%)", stats.in_progress.count, stats.in_progress.percent);
    println!("To do:        {} ({:.1}%)", stats.todo.count, stats.todo.percent);
    println!("Cancelled:    {}", stats.cancelled);
    println!("Overdue:      {}", stats.overdue);
    println!();
    println!("{}: {}", Priority::High.label(), stats.high);
    println!("{}: {}", Priority::Medium.label(), stats.medium);
    println!("{}: {}", Priority::Low.label(), stats.low);

    if !stats.oldest_open.is_empty() {
        println!("\nOldest open tasks:");
        for t in &stats.oldest_open {
            println!(
                "  - ID {}: {} (created {})",
                t.id(),
                t.title(),
                t.created_at().format("%d.%m.%Y")
            );
        }
    }
}

fn format_day(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Format a deadline relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn past_deadline_warning(deadline: Option<NaiveDate>, today: NaiveDate) -> Option<String> {
    deadline
        .filter(|d| *d < today)
        .map(|d| format!("Warning: deadline {d} is already in the past."))
}

pub fn format_due_relative(state: DeadlineState) -> String {
    match state {
        DeadlineState::NoDeadline => "-".into(),
        DeadlineState::Overdue { days_late } => format!("{days_late}d late"),
        DeadlineState::DueSoon { days_left } | DeadlineState::Upcoming { days_left } => {
            match days_left {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n < 0 => format!("{}d ago", -n),
                n => format!("in {n}d"),
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
