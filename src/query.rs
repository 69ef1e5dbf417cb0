//! Read-only queries over a snapshot of tasks.
//!
//! Every function here takes a slice (usually [`TaskStore::snapshot`]) and
//! returns borrowed tasks; nothing mutates. Functions that depend on the date
//! take `today` explicitly so callers decide which clock to trust.
//!
//! [`TaskStore::snapshot`]: crate::store::TaskStore::snapshot

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fields::*;
use crate::store::end_of_month;
use crate::task::Task;

/// Maximum number of tasks returned by [`recently_updated`].
pub const RECENT_LIMIT: usize = 10;
/// Number of tasks listed in [`Statistics::oldest_open`].
pub const OLDEST_OPEN_LIMIT: usize = 3;
/// Days ahead (inclusive) covered by "this week" and [`upcoming`].
pub const WEEK_DAYS: i64 = 7;

/// A single filter a front end can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Status(Status),
    Priority(Priority),
    Deadline(DeadlineWindow),
    Overdue,
    RecentlyUpdated,
}

impl Filter {
    pub fn apply(self, tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
        match self {
            Filter::Status(s) => by_status(tasks, s),
            Filter::Priority(p) => by_priority(tasks, p),
            Filter::Deadline(w) => by_deadline_window(tasks, w, today),
            Filter::Overdue => overdue(tasks, today),
            Filter::RecentlyUpdated => recently_updated(tasks),
        }
    }
}

/// Priority rank, then deadline (unset last), then id.
pub fn compare_default(a: &Task, b: &Task) -> Ordering {
    a.priority()
        .rank()
        .cmp(&b.priority().rank())
        .then(
            a.deadline()
                .unwrap_or(NaiveDate::MAX)
                .cmp(&b.deadline().unwrap_or(NaiveDate::MAX)),
        )
        .then(a.id().cmp(&b.id()))
}

/// All tasks in display order, see [`compare_default`].
pub fn default_order(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| compare_default(a, b));
    sorted
}

pub fn by_status(tasks: &[Task], status: Status) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status() == status).collect()
}

pub fn by_priority(tasks: &[Task], priority: Priority) -> Vec<&Task> {
    tasks.iter().filter(|t| t.priority() == priority).collect()
}

/// Tasks whose deadline falls in `window`, counted from `today`.
pub fn by_deadline_window(tasks: &[Task], window: DeadlineWindow, today: NaiveDate) -> Vec<&Task> {
    let in_range = |d: NaiveDate, end: NaiveDate| d >= today && d <= end;
    tasks
        .iter()
        .filter(|t| match (window, t.deadline()) {
            (DeadlineWindow::None, d) => d.is_none(),
            (_, None) => false,
            (DeadlineWindow::Today, Some(d)) => d == today,
            (DeadlineWindow::ThisWeek, Some(d)) => in_range(d, today + Duration::days(WEEK_DAYS)),
            (DeadlineWindow::ThisMonth, Some(d)) => in_range(d, end_of_month(today)),
        })
        .collect()
}

pub fn overdue(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_overdue(today)).collect()
}

/// Most recently changed first, at most [`RECENT_LIMIT`].
pub fn recently_updated(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
    sorted.truncate(RECENT_LIMIT);
    sorted
}

/// Case-insensitive substring search over title and description.
pub fn search<'a>(tasks: &'a [Task], query: &str) -> Result<Vec<&'a Task>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(Error::validation("Search query cannot be empty"));
    }
    Ok(tasks.iter().filter(|t| t.matches_lowercase(&needle)).collect())
}

/// Count of tasks in one status bucket and its share of the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Share {
    pub count: usize,
    /// Percentage of all tasks, 0.0 when there are none.
    pub percent: f64,
}

impl Share {
    fn of(count: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        };
        Share { count, percent }
    }
}

/// Aggregate figures over a whole collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics<'a> {
    pub total: usize,
    pub done: Share,
    pub in_progress: Share,
    pub todo: Share,
    /// Cancelled tasks are in `total` but in none of the three shares above.
    pub cancelled: usize,
    pub overdue: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Oldest tasks not yet done, by creation time.
    pub oldest_open: Vec<&'a Task>,
}

pub fn statistics(tasks: &[Task], today: NaiveDate) -> Statistics<'_> {
    let mut status_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let (mut overdue, mut high, mut medium, mut low) = (0, 0, 0, 0);

    for t in tasks {
        *status_counts.entry(t.status().wire_name()).or_default() += 1;
        if t.is_overdue(today) {
            overdue += 1;
        }
        match t.priority() {
            Priority::High => high += 1,
            Priority::Medium => medium += 1,
            Priority::Low => low += 1,
        }
    }

    let total = tasks.len();
    let count = |s: Status| status_counts.get(s.wire_name()).copied().unwrap_or(0);

    let mut oldest_open: Vec<&Task> = tasks.iter().filter(|t| t.status() != Status::Done).collect();
    oldest_open.sort_by_key(|t| t.created_at());
    oldest_open.truncate(OLDEST_OPEN_LIMIT);

    Statistics {
        total,
        done: Share::of(count(Status::Done), total),
        in_progress: Share::of(count(Status::InProgress), total),
        todo: Share::of(count(Status::Todo), total),
        cancelled: count(Status::Cancelled),
        overdue,
        high,
        medium,
        low,
        oldest_open,
    }
}

/// Pending tasks due within the next week, grouped by deadline.
///
/// Covers `today ..= today + 7` and leaves out done and cancelled work. Groups
/// are in date order; within a group tasks keep snapshot order.
pub fn upcoming(tasks: &[Task], today: NaiveDate) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let horizon = today + Duration::days(WEEK_DAYS);
    let mut groups: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for t in tasks {
        if matches!(t.status(), Status::Done | Status::Cancelled) {
            continue;
        }
        if let Some(d) = t.deadline() {
            if d >= today && d <= horizon {
                groups.entry(d).or_default().push(t);
            }
        }
    }
    groups
}
