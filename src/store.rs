//! In-memory task store and input helpers.
//!
//! This module provides the `TaskStore` struct that owns the task collection and
//! hands out ids, along with deadline input parsing used by front ends.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::codec::{self, Format, SkippedRecord};
use crate::error::{Error, Result};
use crate::fields::*;
use crate::task::{has_line_break, Task, MAX_ID};

/// Field changes for [`TaskStore::update`]. `None` leaves a field untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the deadline.
    pub deadline: Option<Option<NaiveDate>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
    }
}

/// Outcome of [`TaskStore::load_from`] when the file existed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// In-memory collection of tasks with id allocation.
#[derive(Debug)]
pub struct TaskStore<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    next_id: u64,
    clock: C,
}

impl Default for TaskStore<SystemClock> {
    fn default() -> Self {
        TaskStore::new(SystemClock)
    }
}

impl<C: Clock> TaskStore<C> {
    pub fn new(clock: C) -> Self {
        TaskStore {
            tasks: Vec::new(),
            next_id: 1,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Id the next `create` will hand out.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Current tasks in insertion order.
    pub fn snapshot(&self) -> &[Task] {
        &self.tasks
    }

    /// Add a task stamped with the current time.
    ///
    /// The title must not be blank and neither text field may contain a line
    /// break. Fails with [`Error::IdsExhausted`] once every id has been used.
    pub fn create(
        &mut self,
        title: &str,
        description: &str,
        status: Status,
        priority: Priority,
        deadline: Option<NaiveDate>,
    ) -> Result<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation("Title cannot be empty"));
        }
        let description = description.trim();
        check_single_line("Title", title)?;
        check_single_line("Description", description)?;
        if self.next_id > MAX_ID {
            return Err(Error::IdsExhausted);
        }

        let now = self.clock.now();
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Task::new(
            id,
            title,
            description,
            status,
            priority,
            deadline,
            now,
            now,
        ));
        debug!(id, "created task");
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn find_by_id(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Apply the supplied field changes and refresh `updated_at`.
    ///
    /// Nothing is modified when the task is missing, the new title is blank
    /// or a new text field contains a line break.
    pub fn update(&mut self, id: u64, changes: TaskUpdate) -> Result<&Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id() == id)
            .ok_or(Error::NotFound(id))?;

        let title = match changes.title {
            Some(t) if t.trim().is_empty() => {
                return Err(Error::validation("Title cannot be empty"));
            }
            Some(t) => Some(t.trim().to_string()),
            None => None,
        };
        if let Some(title) = &title {
            check_single_line("Title", title)?;
        }
        if let Some(desc) = &changes.description {
            check_single_line("Description", desc.trim())?;
        }

        let now = self.clock.now();
        let task = &mut self.tasks[idx];
        if let Some(title) = title {
            task.set_title(title, now);
        }
        if let Some(desc) = changes.description {
            task.set_description(desc.trim().to_string(), now);
        }
        if let Some(status) = changes.status {
            task.set_status(status, now);
        }
        if let Some(priority) = changes.priority {
            task.set_priority(priority, now);
        }
        if let Some(deadline) = changes.deadline {
            task.set_deadline(deadline, now);
        }
        Ok(&self.tasks[idx])
    }

    /// Remove a task. Returns whether anything was removed.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id() != id);
        self.tasks.len() != before
    }

    /// Swap in a freshly decoded collection and reset id allocation past it.
    ///
    /// A task whose id already appeared earlier in `tasks` is dropped, as is
    /// one whose id is above [`MAX_ID`].
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(tasks.len());
        for task in tasks {
            if task.id() > MAX_ID {
                warn!(id = task.id(), title = task.title(), "dropping task with out-of-range id");
            } else if seen.insert(task.id()) {
                kept.push(task);
            } else {
                warn!(id = task.id(), title = task.title(), "dropping task with duplicate id");
            }
        }
        self.next_id = kept.iter().map(|t| t.id() + 1).max().unwrap_or(1);
        self.tasks = kept;
    }

    /// Write the collection to `path` in the given format.
    pub fn save_to(&self, format: Format, path: &Path) -> Result<()> {
        codec::save(format.codec(), path, &self.tasks)?;
        debug!(count = self.tasks.len(), path = %path.display(), ?format, "saved tasks");
        Ok(())
    }

    /// Replace the collection with the contents of `path`.
    ///
    /// A missing file loads nothing and leaves the store untouched (`Ok(None)`).
    pub fn load_from(&mut self, format: Format, path: &Path) -> Result<Option<LoadReport>> {
        let Some(decoded) = codec::load(format.codec(), path)? else {
            debug!(path = %path.display(), "no file to load");
            return Ok(None);
        };
        self.replace_all(decoded.tasks);
        debug!(count = self.tasks.len(), path = %path.display(), ?format, "loaded tasks");
        Ok(Some(LoadReport {
            loaded: self.tasks.len(),
            skipped: decoded.skipped,
        }))
    }
}

/// Parse a deadline typed by a person.
///
/// Supports:
/// - "DD.MM.YYYY" and "YYYY-MM-DD"
/// - "today", "tomorrow"
/// - "in 3d", "in 2w"
pub fn parse_deadline_input(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim().to_lowercase();
    let out_of_range = || Error::validation(format!("Date '{s}' is out of range"));
    match s.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return today.succ_opt().ok_or_else(out_of_range),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Duration::try_days(days)
                    .and_then(|d| today.checked_add_signed(d))
                    .ok_or_else(out_of_range);
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Duration::try_weeks(weeks)
                    .and_then(|d| today.checked_add_signed(d))
                    .ok_or_else(out_of_range);
            }
        }
    }

    NaiveDate::parse_from_str(&s, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
        .map_err(|_| Error::validation(format!("Invalid date '{s}', expected DD.MM.YYYY")))
}

fn check_single_line(field: &str, value: &str) -> Result<()> {
    if has_line_break(value) {
        return Err(Error::validation(format!("{field} cannot contain line breaks")));
    }
    Ok(())
}

/// Last calendar day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> TaskStore<FixedClock> {
        TaskStore::new(FixedClock::new(date(2024, 5, 1).and_hms_opt(10, 0, 0).unwrap()))
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let mut store = store();
        let mut last = 0;
        for title in ["one", "two", "three"] {
            let id = store
                .create(title, "", Status::Todo, Priority::Low, None)
                .unwrap()
                .id();
            assert!(id > last);
            assert_eq!(store.find_by_id(id).unwrap().title(), title);
            last = id;
        }
        assert_eq!(store.next_id(), 4);
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let mut store = store();
        let err = store
            .create("   ", "desc", Status::Todo, Priority::High, None)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 1);
    }

    #[test]
    fn test_create_stamps_both_timestamps() {
        let mut store = store();
        let now = store.clock().now();
        let task = store
            .create("Plan", "", Status::Todo, Priority::Medium, None)
            .unwrap();
        assert_eq!(task.created_at(), now);
        assert_eq!(task.updated_at(), now);
    }

    #[test]
    fn test_update_applies_supplied_fields_only() {
        let mut store = store();
        let id = store
            .create("Plan", "Quarterly", Status::Todo, Priority::Medium, Some(date(2024, 5, 10)))
            .unwrap()
            .id();
        store.clock().advance(Duration::minutes(30));

        let task = store
            .update(
                id,
                TaskUpdate {
                    status: Some(Status::InProgress),
                    deadline: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(task.title(), "Plan");
        assert_eq!(task.description(), "Quarterly");
        assert_eq!(task.status(), Status::InProgress);
        assert_eq!(task.priority(), Priority::Medium);
        assert_eq!(task.deadline(), None);
        assert_eq!(task.updated_at() - task.created_at(), Duration::minutes(30));
    }

    #[test]
    fn test_update_missing_and_invalid() {
        let mut store = store();
        let id = store
            .create("Plan", "", Status::Todo, Priority::Medium, None)
            .unwrap()
            .id();

        assert!(matches!(
            store.update(42, TaskUpdate::default()),
            Err(Error::NotFound(42))
        ));

        store.clock().advance(Duration::minutes(1));
        let err = store
            .update(
                id,
                TaskUpdate {
                    title: Some(" ".into()),
                    status: Some(Status::Done),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let task = store.find_by_id(id).unwrap();
        assert_eq!(task.status(), Status::Todo);
        assert_eq!(task.updated_at(), task.created_at());
    }

    #[test]
    fn test_delete() {
        let mut store = store();
        let a = store.create("a", "", Status::Todo, Priority::Low, None).unwrap().id();
        let b = store.create("b", "", Status::Todo, Priority::Low, None).unwrap().id();
        assert!(store.delete(a));
        assert!(!store.delete(a));
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.snapshot()[0].id(), b);

        // Ids are never reused after a delete.
        let c = store.create("c", "", Status::Todo, Priority::Low, None).unwrap().id();
        assert_eq!(c, 3);
    }

    #[test]
    fn test_replace_all_recomputes_next_id() {
        let mut store = store();
        let at = store.clock().now();
        let make = |id| Task::new(id, "t", "", Status::Todo, Priority::Low, None, at, at);

        store.replace_all(vec![make(2), make(9), make(5)]);
        assert_eq!(store.next_id(), 10);
        let ids: Vec<u64> = store.snapshot().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![2, 9, 5]);

        store.replace_all(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 1);
    }

    #[test]
    fn test_replace_all_drops_duplicate_ids() {
        let mut store = store();
        let at = store.clock().now();
        store.replace_all(vec![
            Task::new(3, "first", "", Status::Todo, Priority::Low, None, at, at),
            Task::new(3, "second", "", Status::Done, Priority::Low, None, at, at),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id(3).unwrap().title(), "first");
    }

    #[test]
    fn test_parse_deadline_input() {
        let today = date(2024, 12, 20);
        assert_eq!(parse_deadline_input("25.12.2024", today).unwrap(), date(2024, 12, 25));
        assert_eq!(parse_deadline_input("2025-01-03", today).unwrap(), date(2025, 1, 3));
        assert_eq!(parse_deadline_input("Today", today).unwrap(), today);
        assert_eq!(parse_deadline_input("tomorrow", today).unwrap(), date(2024, 12, 21));
        assert_eq!(parse_deadline_input("in 3d", today).unwrap(), date(2024, 12, 23));
        assert_eq!(parse_deadline_input("in 2w", today).unwrap(), date(2025, 1, 3));
        assert!(matches!(
            parse_deadline_input("31.02.2024", today),
            Err(Error::Validation(_))
        ));
        assert!(parse_deadline_input("next year", today).is_err());
    }

    #[test]
    fn test_end_of_month() {
        assert_eq!(end_of_month(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(end_of_month(date(2023, 12, 31)), date(2023, 12, 31));
        assert_eq!(end_of_month(date(2024, 4, 1)), date(2024, 4, 30));
    }

    #[test]
    fn test_parse_deadline_input_out_of_range() {
        let today = date(2024, 6, 3);
        for input in ["in 999999999d", "in 99999999999999999w", "in -999999999d"] {
            assert!(
                matches!(parse_deadline_input(input, today), Err(Error::Validation(_))),
                "{input}"
            );
        }
        assert!(parse_deadline_input("tomorrow", NaiveDate::MAX).is_err());
    }

    #[test]
    fn test_line_breaks_rejected_in_text_fields() {
        let mut store = store();
        for (title, desc) in [("first\nsecond", ""), ("ok", "line1\r\nline2")] {
            let err = store
                .create(title, desc, Status::Todo, Priority::Low, None)
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 1);

        let id = store.create("ok", "", Status::Todo, Priority::Low, None).unwrap().id();
        let err = store
            .update(
                id,
                TaskUpdate {
                    description: Some("a\nb".into()),
                    status: Some(Status::Done),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.find_by_id(id).unwrap().status(), Status::Todo);
    }

    #[test]
    fn test_ids_exhausted_fails_cleanly() {
        let mut store = store();
        let at = store.clock().now();
        let make = |id| Task::new(id, "t", "", Status::Todo, Priority::Low, None, at, at);

        store.replace_all(vec![make(3), make(u64::MAX)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.next_id(), 4);

        store.replace_all(vec![make(MAX_ID - 1)]);
        assert_eq!(store.next_id(), MAX_ID);
        let last = store.create("last", "", Status::Todo, Priority::Low, None).unwrap().id();
        assert_eq!(last, MAX_ID);

        let err = store
            .create("one too many", "", Status::Todo, Priority::Low, None)
            .unwrap_err();
        assert!(matches!(err, Error::IdsExhausted));
        assert_eq!(store.len(), 2);
    }
}
