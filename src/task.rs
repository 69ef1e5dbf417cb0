//! Task data structure and related functionality.
//!
//! This module defines the `Task` record: a fixed id plus the mutable business
//! fields (title, description, status, priority, deadline) and the two
//! timestamps that track when it was created and last changed.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::fields::*;

/// Days left within which a pending deadline counts as "due soon".
pub const DUE_SOON_DAYS: i64 = 3;

/// Highest id a task may carry; one above it must still fit as the next id.
pub const MAX_ID: u64 = u64::MAX - 1;

/// A single unit of trackable work.
///
/// Fields are read through accessors. Mutation goes through
/// [`TaskStore::update`](crate::store::TaskStore::update), which re-stamps
/// `updated_at` on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: u64,
    title: String,
    description: String,
    status: Status,
    priority: Priority,
    deadline: Option<NaiveDate>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// How a task's deadline relates to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeadlineState {
    NoDeadline,
    Overdue { days_late: i64 },
    DueSoon { days_left: i64 },
    Upcoming { days_left: i64 },
}

impl Task {
    /// Build a task with every field given, as the decoders do.
    ///
    /// An `updated_at` earlier than `created_at` is raised to `created_at`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        title: impl Into<String>,
        description: impl Into<String>,
        status: Status,
        priority: Priority,
        deadline: Option<NaiveDate>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Self {
        Task {
            id,
            title: title.into(),
            description: description.into(),
            status,
            priority,
            deadline,
            created_at,
            updated_at: updated_at.max(created_at),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    pub(crate) fn set_title(&mut self, title: String, now: NaiveDateTime) {
        self.title = title;
        self.touch(now);
    }

    pub(crate) fn set_description(&mut self, description: String, now: NaiveDateTime) {
        self.description = description;
        self.touch(now);
    }

    pub(crate) fn set_status(&mut self, status: Status, now: NaiveDateTime) {
        self.status = status;
        self.touch(now);
    }

    pub(crate) fn set_priority(&mut self, priority: Priority, now: NaiveDateTime) {
        self.priority = priority;
        self.touch(now);
    }

    pub(crate) fn set_deadline(&mut self, deadline: Option<NaiveDate>, now: NaiveDateTime) {
        self.deadline = deadline;
        self.touch(now);
    }

    // updated_at never drops below created_at, even if the clock went backwards.
    fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = now.max(self.created_at);
    }

    /// Past its deadline and not done. Cancelled tasks still count.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.deadline, Some(d) if d < today) && self.status != Status::Done
    }

    /// Whole days from `today` to the deadline; `i64::MAX` without one.
    pub fn days_until_deadline(&self, today: NaiveDate) -> i64 {
        match self.deadline {
            Some(d) => (d - today).num_days(),
            None => i64::MAX,
        }
    }

    pub fn deadline_state(&self, today: NaiveDate) -> DeadlineState {
        if self.deadline.is_none() {
            return DeadlineState::NoDeadline;
        }
        let days = self.days_until_deadline(today);
        if self.is_overdue(today) {
            DeadlineState::Overdue { days_late: -days }
        } else if days <= DUE_SOON_DAYS {
            DeadlineState::DueSoon { days_left: days }
        } else {
            DeadlineState::Upcoming { days_left: days }
        }
    }

    /// Case-insensitive substring match on title or description.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Text fields are stored one record per line, so they cannot span lines.
pub(crate) fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}
