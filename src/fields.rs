//! Enumerations and field types for task management.
//!
//! Status and priority values each carry two spellings: a stable wire name used
//! by the CSV and JSON files, and a display label meant for whatever front end
//! shows them to a person. The persisted formats only ever see the wire name.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Cancelled,
    ];

    /// Identifier written to CSV and JSON.
    pub fn wire_name(self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
            Status::Cancelled => "CANCELLED",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "К выполнению",
            Status::InProgress => "В процессе",
            Status::Done => "Выполнено",
            Status::Cancelled => "Отменено",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Status {
    type Err = String;

    /// Parses a wire name. Matching is exact, as written by the encoders.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|st| st.wire_name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank; lower is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "🔴 Высокий",
            Priority::Medium => "🟡 Средний",
            Priority::Low => "🟢 Низкий",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.wire_name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Filtering options for tasks based on deadlines. Bounds are inclusive.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DeadlineWindow {
    /// Deadline is exactly today.
    Today,
    /// Deadline within today ..= today + 7 days.
    ThisWeek,
    /// Deadline within today ..= last day of the current month.
    ThisMonth,
    /// No deadline set.
    None,
}
