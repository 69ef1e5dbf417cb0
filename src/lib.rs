//! # Task Planner
//!
//! A small task planner core: an in-memory store of tasks with status, priority
//! and an optional deadline, read-only queries over it, and two hand-written
//! file formats to persist it.
//!
//! ## Key Features
//!
//! - **Task store**: id allocation that never reuses ids, field updates that
//!   re-stamp `updated_at`, wholesale replacement after a load
//! - **Queries**: default display order, status/priority/deadline filters,
//!   overdue and recently-updated views, text search, statistics, and the
//!   upcoming week grouped by day
//! - **CSV**: `;`-delimited table with a fixed header
//! - **JSON**: pretty-printed array with a deliberately simple splitter on load
//! - **Fault-isolated loading**: a malformed record is skipped with a warning,
//!   the rest of the file still loads
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use task_planner::{Format, Priority, Status, TaskStore};
//!
//! let mut store = TaskStore::default();
//! store.load_from(Format::Csv, Path::new("tasks.csv"))?;
//! store.create("Write report", "", Status::Todo, Priority::High, None)?;
//! store.save_to(Format::Csv, Path::new("tasks.csv"))?;
//! # Ok::<(), task_planner::Error>(())
//! ```
//!
//! The `planner` binary wraps this in a one-shot command line interface.

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod fields;
pub mod query;
pub mod store;
pub mod task;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{Codec, CsvCodec, Decoded, Format, JsonCodec, SkippedRecord};
pub use config::Config;
pub use error::{DecodeRecordError, Error, Result};
pub use fields::{DeadlineWindow, Priority, Status};
pub use store::{parse_deadline_input, LoadReport, TaskStore, TaskUpdate};
pub use task::{DeadlineState, Task};
