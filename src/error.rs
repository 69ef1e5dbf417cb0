//! Error types for the task planner.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required field was empty or an input could not be interpreted.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task with ID {0} not found")]
    NotFound(u64),

    #[error("No task ids left to assign")]
    IdsExhausted,

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a single CSV line or JSON object was skipped during decoding.
///
/// These never abort a load; the decoder records them and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeRecordError {
    #[error("expected 8 fields, found {0}")]
    TooFewFields(usize),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid id '{0}'")]
    InvalidId(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("unknown priority '{0}'")]
    UnknownPriority(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

pub type Result<T> = std::result::Result<T, Error>;
