//! Text encodings for the task collection and the file I/O around them.
//!
//! Two hand-written formats are supported, a `;`-delimited table ([`CsvCodec`])
//! and a JSON-like array ([`JsonCodec`]). Decoding is fault isolated: a
//! malformed record is skipped and reported in [`Decoded::skipped`] while the
//! rest of the file still loads.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;

use crate::error::{DecodeRecordError, Error, Result};
use crate::task::{Task, MAX_ID};

pub mod csv;
pub mod json;

pub use self::csv::CsvCodec;
pub use self::json::JsonCodec;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATETIME_FORMAT_NO_SECONDS: &str = "%Y-%m-%dT%H:%M";

/// A text encoding of the whole task collection.
pub trait Codec {
    fn encode(&self, tasks: &[Task]) -> String;

    /// Decode as many records as possible from `text`.
    fn decode(&self, text: &str) -> Decoded;
}

/// Result of decoding a file: the records that parsed, and the ones that didn't.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub tasks: Vec<Task>,
    pub skipped: Vec<SkippedRecord>,
}

/// A record the decoder gave up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 1-based line number (CSV) or object index (JSON).
    pub position: usize,
    pub error: DecodeRecordError,
}

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            Format::Csv => &CsvCodec,
            Format::Json => &JsonCodec,
        }
    }

    /// File name used when no explicit path is configured.
    pub fn default_file_name(self) -> &'static str {
        match self {
            Format::Csv => "tasks.csv",
            Format::Json => "tasks.json",
        }
    }
}

/// Encode `tasks` and write them to `path` using a temp file + rename.
pub fn save(codec: &dyn Codec, path: &Path, tasks: &[Task]) -> Result<()> {
    let tmp = temp_path(path);
    let data = codec.encode(tasks);
    let written = File::create(&tmp).and_then(|mut f| {
        f.write_all(data.as_bytes())?;
        f.flush()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::io(path, e));
    }
    Ok(())
}

/// Read and decode `path`. A file that does not exist yields `Ok(None)`.
pub fn load(codec: &dyn Codec, path: &Path) -> Result<Option<Decoded>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(codec.decode(&text))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_datetime(at: NaiveDateTime) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

/// Empty input means "no deadline".
pub(crate) fn parse_optional_date(s: &str) -> std::result::Result<Option<NaiveDate>, DecodeRecordError> {
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DecodeRecordError::InvalidDate(s.to_string()))
}

pub(crate) fn parse_datetime(s: &str) -> std::result::Result<NaiveDateTime, DecodeRecordError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT_NO_SECONDS))
        .map_err(|_| DecodeRecordError::InvalidTimestamp(s.to_string()))
}

/// Ids above [`MAX_ID`] are rejected so the store can always allocate past them.
pub(crate) fn parse_id(s: &str) -> std::result::Result<u64, DecodeRecordError> {
    s.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id <= MAX_ID)
        .ok_or_else(|| DecodeRecordError::InvalidId(s.to_string()))
}

/// Replace each line break (`\r\n`, `\n` or `\r`) with a single space.
pub(crate) fn fold_line_breaks(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
