//! Where the task files live.
//!
//! Both files sit in one data directory under their default names unless a
//! path is given for either of them explicitly.

use std::path::{Path, PathBuf};

use crate::codec::Format;

/// Environment variable naming the data directory.
pub const DIR_ENV: &str = "PLANNER_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config::resolve(Path::new("."), None, None)
    }
}

impl Config {
    /// Default file names inside `dir`, with explicit overrides taking precedence.
    pub fn resolve(dir: &Path, csv: Option<PathBuf>, json: Option<PathBuf>) -> Self {
        Config {
            csv_path: csv.unwrap_or_else(|| dir.join(Format::Csv.default_file_name())),
            json_path: json.unwrap_or_else(|| dir.join(Format::Json.default_file_name())),
        }
    }

    pub fn path_for(&self, format: Format) -> &Path {
        match format {
            Format::Csv => &self.csv_path,
            Format::Json => &self.json_path,
        }
    }
}
