//! Region override file source

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::traits::ValueSource;

/// Default location of the region override file, relative to the project
pub const DEFAULT_REGION_FILE: &str = "lib/AWS_REGION";

/// Outcome of reading the region override file
///
/// Only `Value` contributes to resolution; the other variants exist so the
/// "no file" and "file present but unreadable" paths can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionFileRead {
    /// The file does not exist
    Missing,
    /// The file exists but could not be read as text
    Unreadable(io::ErrorKind),
    /// Trimmed file contents (may be empty)
    Value(String),
}

impl RegionFileRead {
    pub fn value(&self) -> Option<&str> {
        match self {
            RegionFileRead::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Source that reads a single-line region override file
///
/// The file is read on every lookup; the resolver only looks it up when every
/// higher-priority region source is absent.
#[derive(Debug, Clone)]
pub struct RegionFileSource {
    path: PathBuf,
}

impl RegionFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `lib/AWS_REGION` under `project_dir`
    pub fn in_project(project_dir: impl AsRef<Path>) -> Self {
        Self::new(project_dir.as_ref().join(DEFAULT_REGION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, classifying every failure instead of propagating it
    pub fn read(&self) -> RegionFileRead {
        match fs::read_to_string(&self.path) {
            Ok(content) => RegionFileRead::Value(content.trim().to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => RegionFileRead::Missing,
            Err(e) => RegionFileRead::Unreadable(e.kind()),
        }
    }
}

impl ValueSource for RegionFileSource {
    fn name(&self) -> &str {
        "file"
    }

    /// The key is ignored; the file holds a single value
    fn get(&self, _key: &str) -> Option<String> {
        self.read().value().map(str::to_string)
    }
}
