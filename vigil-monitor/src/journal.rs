//! Newline-delimited JSON journal files.
//!
//! A journal is append-only during normal operation; the retention pass
//! is the only writer that replaces the whole file, and it does so via a
//! temp-file-and-rename so a crash mid-rewrite never leaves a half
//! written journal behind.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::tracing::prelude::*;

#[derive(Clone, Debug)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one record as a single line. Each append is one write call,
    /// so lines from different producers never interleave mid-record.
    pub fn append<T: Serialize>(&self, record: &T) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Read every parseable record. A missing or unreadable file counts
    /// as empty, and corrupt lines are dropped; journal integrity is
    /// best-effort by design.
    pub fn read_all<T: DeserializeOwned>(&self) -> Vec<T> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                trace!(path = %self.path.display(), error = %e, "Journal not readable, treating as empty");
                return Vec::new();
            }
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Replace the journal's contents with the given records. An empty
    /// slice truncates the file.
    pub fn rewrite<T: Serialize>(&self, records: &[T]) -> Result<()> {
        let mut out = String::new();
        for record in records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, out)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
