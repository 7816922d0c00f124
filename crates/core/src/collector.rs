// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazy directory-glob value, used as a deferred-output placeholder for
//! inter-task dependencies.

use crate::error::CoreError;
use glob::Pattern;
use std::path::{Path, PathBuf};

/// A lazily-evaluated set of files: each query re-scans `root` for entries
/// whose basename matches `glob`, sorted lexicographically ascending.
/// Matching is non-recursive and restricted to basenames (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCollector {
    root: PathBuf,
    glob: String,
}

impl FileCollector {
    pub fn new(root: impl Into<PathBuf>, glob: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            glob: glob.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// Re-scan `root` and return matching absolute paths, sorted ascending.
    pub fn files(&self) -> Result<Vec<PathBuf>, CoreError> {
        let pattern = Pattern::new(&self.glob).map_err(|source| CoreError::InvalidGlob {
            pattern: self.glob.clone(),
            source,
        })?;

        let entries = std::fs::read_dir(&self.root).map_err(|source| CoreError::DirRead {
            path: self.root.clone(),
            source,
        })?;

        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CoreError::DirRead {
                path: self.root.clone(),
                source,
            })?;
            let name = entry.file_name();
            if pattern.matches(&name.to_string_lossy()) {
                matches.push(entry.path());
            }
        }
        matches.sort();
        Ok(matches)
    }

    /// Number of files currently matching. Re-scans `root`; returns 0 on a
    /// read error rather than propagating, since callers typically treat a
    /// not-yet-created directory as "nothing there yet".
    pub fn len(&self) -> usize {
        self.files().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntoIterator for &FileCollector {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files().unwrap_or_default().into_iter()
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
