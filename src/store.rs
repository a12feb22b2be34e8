//! Subject list and processed-subjects log.
//!
//! Subjects are plain text, one per line. The processed log is a JSON array
//! of subject strings rewritten in full after every article, so a crashed
//! run resumes exactly where it stopped. Malformed or missing state files
//! are treated as empty - state corruption degrades to re-processing, never
//! to a failed run.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Load the subject list. Missing file yields an empty list.
pub fn load_subjects(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read subjects from {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Append-only log of already-processed subjects.
///
/// Invariant: no duplicates. The pending set for a run is the subject list
/// minus this log, in subject-list order.
#[derive(Debug)]
pub struct ProcessedLog {
    path: PathBuf,
    entries: Vec<String>,
}

impl ProcessedLog {
    /// Load the log from disk. Missing or malformed files yield an empty log.
    pub fn load(path: &Path) -> Self {
        let entries = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.entries.iter().any(|e| e == subject)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently processed subjects, newest last.
    pub fn recent(&self, count: usize) -> &[String] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    /// Record a subject as processed and persist the whole log.
    ///
    /// Recording an already-present subject is a no-op.
    pub fn mark(&mut self, subject: &str) -> Result<()> {
        if self.contains(subject) {
            return Ok(());
        }
        self.entries.push(subject.to_owned());
        self.save()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Subjects not yet processed, preserving subject-list order.
    pub fn pending<'a>(&self, subjects: &'a [String]) -> Vec<&'a String> {
        subjects.iter().filter(|s| !self.contains(s)).collect()
    }
}
