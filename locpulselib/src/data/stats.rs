//! Core data structures for codebase metrics.
//!
//! Every record here is plain data: the collectors in [`crate::data`] fill
//! them in and the [`crate::query`] stage joins and rolls them up.
//!
//! - [`LineCounters`]: code / comment / empty lines of one file or a rollup
//! - [`IndentationStats`]: leading-whitespace statistics of one file
//! - [`FileHistory`]: git activity of one path
//! - [`CombinedFileAnalysis`]: both sides joined for one file
//! - [`DirectoryStats`]: line counters summed over a directory subtree

use std::collections::BTreeSet;
use std::ops::{Add, AddAssign};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Line counts of a file, by class.
///
/// For a single file `code + comments + empty` equals its physical line
/// count; every line belongs to exactly one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounters {
    /// Lines carrying at least one token
    pub code: u64,
    /// Lines covered only by comments
    pub comments: u64,
    /// Everything else (blank or whitespace-only)
    pub empty: u64,
}

impl LineCounters {
    /// Create counters with all zeros.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total physical lines.
    pub fn total(&self) -> u64 {
        self.code + self.comments + self.empty
    }
}

impl Add for LineCounters {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            code: self.code + other.code,
            comments: self.comments + other.comments,
            empty: self.empty + other.empty,
        }
    }
}

impl AddAssign for LineCounters {
    fn add_assign(&mut self, other: Self) {
        self.code += other.code;
        self.comments += other.comments;
        self.empty += other.empty;
    }
}

/// Indentation statistics over the non-empty lines of a file.
///
/// All fields are zero when the file has no line with visible content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndentationStats {
    /// Arithmetic mean of the indentation widths
    pub mean: f64,
    /// Smallest indentation width
    pub min: u32,
    /// Largest indentation width
    pub max: u32,
}

/// Codebase-side result for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    /// Path relative to the analysis root, `/`-separated.
    pub path: String,
    /// Line classification.
    pub lines: LineCounters,
    /// Indentation statistics.
    pub indentation: IndentationStats,
}

/// Git activity of a single path.
///
/// The default value is the "never changed" record used for files that
/// exist on disk but were never committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHistory {
    /// Number of distinct commits touching the path.
    pub times_changed: u64,
    /// Distinct author names, sorted.
    pub authors: BTreeSet<String>,
    /// Author date of the most recent commit; `None` if never changed.
    pub last_changed_at: Option<DateTime<FixedOffset>>,
}

impl FileHistory {
    /// True for paths with no recorded commit.
    pub fn is_never_changed(&self) -> bool {
        self.last_changed_at.is_none()
    }
}

/// One file with its codebase-side and history-side results joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedFileAnalysis {
    /// Path relative to the analysis root, `/`-separated.
    pub path: String,
    /// Git activity.
    pub history: FileHistory,
    /// Line classification.
    pub lines: LineCounters,
    /// Indentation statistics.
    pub indentation: IndentationStats,
}

impl CombinedFileAnalysis {
    /// Join a file's codebase stats with its history.
    pub fn new(file: FileStats, history: FileHistory) -> Self {
        Self {
            path: file.path,
            history,
            lines: file.lines,
            indentation: file.indentation,
        }
    }
}

/// Line counters summed over every file at or below a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStats {
    /// Directory path relative to the analysis root; the root is `.`.
    pub path: String,
    /// Number of files at or below this directory.
    pub file_count: u64,
    /// Summed line counters.
    pub lines: LineCounters,
}

impl DirectoryStats {
    /// Create empty directory stats.
    pub fn new(path: String) -> Self {
        Self {
            path,
            file_count: 0,
            lines: LineCounters::new(),
        }
    }

    /// Credit one file to this directory.
    pub fn add_file(&mut self, lines: LineCounters) {
        self.file_count += 1;
        self.lines += lines;
    }
}

/// A file whose analysis failed and was left out of the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Path relative to the analysis root.
    pub path: String,
    /// Why the file was skipped.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_counters_add() {
        let a = LineCounters {
            code: 10,
            comments: 2,
            empty: 3,
        };
        let b = LineCounters {
            code: 1,
            comments: 1,
            empty: 1,
        };

        let mut sum = a;
        sum += b;

        assert_eq!(sum, a + b);
        assert_eq!(sum.code, 11);
        assert_eq!(sum.total(), 18);
    }

    #[test]
    fn default_history_is_never_changed() {
        let history = FileHistory::default();

        assert_eq!(history.times_changed, 0);
        assert!(history.authors.is_empty());
        assert!(history.is_never_changed());
    }

    #[test]
    fn directory_add_file() {
        let mut dir = DirectoryStats::new("src".to_string());
        dir.add_file(LineCounters {
            code: 3,
            comments: 0,
            empty: 1,
        });
        dir.add_file(LineCounters {
            code: 2,
            comments: 1,
            empty: 0,
        });

        assert_eq!(dir.file_count, 2);
        assert_eq!(dir.lines.total(), 7);
    }
}
