//! Source file discovery with extension and glob filtering.
//!
//! This module walks the analysis root and returns the source files to
//! analyze, skipping build output and hidden directories.

use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::LocpulseError;
use crate::Result;

/// Build-output directories skipped by default.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 2] = ["target", "build"];

/// Extensions analyzed by default.
pub const DEFAULT_EXTENSIONS: [&str; 1] = ["rs"];

/// Configuration for file discovery.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// File extensions to include, without the leading dot
    pub extensions: Vec<String>,
    /// Directory names skipped anywhere below the root
    pub excluded_dirs: Vec<String>,
    /// Glob patterns, matched against root-relative paths, to exclude
    pub exclude: Vec<Pattern>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Create the default filter (`.rs` files, skipping `target/` and `build/`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the extension list.
    pub fn extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Skip every directory with this name.
    pub fn exclude_dir(mut self, name: &str) -> Self {
        self.excluded_dirs.push(name.to_string());
        self
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        let pat = Pattern::new(pattern).map_err(|e| LocpulseError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.exclude.push(pat);
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern)?;
        }
        Ok(self)
    }

    /// Check a root-relative file path against the extension list and the
    /// exclude patterns.
    pub fn matches(&self, relative: &Path) -> bool {
        let has_extension = relative
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext));
        if !has_extension {
            return false;
        }

        let path_str = to_relative_string(relative);
        !self.exclude.iter().any(|pattern| pattern.matches(&path_str))
    }

    fn should_skip_dir(&self, name: &str) -> bool {
        name.starts_with('.') || self.excluded_dirs.iter().any(|d| d == name)
    }
}

/// Render a relative path with `/` separators.
pub fn to_relative_string(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Discover source files under `root`.
///
/// Returns absolute paths, sorted. Entries that cannot be read while
/// walking are skipped.
pub fn discover_files(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(LocpulseError::PathNotFound(root.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !filter.should_skip_dir(&entry.file_name().to_string_lossy())
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| filter.matches(entry.path().strip_prefix(root).unwrap_or(entry.path())))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}
