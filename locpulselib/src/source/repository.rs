//! Repository discovery.
//!
//! History is always mined for the whole repository, scoped down to the
//! analysis root. This module finds the work tree that contains the root
//! and expresses the root relative to it.

use std::path::{Path, PathBuf};

use crate::error::LocpulseError;
use crate::Result;

use super::filter::to_relative_string;

/// The git work tree enclosing an analysis root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    /// Canonical work tree root.
    pub root: PathBuf,
    /// Canonical analysis root.
    pub analysis_root: PathBuf,
    /// Analysis root relative to `root`, `/`-separated; empty when equal.
    pub scope: String,
}

impl RepositoryInfo {
    /// Discover the repository at or above `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let analysis_root = canonical_dir(path)?;

        let repo = gix::discover(&analysis_root).map_err(|e| LocpulseError::NotARepository {
            path: analysis_root.clone(),
            message: e.to_string(),
        })?;

        let work_dir = repo
            .work_dir()
            .ok_or_else(|| LocpulseError::NotARepository {
                path: analysis_root.clone(),
                message: "repository has no work tree".to_string(),
            })?
            .to_path_buf();
        let root = std::fs::canonicalize(&work_dir)
            .map_err(|_| LocpulseError::PathNotFound(work_dir.clone()))?;

        let scope = analysis_root
            .strip_prefix(&root)
            .map(to_relative_string)
            .map_err(|_| LocpulseError::NotARepository {
                path: analysis_root.clone(),
                message: format!("path is outside the work tree {}", root.display()),
            })?;

        Ok(Self {
            root,
            analysis_root,
            scope,
        })
    }
}

/// Canonicalize a path that must be an existing directory.
pub fn canonical_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(LocpulseError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(LocpulseError::NotADirectory(path.to_path_buf()));
    }
    std::fs::canonicalize(path).map_err(|_| LocpulseError::PathNotFound(path.to_path_buf()))
}
