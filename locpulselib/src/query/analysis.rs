//! The full analysis: codebase pass and history pass, joined.
//!
//! The two passes share nothing until the join, so they run side by side
//! via `rayon::join`. The join is driven by the files present on disk:
//! files without history get the "never changed" record, and history for
//! paths that no longer exist is dropped.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::counter::{count_codebase, CodebaseResult};
use crate::data::history::{mine_history, CommitLog, GitLog, HistoryIndex};
use crate::data::lexer::{Lexer, RustLexer};
use crate::data::stats::{CombinedFileAnalysis, DirectoryStats, SkippedFile};
use crate::source::filter::FilterConfig;
use crate::source::repository::RepositoryInfo;
use crate::Result;

use super::directory::aggregate_directories;

/// Options for an analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// File discovery configuration
    pub file_filter: FilterConfig,
}

impl AnalysisOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.file_filter = filter;
        self
    }
}

/// Everything produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Canonical analysis root.
    pub root: PathBuf,
    /// Canonical root of the enclosing git work tree.
    pub repository: PathBuf,
    /// Per-file records, sorted by path.
    pub files: Vec<CombinedFileAnalysis>,
    /// Directory rollups, sorted by path.
    pub directories: Vec<DirectoryStats>,
    /// Files left out because they could not be analyzed.
    pub skipped: Vec<SkippedFile>,
}

/// Analyze the codebase at `path` with the Rust front end and `git log`.
///
/// Fails if the path is missing, is not inside a git work tree, or if git
/// history cannot be read. Unreadable individual files are reported in
/// [`AnalysisReport::skipped`] instead.
pub fn analyze(path: impl AsRef<Path>, options: &AnalysisOptions) -> Result<AnalysisReport> {
    let repo = RepositoryInfo::discover(path)?;
    debug!(
        repository = %repo.root.display(),
        scope = %repo.scope,
        "repository discovered"
    );

    let log = GitLog::new(repo.root.clone(), repo.scope.clone());
    analyze_with(&repo, options, &RustLexer, &log)
}

/// Analyze with a caller-supplied front end and commit log.
pub fn analyze_with<L: CommitLog>(
    repo: &RepositoryInfo,
    options: &AnalysisOptions,
    lexer: &dyn Lexer,
    log: &L,
) -> Result<AnalysisReport> {
    let (codebase, history) = rayon::join(
        || count_codebase(&repo.analysis_root, &options.file_filter, lexer),
        || mine_history(log, &repo.scope),
    );
    let codebase = codebase?;
    let history = history?;

    let report = join_results(repo, codebase, &history);
    info!(
        files = report.files.len(),
        skipped = report.skipped.len(),
        commits = history.commit_count(),
        "analysis complete"
    );
    Ok(report)
}

/// Join the codebase pass with the history index.
pub fn join_results(
    repo: &RepositoryInfo,
    codebase: CodebaseResult,
    history: &HistoryIndex,
) -> AnalysisReport {
    let mut files: Vec<CombinedFileAnalysis> = codebase
        .files
        .into_iter()
        .map(|file| {
            let file_history = history.get(&file.path).cloned().unwrap_or_default();
            CombinedFileAnalysis::new(file, file_history)
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let directories = aggregate_directories(files.iter().map(|f| (f.path.as_str(), f.lines)));

    AnalysisReport {
        root: repo.analysis_root.clone(),
        repository: repo.root.clone(),
        files,
        directories,
        skipped: codebase.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::history::CommitRecord;
    use crate::data::stats::LineCounters;
    use crate::error::LocpulseError;
    use chrono::DateTime;
    use std::fs;
    use tempfile::tempdir;

    struct FixtureLog(Vec<CommitRecord>);

    impl CommitLog for FixtureLog {
        type Commits = std::vec::IntoIter<Result<CommitRecord>>;

        fn commits(&self) -> Result<Self::Commits> {
            Ok(self.0.iter().cloned().map(Ok).collect::<Vec<_>>().into_iter())
        }
    }

    struct FailingLog;

    impl CommitLog for FailingLog {
        type Commits = std::vec::IntoIter<Result<CommitRecord>>;

        fn commits(&self) -> Result<Self::Commits> {
            Err(LocpulseError::GitSpawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "git not found",
            )))
        }
    }

    fn commit(author: &str, at: &str, files: &[&str]) -> CommitRecord {
        CommitRecord {
            author: author.to_string(),
            timestamp: DateTime::parse_from_rfc3339(at).unwrap(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn fixture_repo(root: &Path) -> RepositoryInfo {
        fs::create_dir_all(root.join("app/src")).unwrap();
        fs::write(root.join("app/src/main.rs"), "fn main() {\n    run();\n}\n").unwrap();
        fs::write(root.join("app/src/new.rs"), "// not committed yet\n").unwrap();
        fs::write(root.join("app/build.rs"), "fn main() {}\n\n").unwrap();

        RepositoryInfo {
            root: root.to_path_buf(),
            analysis_root: root.join("app"),
            scope: "app".to_string(),
        }
    }

    #[test]
    fn join_is_driven_by_files_on_disk() {
        let temp = tempdir().unwrap();
        let repo = fixture_repo(temp.path());
        let log = FixtureLog(vec![
            commit("bob", "2024-02-01T00:00:00Z", &["app/src/main.rs", "app/src/old.rs"]),
            commit("alice", "2024-01-01T00:00:00Z", &["app/src/main.rs", "app/build.rs"]),
        ]);

        let report = analyze_with(&repo, &AnalysisOptions::new(), &RustLexer, &log).unwrap();
        let paths: Vec<&str> = report.files.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(paths, vec!["build.rs", "src/main.rs", "src/new.rs"]);

        let main = &report.files[1];
        assert_eq!(main.history.times_changed, 2);
        assert_eq!(main.history.authors.len(), 2);
        assert_eq!(main.lines.code, 3);

        let untracked = &report.files[2];
        assert_eq!(untracked.history.times_changed, 0);
        assert!(untracked.history.authors.is_empty());
        assert!(untracked.history.is_never_changed());
    }

    #[test]
    fn root_directory_sums_every_file() {
        let temp = tempdir().unwrap();
        let repo = fixture_repo(temp.path());

        let report =
            analyze_with(&repo, &AnalysisOptions::new(), &RustLexer, &FixtureLog(vec![]))
                .unwrap();
        let root = report.directories.iter().find(|d| d.path == ".").unwrap();
        let sum = report
            .files
            .iter()
            .fold(LineCounters::new(), |acc, f| acc + f.lines);

        assert_eq!(root.lines, sum);
        assert_eq!(root.file_count, 3);
        assert_eq!(report.directories[0].path, ".");
    }

    #[test]
    fn history_failure_aborts_the_run() {
        let temp = tempdir().unwrap();
        let repo = fixture_repo(temp.path());

        let result = analyze_with(&repo, &AnalysisOptions::new(), &RustLexer, &FailingLog);

        assert!(matches!(result, Err(LocpulseError::GitSpawn(_))));
    }
}
