//! Git history mining.
//!
//! History is read from `git log` as a line-oriented stream, newest commit
//! first. Each commit looks like:
//!
//! ```text
//! alice<TAB>2024-03-01T10:00:00+01:00
//! 3<TAB>1<TAB>src/lib.rs
//! -<TAB>-<TAB>assets/logo.png
//!
//! ```
//!
//! [`LogParser`] turns that stream into [`CommitRecord`]s lazily, and
//! [`HistoryMiner`] folds the commits into one [`FileHistory`] per path.
//! The stream is consumed in order by a single reader; it is never split.
//!
//! Renames are not followed, so a renamed file's activity is reported under
//! each path it had, separately.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::error::LocpulseError;
use crate::Result;

use super::stats::FileHistory;

/// One commit read from the log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Author name.
    pub author: String,
    /// Author date.
    pub timestamp: DateTime<FixedOffset>,
    /// Paths touched, relative to the repository root.
    pub files: Vec<String>,
}

/// A source of commits, newest first.
///
/// The log must cover all branches, skip merge commits, not follow renames,
/// and report paths relative to the repository root.
pub trait CommitLog: Sync {
    type Commits: Iterator<Item = Result<CommitRecord>>;

    /// Start reading the log.
    fn commits(&self) -> Result<Self::Commits>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    ExpectHeader,
    ExpectFileLines,
}

/// Shape of a single log line.
#[derive(Debug, PartialEq, Eq)]
enum LogLine<'a> {
    Blank,
    Header { author: &'a str, date: &'a str },
    FileChange(&'a str),
    Other,
}

fn is_count(field: &str) -> bool {
    field == "-" || (!field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()))
}

fn classify_line(line: &str) -> LogLine<'_> {
    if line.trim().is_empty() {
        return LogLine::Blank;
    }

    let fields: Vec<&str> = line.splitn(3, '\t').collect();
    match fields[..] {
        [added, deleted, path] if is_count(added) && is_count(deleted) && !path.is_empty() => {
            LogLine::FileChange(path)
        }
        [author, date] => LogLine::Header { author, date },
        _ => LogLine::Other,
    }
}

fn parse_header(author: &str, date: &str, line: usize) -> Result<CommitRecord> {
    let timestamp =
        DateTime::parse_from_rfc3339(date.trim()).map_err(|e| LocpulseError::Protocol {
            line,
            message: format!("invalid timestamp '{}': {}", date, e),
        })?;

    Ok(CommitRecord {
        author: author.trim().to_string(),
        timestamp,
        files: Vec::new(),
    })
}

/// Undo git's C-style quoting of unusual path names.
fn unquote_path(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'v') => bytes.push(0x0b),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&o @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(o - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Streaming parser for the log format, yielding one commit at a time.
///
/// Lines are decoded lossily: a path or author name that is not valid UTF-8
/// is kept with replacement characters rather than ending the stream.
pub struct LogParser<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    state: ParseState,
    line_no: usize,
    current: Option<CommitRecord>,
    finished: bool,
}

impl<R: BufRead> LogParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            state: ParseState::ExpectHeader,
            line_no: 0,
            current: None,
            finished: false,
        }
    }

    /// Read the next line without its terminator. `None` at end of stream.
    fn read_line(&mut self) -> Option<io::Result<String>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }

    fn fail(&mut self, err: LocpulseError) -> Option<Result<CommitRecord>> {
        self.finished = true;
        self.current = None;
        Some(Err(err))
    }
}

impl<R: BufRead> Iterator for LogParser<R> {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.read_line() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return self.fail(LocpulseError::GitStream(e)),
                None => {
                    self.finished = true;
                    return self.current.take().map(Ok);
                }
            };
            self.line_no += 1;

            match (self.state, classify_line(&line)) {
                (ParseState::ExpectHeader, LogLine::Header { author, date }) => {
                    match parse_header(author, date, self.line_no) {
                        Ok(commit) => self.current = Some(commit),
                        Err(e) => return self.fail(e),
                    }
                    self.state = ParseState::ExpectFileLines;
                }
                (ParseState::ExpectHeader, _) => {}
                (ParseState::ExpectFileLines, LogLine::Blank) => {
                    // some formats separate the header from the stat block
                    if self.current.as_ref().is_some_and(|c| c.files.is_empty()) {
                        continue;
                    }
                    self.state = ParseState::ExpectHeader;
                    if let Some(commit) = self.current.take() {
                        return Some(Ok(commit));
                    }
                }
                (ParseState::ExpectFileLines, LogLine::FileChange(path)) => {
                    if let Some(commit) = self.current.as_mut() {
                        commit.files.push(unquote_path(path));
                    }
                }
                (ParseState::ExpectFileLines, LogLine::Header { author, date }) => {
                    let next = match parse_header(author, date, self.line_no) {
                        Ok(commit) => commit,
                        Err(e) => return self.fail(e),
                    };
                    if let Some(done) = self.current.replace(next) {
                        return Some(Ok(done));
                    }
                }
                (ParseState::ExpectFileLines, LogLine::Other) => {}
            }
        }
    }
}

/// Per-path history for one run, keyed by path relative to the analysis root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryIndex {
    files: BTreeMap<String, FileHistory>,
    commit_count: usize,
}

impl HistoryIndex {
    /// History of a path, if it was ever committed.
    pub fn get(&self, path: &str) -> Option<&FileHistory> {
        self.files.get(path)
    }

    /// Number of paths with recorded history.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of commits folded into the index.
    pub fn commit_count(&self) -> usize {
        self.commit_count
    }

    /// Paths and their history, sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileHistory)> {
        self.files.iter().map(|(path, history)| (path.as_str(), history))
    }
}

/// Strip the scope directory from a repository-relative path.
fn relative_to_scope<'a>(scope: &str, path: &'a str) -> Option<&'a str> {
    if scope.is_empty() {
        return Some(path);
    }
    path.strip_prefix(scope)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
}

/// Folds commits, newest first, into per-path history.
#[derive(Debug, Default)]
pub struct HistoryMiner {
    scope: String,
    files: HashMap<String, FileHistory>,
    commit_count: usize,
}

impl HistoryMiner {
    /// Create a miner for paths under `scope`, a `/`-separated directory
    /// relative to the repository root (empty for the whole repository).
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into().trim_matches('/').to_string(),
            files: HashMap::new(),
            commit_count: 0,
        }
    }

    /// Record one commit. Commits must arrive newest first.
    pub fn record(&mut self, commit: &CommitRecord) {
        self.commit_count += 1;

        let touched: BTreeSet<&str> = commit
            .files
            .iter()
            .filter_map(|path| relative_to_scope(&self.scope, path))
            .collect();

        for path in touched {
            let entry = self.files.entry(path.to_string()).or_default();
            entry.times_changed += 1;
            entry.authors.insert(commit.author.clone());
            if entry.last_changed_at.is_none() {
                entry.last_changed_at = Some(commit.timestamp);
            }
        }
    }

    /// Freeze the accumulated history.
    pub fn finish(self) -> HistoryIndex {
        HistoryIndex {
            files: self.files.into_iter().collect(),
            commit_count: self.commit_count,
        }
    }
}

/// Read a whole commit log into a [`HistoryIndex`] for paths under `scope`.
pub fn mine_history<L: CommitLog + ?Sized>(log: &L, scope: &str) -> Result<HistoryIndex> {
    let mut miner = HistoryMiner::new(scope);
    for commit in log.commits()? {
        miner.record(&commit?);
    }

    let index = miner.finish();
    debug!(
        commits = index.commit_count(),
        paths = index.len(),
        "history mined"
    );
    Ok(index)
}

/// Create a `Command` for git that ignores `GIT_DIR`/`GIT_WORK_TREE` from
/// the environment, so the explicit `-C` path always wins.
fn git_cmd() -> Command {
    let mut cmd = Command::new("git");
    cmd.env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
    cmd
}

/// True if a `git` executable can be run.
pub fn git_available() -> bool {
    git_cmd()
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// The `git log` subprocess as a [`CommitLog`].
#[derive(Debug, Clone)]
pub struct GitLog {
    repo_root: PathBuf,
    scope: String,
}

impl GitLog {
    /// Log of `scope` (relative to `repo_root`, empty for everything).
    pub fn new(repo_root: impl Into<PathBuf>, scope: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            scope: scope.into(),
        }
    }

    fn pathspec(&self) -> &str {
        if self.scope.is_empty() {
            "."
        } else {
            &self.scope
        }
    }
}

impl CommitLog for GitLog {
    type Commits = GitLogStream;

    fn commits(&self) -> Result<GitLogStream> {
        debug!(repo = %self.repo_root.display(), scope = self.pathspec(), "spawning git log");

        let mut cmd = git_cmd();
        cmd.arg("-C")
            .arg(&self.repo_root)
            .args([
                "--literal-pathspecs",
                "-c",
                "core.quotePath=false",
                "-c",
                "log.showSignature=false",
                "log",
                "--all",
                "--no-merges",
                "--no-renames",
                "--numstat",
                "--format=%an%x09%aI",
                "--",
            ])
            .arg(self.pathspec());
        GitLogStream::spawn(&mut cmd)
    }
}

/// Read a pipe to the end on its own thread.
fn drain_in_background<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Commits streamed from a running `git log`.
///
/// The child is waited for once stdout is exhausted; a non-zero exit is
/// reported as the last item. Dropping the stream early kills the child.
pub struct GitLogStream {
    child: Child,
    parser: LogParser<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<String>>,
    finished: bool,
}

impl GitLogStream {
    /// Run `cmd` and parse its stdout as a commit log.
    fn spawn(cmd: &mut Command) -> Result<Self> {
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(LocpulseError::GitSpawn)?;

        let stderr = child.stderr.take().map(drain_in_background);
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(LocpulseError::GitStream(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "git log stdout was not captured",
            )));
        };

        Ok(Self {
            child,
            parser: LogParser::new(BufReader::new(stdout)),
            stderr,
            finished: false,
        })
    }

    fn collect_stderr(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }

    fn wait(&mut self) -> Result<()> {
        self.finished = true;
        let status = self.child.wait().map_err(LocpulseError::GitStream)?;
        let stderr = self.collect_stderr();

        if !status.success() {
            return Err(LocpulseError::GitFailed {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    /// Kill and reap the child. The stderr reader is detached, not joined.
    fn abort(&mut self) {
        self.finished = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.stderr = None;
    }
}

impl Iterator for GitLogStream {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.parser.next() {
            Some(Ok(commit)) => Some(Ok(commit)),
            Some(Err(e)) => {
                self.abort();
                Some(Err(e))
            }
            None => self.wait().err().map(Err),
        }
    }
}

impl Drop for GitLogStream {
    fn drop(&mut self) {
        if !self.finished {
            self.abort();
        }
    }
}
