//! Data collection: read files and history, produce per-file records.
//!
//! This module handles the second stage of the pipeline. It provides:
//!
//! - **Lexing**: the [`Lexer`] capability and the built-in [`RustLexer`]
//! - **Line classification**: code / comment / empty from lexical spans
//! - **Indentation**: leading-whitespace statistics
//! - **Codebase pass**: both of the above over every discovered file
//! - **History mining**: `git log` parsing into per-path activity
//! - **Statistics**: the plain records everything else passes around
//!
//! ## Example
//!
//! ```rust,ignore
//! use locpulselib::data::{count_codebase, mine_history, GitLog, RustLexer};
//!
//! let codebase = count_codebase(root, &FilterConfig::new(), &RustLexer)?;
//! let history = mine_history(&GitLog::new(repo_root, "crates/core"), "crates/core")?;
//! ```

pub mod counter;
pub mod history;
pub mod indent;
pub mod lexer;
pub mod lines;
pub mod stats;

pub use counter::{analyze_file, analyze_source, count_codebase, CodebaseResult};
pub use history::{
    git_available, mine_history, CommitLog, CommitRecord, GitLog, GitLogStream, HistoryIndex,
    HistoryMiner, LogParser,
};
pub use indent::{indentation_stats, indentation_width, TAB_WIDTH};
pub use lexer::{LexedSource, Lexer, RustLexer, Span, SpanKind};
pub use lines::{classify, classify_lines, physical_line_count, physical_lines};
pub use stats::{
    CombinedFileAnalysis, DirectoryStats, FileHistory, FileStats, IndentationStats,
    LineCounters, SkippedFile,
};
