//! # locpulselib
//!
//! Per-file source metrics joined with version-control activity.
//!
//! ## Overview
//!
//! For every source file under an analysis root this library computes:
//!
//! - **Line classes**: code, comment and empty physical lines, reconciled
//!   from lexical token and comment spans (code wins on shared lines)
//! - **Indentation**: mean, minimum and maximum leading-whitespace width
//! - **Activity**: distinct commits, distinct authors and the last-changed
//!   timestamp, mined from `git log` across every branch
//!
//! The per-file records are joined by path and rolled up per directory.
//!
//! ## Pipeline
//!
//! - [`source`]: find the files and the enclosing repository
//! - [`data`]: lex, classify, measure and mine history
//! - [`query`]: run both passes concurrently, join and roll up
//! - [`output`]: CSV or JSON
//!
//! ## Example
//!
//! ```rust
//! use locpulselib::{analyze_source, RustLexer};
//!
//! let text = "/// Greets.\nfn hello() {\n\tprintln!(\"Hi\"); // inline\n}\n\n";
//! let stats = analyze_source("src/lib.rs", text, &RustLexer);
//!
//! assert_eq!(stats.lines.code, 3);
//! assert_eq!(stats.lines.comments, 1);
//! assert_eq!(stats.lines.empty, 1);
//! assert_eq!(stats.indentation.max, 4);
//! ```
//!
//! Analyzing a whole repository:
//!
//! ```rust,ignore
//! use locpulselib::{analyze, write_report, AnalysisOptions, FilterConfig, OutputFormat};
//!
//! let filter = FilterConfig::new().exclude("**/generated/**")?;
//! let report = analyze("crates/core", &AnalysisOptions::new().filter(filter))?;
//! write_report(Path::new("."), &report, OutputFormat::Csv)?;
//! ```

pub mod data;
pub mod error;
pub mod output;
pub mod query;
pub mod source;

pub use data::{
    analyze_file, analyze_source, count_codebase, mine_history, CodebaseResult, CombinedFileAnalysis,
    CommitLog, CommitRecord, DirectoryStats, FileHistory, FileStats, GitLog, HistoryIndex,
    IndentationStats, Lexer, LineCounters, RustLexer, SkippedFile,
};
pub use error::{ErrorCategory, LocpulseError};
pub use output::{render, write_report, OutputFormat};
pub use query::{aggregate_directories, analyze, analyze_with, AnalysisOptions, AnalysisReport};
pub use source::{discover_files, FilterConfig, RepositoryInfo};

/// Result type for locpulselib operations
pub type Result<T> = std::result::Result<T, LocpulseError>;
