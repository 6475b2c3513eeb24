//! Error types for locpulselib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while analyzing a codebase
#[derive(Error, Debug)]
pub enum LocpulseError {
    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// No git repository found at or above path
    #[error("no git repository found at or above '{path}': {message}")]
    NotARepository { path: PathBuf, message: String },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// The git executable could not be launched
    #[error("failed to launch git: {0}")]
    GitSpawn(#[source] std::io::Error),

    /// git exited with a failure status
    #[error("git log exited with {status}: {stderr}")]
    GitFailed { status: String, stderr: String },

    /// Reading the git output stream failed
    #[error("failed to read git output: {0}")]
    GitStream(#[source] std::io::Error),

    /// Malformed line in the git log stream
    #[error("malformed git log output at line {line}: {message}")]
    Protocol { line: usize, message: String },

    /// Failed to read a source file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the output file
    #[error("failed to write '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`LocpulseError`], used for exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or invalid input path, options or repository
    Configuration,
    /// The git process failed to launch or exited abnormally
    ExternalProcess,
    /// The git log stream could not be parsed
    Protocol,
    /// A single source file could not be analyzed
    FileAnalysis,
    /// Writing results failed
    Output,
}

impl LocpulseError {
    /// The category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PathNotFound(_)
            | Self::NotADirectory(_)
            | Self::NotARepository { .. }
            | Self::InvalidGlob { .. } => ErrorCategory::Configuration,
            Self::GitSpawn(_) | Self::GitFailed { .. } | Self::GitStream(_) => {
                ErrorCategory::ExternalProcess
            }
            Self::Protocol { .. } => ErrorCategory::Protocol,
            Self::FileRead { .. } => ErrorCategory::FileAnalysis,
            Self::OutputWrite { .. } | Self::Csv(_) | Self::Json(_) | Self::Io(_) => {
                ErrorCategory::Output
            }
        }
    }
}

impl ErrorCategory {
    /// Process exit code for a run that failed with this category.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Configuration => 2,
            Self::ExternalProcess => 3,
            Self::Protocol => 4,
            Self::FileAnalysis | Self::Output => 1,
        }
    }
}
