//! Source discovery: find what to analyze.
//!
//! This module handles the first stage of the pipeline. It provides:
//!
//! - **File filtering**: walk the analysis root, keep files by extension,
//!   skip build output and user glob exclusions
//! - **Repository discovery**: find the enclosing git work tree and the
//!   analysis root's position inside it
//!
//! ## Example
//!
//! ```rust,ignore
//! use locpulselib::source::{discover_files, FilterConfig, RepositoryInfo};
//!
//! let repo = RepositoryInfo::discover(".")?;
//! let filter = FilterConfig::new().exclude("generated/**")?;
//! let files = discover_files(&repo.analysis_root, &filter)?;
//! ```

pub mod filter;
pub mod repository;

pub use filter::{discover_files, to_relative_string, FilterConfig};
pub use repository::RepositoryInfo;
