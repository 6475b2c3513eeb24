//! Query processing: join, roll up and sort.
//!
//! This module handles the third stage of the pipeline - combining the
//! codebase pass and the history pass into the final report:
//!
//! - **Analysis**: run both passes concurrently and join them by path
//! - **Directory rollups**: sum line counters up to the analysis root
//!
//! ## Example
//!
//! ```rust,ignore
//! use locpulselib::query::{analyze, AnalysisOptions};
//!
//! let report = analyze(".", &AnalysisOptions::new())?;
//! for file in &report.files {
//!     println!("{} changed {} times", file.path, file.history.times_changed);
//! }
//! ```

pub mod analysis;
pub mod directory;

pub use analysis::{analyze, analyze_with, join_results, AnalysisOptions, AnalysisReport};
pub use directory::{aggregate_directories, ancestor_dirs, ROOT_DIR};
