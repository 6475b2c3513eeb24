//! Output formatting: serialize the report.
//!
//! This module handles the fourth and final stage of the pipeline -
//! turning an [`AnalysisReport`](crate::query::AnalysisReport) into bytes.
//! It provides:
//!
//! - **CSV**: one row per file, fixed column order (the default)
//! - **JSON**: the whole report, including author names and rollups
//!
//! Rendering is pure; only [`write_report`] touches the filesystem.
//!
//! ## Example
//!
//! ```rust,ignore
//! use locpulselib::output::{write_report, OutputFormat};
//!
//! let path = write_report(Path::new("out"), &report, OutputFormat::Json)?;
//! // out/analysis.json
//! ```

pub mod writer;

pub use writer::{
    render, report_path, write_csv, write_json, write_report, OutputFormat, CSV_COLUMNS,
    REPORT_STEM,
};
