//! Report serialization: CSV and JSON.
//!
//! The CSV form has one row per file with a fixed column order; the author
//! set is reduced to its size. The JSON form is the whole report, so it
//! keeps the author names, the directory rollups and the skipped files.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LocpulseError;
use crate::query::analysis::AnalysisReport;
use crate::Result;

/// CSV header, in column order.
pub const CSV_COLUMNS: [&str; 10] = [
    "path",
    "times_changed",
    "authors",
    "last_changed_at",
    "code",
    "comments",
    "empty",
    "indent_mean",
    "indent_min",
    "indent_max",
];

/// Base name of the written report file.
pub const REPORT_STEM: &str = "analysis";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One row per file
    #[default]
    Csv,
    /// The full report, pretty-printed
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Write the per-file CSV table.
pub fn write_csv<W: Write>(out: W, report: &AnalysisReport) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    wtr.write_record(CSV_COLUMNS)?;

    for file in &report.files {
        let last_changed = file
            .history
            .last_changed_at
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default();
        wtr.write_record([
            file.path.clone(),
            file.history.times_changed.to_string(),
            file.history.authors.len().to_string(),
            last_changed,
            file.lines.code.to_string(),
            file.lines.comments.to_string(),
            file.lines.empty.to_string(),
            format!("{:.2}", file.indentation.mean),
            file.indentation.min.to_string(),
            file.indentation.max.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the whole report as pretty JSON.
pub fn write_json<W: Write>(mut out: W, report: &AnalysisReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Render the report into memory.
pub fn render(report: &AnalysisReport, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Csv => write_csv(&mut buf, report)?,
        OutputFormat::Json => write_json(&mut buf, report)?,
    }
    Ok(buf)
}

/// Path the report is written to inside `dir`.
pub fn report_path(dir: &Path, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", REPORT_STEM, format.extension()))
}

/// Render the report and write it to `<dir>/analysis.<ext>`, creating `dir`
/// if needed. Returns the written path.
pub fn write_report(dir: &Path, report: &AnalysisReport, format: OutputFormat) -> Result<PathBuf> {
    let bytes = render(report, format)?;
    let path = report_path(dir, format);

    fs::create_dir_all(dir).map_err(|e| LocpulseError::OutputWrite {
        path: dir.to_path_buf(),
        source: e,
    })?;
    fs::write(&path, bytes).map_err(|e| LocpulseError::OutputWrite {
        path: path.clone(),
        source: e,
    })?;

    debug!(path = %path.display(), %format, "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stats::{
        CombinedFileAnalysis, DirectoryStats, FileHistory, FileStats, IndentationStats,
        LineCounters, SkippedFile,
    };
    use chrono::DateTime;
    use tempfile::tempdir;

    fn sample_report() -> AnalysisReport {
        let changed_at = DateTime::parse_from_rfc3339("2024-02-01T10:00:00+01:00").unwrap();
        let mut touched = FileHistory {
            times_changed: 2,
            last_changed_at: Some(changed_at),
            ..FileHistory::default()
        };
        touched.authors.insert("alice".to_string());
        touched.authors.insert("bob".to_string());

        let lib = FileStats {
            path: "src/lib.rs".to_string(),
            lines: LineCounters {
                code: 10,
                comments: 3,
                empty: 2,
            },
            indentation: IndentationStats {
                mean: 2.0 / 3.0,
                min: 0,
                max: 8,
            },
        };
        let fresh = FileStats {
            path: "src/new.rs".to_string(),
            lines: LineCounters {
                code: 1,
                comments: 0,
                empty: 0,
            },
            indentation: IndentationStats::default(),
        };

        let mut src = DirectoryStats::new("src".to_string());
        src.add_file(lib.lines);
        src.add_file(fresh.lines);

        AnalysisReport {
            root: PathBuf::from("/repo"),
            repository: PathBuf::from("/repo"),
            files: vec![
                CombinedFileAnalysis::new(lib, touched),
                CombinedFileAnalysis::new(fresh, FileHistory::default()),
            ],
            directories: vec![src],
            skipped: vec![SkippedFile {
                path: "bad.rs".to_string(),
                reason: "stream did not contain valid UTF-8".to_string(),
            }],
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Csv);
    }

    #[test]
    fn test_csv_columns_and_sentinel() {
        let bytes = render(&sample_report(), OutputFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], CSV_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "src/lib.rs,2,2,2024-02-01T10:00:00+01:00,10,3,2,0.67,0,8"
        );
        assert_eq!(lines[2], "src/new.rs,0,0,,1,0,0,0.00,0,0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_json_keeps_authors_and_rollups() {
        let bytes = render(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let authors = &value["files"][0]["history"]["authors"];
        assert_eq!(authors, &serde_json::json!(["alice", "bob"]));
        assert!(value["files"][1]["history"]["last_changed_at"].is_null());
        assert_eq!(value["directories"][0]["file_count"], 2);
        assert_eq!(value["skipped"][0]["path"], "bad.rs");
    }

    #[test]
    fn test_write_report_creates_directory() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("out/nested");

        let path = write_report(&dir, &sample_report(), OutputFormat::Json).unwrap();

        assert_eq!(path, dir.join("analysis.json"));
        assert!(path.is_file());
    }

    #[test]
    fn test_write_report_into_file_fails() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("taken");
        fs::write(&blocker, "").unwrap();

        let result = write_report(&blocker, &sample_report(), OutputFormat::Csv);

        assert!(matches!(result, Err(LocpulseError::OutputWrite { .. })));
    }
}
