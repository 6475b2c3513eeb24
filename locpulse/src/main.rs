//! # locpulse
//!
//! A CLI tool that snapshots a codebase: line classes, indentation and git
//! activity for every source file.
//!
//! ## Overview
//!
//! locpulse is built on top of locpulselib. It analyzes the directory it is
//! given (which must live inside a git work tree), joins the per-file
//! metrics with the history of the whole repository across every branch,
//! and writes the result as CSV or JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze the current directory, write ./analysis.csv
//! locpulse
//!
//! # Analyze one crate of a workspace, write reports/analysis.json
//! locpulse crates/core --format json --output-dir reports
//!
//! # Other extensions, skip generated code
//! locpulse . -x rs -x ron --exclude "**/generated/**"
//!
//! # See what is going on
//! locpulse -vv
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use console::Style;
use locpulselib::{
    analyze, write_report, AnalysisOptions, FilterConfig, LocpulseError, OutputFormat,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("locpulse")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Per-file code metrics joined with git activity")
        .arg(
            Arg::new("path")
                .help("Directory to analyze (defaults to current directory)")
                .default_value("."),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_parser(["csv", "json"])
                .default_value("csv")
                .help("Output format"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .default_value(".")
                .help("Directory the report is written to"),
        )
        .arg(
            Arg::new("extension")
                .short('x')
                .long("extension")
                .action(ArgAction::Append)
                .help("File extension to analyze (can be specified multiple times, default: rs)"),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .action(ArgAction::Append)
                .help("Exclude files matching glob pattern"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .conflicts_with("quiet")
                .help("More log output (-v info, -vv debug, -vvv trace)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Only log errors"),
        )
}

/// Log level for the given flags, used when RUST_LOG is not set
fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(matches: &ArgMatches) {
    let level = default_level(matches.get_count("verbose"), matches.get_flag("quiet"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

/// Build the file filter from CLI arguments
fn build_filter(matches: &ArgMatches) -> Result<FilterConfig, LocpulseError> {
    let mut filter = FilterConfig::new();

    let extensions: Vec<&String> = matches
        .get_many::<String>("extension")
        .map(|v| v.collect())
        .unwrap_or_default();
    if !extensions.is_empty() {
        filter = filter.extensions(&extensions);
    }

    if let Some(excludes) = matches.get_many::<String>("exclude") {
        for pattern in excludes {
            filter = filter.exclude(pattern)?;
        }
    }

    Ok(filter)
}

fn run(matches: &ArgMatches) -> anyhow::Result<PathBuf> {
    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or(".");
    let output_dir = matches
        .get_one::<String>("output-dir")
        .map(String::as_str)
        .unwrap_or(".");
    let format: OutputFormat = matches
        .get_one::<String>("format")
        .map(|s| s.parse())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let options = AnalysisOptions::new().filter(build_filter(matches)?);
    debug!(?options, "options parsed");

    let report =
        analyze(path, &options).with_context(|| format!("failed to analyze '{}'", path))?;
    info!(
        files = report.files.len(),
        directories = report.directories.len(),
        "writing {} report",
        format
    );

    let written = write_report(Path::new(output_dir), &report, format)?;
    Ok(written)
}

/// Process exit status for a failed run
fn exit_status(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<LocpulseError>()
        .map(|e| e.category().exit_code())
        .unwrap_or(1)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(&matches);

    match run(&matches) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            let label = Style::new().for_stderr().red().bold();
            eprintln!("{} {:#}", label.apply_to("Error:"), e);
            ExitCode::from(exit_status(&e))
        }
    }
}
