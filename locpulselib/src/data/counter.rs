//! Codebase pass: line classification and indentation for every file.
//!
//! Files are independent, so they are analyzed in parallel on the rayon
//! pool. A file that cannot be read is reported in
//! [`CodebaseResult::skipped`] and does not stop the scan.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::LocpulseError;
use crate::source::filter::{discover_files, to_relative_string, FilterConfig};
use crate::Result;

use super::indent::indentation_stats;
use super::lexer::Lexer;
use super::lines::classify;
use super::stats::{FileStats, SkippedFile};

/// Result of the codebase pass.
#[derive(Debug, Clone, Default)]
pub struct CodebaseResult {
    /// Analyzed files, sorted by path.
    pub files: Vec<FileStats>,
    /// Files that could not be analyzed, sorted by path.
    pub skipped: Vec<SkippedFile>,
}

/// Analyze source text that is already in memory.
///
/// # Example
///
/// ```rust
/// use locpulselib::{analyze_source, RustLexer};
///
/// let stats = analyze_source("src/lib.rs", "/// Docs\npub fn f() {}\n", &RustLexer);
/// assert_eq!(stats.lines.code, 1);
/// assert_eq!(stats.lines.comments, 1);
/// ```
pub fn analyze_source(path: impl Into<String>, text: &str, lexer: &dyn Lexer) -> FileStats {
    let lexed = lexer.lex(text);
    FileStats {
        path: path.into(),
        lines: classify(&lexed),
        indentation: indentation_stats(text),
    }
}

/// Analyze one file on disk. `root` is the analysis root the reported path
/// is made relative to.
pub fn analyze_file(root: &Path, path: &Path, lexer: &dyn Lexer) -> Result<FileStats> {
    let text = fs::read_to_string(path).map_err(|e| LocpulseError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let relative = to_relative_string(path.strip_prefix(root).unwrap_or(path));
    Ok(analyze_source(relative, &text, lexer))
}

/// Discover and analyze every matching file under `root`.
pub fn count_codebase(
    root: &Path,
    filter: &FilterConfig,
    lexer: &dyn Lexer,
) -> Result<CodebaseResult> {
    let paths = discover_files(root, filter)?;
    debug!(files = paths.len(), root = %root.display(), "analyzing codebase");

    let outcomes: Vec<_> = paths
        .par_iter()
        .map(|path| (path, analyze_file(root, path, lexer)))
        .collect();

    let mut result = CodebaseResult::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(stats) => result.files.push(stats),
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                result.skipped.push(SkippedFile {
                    path: to_relative_string(path.strip_prefix(root).unwrap_or(path)),
                    reason: e.to_string(),
                });
            }
        }
    }

    result.files.sort_by(|a, b| a.path.cmp(&b.path));
    result.skipped.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::lexer::RustLexer;
    use std::fs;
    use tempfile::tempdir;

    fn create_rust_file(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_analyze_source() {
        let stats = analyze_source(
            "main.rs",
            "fn main() {\n\t// say hi\n\tprintln!(\"Hi\");\n}\n\n",
            &RustLexer,
        );

        assert_eq!(stats.path, "main.rs");
        assert_eq!(stats.lines.code, 3);
        assert_eq!(stats.lines.comments, 1);
        assert_eq!(stats.lines.empty, 1);
        assert_eq!(stats.indentation.max, 4);
        assert_eq!(stats.indentation.min, 0);
    }

    #[test]
    fn test_byte_order_mark_before_comment() {
        let stats = analyze_source("a.rs", "\u{feff}// header comment\nfn f() {}\n", &RustLexer);

        assert_eq!(stats.lines.code, 1);
        assert_eq!(stats.lines.comments, 1);
        assert_eq!(stats.lines.empty, 0);
    }

    #[test]
    fn test_count_codebase() {
        let temp = tempdir().unwrap();
        create_rust_file(&temp.path().join("src/main.rs"), b"fn main() {}\n");
        create_rust_file(&temp.path().join("src/util/mod.rs"), b"// util\n");
        create_rust_file(&temp.path().join("empty.rs"), b"");

        let result = count_codebase(temp.path(), &FilterConfig::new(), &RustLexer).unwrap();
        let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(paths, vec!["empty.rs", "src/main.rs", "src/util/mod.rs"]);
        assert_eq!(result.files[0].lines.total(), 0);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let temp = tempdir().unwrap();
        create_rust_file(&temp.path().join("good.rs"), b"fn ok() {}\n");
        create_rust_file(&temp.path().join("bad.rs"), &[0xff, 0xfe, 0x00, 0x41]);

        let result = count_codebase(temp.path(), &FilterConfig::new(), &RustLexer).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, "good.rs");
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].path, "bad.rs");
    }
}
