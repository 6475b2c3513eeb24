//! Directory rollups.
//!
//! Every file is credited to its own directory and to each ancestor up to
//! and including the analysis root (`.`), and to nothing above the root.

use std::collections::BTreeMap;

use crate::data::stats::{DirectoryStats, LineCounters};

/// Name used for the analysis root.
pub const ROOT_DIR: &str = ".";

/// Directories containing `path`, innermost first, ending with the root.
///
/// `path` is a `/`-separated file path relative to the analysis root.
pub fn ancestor_dirs(path: &str) -> Vec<&str> {
    let mut dirs = Vec::new();
    let mut current = path;
    while let Some(idx) = current.rfind('/') {
        current = &current[..idx];
        if !current.is_empty() {
            dirs.push(current);
        }
    }
    dirs.push(ROOT_DIR);
    dirs
}

/// Roll per-file line counters up the directory tree.
///
/// Results are sorted by directory path.
pub fn aggregate_directories<'a, I>(files: I) -> Vec<DirectoryStats>
where
    I: IntoIterator<Item = (&'a str, LineCounters)>,
{
    let mut dirs: BTreeMap<&str, DirectoryStats> = BTreeMap::new();

    for (path, lines) in files {
        for dir in ancestor_dirs(path) {
            dirs.entry(dir)
                .or_insert_with(|| DirectoryStats::new(dir.to_string()))
                .add_file(lines);
        }
    }

    dirs.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(code: u64, comments: u64, empty: u64) -> LineCounters {
        LineCounters {
            code,
            comments,
            empty,
        }
    }

    #[test]
    fn ancestors_end_at_root() {
        assert_eq!(ancestor_dirs("a/b/c.rs"), vec!["a/b", "a", "."]);
        assert_eq!(ancestor_dirs("main.rs"), vec!["."]);
    }

    #[test]
    fn rollup_sorted_by_path() {
        let files = vec![
            ("src/lib.rs", lines(10, 2, 1)),
            ("src/data/mod.rs", lines(5, 0, 1)),
            ("build.rs", lines(3, 0, 0)),
        ];

        let dirs = aggregate_directories(files.iter().map(|(p, l)| (*p, *l)));
        let paths: Vec<&str> = dirs.iter().map(|d| d.path.as_str()).collect();

        assert_eq!(paths, vec![".", "src", "src/data"]);
        assert_eq!(dirs[1].file_count, 2);
        assert_eq!(dirs[1].lines, lines(15, 2, 2));
        assert_eq!(dirs[2].file_count, 1);
    }

    #[test]
    fn root_equals_sum_of_all_files() {
        let files = vec![
            ("a.rs", lines(1, 2, 3)),
            ("x/b.rs", lines(4, 5, 6)),
            ("x/y/z/c.rs", lines(7, 8, 9)),
        ];

        let dirs = aggregate_directories(files.iter().map(|(p, l)| (*p, *l)));
        let root = dirs.iter().find(|d| d.path == ROOT_DIR).unwrap();
        let sum = files
            .iter()
            .fold(LineCounters::new(), |acc, (_, l)| acc + *l);

        assert_eq!(root.lines, sum);
        assert_eq!(root.file_count, 3);
    }

    #[test]
    fn no_files_no_directories() {
        let dirs = aggregate_directories(std::iter::empty::<(&str, LineCounters)>());
        assert!(dirs.is_empty());
    }
}
