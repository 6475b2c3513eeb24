//! Indentation statistics.

use super::lines::physical_lines;
use super::stats::IndentationStats;

/// Width a tab contributes to a line's indentation.
pub const TAB_WIDTH: u32 = 4;

/// Leading-whitespace width of a line, or `None` if the line has no
/// visible content.
pub fn indentation_width(line: &str) -> Option<u32> {
    let mut width = 0;
    for c in line.chars() {
        if !c.is_whitespace() {
            return Some(width);
        }
        width += if c == '\t' { TAB_WIDTH } else { 1 };
    }
    None
}

/// Compute mean/min/max indentation over the lines with visible content.
pub fn indentation_stats(text: &str) -> IndentationStats {
    let mut count = 0u64;
    let mut sum = 0u64;
    let mut min = u32::MAX;
    let mut max = 0;

    for width in physical_lines(text).filter_map(indentation_width) {
        count += 1;
        sum += u64::from(width);
        min = min.min(width);
        max = max.max(width);
    }

    if count == 0 {
        return IndentationStats::default();
    }

    IndentationStats {
        mean: sum as f64 / count as f64,
        min,
        max,
    }
}
