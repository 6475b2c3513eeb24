//! Physical-line splitting and code/comment/empty classification.
//!
//! A line is CODE if any token touches it, COMMENT if a comment touches it
//! and no token does, and EMPTY otherwise. Code wins over comments, so
//! `let x = 1; // note` is a code line, while a blank line inside a block
//! comment is a comment line.

use super::lexer::{LexedSource, Span};
use super::stats::LineCounters;

/// Iterator over the physical lines of a text, without their terminators.
///
/// `\n`, `\r\n` and a lone `\r` each end a line. A terminator at the very
/// end does not start another (empty) line.
pub struct PhysicalLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.find(['\n', '\r']) {
            Some(idx) => {
                let line = &self.rest[..idx];
                let terminator = if self.rest[idx..].starts_with("\r\n") {
                    2
                } else {
                    1
                };
                self.rest = &self.rest[idx + terminator..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

/// Split text into physical lines.
pub fn physical_lines(text: &str) -> PhysicalLines<'_> {
    PhysicalLines { rest: text }
}

/// Number of physical lines in a text. A zero-byte text has none.
pub fn physical_line_count(text: &str) -> usize {
    physical_lines(text).count()
}

/// Classify every line from token spans and trivia spans.
///
/// Only comment trivia is considered; whitespace trivia is ignored. Span
/// lines at or beyond `line_count` are ignored.
pub fn classify_lines(line_count: usize, tokens: &[Span], trivia: &[Span]) -> LineCounters {
    let mut code = vec![false; line_count];
    for span in tokens {
        mark(&mut code, span);
    }

    let mut comment = vec![false; line_count];
    for span in trivia.iter().filter(|s| s.kind.is_comment()) {
        mark(&mut comment, span);
    }

    let code_lines = code.iter().filter(|&&c| c).count();
    let comment_lines = code
        .iter()
        .zip(&comment)
        .filter(|(&is_code, &is_comment)| is_comment && !is_code)
        .count();

    LineCounters {
        code: code_lines as u64,
        comments: comment_lines as u64,
        empty: (line_count - code_lines - comment_lines) as u64,
    }
}

/// Classify the lines of an already lexed source.
pub fn classify(lexed: &LexedSource) -> LineCounters {
    classify_lines(lexed.line_count, &lexed.tokens, &lexed.trivia)
}

fn mark(lines: &mut [bool], span: &Span) {
    let end = span.end_line.min(lines.len().saturating_sub(1));
    if span.start_line > end || lines.is_empty() {
        return;
    }
    for flag in &mut lines[span.start_line..=end] {
        *flag = true;
    }
}
