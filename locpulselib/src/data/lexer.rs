//! Lexical front end: turns source text into token and trivia spans.
//!
//! The line classifier does not look at source text at all. It only needs
//! to know which lines are covered by tokens and which by comments, so any
//! language can be supported by implementing [`Lexer`] for it.
//!
//! [`RustLexer`] is the built-in front end for Rust sources. It is a small
//! hand-written scanner with single-character lookahead, in the spirit of
//! [cargo-warloc](https://github.com/Maximkaaa/cargo-warloc)'s visitor, but it
//! reports spans instead of counting lines itself.

use std::mem;
use std::str::Chars;

use serde::{Deserialize, Serialize};

use super::lines::physical_line_count;

/// What a span covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    /// Identifier, keyword, literal or punctuation
    Token,
    /// Run of whitespace, including line breaks
    Whitespace,
    /// `// ...`
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `/// ...` or `//! ...`
    DocLineComment,
    /// `/** ... */` or `/*! ... */`
    DocBlockComment,
}

impl SpanKind {
    /// True for the four comment kinds.
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            Self::LineComment | Self::BlockComment | Self::DocLineComment | Self::DocBlockComment
        )
    }
}

/// A range of physical lines covered by one lexical element.
///
/// Lines are 0-based and both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub kind: SpanKind,
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    pub fn new(kind: SpanKind, start_line: usize, end_line: usize) -> Self {
        Self {
            kind,
            start_line,
            end_line,
        }
    }
}

/// Output of a [`Lexer`]: spans in source order plus the line count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexedSource {
    /// Number of physical lines in the source.
    pub line_count: usize,
    /// Token spans, in order.
    pub tokens: Vec<Span>,
    /// Trivia spans (whitespace and comments), in order.
    pub trivia: Vec<Span>,
}

/// A source-language front end.
///
/// Given source text, produce an ordered sequence of `(kind, start-line,
/// end-line)` spans for tokens and for trivia.
pub trait Lexer: Send + Sync {
    fn lex(&self, source: &str) -> LexedSource;
}

/// Front end for Rust source files.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustLexer;

impl Lexer for RustLexer {
    fn lex(&self, source: &str) -> LexedSource {
        let mut scanner = Scanner::new(source);
        while scanner.scan_next() {}

        LexedSource {
            line_count: physical_line_count(source),
            tokens: scanner.tokens,
            trivia: scanner.trivia,
        }
    }
}

/// Character scanner with one character of lookahead.
struct Scanner<'a> {
    chars: Chars<'a>,
    lookahead: Option<char>,
    /// Line of the lookahead character.
    line: usize,
    /// Line of the most recently consumed character.
    last_line: usize,
    tokens: Vec<Span>,
    trivia: Vec<Span>,
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let mut chars = source.chars();
        let lookahead = chars.next();
        Self {
            chars,
            lookahead,
            line: 0,
            last_line: 0,
            tokens: Vec::new(),
            trivia: Vec::new(),
        }
    }

    /// Scan one lexical element. Returns false at end of input.
    fn scan_next(&mut self) -> bool {
        let start = self.line;
        let Some(c) = self.next_char() else {
            return false;
        };

        let kind = match c {
            c if c.is_whitespace() => {
                self.collect_while(char::is_whitespace);
                SpanKind::Whitespace
            }
            '/' if self.lookahead == Some('/') => self.scan_line_comment(),
            '/' if self.lookahead == Some('*') => self.scan_block_comment(),
            '"' => {
                self.scan_string_body();
                SpanKind::Token
            }
            '\'' => {
                self.scan_quote_body();
                SpanKind::Token
            }
            c if c == '_' || c.is_alphabetic() => {
                self.scan_word(c);
                SpanKind::Token
            }
            c if c.is_ascii_digit() => {
                self.collect_while(is_ident_continue);
                SpanKind::Token
            }
            _ => SpanKind::Token,
        };

        let span = Span::new(kind, start, self.last_line);
        if kind == SpanKind::Token {
            self.tokens.push(span);
        } else {
            self.trivia.push(span);
        }
        true
    }

    /// After the first `/` of `//`.
    fn scan_line_comment(&mut self) -> SpanKind {
        let _ = self.next_char();
        let is_doc = match self.lookahead {
            Some('!') => true,
            Some('/') => {
                let _ = self.next_char();
                self.lookahead != Some('/')
            }
            _ => false,
        };
        self.collect_while(|c| c != '\n' && c != '\r');

        if is_doc {
            SpanKind::DocLineComment
        } else {
            SpanKind::LineComment
        }
    }

    /// After the `/` of `/*`. Block comments nest.
    fn scan_block_comment(&mut self) -> SpanKind {
        let _ = self.next_char();
        let is_doc = match self.lookahead {
            Some('!') => true,
            Some('*') => {
                let _ = self.next_char();
                if self.lookahead == Some('/') {
                    // `/**/` is an empty regular comment
                    let _ = self.next_char();
                    return SpanKind::BlockComment;
                }
                self.lookahead != Some('*')
            }
            _ => false,
        };

        let mut depth = 1usize;
        while let Some(c) = self.next_char() {
            match c {
                '/' if self.lookahead == Some('*') => {
                    let _ = self.next_char();
                    depth += 1;
                }
                '*' if self.lookahead == Some('/') => {
                    let _ = self.next_char();
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }

        if is_doc {
            SpanKind::DocBlockComment
        } else {
            SpanKind::BlockComment
        }
    }

    /// After the opening `"` of a (possibly prefixed) string literal.
    fn scan_string_body(&mut self) {
        while let Some(c) = self.next_char() {
            match c {
                '\\' => {
                    let _ = self.next_char();
                }
                '"' => return,
                _ => {}
            }
        }
    }

    /// After the opening `"` of a raw string delimited by `hashes` `#`s.
    fn scan_raw_string_body(&mut self, hashes: usize) {
        while let Some(c) = self.next_char() {
            if c != '"' {
                continue;
            }
            let mut closing = 0;
            while closing < hashes && self.lookahead == Some('#') {
                let _ = self.next_char();
                closing += 1;
            }
            if closing == hashes {
                return;
            }
        }
    }

    /// After a `'`: character literal, byte literal body, or lifetime/label.
    fn scan_quote_body(&mut self) {
        match self.lookahead {
            Some('\\') => {
                let _ = self.next_char();
                let _ = self.next_char();
                self.collect_while(|c| c != '\'' && c != '\n' && c != '\r');
                if self.lookahead == Some('\'') {
                    let _ = self.next_char();
                }
            }
            Some(c) if c != '\n' && c != '\r' => {
                let _ = self.next_char();
                if self.lookahead == Some('\'') {
                    let _ = self.next_char();
                } else {
                    self.collect_while(is_ident_continue);
                }
            }
            _ => {}
        }
    }

    /// Identifier or keyword, including literal prefixes (`b"`, `r#"`, ...).
    fn scan_word(&mut self, first: char) {
        let mut word = first.to_string();
        self.collect_into(&mut word, is_ident_continue);

        match (word.as_str(), self.lookahead) {
            ("r" | "br" | "cr", Some('"' | '#')) => {
                let mut hashes = 0;
                while self.lookahead == Some('#') {
                    let _ = self.next_char();
                    hashes += 1;
                }
                if self.lookahead == Some('"') {
                    let _ = self.next_char();
                    self.scan_raw_string_body(hashes);
                } else {
                    // raw identifier, e.g. `r#type`
                    self.collect_while(is_ident_continue);
                }
            }
            ("b" | "c", Some('"')) => {
                let _ = self.next_char();
                self.scan_string_body();
            }
            ("b", Some('\'')) => {
                let _ = self.next_char();
                self.scan_quote_body();
            }
            _ => {}
        }
    }

    fn collect_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while let Some(next_char) = self.lookahead {
            if !predicate(next_char) {
                break;
            }
            let _ = self.next_char();
        }
    }

    fn collect_into(&mut self, string: &mut String, mut predicate: impl FnMut(char) -> bool) {
        while let Some(next_char) = self.lookahead {
            if !predicate(next_char) {
                break;
            }
            let _ = self.next_char();
            string.push(next_char);
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = mem::replace(&mut self.lookahead, self.chars.next());

        if let Some(c) = c {
            self.last_line = self.line;
            match c {
                '\n' => self.line += 1,
                '\r' if self.lookahead != Some('\n') => self.line += 1,
                _ => {}
            }
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> LexedSource {
        RustLexer.lex(source)
    }

    fn comments(source: &str) -> Vec<Span> {
        lex(source)
            .trivia
            .into_iter()
            .filter(|s| s.kind.is_comment())
            .collect()
    }

    #[test]
    fn empty_source() {
        let lexed = lex("");

        assert_eq!(lexed.line_count, 0);
        assert!(lexed.tokens.is_empty());
        assert!(lexed.trivia.is_empty());
    }

    #[test]
    fn tokens_carry_their_line() {
        let lexed = lex("fn main() {\n    run();\n}\n");

        assert_eq!(lexed.line_count, 3);
        assert_eq!(lexed.tokens.first().map(|s| s.start_line), Some(0));
        assert_eq!(lexed.tokens.last().map(|s| s.end_line), Some(2));
        assert!(lexed.tokens.iter().all(|s| s.start_line == s.end_line));
    }

    #[test]
    fn line_comment_kinds() {
        assert_eq!(comments("// plain")[0].kind, SpanKind::LineComment);
        assert_eq!(comments("/// doc")[0].kind, SpanKind::DocLineComment);
        assert_eq!(comments("//! inner doc")[0].kind, SpanKind::DocLineComment);
        assert_eq!(comments("//// banner")[0].kind, SpanKind::LineComment);
    }

    #[test]
    fn block_comment_kinds() {
        assert_eq!(comments("/* plain */")[0].kind, SpanKind::BlockComment);
        assert_eq!(comments("/** doc */")[0].kind, SpanKind::DocBlockComment);
        assert_eq!(comments("/*! doc */")[0].kind, SpanKind::DocBlockComment);
        assert_eq!(comments("/**/")[0].kind, SpanKind::BlockComment);
        assert_eq!(comments("/*** rule ***/")[0].kind, SpanKind::BlockComment);
    }

    #[test]
    fn multiline_block_comment_span() {
        let spans = comments("/*\n\n  text\n*/\nfn f() {}\n");

        assert_eq!(spans, vec![Span::new(SpanKind::BlockComment, 0, 3)]);
    }

    #[test]
    fn nested_block_comment() {
        let lexed = lex("/* outer /* inner */ still outer */ x");
        let spans: Vec<_> = lexed.trivia.iter().filter(|s| s.kind.is_comment()).collect();

        assert_eq!(spans.len(), 1);
        assert_eq!(lexed.tokens.len(), 1);
    }

    #[test]
    fn comment_markers_inside_strings_are_tokens() {
        let lexed = lex("let s = \"// not a comment /*\";\nlet t = 1;\n");

        assert!(lexed.trivia.iter().all(|s| !s.kind.is_comment()));
    }

    #[test]
    fn multiline_string_is_one_token() {
        let source = "let s = \"first\n\n// inside\nlast\";\n";
        let lexed = lex(source);
        let string = lexed
            .tokens
            .iter()
            .find(|s| s.start_line != s.end_line)
            .copied();

        assert_eq!(string, Some(Span::new(SpanKind::Token, 0, 3)));
        assert!(lexed.trivia.iter().all(|s| !s.kind.is_comment()));
    }

    #[test]
    fn raw_strings_with_hashes() {
        let source = "let s = r#\"\n\"quoted\" // text\n\"#;\nlet b = br##\"x\"# y\"##;\n";
        let lexed = lex(source);

        assert!(lexed.trivia.iter().all(|s| !s.kind.is_comment()));
        assert!(lexed
            .tokens
            .iter()
            .any(|s| s.start_line == 0 && s.end_line == 2));
    }

    #[test]
    fn raw_identifier_is_not_a_string() {
        let lexed = lex("let r#type = 1; // note\n");

        assert_eq!(comments("let r#type = 1; // note\n").len(), 1);
        assert!(lexed.tokens.iter().all(|s| s.end_line == 0));
    }

    #[test]
    fn char_literals_and_lifetimes() {
        let source = "fn f<'a>(x: &'a str) -> char { '\"' }\nlet q = '\\'';\nlet b = b'/';\n// end\n";
        let spans = comments(source);

        assert_eq!(spans, vec![Span::new(SpanKind::LineComment, 3, 3)]);
    }

    #[test]
    fn crlf_and_lone_cr_line_breaks() {
        let lexed = lex("a\r\nb\rc\n");

        assert_eq!(lexed.line_count, 3);
        let lines: Vec<usize> = lexed.tokens.iter().map(|s| s.start_line).collect();
        assert_eq!(lines, vec![0, 1, 2]);
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let lexed = lex("\u{feff}// header comment\nfn f() {}\n");

        assert_eq!(lexed.line_count, 2);
        assert_eq!(lexed.trivia[0], Span::new(SpanKind::LineComment, 0, 0));
        assert!(lexed.tokens.iter().all(|t| t.start_line == 1));
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        let spans = comments("x\n/* open\nstill open\n");

        assert_eq!(spans, vec![Span::new(SpanKind::BlockComment, 1, 2)]);
    }
}
