//! Tokenization for smallsh
//!
//! A line splits into whitespace-delimited words. Operators (`<`, `>`, `&`)
//! are ordinary words here; the parser recognizes them only when they stand
//! alone. Every word gets one expansion pass that replaces the marker (`$$`
//! by default) with the shell's process id.

use nom::{
    bytes::complete::{take_till1, take_while},
    multi::many0,
    sequence::preceded,
    IResult,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexError {
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Splits lines into expanded tokens
#[derive(Debug, Clone)]
pub struct Lexer {
    max_line: usize,
    marker: String,
    pid: String,
}

impl Lexer {
    /// `pid` is the decimal text substituted for each marker occurrence
    pub fn new(max_line: usize, marker: impl Into<String>, pid: impl Into<String>) -> Self {
        Lexer {
            max_line,
            marker: marker.into(),
            pid: pid.into(),
        }
    }

    /// Tokenize one line, truncating it to the configured length first
    pub fn tokenize(&self, line: &str) -> Result<Vec<String>, LexError> {
        let line = truncate_line(line, self.max_line);
        let words = split_words(line)?;
        Ok(words
            .into_iter()
            .map(|w| expand_marker(w, &self.marker, &self.pid))
            .collect())
    }
}

/// Cut `line` to at most `max` bytes without splitting a character
pub fn truncate_line(line: &str, max: usize) -> &str {
    if line.len() <= max {
        return line;
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    tracing::warn!(len = line.len(), max, "input line truncated");
    &line[..end]
}

/// Replace every occurrence of `marker` in `token` with `replacement`.
///
/// Scanning resumes just past each inserted replacement, so adjacent markers
/// (`$$$$`) both expand and text produced by a replacement is never rescanned.
pub fn expand_marker(token: &str, marker: &str, replacement: &str) -> String {
    if marker.is_empty() {
        return token.to_string();
    }

    let mut expanded = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(idx) = rest.find(marker) {
        expanded.push_str(&rest[..idx]);
        expanded.push_str(replacement);
        rest = &rest[idx + marker.len()..];
    }
    expanded.push_str(rest);
    expanded
}

/// Parse one word, skipping any leading whitespace
fn word(input: &str) -> IResult<&str, &str> {
    preceded(take_while(char::is_whitespace), take_till1(char::is_whitespace))(input)
}

/// Split a line on runs of whitespace
fn split_words(input: &str) -> Result<Vec<&str>, LexError> {
    let (_, words) = many0(word)(input).map_err(|e| LexError::ParseError(e.to_string()))?;
    Ok(words)
}
