//! Parser for smallsh
//!
//! Turns a token sequence into an [`Invocation`]: the argument vector, the
//! optional redirect targets and the background flag. Redirect operators
//! and their targets never reach the argument vector.

use crate::signals::Mode;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing file name after '{0}'")]
    MissingRedirectTarget(String),
    #[error("Too many arguments (limit is {0})")]
    TooManyArguments(usize),
}

/// One parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program name first. Empty for the no-op invocation.
    pub argv: Vec<String>,
    /// `< path`
    pub input: Option<String>,
    /// `> path`
    pub output: Option<String>,
    /// The line ended in `&`
    pub background_requested: bool,
    /// `&` was requested and the mode honored it
    pub background: bool,
}

impl Invocation {
    /// The invocation for blank lines and comments
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.argv.is_empty()
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }
}

/// Parser state
pub struct Parser {
    tokens: Vec<String>,
    pos: usize,
    max_args: usize,
}

impl Parser {
    pub fn new(tokens: Vec<String>, max_args: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            max_args,
        }
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    /// Consume and return the current token
    fn advance(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    /// Consume the file name following a redirect operator
    fn redirect_target(&mut self, op: &str) -> Result<String, ParseError> {
        if matches!(self.peek(), Some("<") | Some(">") | None) {
            return Err(ParseError::MissingRedirectTarget(op.to_string()));
        }
        self.advance()
            .ok_or_else(|| ParseError::MissingRedirectTarget(op.to_string()))
    }

    /// Parse the whole token sequence under the given mode
    pub fn parse(&mut self, mode: Mode) -> Result<Invocation, ParseError> {
        if self.peek().map_or(true, is_comment) {
            return Ok(Invocation::noop());
        }

        let mut invocation = Invocation::noop();
        while let Some(token) = self.advance() {
            match token.as_str() {
                "<" => invocation.input = Some(self.redirect_target("<")?),
                ">" => invocation.output = Some(self.redirect_target(">")?),
                _ => {
                    if invocation.argv.len() >= self.max_args {
                        return Err(ParseError::TooManyArguments(self.max_args));
                    }
                    invocation.argv.push(token);
                }
            }
        }

        if invocation.argv.last().map(String::as_str) == Some("&") {
            invocation.argv.pop();
            invocation.background_requested = true;
            invocation.background = mode.allows_background();
        }

        if invocation.argv.first().map_or(true, |a| is_comment(a)) {
            return Ok(Invocation::noop());
        }

        Ok(invocation)
    }
}

fn is_comment(token: &str) -> bool {
    token.starts_with('#')
}

/// Convenience function to parse tokens
pub fn parse(tokens: Vec<String>, mode: Mode, max_args: usize) -> Result<Invocation, ParseError> {
    Parser::new(tokens, max_args).parse(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn parse_normal(line: &str) -> Result<Invocation, ParseError> {
        parse(toks(line), Mode::Normal, 512)
    }

    #[test]
    fn plain_command() {
        let inv = parse_normal("ls -la /tmp").unwrap();
        assert_eq!(inv.argv, vec!["ls", "-la", "/tmp"]);
        assert_eq!(inv.program(), Some("ls"));
        assert_eq!(inv.args(), ["-la".to_string(), "/tmp".to_string()]);
        assert!(inv.input.is_none());
        assert!(inv.output.is_none());
        assert!(!inv.background);
    }

    #[test]
    fn redirects_are_removed_from_argv() {
        let inv = parse_normal("sort < in.txt > out.txt").unwrap();
        assert_eq!(inv.argv, vec!["sort"]);
        assert_eq!(inv.input.as_deref(), Some("in.txt"));
        assert_eq!(inv.output.as_deref(), Some("out.txt"));
    }

    #[test]
    fn redirects_in_either_order_and_between_args() {
        let inv = parse_normal("wc > out.txt -l < in.txt").unwrap();
        assert_eq!(inv.argv, vec!["wc", "-l"]);
        assert_eq!(inv.input.as_deref(), Some("in.txt"));
        assert_eq!(inv.output.as_deref(), Some("out.txt"));
    }

    #[test]
    fn trailing_ampersand_requests_background() {
        let inv = parse_normal("sleep 5 &").unwrap();
        assert_eq!(inv.argv, vec!["sleep", "5"]);
        assert!(inv.background_requested);
        assert!(inv.background);
    }

    #[test]
    fn foreground_only_mode_strips_but_ignores_ampersand() {
        let inv = parse(toks("sleep 5 &"), Mode::ForegroundOnly, 512).unwrap();
        assert_eq!(inv.argv, vec!["sleep", "5"]);
        assert!(inv.background_requested);
        assert!(!inv.background);
    }

    #[test]
    fn ampersand_not_last_is_an_argument() {
        let inv = parse_normal("echo & done").unwrap();
        assert_eq!(inv.argv, vec!["echo", "&", "done"]);
        assert!(!inv.background);
    }

    #[test]
    fn background_with_redirects() {
        let inv = parse_normal("cat < in > out &").unwrap();
        assert_eq!(inv.argv, vec!["cat"]);
        assert!(inv.background);
        assert_eq!(inv.input.as_deref(), Some("in"));
    }

    #[test]
    fn blank_and_comment_lines_are_noop() {
        assert!(parse_normal("").unwrap().is_noop());
        assert!(parse_normal("# a comment").unwrap().is_noop());
        assert!(parse_normal("#no-space").unwrap().is_noop());
        assert!(parse_normal("&").unwrap().is_noop());
    }

    #[test]
    fn comment_with_dangling_operator_is_still_noop() {
        assert!(parse_normal("# see <").unwrap().is_noop());
    }

    #[test]
    fn hash_inside_later_argument_is_kept() {
        let inv = parse_normal("echo #not-a-comment").unwrap();
        assert_eq!(inv.argv, vec!["echo", "#not-a-comment"]);
    }

    #[test]
    fn dangling_redirect_is_rejected() {
        assert_eq!(
            parse_normal("cat <"),
            Err(ParseError::MissingRedirectTarget("<".into()))
        );
        assert_eq!(
            parse_normal("ls >"),
            Err(ParseError::MissingRedirectTarget(">".into()))
        );
    }

    #[test]
    fn redirect_followed_by_operator_is_rejected() {
        assert_eq!(
            parse_normal("cat < > out"),
            Err(ParseError::MissingRedirectTarget("<".into()))
        );
    }

    #[test]
    fn argument_limit_is_enforced() {
        assert!(parse(toks("a b c"), Mode::Normal, 3).is_ok());
        assert_eq!(
            parse(toks("a b c d"), Mode::Normal, 3),
            Err(ParseError::TooManyArguments(3))
        );
    }
}
