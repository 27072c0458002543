//! Runtime configuration for smallsh
//!
//! Limits and presentation knobs. Values come from the built-in defaults,
//! then `SMALLSH_*` environment variables, then command-line flags (applied
//! by the binary on top of [`Config::from_env`]).

use std::env;
use std::path::PathBuf;

/// Maximum accepted line length, in bytes
pub const DEFAULT_MAX_LINE: usize = 2048;
/// Maximum number of arguments in one command
pub const DEFAULT_MAX_ARGS: usize = 512;
/// Prompt shown before each line
pub const DEFAULT_PROMPT: &str = ": ";
/// Token substring replaced by the shell's own process id
pub const DEFAULT_MARKER: &str = "$$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Lines longer than this are truncated before tokenizing
    pub max_line: usize,
    /// Commands with more arguments than this are rejected
    pub max_args: usize,
    pub prompt: String,
    /// Expansion marker
    pub marker: String,
    /// Where background jobs read from and write to when not redirected
    pub null_device: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_line: DEFAULT_MAX_LINE,
            max_args: DEFAULT_MAX_ARGS,
            prompt: DEFAULT_PROMPT.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            null_device: PathBuf::from("/dev/null"),
        }
    }
}

impl Config {
    /// Defaults overridden by `SMALLSH_PROMPT`, `SMALLSH_MAX_LINE` and `SMALLSH_MAX_ARGS`
    pub fn from_env() -> Self {
        Self::default().with_lookup(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (the environment, in practice)
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prompt) = lookup("SMALLSH_PROMPT") {
            self.prompt = prompt;
        }
        if let Some(n) = parse_limit("SMALLSH_MAX_LINE", lookup("SMALLSH_MAX_LINE")) {
            self.max_line = n;
        }
        if let Some(n) = parse_limit("SMALLSH_MAX_ARGS", lookup("SMALLSH_MAX_ARGS")) {
            self.max_args = n;
        }
        self
    }
}

/// Parse a positive limit, ignoring (and logging) anything else
pub fn parse_limit(key: &str, raw: Option<String>) -> Option<usize> {
    let raw = raw?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid limit");
            None
        }
    }
}
