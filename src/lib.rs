//! smallsh - a small interactive shell
//!
//! # Overview
//!
//! smallsh reads a line, splits it into words, and either runs a builtin or
//! forks and execs an external program. A command can redirect its standard
//! input and output and can run in the background.
//!
//! ```text
//! : ls -la > listing.txt        # stdout to a file
//! : wc -l < listing.txt         # stdin from a file
//! : sleep 30 &                  # background job
//! background pid is 4711
//! : echo $$                     # $$ expands to the shell's pid
//! 4702
//! : status                      # how the last foreground command ended
//! exit value 0
//! : # comments and blank lines do nothing
//! : exit                        # SIGTERM to background jobs, then leave
//! ```
//!
//! # Job Control
//!
//! Ctrl+Z (SIGTSTP) toggles foreground-only mode, in which a trailing `&`
//! is stripped and the command runs in the foreground. Ctrl+C (SIGINT) is
//! ignored by the shell itself but still stops foreground children.
//! Finished background jobs are reported before the next prompt.
//!
//! # Example
//!
//! ```no_run
//! use smallsh::{Config, Outcome, Shell};
//!
//! let mut shell = Shell::new(Config::default());
//! assert_eq!(shell.execute_line("echo hello"), Outcome::Continue);
//! assert!(shell.last_status().success());
//! ```

#[cfg(not(unix))]
compile_error!("smallsh needs fork(2) and POSIX signals; only Unix targets are supported");

pub mod config;
pub mod executor;
pub mod jobs;
pub mod lexer;
pub mod parser;
pub mod shell;
pub mod signals;
pub mod state;

// Re-export commonly used items
pub use config::Config;
pub use executor::{ExecuteError, EXIT_INPUT_FAILED, EXIT_NOT_FOUND, EXIT_OUTPUT_FAILED};
pub use jobs::{Completion, JobRegistry, ProcessRecord};
pub use lexer::{expand_marker, LexError, Lexer};
pub use parser::{parse, Invocation, ParseError};
pub use shell::{Outcome, Shell, ShellError};
pub use signals::Mode;
pub use state::{LastStatus, ShellState};
