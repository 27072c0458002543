//! Shell - the execution engine
//!
//! The Shell owns all state and runs one line at a time:
//! 1. Tokenize and expand the marker (lexer)
//! 2. Parse into an Invocation under the current mode (parser + signals)
//! 3. Dispatch to a builtin, or fork/exec an external program (executor)
//! 4. Sweep finished background jobs (jobs)
//!
//! User-facing messages go to the `out` writer; errors go to `err` as
//! `smallsh: <error>`. No error ends the shell; only `exit` does.

mod builtins;

use std::io::{self, Write};
use std::path::PathBuf;

use nix::unistd::{getpid, Pid};
use thiserror::Error;

use crate::config::Config;
use crate::executor::{self, ExecuteError};
use crate::jobs::{Completion, JobRegistry};
use crate::lexer::{LexError, Lexer};
use crate::parser::{parse, Invocation, ParseError};
use crate::signals;
use crate::state::{LastStatus, ShellState};

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Lexer error: {0}")]
    Lex(#[from] LexError),
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Execute(#[from] ExecuteError),
    #[error("cd: {}: {source}", .path.display())]
    Cd { path: PathBuf, source: io::Error },
    #[error("cd: HOME not set")]
    NoHome,
    #[error("cd: too many arguments")]
    CdTooManyArgs,
    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

/// What the read loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// `exit` ran: background jobs are signaled, the shell should end with success
    Exit,
}

pub struct Shell<O: Write = io::Stdout, E: Write = io::Stderr> {
    config: Config,
    lexer: Lexer,
    pid: Pid,
    state: ShellState,
    out: O,
    err: E,
}

impl Shell {
    /// A shell writing to the process's stdout and stderr
    pub fn new(config: Config) -> Self {
        Shell::with_writers(config, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Shell<O, E> {
    pub fn with_writers(config: Config, out: O, err: E) -> Self {
        let pid = getpid();
        let lexer = Lexer::new(config.max_line, config.marker.clone(), pid.to_string());
        Shell {
            config,
            lexer,
            pid,
            state: ShellState::new(),
            out,
            err,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shell's own pid (what the marker expands to)
    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn last_status(&self) -> LastStatus {
        self.state.last_status
    }

    pub fn jobs(&self) -> &JobRegistry {
        &self.state.jobs
    }

    pub fn out(&self) -> &O {
        &self.out
    }

    pub fn err(&self) -> &E {
        &self.err
    }

    /// Run one input line, report any error, then sweep background jobs
    pub fn execute_line(&mut self, line: &str) -> Outcome {
        let outcome = match self.dispatch_line(line) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report_error(&e);
                Outcome::Continue
            }
        };

        if outcome == Outcome::Continue {
            self.reap_background();
        }
        outcome
    }

    /// Tokenize, parse and run a line, without the sweep
    pub fn dispatch_line(&mut self, line: &str) -> Result<Outcome, ShellError> {
        let tokens = self.lexer.tokenize(line)?;
        let invocation = parse(tokens, signals::current_mode(), self.config.max_args)?;
        self.run(&invocation)
    }

    /// Run an already parsed invocation
    pub fn run(&mut self, invocation: &Invocation) -> Result<Outcome, ShellError> {
        let Some(program) = invocation.program() else {
            return Ok(Outcome::Continue);
        };

        match program {
            "status" => self.builtin_status(),
            "cd" => self.builtin_cd(invocation.args()),
            "exit" => self.builtin_exit(),
            _ => self.run_external(invocation),
        }
    }

    fn run_external(&mut self, invocation: &Invocation) -> Result<Outcome, ShellError> {
        // Nothing buffered may be duplicated into, or overtaken by, the child
        self.out.flush()?;
        self.err.flush()?;

        let pid = executor::spawn(invocation, &self.config.null_device)?;

        if invocation.background {
            self.state.jobs.register(pid);
            writeln!(self.out, "background pid is {}", pid)?;
        } else {
            let status = executor::wait_foreground(pid)?;
            self.state.last_status = status;
            if let LastStatus::Signaled(_) = status {
                writeln!(self.out, "{}", status)?;
            }
        }
        self.out.flush()?;
        Ok(Outcome::Continue)
    }

    /// Report every background child that has finished, without blocking
    pub fn reap_background(&mut self) -> Vec<Completion> {
        let done = self.state.jobs.sweep();
        for completion in &done {
            if let Err(e) = writeln!(self.out, "{}", completion) {
                tracing::warn!(error = %e, "failed to report background completion");
            }
        }
        let _ = self.out.flush();
        done
    }

    /// Send SIGTERM to every tracked background job
    pub fn shutdown(&mut self) -> Vec<Pid> {
        let signaled = self.state.jobs.terminate_all();
        tracing::debug!(count = signaled.len(), "terminated background jobs");
        signaled
    }

    fn report_error(&mut self, e: &ShellError) {
        tracing::debug!(error = ?e, "command failed");
        let _ = writeln!(self.err, "smallsh: {}", e);
        let _ = self.err.flush();
    }
}
