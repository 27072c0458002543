//! Shell state that persists between commands
//!
//! - last foreground termination (exit code or signal)
//! - the background job registry
//!
//! The foreground-only mode is not stored here: the SIGTSTP handler owns it
//! (see [`crate::signals`]).

use std::fmt;

use nix::sys::wait::WaitStatus;

use crate::jobs::JobRegistry;

/// How the last foreground process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastStatus {
    Exited(i32),
    Signaled(i32),
}

impl Default for LastStatus {
    fn default() -> Self {
        LastStatus::Exited(0)
    }
}

impl LastStatus {
    /// Decompose a wait status. `None` for states that are not terminations.
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(LastStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(LastStatus::Signaled(signal as i32)),
            _ => None,
        }
    }

    pub fn success(&self) -> bool {
        *self == LastStatus::Exited(0)
    }
}

impl fmt::Display for LastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastStatus::Exited(code) => write!(f, "exit value {}", code),
            LastStatus::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

#[derive(Debug, Default)]
pub struct ShellState {
    /// Last foreground termination
    pub last_status: LastStatus,
    /// Outstanding background jobs
    pub jobs: JobRegistry,
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }
}
