//! Background job registry
//!
//! Records every background child from launch until its termination has been
//! observed and reported. The sweep polls the process table with `WNOHANG`
//! so it never blocks the prompt loop.

use std::fmt;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::signals::terminate_process;
use crate::state::LastStatus;

/// A launched background job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: Pid,
    /// Launch order, starting at 1
    pub order: usize,
}

/// A terminated child found by a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub pid: Pid,
    pub status: LastStatus,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "background pid {} is done: {}", self.pid, self.status)
    }
}

#[derive(Debug, Default)]
pub struct JobRegistry {
    records: Vec<ProcessRecord>,
    launched: usize,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly launched background child
    pub fn register(&mut self, pid: Pid) -> ProcessRecord {
        self.launched += 1;
        let record = ProcessRecord {
            pid,
            order: self.launched,
        };
        self.records.push(record);
        tracing::debug!(pid = pid.as_raw(), order = record.order, "registered background job");
        record
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.records.iter().any(|r| r.pid == pid)
    }

    /// Outstanding jobs in launch order
    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    fn remove(&mut self, pid: Pid) -> Option<ProcessRecord> {
        let idx = self.records.iter().position(|r| r.pid == pid)?;
        Some(self.records.remove(idx))
    }

    /// Reap every child that has already terminated, without blocking.
    ///
    /// Any child counts, not only registered ones. Records for reaped
    /// children are discarded. No children at all ends the sweep quietly.
    pub fn sweep(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        loop {
            match waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => break,
                Ok(status) => {
                    let (Some(pid), Some(status)) = (status.pid(), LastStatus::from_wait_status(status))
                    else {
                        continue;
                    };
                    if self.remove(pid).is_none() {
                        tracing::debug!(pid = pid.as_raw(), "reaped untracked child");
                    }
                    done.push(Completion { pid, status });
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "background sweep failed");
                    break;
                }
            }
        }
        done
    }

    /// Send SIGTERM to every outstanding job and forget them.
    ///
    /// Returns the pids that were signaled successfully.
    pub fn terminate_all(&mut self) -> Vec<Pid> {
        let mut signaled = Vec::with_capacity(self.records.len());
        for record in self.records.drain(..) {
            match terminate_process(record.pid) {
                Ok(()) => signaled.push(record.pid),
                Err(e) => tracing::warn!("{}", e),
            }
        }
        signaled
    }
}
