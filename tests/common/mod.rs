//! Common test utilities for smallsh integration tests

#![allow(dead_code)]

pub use smallsh::{parse, Config, LastStatus, Mode, Outcome, Shell};

use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A shell whose messages land in memory
pub type TestShell = Shell<Vec<u8>, Vec<u8>>;

/// Serializes tests that fork: the background sweep reaps *any* child of
/// the test process, so two forking tests must never overlap.
static FORK_LOCK: Mutex<()> = Mutex::new(());

pub fn serial() -> MutexGuard<'static, ()> {
    FORK_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn shell() -> TestShell {
    Shell::with_writers(Config::default(), Vec::new(), Vec::new())
}

pub fn stdout(shell: &TestShell) -> String {
    String::from_utf8_lossy(shell.out()).into_owned()
}

pub fn stderr(shell: &TestShell) -> String {
    String::from_utf8_lossy(shell.err()).into_owned()
}

/// Run blank lines until the registry is empty or the deadline passes
pub fn sweep_until_idle(shell: &mut TestShell, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !shell.jobs().is_empty() && Instant::now() < deadline {
        shell.execute_line("");
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Blocking reap of a child the shell left behind
pub fn reap(pid: Pid) -> WaitStatus {
    waitpid(pid, None).expect("waitpid failed")
}

/// Write a small `sh` script into `dir` and return its path as a string
pub fn script(dir: &std::path::Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("failed to write script");
    path.to_str().expect("utf-8 temp path").to_string()
}
