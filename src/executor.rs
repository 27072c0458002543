//! Executor: runs external programs
//!
//! fork, then in the child: signal dispositions, redirections, exec.
//! Everything the child needs (C strings, argv pointer array, error
//! messages) is built before the fork, so the child only makes raw system
//! calls until exec replaces it or `_exit` ends it.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;

use libc::c_char;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{close, dup2, fork, ForkResult, Pid};
use thiserror::Error;

use crate::parser::Invocation;
use crate::signals;
use crate::state::LastStatus;

/// Child exit code when the input redirect cannot be opened
pub const EXIT_INPUT_FAILED: i32 = 1;
/// Child exit code when the output redirect cannot be opened
pub const EXIT_OUTPUT_FAILED: i32 = 2;
/// Child exit code when the program cannot be executed
pub const EXIT_NOT_FOUND: i32 = 127;

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("Failed to fork: {0}")]
    Fork(Errno),
    #[error("Argument contains a NUL byte: {0:?}")]
    NulByte(String),
    #[error("Failed to wait for process {pid}: {source}")]
    Wait { pid: Pid, source: Errno },
    #[error("Nothing to execute")]
    EmptyCommand,
}

/// One stream redirection, applied in the child
#[derive(Debug)]
struct Redirect {
    path: CString,
    flags: OFlag,
    mode: Mode,
    target: RawFd,
    error_message: Vec<u8>,
    dup_error_message: Vec<u8>,
    exit_code: i32,
}

impl Redirect {
    fn input(path: &Path) -> Result<Self, ExecuteError> {
        Ok(Redirect {
            path: path_cstring(path)?,
            flags: OFlag::O_RDONLY,
            mode: Mode::empty(),
            target: libc::STDIN_FILENO,
            error_message: format!("cannot open {} for input\n", path.display()).into_bytes(),
            dup_error_message: format!("cannot redirect input from {}\n", path.display())
                .into_bytes(),
            exit_code: EXIT_INPUT_FAILED,
        })
    }

    fn output(path: &Path, truncate: bool) -> Result<Self, ExecuteError> {
        let flags = if truncate {
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC
        } else {
            OFlag::O_WRONLY
        };
        Ok(Redirect {
            path: path_cstring(path)?,
            flags,
            mode: Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH,
            target: libc::STDOUT_FILENO,
            error_message: format!("cannot open {} for output\n", path.display()).into_bytes(),
            dup_error_message: format!("cannot redirect output to {}\n", path.display())
                .into_bytes(),
            exit_code: EXIT_OUTPUT_FAILED,
        })
    }

    /// Open, move onto the target stream, close the original descriptor.
    /// On failure, returns the message naming the step that failed.
    fn apply(&self) -> Result<(), &[u8]> {
        let fd = open(self.path.as_c_str(), self.flags, self.mode)
            .map_err(|_| self.error_message.as_slice())?;
        if fd != self.target {
            let moved = dup2(fd, self.target);
            let _ = close(fd);
            moved.map_err(|_| self.dup_error_message.as_slice())?;
        }
        Ok(())
    }
}

/// Everything a forked child needs, prepared in the parent
#[derive(Debug)]
pub(crate) struct ChildPlan {
    argv: Vec<CString>,
    argv_ptrs: Vec<*const c_char>,
    redirects: Vec<Redirect>,
    foreground: bool,
    not_found_message: Vec<u8>,
}

impl ChildPlan {
    /// Explicit redirects come first; a background job's unredirected
    /// streams fall back to the null device, each stream on its own.
    pub(crate) fn new(invocation: &Invocation, null_device: &Path) -> Result<Self, ExecuteError> {
        let program = invocation.program().ok_or(ExecuteError::EmptyCommand)?;

        let argv = invocation
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_str()).map_err(|_| ExecuteError::NulByte(arg.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        let mut argv_ptrs: Vec<*const c_char> = argv.iter().map(|a| a.as_ptr()).collect();
        argv_ptrs.push(std::ptr::null());

        let mut redirects = Vec::with_capacity(2);
        if let Some(path) = &invocation.input {
            redirects.push(Redirect::input(Path::new(path))?);
        }
        if let Some(path) = &invocation.output {
            redirects.push(Redirect::output(Path::new(path), true)?);
        }
        if invocation.background {
            if invocation.input.is_none() {
                redirects.push(Redirect::input(null_device)?);
            }
            if invocation.output.is_none() {
                redirects.push(Redirect::output(null_device, false)?);
            }
        }

        Ok(ChildPlan {
            argv,
            argv_ptrs,
            redirects,
            foreground: !invocation.background,
            not_found_message: format!("{}: no such file or directory\n", program).into_bytes(),
        })
    }

    /// Runs in the forked child. Never returns.
    fn exec(&self) -> ! {
        signals::prepare_child(self.foreground);

        for redirect in &self.redirects {
            if let Err(message) = redirect.apply() {
                child_fail(message, redirect.exit_code);
            }
        }

        // SAFETY: argv_ptrs is NULL-terminated and points into self.argv,
        // which outlives this call
        unsafe {
            libc::execvp(self.argv[0].as_ptr(), self.argv_ptrs.as_ptr());
        }
        child_fail(&self.not_found_message, EXIT_NOT_FOUND)
    }
}

/// Report on stderr and leave the child without running any parent cleanup
fn child_fail(message: &[u8], code: i32) -> ! {
    // SAFETY: write(2) and _exit(2) are async-signal-safe
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            message.as_ptr() as *const libc::c_void,
            message.len(),
        );
        libc::_exit(code)
    }
}

fn path_cstring(path: &Path) -> Result<CString, ExecuteError> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| ExecuteError::NulByte(path.display().to_string()))
}

/// Fork a child for `invocation` and return its pid without waiting
pub fn spawn(invocation: &Invocation, null_device: &Path) -> Result<Pid, ExecuteError> {
    let plan = ChildPlan::new(invocation, null_device)?;

    // SAFETY: the child touches only the pre-built plan and raw system calls
    // before exec or _exit
    match unsafe { fork() }.map_err(ExecuteError::Fork)? {
        ForkResult::Child => plan.exec(),
        ForkResult::Parent { child } => {
            tracing::debug!(
                pid = child.as_raw(),
                program = invocation.program().unwrap_or_default(),
                background = invocation.background,
                "spawned"
            );
            Ok(child)
        }
    }
}

/// Block until `pid` terminates and decompose how it ended
pub fn wait_foreground(pid: Pid) -> Result<LastStatus, ExecuteError> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(status) = LastStatus::from_wait_status(status) {
                    return Ok(status);
                }
            }
            // SIGTSTP may land while we are blocked here
            Err(Errno::EINTR) => continue,
            Err(source) => return Err(ExecuteError::Wait { pid, source }),
        }
    }
}
