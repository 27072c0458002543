//! Signal handling for smallsh
//!
//! - SIGTSTP (Ctrl+Z): toggles foreground-only mode
//! - SIGINT (Ctrl+C): ignored by the shell, restored to default in foreground children
//!
//! The mode lives in a single atomic word. The handler is the only writer;
//! the main loop only reads it, so no lock is shared with signal context.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{kill, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::Pid;

/// Background-request handling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `&` launches a background job
    Normal,
    /// `&` is stripped and the command runs in the foreground
    ForegroundOnly,
}

impl Mode {
    pub fn allows_background(self) -> bool {
        self == Mode::Normal
    }
}

/// True while in foreground-only mode
static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_MESSAGE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_MESSAGE: &[u8] = b"\nExiting foreground-only mode\n";

/// Current mode. Lock-free and allocation-free.
pub fn current_mode() -> Mode {
    if FOREGROUND_ONLY.load(Ordering::SeqCst) {
        Mode::ForegroundOnly
    } else {
        Mode::Normal
    }
}

/// Flip the mode and announce the new one on stdout.
///
/// Runs in signal context: one atomic RMW and a raw `write(2)` of a static
/// buffer, nothing else.
pub fn toggle_mode() -> Mode {
    let was_foreground_only = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    let (mode, message) = if was_foreground_only {
        (Mode::Normal, EXIT_MESSAGE)
    } else {
        (Mode::ForegroundOnly, ENTER_MESSAGE)
    };
    // SAFETY: write(2) is async-signal-safe and the buffer is static
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            message.as_ptr() as *const libc::c_void,
            message.len(),
        );
    }
    mode
}

/// Install the shell's own signal dispositions
pub fn setup_signal_handlers() -> std::io::Result<()> {
    use signal_hook::low_level;

    // SAFETY: toggle_mode only touches an atomic and calls write(2)
    unsafe {
        low_level::register(signal_hook::consts::SIGTSTP, || {
            toggle_mode();
        })?;
    }

    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    // SAFETY: SIG_IGN installs no handler code
    unsafe { sigaction(Signal::SIGINT, &ignore) }.map_err(std::io::Error::from)?;
    Ok(())
}

/// Dispositions for a freshly forked child, before exec.
///
/// Every child ignores SIGTSTP; only foreground children get SIGINT back.
/// Background children keep the inherited SIG_IGN for SIGINT across exec.
pub(crate) fn prepare_child(foreground: bool) {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    // SAFETY: sigaction is async-signal-safe; no handler code is installed
    unsafe {
        let _ = sigaction(Signal::SIGTSTP, &ignore);
        if foreground {
            let _ = sigaction(Signal::SIGINT, &default);
        }
    }
}

/// Send SIGTERM to a process
pub fn terminate_process(pid: Pid) -> Result<(), String> {
    kill(pid, Signal::SIGTERM)
        .map_err(|e| format!("Failed to terminate process {}: {}", pid, e))
}
