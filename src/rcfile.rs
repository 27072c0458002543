use smallsh::{Outcome, Shell};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Get home directory
pub(crate) fn dirs_home() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// Run ~/.smallshrc if it exists
pub(crate) fn load_smallshrc(shell: &mut Shell) -> Outcome {
    let rc_path = match dirs_home() {
        Some(home) => home.join(".smallshrc"),
        None => return Outcome::Continue,
    };

    let content = match fs::read(&rc_path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => return Outcome::Continue,
    };

    tracing::debug!(path = %rc_path.display(), "running startup file");
    run_source(shell, &content, "~/.smallshrc")
}

/// Run each line of `content`, reporting failures with their line number.
///
/// Stops early only if a line runs `exit`.
pub(crate) fn run_source(shell: &mut Shell, content: &str, source: &str) -> Outcome {
    for (line_num, line) in content.lines().enumerate() {
        let outcome = match shell.dispatch_line(line) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("Warning: {} line {}: {}", source, line_num + 1, e);
                Outcome::Continue
            }
        };

        if outcome == Outcome::Exit {
            return Outcome::Exit;
        }
        shell.reap_background();
    }

    Outcome::Continue
}
