use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use smallsh::{Outcome, Shell};
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

// ============================================
// Line sources
// ============================================

/// One read from the line source
enum Line {
    Text(String),
    /// Ctrl+C at the prompt
    Interrupted,
    /// The editor could not decode the line
    Undecodable,
    Eof,
}

/// Where input lines come from: a line editor on a terminal, plain stdin otherwise
enum LineSource {
    Editor(Box<DefaultEditor>),
    Plain(io::Stdin),
}

impl LineSource {
    fn new() -> Self {
        if !io::stdin().is_terminal() {
            return LineSource::Plain(io::stdin());
        }
        match DefaultEditor::new() {
            Ok(editor) => LineSource::Editor(Box::new(editor)),
            Err(e) => {
                tracing::warn!(error = %e, "line editor unavailable, reading plain stdin");
                LineSource::Plain(io::stdin())
            }
        }
    }

    fn read(&mut self, prompt: &str) -> io::Result<Line> {
        match self {
            LineSource::Editor(rl) => match rl.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    Ok(Line::Text(line))
                }
                Err(ReadlineError::Interrupted) => Ok(Line::Interrupted),
                Err(ReadlineError::Eof) => Ok(Line::Eof),
                Err(ReadlineError::Io(e)) => Err(e),
                Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
            },
            LineSource::Plain(stdin) => {
                let mut stdout = io::stdout();
                stdout.write_all(prompt.as_bytes())?;
                stdout.flush()?;

                // Fresh buffer every cycle; arbitrary bytes are accepted
                let mut raw = Vec::new();
                if stdin.lock().read_until(b'\n', &mut raw)? == 0 {
                    return Ok(Line::Eof);
                }
                Ok(Line::Text(String::from_utf8_lossy(&raw).into_owned()))
            }
        }
    }
}

// ============================================
// Main loop
// ============================================

/// Read-execute loop. Returns only through `exit` or end of input.
pub(crate) fn run_repl(shell: &mut Shell) -> ExitCode {
    let mut source = LineSource::new();
    let prompt = shell.config().prompt.clone();

    loop {
        match source.read(&prompt) {
            Ok(Line::Text(line)) => {
                if shell.execute_line(&line) == Outcome::Exit {
                    return ExitCode::SUCCESS;
                }
            }
            Ok(Line::Interrupted) => {
                shell.reap_background();
            }
            Ok(Line::Undecodable) => {
                tracing::warn!("discarding a line that is not valid UTF-8");
                shell.reap_background();
            }
            Ok(Line::Eof) => {
                // A last no-op cycle, then the same path as `exit`
                shell.reap_background();
                shell.shutdown();
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                shell.shutdown();
                return ExitCode::FAILURE;
            }
        }
    }
}
