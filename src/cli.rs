use smallsh::config::parse_limit;
use smallsh::{Config, LastStatus, Outcome, Shell};
use crate::rcfile::run_source;
use std::fs;
use std::process::ExitCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) script: Option<String>,
    pub(crate) help: bool,
    pub(crate) version: bool,
    pub(crate) trace: bool,
    pub(crate) norc: bool,
    pub(crate) prompt: Option<String>,
    /// Raw values; validated in `apply`, once logging is up
    pub(crate) max_line: Option<String>,
    pub(crate) max_args: Option<String>,
}

impl CliArgs {
    /// Layer the flags over an existing configuration
    pub(crate) fn apply(&self, mut config: Config) -> Config {
        if let Some(prompt) = &self.prompt {
            config.prompt = prompt.clone();
        }
        if let Some(n) = parse_limit("--max-line", self.max_line.clone()) {
            config.max_line = n;
        }
        if let Some(n) = parse_limit("--max-args", self.max_args.clone()) {
            config.max_args = n;
        }
        config
    }
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs::default();

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "--trace" => {
                cli.trace = true;
            }
            "--norc" => {
                cli.norc = true;
            }
            "--prompt" => {
                i += 1;
                cli.prompt = args.get(i).cloned();
            }
            "--max-line" => {
                i += 1;
                cli.max_line = args.get(i).cloned();
            }
            "--max-args" => {
                i += 1;
                cli.max_args = args.get(i).cloned();
            }
            "-c" => {
                // Everything after -c is the command
                if i + 1 < args.len() {
                    cli.command = Some(args[i + 1..].join(" "));
                    break;
                }
            }
            "--help" | "-h" => {
                cli.help = true;
            }
            "--version" | "-V" => {
                cli.version = true;
            }
            path => {
                // Assume it's a script file if not a flag
                if !path.starts_with('-') {
                    cli.script = Some(path.to_string());
                }
            }
        }
        i += 1;
    }

    cli
}

pub(crate) fn print_help() {
    println!(
        r#"smallsh-{} - a small shell with foreground/background jobs

USAGE:
    smallsh                     Start interactive shell
    smallsh -c <command>        Execute a single command line
    smallsh <script>            Execute each line of a script file
    smallsh --help              Show this help message
    smallsh --version           Show version

OPTIONS:
    --norc                      Do not run ~/.smallshrc
    --trace                     Debug logging on stderr
    --prompt <text>             Prompt string (default ": ")
    --max-line <bytes>          Truncate longer lines (default 2048)
    --max-args <n>              Reject commands with more arguments (default 512)

ENVIRONMENT:
    SMALLSH_PROMPT, SMALLSH_MAX_LINE, SMALLSH_MAX_ARGS
                                Same as the options above
    SMALLSH_LOG                 Log filter (e.g. debug, smallsh=trace)

SYNTAX:
    command [arg...] [< infile] [> outfile] [&]
    # comment                   Ignored, as are blank lines
    $$                          Expands to the shell's process id

BUILTINS:
    status                      Exit value or signal of the last foreground command
    cd [dir]                    Change directory ($HOME without an argument)
    exit                        Terminate background jobs and leave

SIGNALS:
    Ctrl+Z                      Toggle foreground-only mode (& is ignored)
    Ctrl+C                      Interrupts the foreground command, not the shell
"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("smallsh-{}", VERSION);
}

/// Map the last foreground status onto the process exit code
fn exit_code_for(status: LastStatus) -> ExitCode {
    match status {
        LastStatus::Exited(code) => ExitCode::from(code as u8),
        LastStatus::Signaled(signal) => ExitCode::from((128 + signal) as u8),
    }
}

/// Execute a single command line
pub(crate) fn execute_command(shell: &mut Shell, cmd: &str) -> ExitCode {
    if shell.execute_line(cmd) == Outcome::Exit {
        return ExitCode::SUCCESS;
    }
    shell.shutdown();
    exit_code_for(shell.last_status())
}

/// Execute a script file
pub(crate) fn execute_script(shell: &mut Shell, path: &str) -> ExitCode {
    let content = match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    if run_source(shell, &content, path) == Outcome::Exit {
        return ExitCode::SUCCESS;
    }
    shell.shutdown();
    exit_code_for(shell.last_status())
}
