//! smallsh - a small shell with foreground/background job control
//!
//! Usage:
//!   smallsh              Start interactive shell
//!   smallsh -c "cmd"     Execute a single command line
//!   smallsh script       Execute a script file

mod cli;
mod rcfile;
mod repl;

use smallsh::{Config, Outcome, Shell};
use std::env;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::{execute_command, execute_script, parse_args, print_help, print_version};
use crate::rcfile::load_smallshrc;
use crate::repl::run_repl;

/// Diagnostics to stderr; `--trace` wins over `SMALLSH_LOG`
fn init_logging(trace: bool) {
    let filter = if trace {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SMALLSH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args);

    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    init_logging(cli.trace);

    if let Err(e) = smallsh::signals::setup_signal_handlers() {
        eprintln!("smallsh: failed to install signal handlers: {}", e);
        return ExitCode::FAILURE;
    }

    let config = cli.apply(Config::from_env());
    tracing::debug!(?config, "starting");
    let mut shell = Shell::new(config);

    if !cli.norc && load_smallshrc(&mut shell) == Outcome::Exit {
        return ExitCode::SUCCESS;
    }

    if let Some(cmd) = cli.command {
        return execute_command(&mut shell, &cmd);
    }

    if let Some(script) = cli.script {
        return execute_script(&mut shell, &script);
    }

    run_repl(&mut shell)
}
