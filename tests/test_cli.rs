//! End-to-end tests driving the smallsh binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::process::Stdio;

/// The binary with a throwaway HOME and no startup file
fn smallsh(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("smallsh").unwrap();
    cmd.env("HOME", home)
        .env_remove("SMALLSH_PROMPT")
        .env_remove("SMALLSH_LOG")
        .arg("--norc");
    cmd
}

#[test]
fn test_version() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("smallsh-"));
}

#[test]
fn test_prompt_and_status() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("status\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(": "))
        .stdout(predicate::str::contains("exit value 0"));
}

#[test]
fn test_end_of_input_exits_cleanly() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("# only a comment\n\n")
        .assert()
        .success();
}

#[test]
fn test_custom_prompt() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .args(["--prompt", "%% "])
        .write_stdin("exit\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("%% "));
}

#[test]
fn test_foreground_redirect_and_status() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("out.txt");
    smallsh(home.path())
        .write_stdin(format!("echo hello > {}\nfalse\nstatus\nexit\n", out.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("exit value 1"));
    assert_eq!(fs::read_to_string(out).unwrap(), "hello\n");
}

#[test]
fn test_background_job_announced_and_reaped() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("sleep 0.1 &\nsleep 0.5\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"background pid is \d+").unwrap())
        .stdout(predicate::str::is_match(r"background pid \d+ is done: exit value 0").unwrap());
}

#[test]
fn test_sigtstp_toggles_foreground_only_mode() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("kill -TSTP $$\nsleep 0.1 &\nkill -TSTP $$\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Entering foreground-only mode (& is now ignored)",
        ))
        .stdout(predicate::str::contains("Exiting foreground-only mode"))
        .stdout(predicate::str::contains("background pid is").not());
}

#[test]
fn test_unknown_command_reports_and_continues() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("smallsh-no-such-command-xyz\nstatus\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "smallsh-no-such-command-xyz: no such file or directory",
        ))
        .stdout(predicate::str::contains("exit value 127"));
}

#[test]
fn test_bad_input_redirect_reports_path() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("cat < /definitely/not/here.txt\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "cannot open /definitely/not/here.txt for input",
        ));
}

#[test]
fn test_cd_changes_directory_for_children() {
    let home = tempfile::tempdir().unwrap();
    let sub = home.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let out = home.path().join("pwd.txt");

    smallsh(home.path())
        .write_stdin(format!("cd {}\npwd > {}\nexit\n", sub.display(), out.display()))
        .assert()
        .success();

    let pwd = fs::read_to_string(out).unwrap();
    assert_eq!(
        fs::canonicalize(pwd.trim()).unwrap(),
        fs::canonicalize(&sub).unwrap()
    );
}

#[test]
fn test_cd_without_argument_goes_home() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("pwd.txt");

    smallsh(home.path())
        .current_dir("/")
        .write_stdin(format!("cd\npwd > {}\nexit\n", out.display()))
        .assert()
        .success();

    let pwd = fs::read_to_string(out).unwrap();
    assert_eq!(
        fs::canonicalize(pwd.trim()).unwrap(),
        fs::canonicalize(home.path()).unwrap()
    );
}

#[test]
fn test_cd_failure_is_reported() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("cd /definitely/not/here\nstatus\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("smallsh: cd: /definitely/not/here"))
        .stdout(predicate::str::contains("exit value 0"));
}

#[test]
fn test_single_command_returns_its_status() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path()).args(["-c", "false"]).assert().code(1);
    smallsh(home.path()).args(["-c", "true"]).assert().success();
}

#[test]
fn test_script_file() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("out.txt");
    let script = home.path().join("run.smallsh");
    fs::write(
        &script,
        format!("# write a file\necho from-script > {}\n\nstatus\n", out.display()),
    )
    .unwrap();

    smallsh(home.path())
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("exit value 0"));
    assert_eq!(fs::read_to_string(out).unwrap(), "from-script\n");
}

#[test]
fn test_startup_file_runs_before_prompt() {
    let home = tempfile::tempdir().unwrap();
    let sub = home.path().join("start");
    fs::create_dir(&sub).unwrap();
    fs::write(
        home.path().join(".smallshrc"),
        format!("# startup\ncd {}\n", sub.display()),
    )
    .unwrap();
    let out = home.path().join("pwd.txt");

    let mut cmd = Command::cargo_bin("smallsh").unwrap();
    cmd.env("HOME", home.path())
        .write_stdin(format!("pwd > {}\nexit\n", out.display()))
        .assert()
        .success();

    let pwd = fs::read_to_string(out).unwrap();
    assert_eq!(
        fs::canonicalize(pwd.trim()).unwrap(),
        fs::canonicalize(&sub).unwrap()
    );
}

#[test]
fn test_marker_expands_to_shell_pid() {
    let home = tempfile::tempdir().unwrap();
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("smallsh"))
        .env("HOME", home.path())
        .arg("--norc")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let pid = child.id();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"echo pid=$$\nexit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("pid={}", pid)), "got: {}", stdout);
}

#[test]
fn test_invalid_utf8_line_does_not_stop_the_shell() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin(&b"echo \xff\nstatus\necho still-alive\nexit\n"[..])
        .assert()
        .success()
        .stdout(predicate::str::contains("exit value 0"))
        .stdout(predicate::str::contains("still-alive"));
}

#[test]
fn test_script_with_invalid_utf8_keeps_running() {
    let home = tempfile::tempdir().unwrap();
    let script = home.path().join("bytes.smallsh");
    fs::write(&script, &b"echo \xfe\xff\necho after-bad-bytes\n"[..]).unwrap();

    smallsh(home.path())
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("after-bad-bytes"));
}

// ============================================
// SIGINT
// ============================================

#[test]
fn test_shell_ignores_sigint() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("kill -INT $$\necho alive\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("alive"));
}

#[test]
fn test_foreground_child_dies_on_sigint() {
    let home = tempfile::tempdir().unwrap();
    let script = home.path().join("int.sh");
    fs::write(&script, "kill -INT $$\nsleep 1\n").unwrap();

    smallsh(home.path())
        .write_stdin(format!("sh {}\nstatus\nexit\n", script.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("terminated by signal 2").count(2));
}

#[test]
fn test_background_child_ignores_sigint() {
    let home = tempfile::tempdir().unwrap();
    let script = home.path().join("int.sh");
    let marker = home.path().join("survived.txt");
    fs::write(
        &script,
        format!("kill -INT $$\necho survived > {}\n", marker.display()),
    )
    .unwrap();

    smallsh(home.path())
        .write_stdin(format!("sh {} &\nsleep 0.5\nexit\n", script.display()))
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"background pid \d+ is done: exit value 0").unwrap())
        .stdout(predicate::str::contains("terminated by signal 2").not());
    assert_eq!(fs::read_to_string(marker).unwrap(), "survived\n");
}

// ============================================
// Diagnostics
// ============================================

#[test]
fn test_bad_limit_flag_is_reported_without_colors() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .args(["--max-line", "bad"])
        .write_stdin("echo fine\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("fine"))
        .stderr(predicate::str::contains("ignoring invalid limit"))
        .stderr(predicate::str::contains("--max-line"))
        .stderr(predicate::str::contains("\u{1b}[").not());
}
