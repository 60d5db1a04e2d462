//! Integration tests for synchronous runs and command construction.
#![cfg(unix)]

use procexec::{Exec, ExecError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn dry_run_of_inline_command() {
    let exec = Exec::new("./success 127.0.0.1 -c 3");
    assert_eq!(exec.dry_run(), "./success 127.0.0.1 -c 3 2>&1");
}

#[test]
fn dry_run_spawns_nothing() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("marker");
    let exec = Exec::new("touch").arg(&marker.to_string_lossy());
    let first = exec.dry_run();
    assert_eq!(first, exec.dry_run());
    assert!(!marker.exists());
}

#[test]
fn run_passes_arguments_through() {
    let res = Exec::new("sh bin/success.sh 127.0.0.1 -c 3")
        .working_directory(fixtures())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(res.exit_code, 0);
    assert_eq!(res.lines, ["bin/success.sh", "127.0.0.1", "-c", "3"]);
}

#[test]
fn run_failure_carries_code_output_and_command() {
    let err = Exec::new("sh bin/fail.sh 127.0.0.1 -c 3")
        .working_directory(fixtures())
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, ExecError::NonZeroExit { .. }));
    assert_eq!(err.code(), Some(10));
    assert_eq!(err.to_string(), "First line\nSecond line\nThird line");
    assert_eq!(err.command(), Some("sh bin/fail.sh 127.0.0.1 -c 3 2>&1"));
}

#[test]
fn single_quoted_arguments_are_escaped() {
    let res = Exec::new("sh bin/success.sh")
        .arg("First-line")
        .arg("'Second line'")
        .arg("'Third 'line'")
        .arg("'Four `ls` 'line'")
        .arg("\"Five `echo many` line\"")
        .working_directory(fixtures())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(
        res.lines,
        [
            "bin/success.sh",
            "First-line",
            "Second line",
            "Third 'line",
            "Four `ls` 'line",
            "Five many line",
        ]
    );
}

#[test]
fn command_substitution_in_quoted_argument_does_not_run() {
    let temp = TempDir::new().unwrap();
    let res = Exec::new("printf '%s\\n'")
        .arg("'$(touch pwned)'")
        .working_directory(temp.path())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(res.lines, ["$(touch pwned)"]);
    assert!(!temp.path().join("pwned").exists());
}

#[test]
fn run_in_working_directory_keeps_caller_directory() {
    let orig = std::env::current_dir().unwrap();
    let res = Exec::new("ls")
        .working_directory(fixtures().join("data"))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(res.exit_code, 0);
    assert_eq!(res.lines, ["a.txt", "b.txt", "c.txt"]);
    assert_eq!(std::env::current_dir().unwrap(), orig);
}

#[test]
fn failed_run_in_working_directory_keeps_caller_directory() {
    let orig = std::env::current_dir().unwrap();
    let result = Exec::new("false")
        .working_directory(fixtures().join("data"))
        .unwrap()
        .run();

    assert!(result.is_err());
    assert_eq!(std::env::current_dir().unwrap(), orig);
}

#[test]
fn missing_working_directory_fails_before_launch() {
    let orig = std::env::current_dir().unwrap();
    let missing = fixtures().join("nope");
    let err = Exec::new("ls").working_directory(&missing).unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("Directory '{}' is not found.", missing.display())
    );
    assert_eq!(std::env::current_dir().unwrap(), orig);
}
