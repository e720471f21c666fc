//! Binary integration tests using `-c` batch mode.

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn nodeshell(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nodeshell"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run nodeshell")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_batch_commands_run_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let output = nodeshell(
        &dir.path().join("config.toml"),
        &["-c", "cn level", "-c", "cm get_child_count()"],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Target: /root/level\nget_child_count: 2\n");
}

#[test]
fn test_failed_command_sets_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = nodeshell(&dir.path().join("config.toml"), &["-c", "fly", "-c", "echo still runs"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown command: fly"));
    assert_eq!(stdout(&output), "still runs\n");
}

#[test]
fn test_quit_stops_batch() {
    let dir = tempfile::tempdir().unwrap();
    let output = nodeshell(&dir.path().join("config.toml"), &["-c", "quit", "-c", "echo after"]);

    assert!(output.status.success());
    assert!(!stdout(&output).contains("after"));
}

#[test]
fn test_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = nodeshell(
        &dir.path().join("config.toml"),
        &["--output", "json", "-c", "echo hi", "-c", "exit"],
    );

    let lines: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines[0], serde_json::json!({"success": true, "message": "hi"}));
    assert_eq!(
        lines[1],
        serde_json::json!({"success": true, "message": "Goodbye.", "action": "exit"})
    );
}

#[test]
fn test_config_start_path_and_quiet_results() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        "[interpreter]\nstart_path = \"/root/ui\"\nprint_results = false\n",
    )
    .unwrap();

    let output = nodeshell(
        &config,
        &["-c", "cm get_name()", "-c", "set print_results on", "-c", "cm get_name()"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "print_results = true\nget_name: ui\n");
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[interpreter]\nprint_results = \"sometimes\"\n").unwrap();

    let output = nodeshell(&config, &["-c", "help"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Configuration error"));
}

#[test]
fn test_default_logging_keeps_stderr_clean() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_nodeshell"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["-c", "cn level", "-c", "echo ok"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run nodeshell");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "Target: /root/level\nok\n");
    assert_eq!(stderr(&output), "");
}

#[test]
fn test_cm_argument_text_survives_tokenizing() {
    let dir = tempfile::tempdir().unwrap();
    let output = nodeshell(
        &dir.path().join("config.toml"),
        &["-c", "cm set_meta( 'k', 'true' )", "-c", "cm get_meta('k')"],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "set_meta: null\nget_meta: true\n");
}
