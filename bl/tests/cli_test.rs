//! CLI tests for the `bl` binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated home: config file, audit dir and log dir all live under `home`
fn write_config(home: &Path) -> std::path::PathBuf {
    let config = home.join("boothlock.yml");
    let body = format!(
        "timeline:\n  grace-secs: 5\naudit:\n  dir: {}\n",
        home.join("audit").display()
    );
    fs::write(&config, body).unwrap();
    config
}

fn bl(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bl").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_DATA_HOME", home.join("data"))
        .env("XDG_CONFIG_HOME", home.join("config"));
    cmd
}

fn session_line(key: &str, storage: &Path) -> String {
    format!(
        r#"{{"event":"session-changed","session-key":"{}","storage-path":"{}"}}"#,
        key,
        storage.display()
    )
}

#[test]
fn test_config_prints_effective_settings() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());

    bl(home.path())
        .args(["config", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("grace-secs: 5"))
        .stdout(predicate::str::contains("operator-mode: customer"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.yml");
    fs::write(&config, "timeline:\n  grace-secs: 0\n").unwrap();

    bl(home.path()).args(["config", "-c"]).arg(&config).assert().failure();
}

#[test]
fn test_run_applies_session_and_resets() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());
    let storage = home.path().join("session-1");
    fs::create_dir(&storage).unwrap();
    fs::write(storage.join("IMG_0001.jpg"), b"jpg").unwrap();

    let input = [
        session_line("s-1", &storage),
        r#"{"event":"session-warning"}"#.to_string(),
        r#"{"event":"warning-acknowledged"}"#.to_string(),
        r#"{"event":"session-lockout"}"#.to_string(),
        r#"{"event":"session-reset-requested"}"#.to_string(),
    ]
    .join("\n");

    bl(home.path())
        .args(["run", "-c"])
        .arg(&config)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"session-applied""#))
        .stdout(predicate::str::contains(r#""type":"warning-shown""#))
        .stdout(predicate::str::contains(r#""type":"end-screen-shown""#))
        .stdout(predicate::str::contains(r#""reason":"immediate""#));
}

#[test]
fn test_run_skips_malformed_lines() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());

    bl(home.path())
        .args(["run", "-c"])
        .arg(&config)
        .write_stdin("this is not json\n# comment\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping"));
}

#[test]
fn test_run_warns_when_input_ends_during_grace() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());
    let storage = home.path().join("session-3");
    fs::create_dir(&storage).unwrap();

    let input = [
        session_line("s-3", &storage),
        r#"{"event":"busy-changed","source":"export","busy":true}"#.to_string(),
        r#"{"event":"session-reset-requested"}"#.to_string(),
    ]
    .join("\n");

    bl(home.path())
        .args(["run", "-c"])
        .arg(&config)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"reset-deferred""#))
        .stdout(predicate::str::contains("reset-completed").not())
        .stderr(predicate::str::contains("reset still pending"));
}

#[test]
fn test_admin_overrides_are_audited() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());
    let storage = home.path().join("session-7");
    fs::create_dir(&storage).unwrap();

    let input = [
        session_line("s-7", &storage),
        r#"{"event":"session-lockout"}"#.to_string(),
        r#"{"event":"admin-continue"}"#.to_string(),
    ]
    .join("\n");

    bl(home.path())
        .args(["run", "--mode", "admin", "-c"])
        .arg(&config)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"lockout-modal-opened""#))
        .stdout(predicate::str::contains(r#""type":"override-recorded""#));

    bl(home.path())
        .args(["audit", "--session", "s-7", "--format", "json", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("t_zero_continue_working"));

    bl(home.path())
        .args(["audit", "--session", "other", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No overrides recorded"));
}

#[test]
fn test_customer_cannot_continue_after_lockout() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());
    let storage = home.path().join("session-2");
    fs::create_dir(&storage).unwrap();

    let input = [
        session_line("s-2", &storage),
        r#"{"event":"session-lockout"}"#.to_string(),
        r#"{"event":"admin-continue"}"#.to_string(),
    ]
    .join("\n");

    bl(home.path())
        .args(["run", "-c"])
        .arg(&config)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"command-rejected""#))
        .stdout(predicate::str::contains("override-recorded").not());
}
