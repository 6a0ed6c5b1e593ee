//! CLI smoke tests — verify basic binary behavior.

use std::io::Write;
use std::process::{Command, Stdio};

fn cli_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_simbot_cli"));
    cmd.env_remove("SIMBOT_SEED")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg("/tmp/nonexistent_simbot_config_12345.toml");
    cmd
}

fn fixture() -> String {
    format!(
        "{}/tests/fixtures/brain_response.json",
        env!("CARGO_MANIFEST_DIR")
    )
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage"),
        "Expected usage info in --help output"
    );
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("simbot_cli"),
        "Expected crate name in --version output"
    );
}

#[test]
fn test_extract_from_file() {
    let output = cli_bin()
        .arg("--input")
        .arg(fixture())
        .arg("--seed")
        .arg("1")
        .output()
        .expect("failed to run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let thoughts: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let names: Vec<&str> = thoughts
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    for expected in [
        "_trust",
        "statement_novelty",
        "overlap person",
        "overlap animal",
        "overlap animal person",
        "entity_novelty animal",
        "object_gap animal doctor",
        "negation_conflict",
    ] {
        assert!(names.contains(&expected), "missing {} in {:?}", expected, names);
    }
    assert_eq!(names.len(), 8);
    assert_eq!(thoughts["_trust"]["payload"], serde_json::json!(0.8));
}

#[test]
fn test_same_seed_same_order() {
    let run = || {
        cli_bin()
            .arg("--input")
            .arg(fixture())
            .arg("--seed")
            .arg("42")
            .arg("--names")
            .output()
            .expect("failed to run")
            .stdout
    };
    let first = run();
    assert_eq!(String::from_utf8_lossy(&first).lines().count(), 8);
    assert_eq!(first, run());
}

#[test]
fn test_reads_stdin() {
    let mut child = cli_bin()
        .arg("--names")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run");
    let text = std::fs::read_to_string(fixture()).unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(text.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|l| l == "_trust"));
}

#[test]
fn test_malformed_input_fails() {
    let path = std::env::temp_dir().join("simbot_cli_malformed_12345.json");
    std::fs::write(&path, r#"{"statement": {"triple": {}}, "thoughts": {}}"#).unwrap();
    let output = cli_bin()
        .arg("--input")
        .arg(&path)
        .output()
        .expect("failed to run");
    let _ = std::fs::remove_file(&path);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing field"), "stderr: {}", stderr);
}

#[test]
fn test_non_numeric_seed_env_is_ignored() {
    let output = cli_bin()
        .env("SIMBOT_SEED", "abc")
        .arg("--input")
        .arg(fixture())
        .arg("--names")
        .output()
        .expect("failed to run");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(
        stderr.contains("Ignoring non-numeric SIMBOT_SEED"),
        "stderr: {}",
        stderr
    );
    assert!(stderr.contains("using defaults"), "stderr: {}", stderr);
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 8);
}

#[test]
fn test_seed_env_matches_seed_flag() {
    let run = |cmd: &mut Command| {
        cmd.arg("--input")
            .arg(fixture())
            .arg("--names")
            .output()
            .expect("failed to run")
            .stdout
    };
    let from_env = run(cli_bin().env("SIMBOT_SEED", "42"));
    let from_flag = run(cli_bin().arg("--seed").arg("42"));
    assert_eq!(from_env, from_flag);
}
