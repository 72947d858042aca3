use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, pouring_timeout_ms: u64, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
[[bottles]]
number = 2
pin = 18
pos_down = 1850
pos_up = 1150

[timing]
turn_down_delay_ms = 1
turn_up_delay_ms = 1
fast_turn_up_delay_ms = 1
pouring_timeout_ms = {pouring_timeout_ms}
poll_ms = 1
progress_log_ms = 0

{extra}
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn last_json_line(stdout: &[u8]) -> Value {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .unwrap_or_else(|| panic!("no JSON on stdout: {text}"));
    serde_json::from_str(line).expect("valid JSON")
}

#[test]
fn json_success_has_stable_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 2000, "");

    let out = Command::cargo_bin("pour")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .args(["pour", "--bottle", "2", "--grams", "40"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let v = last_json_line(&out.stdout);
    assert_eq!(v["bottle"], 2);
    assert_eq!(v["requested_g"], 40);
    // cutoff 250 + 40 - 10 with a 1 g/sample simulated pour
    assert_eq!(v["measured_g"], 30);
}

#[test]
fn json_error_names_the_fault() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 50, "[retry]\nmax_resume_waits = 0\n");

    let out = Command::cargo_bin("pour")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .env("POUR_TEST_SIM_STEP", "0")
        .args(["pour", "--bottle", "2", "--grams", "40"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));

    let v = last_json_line(&out.stdout);
    assert_eq!(v["reason"], "RetryBudgetExhausted");
    assert_eq!(v["details"]["fault"], "bottle empty");
    assert!(v["message"].as_str().unwrap().contains("What happened"));
}

#[test]
fn json_turn_reports_position() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 2000, "");

    let out = Command::cargo_bin("pour")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .args(["turn", "--bottle", "2", "--to", "pause"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let v = last_json_line(&out.stdout);
    assert_eq!(v["bottle"], 2);
    assert_eq!(v["position"], 1500);
}
