//! Smoke tests -- verify the binary runs and the replay command works end
//! to end.

use assert_cmd::Command;

#[test]
fn test_cli_help() {
    Command::cargo_bin("smokeboard")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Live status board daemon for smoke-test results",
        ));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("smokeboard")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("smokeboard"));
}

#[test]
fn test_serve_subcommand_exists() {
    Command::cargo_bin("smokeboard")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success();
}

#[test]
fn test_replay_produces_final_board() {
    let dir = tempfile::TempDir::new().unwrap();
    let layout = dir.path().join("layout.json");
    let events = dir.path().join("events.jsonl");

    std::fs::write(
        &layout,
        r#"[
            {"id": "box-abc-linux", "kind": "progress_box", "sha": "abc123", "config": "linux"},
            {"id": "row-abc-linux", "kind": "config_row", "sha": "abc123", "config": "linux", "big_list": true},
            {"id": "retest-abc", "kind": "retest_control", "sha": "abc123"}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        &events,
        concat!(
            r#"{"channel":"test_progress","sha":"abc123","config":"linux","raw_status":"testing","status":"running","percent":"40%"}"#,
            "\n",
            r#"{"channel":"commit_status","sha":"abc123","raw_status":"testing"}"#,
            "\n",
            r#"{"channel":"test_progress","sha":"abc123","config":"linux","raw_status":"passing","status":"all green","percent":"100%"}"#,
            "\n",
        ),
    )
    .unwrap();

    let output = Command::cargo_bin("smokeboard")
        .unwrap()
        .args(["replay", "--layout"])
        .arg(&layout)
        .arg("--events")
        .arg(&events)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let board: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(board["box-abc-linux"]["view"]["status"], "passing");
    assert_eq!(
        board["box-abc-linux"]["view"]["text"],
        serde_json::Value::Null
    );
    assert_eq!(board["row-abc-linux"]["view"]["status"], "passing");
    assert_eq!(board["retest-abc"]["view"]["affordance"], "retestable");
}

#[test]
fn test_replay_patch_trace() {
    let dir = tempfile::TempDir::new().unwrap();
    let layout = dir.path().join("layout.json");
    let events = dir.path().join("events.jsonl");

    std::fs::write(
        &layout,
        r#"[{"id": "branch-abc", "kind": "branch_entry", "sha": "abc123"}]"#,
    )
    .unwrap();
    std::fs::write(
        &events,
        concat!(
            r#"{"channel":"commit_status","sha":"abc123","raw_status":"queued"}"#,
            "\n"
        ),
    )
    .unwrap();

    let output = Command::cargo_bin("smokeboard")
        .unwrap()
        .args(["replay", "--patches", "--layout"])
        .arg(&layout)
        .arg("--events")
        .arg(&events)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let trace: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(trace[0]["element"], "branch-abc");
    assert_eq!(trace[0]["op"], "set_status");
    assert_eq!(trace[0]["status"], "queued");
}

#[test]
fn test_replay_missing_events_file_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let layout = dir.path().join("layout.json");
    std::fs::write(&layout, "[]").unwrap();

    Command::cargo_bin("smokeboard")
        .unwrap()
        .args(["replay", "--layout"])
        .arg(&layout)
        .arg("--events")
        .arg(dir.path().join("missing.jsonl"))
        .assert()
        .failure();
}
