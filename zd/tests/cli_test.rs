//! CLI tests for the `zd` binary
//!
//! Every run is isolated in a temp dir: the data file, the log file and any
//! config lookup stay inside it.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn data_file(&self) -> PathBuf {
        self.dir.path().join("todos.json")
    }

    fn zd(&self) -> Command {
        let mut cmd = Command::cargo_bin("zd").expect("zd binary");
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--data-file")
            .arg(self.data_file());
        cmd
    }

    fn list_json(&self) -> Vec<serde_json::Value> {
        let output = self
            .zd()
            .args(["list", "--format", "json"])
            .output()
            .expect("Failed to run zd list");
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).expect("list output is JSON")
    }
}

// =============================================================================
// Add / List Tests
// =============================================================================

#[test]
fn test_add_then_list() {
    let sandbox = Sandbox::new();

    sandbox
        .zd()
        .args(["add", "Buy", "milk", "--priority", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added").and(predicate::str::contains("Buy milk")));

    sandbox
        .zd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk").and(predicate::str::contains("high")));

    let tasks = sandbox.list_json();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "Buy milk");
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["completed"], false);
}

#[test]
fn test_list_empty() {
    let sandbox = Sandbox::new();

    sandbox
        .zd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found"));
}

#[test]
fn test_add_blank_text_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .zd()
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task text is empty"));

    assert!(!sandbox.data_file().exists());
}

#[test]
fn test_list_filters() {
    let sandbox = Sandbox::new();
    sandbox.zd().args(["add", "first"]).assert().success();
    sandbox.zd().args(["add", "second"]).assert().success();

    let id = sandbox.list_json()[1]["id"].as_str().expect("id").to_string();
    sandbox.zd().args(["toggle", &id]).assert().success();

    sandbox
        .zd()
        .args(["list", "--filter", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first").and(predicate::str::contains("second").not()));

    sandbox
        .zd()
        .args(["list", "--filter", "active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("second").and(predicate::str::contains("first").not()));
}

// =============================================================================
// Toggle / Delete Tests
// =============================================================================

#[test]
fn test_toggle_by_prefix() {
    let sandbox = Sandbox::new();
    sandbox.zd().args(["add", "Write report"]).assert().success();

    let id = sandbox.list_json()[0]["id"].as_str().expect("id").to_string();
    let prefix = &id[..8];

    sandbox
        .zd()
        .args(["toggle", prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));
    assert_eq!(sandbox.list_json()[0]["completed"], true);

    sandbox
        .zd()
        .args(["toggle", prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("active"));
    assert_eq!(sandbox.list_json()[0]["completed"], false);
}

#[test]
fn test_delete_by_id() {
    let sandbox = Sandbox::new();
    sandbox.zd().args(["add", "keep"]).assert().success();
    sandbox.zd().args(["add", "drop"]).assert().success();

    let id = sandbox.list_json()[0]["id"].as_str().expect("id").to_string();
    sandbox
        .zd()
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted drop"));

    let tasks = sandbox.list_json();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "keep");
}

#[test]
fn test_unknown_id_fails() {
    let sandbox = Sandbox::new();
    sandbox.zd().args(["add", "something"]).assert().success();

    sandbox
        .zd()
        .args(["toggle", "no-such-task"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No task matches"));
}

// =============================================================================
// Stats / Clear Tests
// =============================================================================

#[test]
fn test_stats_json() {
    let sandbox = Sandbox::new();
    sandbox.zd().args(["add", "one"]).assert().success();
    sandbox.zd().args(["add", "two"]).assert().success();
    let id = sandbox.list_json()[0]["id"].as_str().expect("id").to_string();
    sandbox.zd().args(["toggle", &id]).assert().success();

    let output = sandbox
        .zd()
        .args(["stats", "--format", "json"])
        .output()
        .expect("Failed to run zd stats");
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stats output is JSON");
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["progress_percent"], 50);
}

#[test]
fn test_clear_completed() {
    let sandbox = Sandbox::new();
    for text in ["a", "b", "c"] {
        sandbox.zd().args(["add", text]).assert().success();
    }
    for task in sandbox.list_json().iter().take(2) {
        let id = task["id"].as_str().expect("id").to_string();
        sandbox.zd().args(["toggle", &id]).assert().success();
    }

    sandbox
        .zd()
        .arg("clear-completed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 completed tasks"));

    let tasks = sandbox.list_json();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "a");
}

// =============================================================================
// Storage / Config Tests
// =============================================================================

#[test]
fn test_ephemeral_does_not_touch_disk() {
    let sandbox = Sandbox::new();

    let mut cmd = Command::cargo_bin("zd").expect("zd binary");
    cmd.current_dir(sandbox.dir.path())
        .env("HOME", sandbox.dir.path())
        .env("XDG_DATA_HOME", sandbox.dir.path().join("data"))
        .env("XDG_CONFIG_HOME", sandbox.dir.path().join("config"))
        .env("NO_COLOR", "1")
        .args(["--ephemeral", "add", "gone soon"])
        .assert()
        .success();

    assert!(!sandbox.data_file().exists());
    assert!(!sandbox.dir.path().join("data").join("zendo").join("zendo-todos.json").exists());
}

#[test]
fn test_ephemeral_conflicts_with_data_file() {
    let sandbox = Sandbox::new();

    sandbox.zd().args(["--ephemeral", "list"]).assert().failure();
}

#[test]
fn test_corrupt_data_file_warns_and_continues() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.data_file(), "not json at all").expect("Failed to write data file");

    sandbox
        .zd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found"));

    assert!(sandbox.dir.path().join("todos.json.corrupt").exists());
}

#[test]
fn test_add_fails_when_data_file_cannot_be_read() {
    let sandbox = Sandbox::new();
    std::fs::create_dir(sandbox.data_file()).expect("Failed to create dir");

    sandbox
        .zd()
        .args(["add", "new"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("will not be saved").and(predicate::str::contains("Not saved")));

    assert!(sandbox.data_file().is_dir());
}

#[test]
fn test_config_prints_effective_settings() {
    let sandbox = Sandbox::new();

    sandbox
        .zd()
        .arg("config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("provider: gemini")
                .and(predicate::str::contains("GEMINI_API_KEY"))
                .and(predicate::str::contains("todos.json")),
        );
}

#[test]
fn test_local_config_file_is_used() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.dir.path().join(".zendo.yml"), "llm:\n  provider: anthropic\n")
        .expect("Failed to write config");

    sandbox
        .zd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("provider: anthropic").and(predicate::str::contains("ANTHROPIC_API_KEY")));
}

#[test]
fn test_decompose_without_api_key_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .zd()
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .args(["decompose", "Plan", "a", "trip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));

    assert!(!sandbox.data_file().exists());
}
