use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CAPABILITIES: &str = r#"
[[capabilities]]
key = "budget.view"
area = "budget"
label = "View budgets"

[[capabilities]]
key = "budget.edit"
area = "budget"
label = "Edit budgets"
depends_on = ["budget.view"]

[[capabilities]]
key = "budget.approve"
area = "budget"
label = "Approve budgets"
depends_on = ["budget.edit"]

[[capabilities]]
key = "users.view"
area = "users"
label = "View users"
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("capabilities.toml"), CAPABILITIES).unwrap();
        fs::write(
            dir.path().join("roster.toml"),
            "data_dir = \"data\"\ncapability_catalog = \"capabilities.toml\"\n",
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> PathBuf {
        self.path().join("roster.toml")
    }

    fn roster(&self) -> Command {
        let mut cmd = Command::cargo_bin("roster").unwrap();
        cmd.arg("--config").arg(self.config());
        cmd.env_remove("ROSTER_LOG");
        cmd
    }

    fn create_planner(&self) {
        self.roster()
            .args([
                "role",
                "create",
                "--id",
                "planner",
                "--label",
                "Budget planner",
                "-c",
                "budget.edit",
                "-s",
                "project=assigned",
            ])
            .assert()
            .success();
    }
}

#[test]
fn test_catalog_validate() {
    let ws = Workspace::new();
    ws.roster()
        .args(["catalog", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Capability catalog: 4 capabilities in 2 areas",
        ))
        .stdout(predicate::str::contains("Menu catalog: not configured"));
}

#[test]
fn test_catalog_validate_rejects_cycle() {
    let ws = Workspace::new();
    fs::write(
        ws.path().join("capabilities.toml"),
        r#"
[[capabilities]]
key = "a"
area = "x"
label = "A"
depends_on = ["b"]

[[capabilities]]
key = "b"
area = "x"
label = "B"
depends_on = ["a"]
"#,
    )
    .unwrap();

    ws.roster()
        .args(["catalog", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency cycle"));
}

#[test]
fn test_catalog_show_lists_dependencies() {
    let ws = Workspace::new();
    ws.roster()
        .args(["catalog", "show", "--area", "budget"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(requires: budget.view)"))
        .stdout(predicate::str::contains("users.view").not());
}

#[test]
fn test_create_adds_prerequisites() {
    let ws = Workspace::new();
    ws.roster()
        .args([
            "role",
            "create",
            "--id",
            "approver",
            "--label",
            "Approver",
            "-c",
            "budget.approve",
            "-s",
            "data=department",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created role approver v1"))
        .stdout(predicate::str::contains(
            "added prerequisites: budget.edit, budget.view",
        ));

    ws.roster()
        .args(["role", "show", "approver"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data = department"))
        .stdout(predicate::str::contains("(inactive)"));
}

#[test]
fn test_create_requires_scopes() {
    let ws = Workspace::new();
    ws.roster()
        .args([
            "role", "create", "--id", "viewer", "--label", "Viewer", "-c", "users.view",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scope"));

    ws.roster()
        .args(["role", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No roles defined"));
}

#[test]
fn test_invalid_scope_value() {
    let ws = Workspace::new();
    ws.roster()
        .args([
            "role", "create", "--id", "viewer", "--label", "Viewer", "-c", "users.view", "-s",
            "tenant=everyone",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("everyone"));
}

#[test]
fn test_update_publish_and_versions() {
    let ws = Workspace::new();
    ws.create_planner();

    ws.roster()
        .args(["role", "update", "planner", "--remove", "budget.view"])
        .assert()
        .failure();

    ws.roster()
        .args([
            "role",
            "update",
            "planner",
            "--remove",
            "budget.view",
            "--add",
            "users.view",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated role planner v2"))
        .stdout(predicate::str::contains("removed: budget.edit, budget.view"));

    ws.roster()
        .args(["role", "publish", "planner", "v1"])
        .assert()
        .success();
    ws.roster()
        .args(["role", "publish", "planner", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published planner v2 (was v1)"));

    ws.roster()
        .args(["role", "versions", "planner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v2 (active)"))
        .stdout(predicate::str::contains("v1 (active)").not());

    ws.roster()
        .args(["role", "publish", "planner", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no version v7"));
}

#[test]
fn test_stale_update_conflicts() {
    let ws = Workspace::new();
    ws.create_planner();
    ws.roster()
        .args(["role", "update", "planner", "--label", "Planner"])
        .assert()
        .success();

    ws.roster()
        .args([
            "role",
            "update",
            "planner",
            "--label",
            "Stale",
            "--expected-version",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Version conflict"));
}

#[test]
fn test_clone_and_delete_guard() {
    let ws = Workspace::new();
    ws.create_planner();

    ws.roster()
        .args(["role", "clone", "planner"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Cloned planner to planner-copy \"Budget planner (Copy)\"",
        ));

    fs::write(
        ws.path().join("data").join("assignments.json"),
        r#"{"planner": 2}"#,
    )
    .unwrap();

    ws.roster()
        .args(["role", "delete", "planner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("assigned to 2 user(s)"));

    ws.roster()
        .args(["role", "delete", "planner-copy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted role planner-copy"));
}

#[test]
fn test_dashboard_save_and_publish() {
    let ws = Workspace::new();
    ws.create_planner();

    ws.roster()
        .args(["dashboard", "save", "planner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("menu is empty"));

    ws.roster()
        .args([
            "dashboard", "save", "planner", "-e", "home", "-e", "budgets", "-e", "reports",
            "--move", "2:0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved dashboard v1 for planner"));

    ws.roster()
        .args(["dashboard", "publish", "planner", "1", "--role-version", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Published planner v1 with dashboard v1",
        ));

    let output = ws
        .roster()
        .args(["--json", "dashboard", "show", "planner"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let dashboard: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(dashboard["active"], true);
    assert_eq!(dashboard["menu"][0]["key"], "reports");
    assert_eq!(dashboard["menu"][1]["key"], "home");
}

#[test]
fn test_dashboard_requires_role() {
    let ws = Workspace::new();
    ws.roster()
        .args(["dashboard", "save", "ghost", "-e", "home"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Role not found: ghost"));
}

#[test]
fn test_update_remove_already_cascaded() {
    let ws = Workspace::new();
    ws.create_planner();

    ws.roster()
        .args([
            "role",
            "update",
            "planner",
            "--add",
            "users.view",
            "--remove",
            "budget.view",
            "--remove",
            "budget.edit",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated role planner v2"))
        .stdout(predicate::str::contains("removed: budget.edit, budget.view"));

    ws.roster()
        .args(["role", "update", "planner", "--remove", "budget.approve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not grant budget.approve"));
}

#[test]
fn test_deactivate_clears_published_version() {
    let ws = Workspace::new();
    ws.create_planner();
    ws.roster()
        .args(["role", "publish", "planner", "1"])
        .assert()
        .success();
    ws.roster()
        .args(["role", "update", "planner", "--label", "Planner"])
        .assert()
        .success();

    ws.roster()
        .args(["role", "deactivate", "planner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deactivated role planner"));

    ws.roster()
        .args(["role", "versions", "planner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(active)").not());
}
