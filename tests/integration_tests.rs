//! Integration tests for Kong
//!
//! These drive the `kong` binary end to end: config discovery, the static
//! and runtime filters, the local store, and activity output.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

/// Helper to create a kong Command isolated from the caller's environment
fn kong(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("kong");
    cmd.current_dir(dir.path())
        .env_remove("KONG_CONFIG")
        .env_remove("KONG_REST_URL")
        .env_remove("KONG_API_KEY")
        .env_remove("KONG_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a project directory with the given kong.toml
fn project_with_config(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("kong.toml"), content).unwrap();
    dir
}

fn sqlite_project() -> TempDir {
    project_with_config(
        r#"
[runtime_schema]
backend = "sqlite"
sqlite_path = "kong.db"
"#,
    )
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

const ROCK: &str = r#"{"name": "Rock", "code": "rk01", "hacker_field": "x", "project_id": "p1"}"#;

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_kong_help() {
        let dir = TempDir::new().unwrap();
        kong(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("pick"));
    }

    #[test]
    fn test_kong_version() {
        let dir = TempDir::new().unwrap();
        kong(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_entity_fails() {
        let dir = project_with_config("");
        kong(&dir)
            .args(["pick", "--entity", "playlist"])
            .write_stdin("{}")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown entity 'playlist'"));
    }

    #[test]
    fn test_non_object_input_fails() {
        let dir = project_with_config("");
        kong(&dir)
            .args(["pick", "--entity", "asset"])
            .write_stdin("[1, 2]")
            .assert()
            .failure()
            .stderr(predicate::str::contains("must be a JSON object"));
    }

    #[test]
    fn test_invalid_backend_flag_fails() {
        let dir = project_with_config("");
        kong(&dir)
            .args(["--backend", "mongo", "schema"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid runtime schema backend"));
    }
}

// =============================================================================
// Static filter
// =============================================================================

mod static_pick {
    use super::*;

    #[test]
    fn test_asset_scenario() {
        let dir = project_with_config("");
        let output = kong(&dir)
            .args(["pick", "--entity", "asset", "--deny", "project_id"])
            .write_stdin(ROCK)
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(stdout_json(&output), json!({"name": "Rock", "code": "rk01"}));
    }

    #[test]
    fn test_id_and_timestamps_never_survive() {
        let dir = project_with_config("");
        let output = kong(&dir)
            .args(["pick", "--entity", "shot", "--static-only"])
            .write_stdin(r#"{"id": 5, "created_at": "x", "updated_at": "y", "status": "ip"}"#)
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(stdout_json(&output), json!({"status": "ip"}));
    }

    #[test]
    fn test_input_from_file() {
        let dir = project_with_config("");
        fs::write(dir.path().join("payload.json"), ROCK).unwrap();
        let output = kong(&dir)
            .args(["pick", "-e", "asset", "-i", "payload.json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(
            stdout_json(&output),
            json!({"name": "Rock", "code": "rk01", "project_id": "p1"})
        );
    }

    #[test]
    fn test_prepare_update_locks_shot_identity() {
        let dir = project_with_config("");
        let output = kong(&dir)
            .args(["prepare", "--entity", "shot", "--kind", "update"])
            .write_stdin(r#"{"code": "sh020", "sequence_id": 3, "status": "ip", "project_id": 1}"#)
            .output()
            .unwrap();
        assert!(output.status.success());
        let prepared = stdout_json(&output);
        assert_eq!(prepared["table"], "shots");
        assert_eq!(prepared["kind"], "update");
        assert_eq!(prepared["columns"], json!({"status": "ip"}));
    }

    #[test]
    fn test_prepare_rejects_bad_kind() {
        let dir = project_with_config("");
        kong(&dir)
            .args(["prepare", "--entity", "shot", "--kind", "upsert"])
            .write_stdin("{}")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid write kind"));
    }
}

// =============================================================================
// Schema listing
// =============================================================================

mod schema_listing {
    use super::*;

    #[test]
    fn test_schema_lists_all_entities() {
        let dir = project_with_config("");
        kong(&dir)
            .arg("schema")
            .assert()
            .success()
            .stdout(predicate::str::contains("published_file"))
            .stdout(predicate::str::contains("post_reactions"));
    }

    #[test]
    fn test_schema_marks_virtual_fields() {
        let dir = project_with_config("");
        kong(&dir)
            .args(["schema", "task"])
            .assert()
            .success()
            .stdout(predicate::str::contains("(virtual)"));
    }

    #[test]
    fn test_schema_json() {
        let dir = project_with_config("");
        let output = kong(&dir).args(["schema", "asset", "--json"]).output().unwrap();
        assert!(output.status.success());
        let schema = stdout_json(&output);
        assert_eq!(schema["table"], "assets");
        assert!(schema["fields"].as_array().is_some_and(|f| !f.is_empty()));
    }
}

// =============================================================================
// Runtime overlay against the local store
// =============================================================================

mod runtime_fields {
    use super::*;

    #[test]
    fn test_registered_field_is_admitted() {
        let dir = sqlite_project();
        kong(&dir)
            .args(["fields", "add", "--entity", "asset", "rig_notes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Registered asset.rig_notes (active)"));

        let output = kong(&dir)
            .args(["pick", "--entity", "asset", "--deny", "project_id"])
            .write_stdin(r#"{"name": "Rock", "rig_notes": "heavy", "hacker_field": "x", "project_id": "p1"}"#)
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(stdout_json(&output), json!({"name": "Rock", "rig_notes": "heavy"}));

        kong(&dir)
            .args(["fields", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("rig_notes"));
    }

    #[test]
    fn test_hacker_field_registered_at_runtime() {
        let dir = sqlite_project();
        kong(&dir)
            .args(["fields", "add", "--entity", "asset", "hacker_field"])
            .assert()
            .success();

        let output = kong(&dir)
            .args(["pick", "--entity", "asset", "--deny", "project_id"])
            .write_stdin(ROCK)
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(
            stdout_json(&output),
            json!({"name": "Rock", "code": "rk01", "hacker_field": "x"})
        );
    }

    #[test]
    fn test_static_only_ignores_runtime_fields() {
        let dir = sqlite_project();
        kong(&dir)
            .args(["fields", "add", "-e", "asset", "rig_notes"])
            .assert()
            .success();

        let output = kong(&dir)
            .args(["pick", "--entity", "asset", "--static-only"])
            .write_stdin(r#"{"name": "Rock", "rig_notes": "heavy"}"#)
            .output()
            .unwrap();
        assert_eq!(stdout_json(&output), json!({"name": "Rock"}));
    }

    #[test]
    fn test_inactive_field_is_dropped() {
        let dir = sqlite_project();
        kong(&dir)
            .args(["fields", "add", "-e", "asset", "rig_notes", "--inactive"])
            .assert()
            .success();

        let output = kong(&dir)
            .args(["pick", "--entity", "asset"])
            .write_stdin(r#"{"name": "Rock", "rig_notes": "heavy"}"#)
            .output()
            .unwrap();
        assert_eq!(stdout_json(&output), json!({"name": "Rock"}));
    }

    #[test]
    fn test_unprovisioned_store_falls_back_to_static() {
        let dir = sqlite_project();
        let output = kong(&dir)
            .args(["pick", "--entity", "asset", "--deny", "project_id"])
            .write_stdin(ROCK)
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(stdout_json(&output), json!({"name": "Rock", "code": "rk01"}));
        assert!(!String::from_utf8_lossy(&output.stderr).contains("ERROR"));
        assert!(!dir.path().join("kong.db").exists());
    }

    #[test]
    fn test_fields_list_before_provision() {
        let dir = sqlite_project();
        kong(&dir)
            .args(["fields", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No custom fields registered."));
    }

    #[test]
    fn test_unreachable_rest_backend_falls_back_to_static() {
        let dir = project_with_config(
            r#"
[runtime_schema]
backend = "rest"
rest_url = "http://127.0.0.1:9"
timeout_secs = 2
"#,
        );
        let output = kong(&dir)
            .args(["pick", "--entity", "asset", "--deny", "project_id"])
            .write_stdin(ROCK)
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(stdout_json(&output), json!({"name": "Rock", "code": "rk01"}));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load runtime schema fields"));
    }

    #[test]
    fn test_fields_rejected_for_rest_backend() {
        let dir = project_with_config("[runtime_schema]\nbackend = \"rest\"\nrest_url = \"http://127.0.0.1:9\"\n");
        kong(&dir)
            .args(["fields", "provision"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not support custom field management"));
    }
}

// =============================================================================
// Activity
// =============================================================================

mod activity {
    use super::*;

    #[test]
    fn test_diff_prints_events_and_records() {
        let dir = sqlite_project();
        fs::write(dir.path().join("old.json"), r#"{"status": "wtg", "name": "Rock"}"#).unwrap();
        fs::write(dir.path().join("new.json"), r#"{"status": "ip", "name": "Rock", "updated_at": "now"}"#).unwrap();

        let output = kong(&dir)
            .args([
                "activity", "diff", "--entity", "asset", "--id", "7", "--old", "old.json", "--new",
                "new.json", "--project", "1", "--record",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        let events = stdout_json(&output);
        let events = events.as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event_type"], "status_changed");
        assert_eq!(events[0]["description"], "Changed Status from \"wtg\" to \"ip\"");

        kong(&dir)
            .args(["activity", "list", "--entity", "asset"])
            .assert()
            .success()
            .stdout(predicate::str::contains("status_changed"))
            .stdout(predicate::str::contains("asset#7"));
    }

    #[test]
    fn test_prepare_records_insert_and_update() {
        let dir = sqlite_project();
        kong(&dir)
            .args(["prepare", "-e", "asset", "-k", "insert", "--id", "7", "--actor", "u1"])
            .write_stdin(r#"{"name": "Rock", "created_by": "x"}"#)
            .assert()
            .success();

        fs::write(dir.path().join("old.json"), r#"{"name": "Rock", "status": "wtg"}"#).unwrap();
        kong(&dir)
            .args(["prepare", "-e", "asset", "-k", "update", "--id", "7", "--old", "old.json"])
            .write_stdin(r#"{"name": "Rock", "status": "ip"}"#)
            .assert()
            .success();

        kong(&dir)
            .args(["activity", "list", "--entity", "asset", "--id", "7"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created Asset \"Rock\""))
            .stdout(predicate::str::contains("Changed Status from \"wtg\" to \"ip\""));
    }

    #[test]
    fn test_prepare_without_id_records_nothing() {
        let dir = sqlite_project();
        kong(&dir)
            .args(["prepare", "-e", "asset"])
            .write_stdin(r#"{"name": "Rock"}"#)
            .assert()
            .success();
        assert!(!dir.path().join("kong.db").exists());
    }

    #[test]
    fn test_prepare_respects_disabled_activity() {
        let dir = project_with_config("[runtime_schema]\nsqlite_path = \"kong.db\"\n[activity]\nenabled = false\n");
        kong(&dir)
            .args(["prepare", "-e", "asset", "--id", "7"])
            .write_stdin(r#"{"name": "Rock"}"#)
            .assert()
            .success();

        kong(&dir)
            .args(["activity", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No activity recorded."));
    }

    #[test]
    fn test_list_empty_log() {
        let dir = sqlite_project();
        kong(&dir)
            .args(["activity", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No activity recorded."));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_commands {
    use super::*;

    #[test]
    fn test_config_init_then_validate() {
        let dir = TempDir::new().unwrap();
        kong(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created kong.toml"));
        assert!(dir.path().join("kong.toml").exists());

        kong(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid."));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = project_with_config("[runtime_schema]\nbackend = \"rest\"\n");
        kong(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("no rest_url"));
    }

    #[test]
    fn test_config_show_masks_api_key() {
        let dir = project_with_config("[runtime_schema]\napi_key = \"super-secret\"\n");
        kong(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("***"))
            .stdout(predicate::str::contains("super-secret").not());
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[runtime_schema]\nbackend = \"sqlite\"\n").unwrap();
        kong(&dir)
            .args(["--config", path.to_str().unwrap(), "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("backend = \"sqlite\""));
    }
}
