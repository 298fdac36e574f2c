use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("daylist-{nanos}-{file_name}"))
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_daylist"))
        .args(args)
        .env("DAYLIST_STORE_PATH", store_path)
        .env("DAYLIST_CONFIG_PATH", store_path.with_extension("config.json"))
        .output()
        .expect("failed to run daylist")
}

#[test]
fn list_on_first_run_shows_seed_tasks() {
    let store_path = temp_path("cli-list-seed.json");
    let output = run(&store_path, &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("read a book"));
    assert!(stdout.contains("do homework"));
    assert!(stdout.contains("No tasks for tomorrow. Add one above!"));
    assert!(stdout.contains("Progress: 50%"));
    assert!(!store_path.exists());
}

#[test]
fn list_json_shows_sections_and_tracker() {
    let store_path = temp_path("cli-list-json.json");
    run(&store_path, &["add", "--tomorrow", "buy milk"]);
    let output = run(&store_path, &["--json", "list"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let board: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(board["sections"][0]["section"], "today");
    assert_eq!(board["sections"][0]["content"]["kind"], "rows");
    assert_eq!(board["sections"][1]["section"], "tomorrow");
    let rows = board["sections"][1]["content"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["text"], "buy milk");
    assert_eq!(board["tracker"]["total"], 3);
    assert_eq!(board["tracker"]["percent_label"], "33%");
}

#[test]
fn list_with_empty_stored_list_shows_both_placeholders() {
    let store_path = temp_path("cli-list-empty.json");
    let content = serde_json::json!({ "tasks": "[]" });
    std::fs::write(&store_path, content.to_string()).unwrap();

    let output = run(&store_path, &["list"]);
    std::fs::remove_file(&store_path).ok();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No tasks for today. Add one above!"));
    assert!(stdout.contains("No tasks for tomorrow. Add one above!"));
    assert!(stdout.contains("Progress: 0%"));
}

#[test]
fn list_falls_back_to_seed_on_corrupt_tasks() {
    let store_path = temp_path("cli-list-corrupt.json");
    let content = serde_json::json!({ "tasks": "{oops" });
    std::fs::write(&store_path, content.to_string()).unwrap();

    let output = run(&store_path, &["list"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("read a book"));
}

#[test]
fn theme_override_colors_the_percent_label() {
    let store_path = temp_path("cli-list-theme.json");
    let output = run(&store_path, &["--config-override", "theme=noir", "list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\x1b[38;5;208m50%\x1b[0m"));
}

#[test]
fn bad_config_override_is_rejected() {
    let store_path = temp_path("cli-list-bad-override.json");
    let output = run(&store_path, &["--config-override", "colour=red", "list"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unknown config field"));
}

#[test]
fn unreadable_config_is_reported_and_defaults_apply() {
    let store_path = temp_path("cli-list-bad-config.json");
    let config_path = store_path.with_extension("config.json");
    std::fs::write(&config_path, "{ not json").unwrap();

    let output = run(&store_path, &["list"]);
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data - invalid JSON in"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("read a book"));
}

#[cfg(unix)]
#[test]
fn missing_home_for_config_is_reported() {
    let store_path = temp_path("cli-list-no-home.json");
    let output = Command::new(env!("CARGO_BIN_EXE_daylist"))
        .arg("list")
        .env("DAYLIST_STORE_PATH", &store_path)
        .env_remove("DAYLIST_CONFIG_PATH")
        .env_remove("HOME")
        .output()
        .expect("failed to run daylist");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data - HOME is not set"));
}
