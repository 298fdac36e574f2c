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

fn stored_tasks(store_path: &Path) -> serde_json::Value {
    let store: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store_path).unwrap()).unwrap();
    serde_json::from_str(store["tasks"].as_str().expect("tasks string")).unwrap()
}

#[test]
fn add_appends_after_seed_tasks() {
    let store_path = temp_path("cli-add.json");
    let output = run(&store_path, &["add", "  stretch", "legs  "]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: stretch legs"));

    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0]["text"], "read a book");
    assert_eq!(tasks[2]["text"], "stretch legs");
    assert_eq!(tasks[2]["completed"], false);
    assert_eq!(tasks[2]["section"], "today");
}

#[test]
fn add_tomorrow_uses_tomorrow_section() {
    let store_path = temp_path("cli-add-tomorrow.json");
    let output = run(&store_path, &["--json", "add", "--tomorrow", "buy milk"]);

    assert!(output.status.success());
    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(printed["text"], "buy milk");
    assert_eq!(printed["section"], "tomorrow");
    assert_eq!(tasks[2]["id"], printed["id"]);
}

#[test]
fn add_blank_text_is_silent_no_op() {
    let store_path = temp_path("cli-add-blank.json");
    let output = run(&store_path, &["add", "   "]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).trim().is_empty());
    assert!(!store_path.exists());
}
