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
fn notes_save_then_show() {
    let store_path = temp_path("cli-notes.json");
    let saved = run(&store_path, &["notes", "save", "call the plumber"]);
    assert!(saved.status.success());
    assert!(String::from_utf8_lossy(&saved.stdout).contains("Notes saved."));

    let shown = run(&store_path, &["--json", "notes"]);
    let store: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    let printed: serde_json::Value = serde_json::from_slice(&shown.stdout).unwrap();
    assert_eq!(printed["notes"], "call the plumber");
    assert_eq!(store["notes"], "call the plumber");
    assert!(store.get("tasks").is_none());
}

#[test]
fn stored_notes_are_shown_verbatim() {
    let store_path = temp_path("cli-notes-verbatim.json");
    let content = serde_json::json!({ "notes": "  indented\nsecond line  " });
    std::fs::write(&store_path, content.to_string()).unwrap();

    let shown = run(&store_path, &["--json", "notes", "show"]);
    std::fs::remove_file(&store_path).ok();

    let printed: serde_json::Value = serde_json::from_slice(&shown.stdout).unwrap();
    assert_eq!(printed["notes"], "  indented\nsecond line  ");
}
