use std::{
    path::Path,
    process::{Command, Output},
};

use tempfile::TempDir;

fn calnotes(settings: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_calnotes"))
        .arg("--settings")
        .arg(settings)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn created_id(output: &Output) -> String {
    stdout(output)
        .lines()
        .find_map(|l| l.strip_prefix("Note created with ID: "))
        .unwrap()
        .trim()
        .to_string()
}

#[test]
fn test_add_without_setup_fails() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");

    let output = calnotes(&settings, &["add", "--date", "2024-01-01", "--title", "Early"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("complete setup first"));
}

#[test]
fn test_full_note_workflow() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");
    let dir = tmp.path().join("journal");

    let output = calnotes(&settings, &["setup", dir.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(dir.is_dir());

    let output = calnotes(
        &settings,
        &["add", "-d", "2024-01-01", "-T", "  New year  ", "-c", "fireworks"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let id = created_id(&output);

    let output = calnotes(&settings, &["add", "-d", "2024-01-02", "-T", "Second"]);
    assert!(output.status.success());

    let output = calnotes(&settings, &["day", "2024-01-01", "--json"]);
    let notes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["id"], id.as_str());
    assert_eq!(notes[0]["title"], "New year");

    let output = calnotes(&settings, &["edit", id.as_str(), "--title", "Renamed", "--date", "2024-01-05"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = calnotes(&settings, &["day", "2024-01-05", "--json"]);
    let notes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(notes[0]["title"], "Renamed");
    assert_eq!(notes[0]["content"], "fireworks");

    let output = calnotes(&settings, &["month", "2024-01"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("2024-01-05  1 note"));

    let output = calnotes(&settings, &["delete", id.as_str(), "--force"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = calnotes(&settings, &["list", "--json"]);
    let notes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["title"], "Second");
}

#[test]
fn test_blank_title_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");
    calnotes(&settings, &["setup", tmp.path().join("j").to_str().unwrap()]);

    let output = calnotes(&settings, &["add", "-d", "2024-01-01", "-T", "   "]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("title cannot be empty"));
}

#[test]
fn test_missing_directory_is_reported() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");
    let dir = tmp.path().join("journal");
    calnotes(&settings, &["setup", dir.to_str().unwrap()]);

    std::fs::remove_dir_all(&dir).unwrap();

    let output = calnotes(&settings, &["list"]);
    assert!(!output.status.success());
    assert_eq!(stderr(&output).matches("no longer exists").count(), 1);

    let output = calnotes(&settings, &["status"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("no longer exists"));
}

#[test]
fn test_content_conflicts_with_file_and_edit() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");
    calnotes(&settings, &["setup", tmp.path().join("j").to_str().unwrap()]);
    let body = tmp.path().join("body.txt");
    std::fs::write(&body, "from file").unwrap();

    let output = calnotes(
        &settings,
        &["add", "-T", "Mixed", "-c", "inline", "-f", body.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot be used with"));

    let output = calnotes(&settings, &["add", "-T", "Mixed", "-c", "inline", "--edit"]);
    assert!(!output.status.success());

    let output = calnotes(&settings, &["list", "--json"]);
    let notes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(notes.as_array().unwrap().is_empty());
}

#[test]
fn test_failure_is_reported_once() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");

    let output = calnotes(&settings, &["list"]);

    assert!(!output.status.success());
    assert_eq!(stderr(&output).matches("complete setup first").count(), 1);
}

#[test]
fn test_editing_unknown_note_fails() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");
    calnotes(&settings, &["setup", tmp.path().join("j").to_str().unwrap()]);

    let output = calnotes(&settings, &["edit", "note-missing", "--title", "x"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Note not found: note-missing"));
}
