use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_world-id-reset"))
        .args(args)
        .stdin(Stdio::null())
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run world-id-reset CLI")
}

fn world() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("world.json"), "{\"name\":\"copy\"}").expect("marker");
    fs::create_dir_all(dir.path().join("data")).expect("data dir");
    dir
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir");
    }
    fs::write(path, contents).expect("fixture file");
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).expect("file should be readable")
}

fn first_id(line: &str) -> String {
    let value: Value = serde_json::from_str(line.trim_end()).expect("line should be JSON");
    value["_id"].as_str().expect("_id is a string").to_string()
}

#[test]
fn resets_actor_ids_and_reports_json() {
    let dir = world();
    let root = dir.path();
    write(root, "data/actors.db", "{\"_id\":\"abc123\", \"name\":\"Hero\"}\n");
    let path = root.to_string_lossy().to_string();

    let output = run_cli(&["--path", &path, "--yes", "--json"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = read(root, "data/actors.db");
    let new_id = first_id(&content);
    assert_ne!(new_id, "abc123");
    assert_eq!(new_id.len(), 16);
    assert!(new_id.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(content.contains("\"name\":\"Hero\""));

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["total_replacements"], 1);
    assert_eq!(json["files"][0]["file"], "actors.db");
}

#[test]
fn duplicate_ids_exit_non_zero_and_leave_files_alone() {
    let dir = world();
    let root = dir.path();
    let actors = "{\"_id\":\"dup1\",\"name\":\"A\"}\n";
    let items = "{\"_id\":\"dup1\",\"name\":\"B\"}\n";
    write(root, "data/actors.db", actors);
    write(root, "data/items.db", items);
    let path = root.to_string_lossy().to_string();

    let output = run_cli(&["-p", &path, "-y"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate IDs found"));
    assert!(stderr.contains("dup1"));
    assert_eq!(read(root, "data/actors.db"), actors);
    assert_eq!(read(root, "data/items.db"), items);
}

#[test]
fn renames_scene_thumbnail_to_new_id() {
    let dir = world();
    let root = dir.path();
    write(root, "data/scenes.db", "{\"_id\":\"scn1\",\"name\":\"Forest\"}\n");
    write(root, "scenes/thumbs/scn1.png", "thumbnail");
    let path = root.to_string_lossy().to_string();

    let output = run_cli(&["--path", &path, "--yes"]);
    assert!(output.status.success());

    let new_id = first_id(&read(root, "data/scenes.db"));
    assert!(!root.join("scenes/thumbs/scn1.png").exists());
    assert_eq!(
        read(root, &format!("scenes/thumbs/{new_id}.png")),
        "thumbnail"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("scn1.png -> {new_id}.png")));
}

#[test]
fn missing_thumbnail_fails_without_touching_anything() {
    let dir = world();
    let root = dir.path();
    let scenes = "{\"_id\":\"scn1\",\"name\":\"Forest\"}\n";
    write(root, "data/scenes.db", scenes);
    fs::create_dir_all(root.join("scenes/thumbs")).expect("thumbs dir");
    let path = root.to_string_lossy().to_string();

    let output = run_cli(&["--path", &path, "--yes"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("thumbnail file not found"));
    assert_eq!(read(root, "data/scenes.db"), scenes);
}

#[test]
fn dry_run_prints_map_and_writes_nothing() {
    let dir = world();
    let root = dir.path();
    let actors = "{\"_id\":\"act1\",\"name\":\"Hero\"}\n";
    write(root, "data/actors.db", actors);
    let path = root.to_string_lossy().to_string();

    let output = run_cli(&["--path", &path, "--dry-run", "--json", "--seed", "5"]);
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let doc = &json["files"][0]["documents"][0];
    assert_eq!(doc["old_id"], "act1");
    assert_eq!(doc["name"], "Hero");
    assert_eq!(doc["new_id"].as_str().map(str::len), Some(16));
    assert_eq!(read(root, "data/actors.db"), actors);

    let again = run_cli(&["--path", &path, "--dry-run", "--json", "--seed", "5"]);
    let again: Value = serde_json::from_slice(&again.stdout).expect("stdout should be JSON");
    assert_eq!(again["files"][0]["documents"][0]["new_id"], doc["new_id"]);
}

#[test]
fn rejects_directory_without_markers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().to_string_lossy().to_string();

    let output = run_cli(&["--path", &path, "--yes"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("world.json or module.json not found"));
}

#[test]
fn closed_stdin_cancels_before_writing() {
    let dir = world();
    let root = dir.path();
    let actors = "{\"_id\":\"act1\"}\n";
    write(root, "data/actors.db", actors);
    let path = root.to_string_lossy().to_string();

    let output = run_cli(&["--path", &path]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("pass --yes"));
    assert_eq!(read(root, "data/actors.db"), actors);
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let output = run_cli(&["--frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
}
