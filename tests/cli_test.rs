use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn run_command(storage: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slideforge"))
        .arg("--storage")
        .arg(storage)
        .args(args)
        .env_remove("GENERATION_ENDPOINT")
        .env_remove("SLIDEFORGE_STORAGE")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_response(dir: &Path) -> String {
    let path = dir.join("response.json");
    let response = r#"{
        "slides": [
            {"title": "Hello", "bulletPoints": ["One", "Two"]},
            {"title": "Plan", "bulletPoints": ["Three"]},
            {"title": "Risks", "bulletPoints": ["Four", "Five"]},
            {"title": "Budget", "bulletPoints": ["Six"]},
            {"title": "Thanks", "bulletPoints": ["Seven"]}
        ]
    }"#;
    fs::write(&path, response).expect("Failed to write response");
    path.to_string_lossy().into_owned()
}

fn create_deck(dir: &Path, storage: &Path) {
    let response = write_response(dir);
    let output = run_command(
        storage,
        &[
            "create",
            "--title",
            "Team Offsite",
            "--topic",
            "planning the next quarter together",
            "--template",
            "minimal-whiteboard",
            "--theme",
            "light",
            "--from-json",
            &response,
        ],
    );
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("with 5 slides"));
}

#[test]
fn test_create_and_show() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = temp_dir.path().join("session.json");
    create_deck(temp_dir.path(), &storage);

    let output = run_command(&storage, &["show"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let text = stdout(&output);
    assert!(text.contains("Team Offsite"));
    assert!(text.contains("template: minimal-whiteboard"));
    assert!(text.contains("5. Thanks"));
    assert!(text.contains("panels: left 280  right 320"));
}

#[test]
fn test_editing_commands() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = temp_dir.path().join("session.json");
    create_deck(temp_dir.path(), &storage);

    for args in [
        vec!["slide", "add"],
        vec!["title", "6", "Questions"],
        vec!["bullet", "edit", "6", "1", "Ask anything"],
        vec!["transition", "6", "fade"],
        vec!["slide", "move", "6", "1"],
        vec!["deck", "theme", "dark"],
        vec!["panel", "resize", "left", "200"],
    ] {
        let output = run_command(&storage, &args);
        assert!(output.status.success(), "{:?} failed: {:?}", args, output);
    }

    let text = stdout(&run_command(&storage, &["show"]));
    assert!(text.contains("1. Questions [fade]"));
    assert!(text.contains("- Ask anything"));
    assert!(text.contains("theme: dark"));
    assert!(text.contains("panels: left 200"));
}

#[test]
fn test_export_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = temp_dir.path().join("session.json");
    create_deck(temp_dir.path(), &storage);

    let output_path = temp_dir.path().join("out").join("offsite.pptx");
    let output = run_command(
        &storage,
        &[
            "export",
            "--format",
            "pptx",
            "--settle-ms",
            "0",
            "-o",
            output_path.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(output_path.exists(), "Output file was not created");

    let archive = zip::ZipArchive::new(fs::File::open(&output_path).unwrap()).unwrap();
    let slides = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide"))
        .count();
    assert_eq!(slides, 5);
}

#[test]
fn test_errors_exit_with_status_one() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = temp_dir.path().join("session.json");

    let output = run_command(&storage, &["show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: No presentation found"));

    let output = run_command(
        &storage,
        &["create", "--title", "Hi", "--topic", "too short"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Input validation error"));

    create_deck(temp_dir.path(), &storage);
    let output = run_command(&storage, &["title", "9", "Nope"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("out of range"));
}

#[test]
fn test_create_recovers_from_corrupt_storage() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = temp_dir.path().join("session.json");
    fs::write(&storage, "{truncated").expect("Failed to write storage");

    let output = run_command(&storage, &["show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: No presentation found"));

    create_deck(temp_dir.path(), &storage);
    let output = run_command(&storage, &["show"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("Team Offsite"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("session.json.bak")).unwrap(),
        "{truncated"
    );
}

#[test]
fn test_play_runs_to_the_last_slide_without_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = temp_dir.path().join("session.json");
    create_deck(temp_dir.path(), &storage);

    let output = run_command(&storage, &["play", "--interval-ms", "1"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let text = stdout(&output);
    assert!(text.starts_with("[1/5] Hello"));
    assert!(text.contains("[5/5] Thanks"));
}

#[test]
fn test_play_follows_keys_from_stdin() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = temp_dir.path().join("session.json");
    create_deck(temp_dir.path(), &storage);

    let mut child = Command::new(env!("CARGO_BIN_EXE_slideforge"))
        .arg("--storage")
        .arg(&storage)
        .args(["play", "--interval-ms", "600000"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start play");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"n\nn\np\nq\n")
        .expect("Failed to send keys");
    let output = child.wait_with_output().expect("Failed to wait for play");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let shown: Vec<String> = stdout(&output)
        .lines()
        .filter(|line| line.starts_with('['))
        .map(str::to_string)
        .collect();
    assert_eq!(
        shown,
        vec!["[1/5] Hello", "[2/5] Plan", "[3/5] Risks", "[2/5] Plan"]
    );
}
