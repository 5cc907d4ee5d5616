//! CLI binary integration tests using assert_cmd

mod common;

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ai-chat-exporter"))
}

#[test]
fn test_extract_prints_canonical_json() {
    let (_dir, page) = common::write_page(common::CLAUDE_FIXTURE);
    bin()
        .arg("extract")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"platform\": \"claude\""))
        .stdout(predicate::str::contains("\"messages\""))
        .stdout(predicate::str::contains("Explain recursion"));
}

#[test]
fn test_extract_with_explicit_platform() {
    let (_dir, page) = common::write_page(common::CLAUDE_FIXTURE);
    bin()
        .arg("extract")
        .arg(&page)
        .args(["--platform", "claude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"platform\": \"claude\""));
}

#[test]
fn test_extract_unknown_platform_fails() {
    let (_dir, page) = common::write_page(common::CLAUDE_FIXTURE);
    bin()
        .arg("extract")
        .arg(&page)
        .args(["--platform", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown platform"));
}

#[test]
fn test_extract_missing_file_fails_with_context() {
    bin()
        .arg("extract")
        .arg("/definitely/not/here.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_export_markdown_writes_artifact() {
    let (dir, page) = common::write_page(common::CLAUDE_FIXTURE);
    let out_dir = dir.path().join("out");
    bin()
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .arg("export")
        .arg(&page)
        .args(["--format", "markdown"])
        .arg("--out-dir")
        .arg(&out_dir)
        .args(["--filename", "session"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote "));

    let entries: Vec<_> = std::fs::read_dir(&out_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let written = entries[0].as_ref().unwrap().path();
    assert!(written.extension().is_some_and(|e| e == "md"));
    let text = std::fs::read_to_string(written).unwrap();
    assert!(text.contains("## User"));
}

#[test]
fn test_export_signed_writes_manifest_sibling() {
    let (dir, page) = common::write_page(common::CLAUDE_FIXTURE);
    let out_dir = dir.path().join("out");
    bin()
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .arg("export")
        .arg(&page)
        .args(["--format", "json", "--sign", "--filename", "signed"])
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success();

    let names: Vec<String> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.ends_with(".manifest.json")), "{names:?}");
}

#[test]
fn test_export_all_renders_every_text_format() {
    let (dir, page) = common::write_page(common::CLAUDE_FIXTURE);
    let out_dir = dir.path().join("out");
    bin()
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .arg("export")
        .arg(&page)
        .arg("--all")
        .arg("--out-dir")
        .arg(&out_dir)
        .args(["--filename", "bulk"])
        .assert()
        .success();

    let count = std::fs::read_dir(&out_dir).unwrap().count();
    assert_eq!(count, 8);
}

#[test]
fn test_export_range_scope() {
    let (dir, page) = common::write_page(&common::six_turn_page());
    let out_dir = dir.path().join("out");
    bin()
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .arg("export")
        .arg(&page)
        .args(["--format", "text", "--range-start", "2", "--range-end", "4"])
        .args(["--filename", "slice"])
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success();

    let entries: Vec<_> = std::fs::read_dir(&out_dir).unwrap().collect();
    let written = entries[0].as_ref().unwrap().path();
    assert!(written.file_name().unwrap().to_string_lossy().contains("range-2-4"));
    let text = std::fs::read_to_string(written).unwrap();
    assert!(text.contains("Turn number 3"));
    assert!(!text.contains("Turn number 5"));
}

#[test]
fn test_stats_command_reports_metrics() {
    let (_dir, page) = common::write_page(common::CLAUDE_FIXTURE);
    bin()
        .arg("stats")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversation Statistics"))
        .stdout(predicate::str::contains("Messages: 2 (1 user, 1 assistant)"))
        .stdout(predicate::str::contains("Initiated by: user"))
        .stdout(predicate::str::contains("Structural complexity"));
}

#[test]
fn test_history_empty_then_populated() {
    let (dir, page) = common::write_page(common::CLAUDE_FIXTURE);
    let data_home = dir.path().join("data");

    bin()
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", &data_home)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No exports recorded yet."));

    bin()
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", &data_home)
        .arg("export")
        .arg(&page)
        .args(["--format", "markdown", "--filename", "tracked"])
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .assert()
        .success();

    bin()
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", &data_home)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recent exports"))
        .stdout(predicate::str::contains("markdown"))
        .stdout(predicate::str::contains("claude"));
}

#[test]
fn test_no_subcommand_mentions_help() {
    bin().assert().success().stdout(predicate::str::contains("--help"));
}
