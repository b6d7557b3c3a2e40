//! CLI integration tests driving the `kvid` binary end to end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn kvid_cmd() -> Command {
    Command::cargo_bin("kvid").unwrap()
}

#[test]
fn help_displays_usage() {
    kvid_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Text-in-video semantic store"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn version_displays_version() {
    kvid_cmd().arg("--version").assert().success().stdout(predicate::str::contains("kvid"));
}

#[test]
fn invalid_command_shows_error() {
    kvid_cmd().arg("not-a-real-command").assert().failure();
}

#[test]
fn build_index_then_search_round_trips_the_top_hit() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("corpus.txt");
    fs::write(&input, "The quick brown fox jumps over the lazy dog. Rust is a systems language.").unwrap();

    let index_path = dir.path().join("corpus.index");
    let corpus_path = dir.path().join("corpus.jsonl");

    kvid_cmd()
        .args(["build-index"])
        .arg(&input)
        .arg(&index_path)
        .arg(&corpus_path)
        .args(["--dimension", "32", "--chunk-size", "40", "--overlap", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed"));

    assert!(index_path.exists());
    assert!(corpus_path.exists());

    kvid_cmd()
        .arg("search")
        .arg(&index_path)
        .arg(&corpus_path)
        .arg("Rust systems language")
        .args(["--dimension", "32", "-k", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("similarity="));
}

#[test]
fn search_against_a_missing_index_fails() {
    let dir = TempDir::new().unwrap();
    kvid_cmd()
        .arg("search")
        .arg(dir.path().join("missing.index"))
        .arg(dir.path().join("missing.jsonl"))
        .arg("query")
        .assert()
        .failure();
}

#[test]
fn encode_then_decode_round_trips_the_chunk_text() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("message.txt");
    fs::write(&input, "hello from the encode and decode round trip test").unwrap();
    let container = dir.path().join("message.kvid");

    kvid_cmd()
        .arg("encode")
        .arg(&input)
        .arg(&container)
        .args(["--width", "64", "--height", "64", "--fps", "5", "--chunk-size", "200", "--overlap", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encoded"));

    assert!(container.exists());

    kvid_cmd()
        .arg("decode")
        .arg(&container)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from the encode"));

    kvid_cmd()
        .arg("info")
        .arg(&container)
        .assert()
        .success();
}
