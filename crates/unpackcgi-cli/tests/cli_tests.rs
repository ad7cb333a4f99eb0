//! Integration tests for unpackcgi-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn unpackcgi_cmd() -> Command {
    cargo_bin_cmd!("unpackcgi")
}

/// Builds a record container: `[name_len u16][name][payload_len u32][payload]`
/// repeated, terminated by a zero name length. All fields little-endian.
fn write_record_blob(path: &Path, entries: &[(&str, &[u8])]) {
    let mut blob = Vec::new();
    for (name, payload) in entries {
        blob.extend_from_slice(&u16::try_from(name.len()).unwrap().to_le_bytes());
        blob.extend_from_slice(name.as_bytes());
        blob.extend_from_slice(&u32::try_from(payload.len()).unwrap().to_le_bytes());
        blob.extend_from_slice(payload);
    }
    blob.extend_from_slice(&0u16.to_le_bytes());
    fs::write(path, blob).expect("failed to write fixture blob");
}

#[test]
fn test_version_flag() {
    unpackcgi_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unpackcgi"));
}

#[test]
fn test_help_flag() {
    unpackcgi_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("OUTPUT_DIR"));
}

#[test]
fn test_missing_args_is_usage_error() {
    unpackcgi_cmd()
        .arg("only_one_arg.bin")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unpack_record_blob() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let input = temp.path().join("cgi_config.bin");
    let output = temp.path().join("config_out");
    write_record_blob(&input, &[("Account1", b"admin\n"), ("General", b"lang=en\n")]);

    unpackcgi_cmd()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files extracted: 2"));

    assert_eq!(fs::read(output.join("Account1")).unwrap(), b"admin\n");
    assert_eq!(fs::read(output.join("General")).unwrap(), b"lang=en\n");
}

#[test]
fn test_quiet_suppresses_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let input = temp.path().join("cgi_config.bin");
    write_record_blob(&input, &[("cfg", b"x")]);

    unpackcgi_cmd()
        .arg(&input)
        .arg(temp.path().join("out"))
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_json_output_shape() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let input = temp.path().join("cgi_config.bin");
    write_record_blob(&input, &[("NetWork.NetDNS", b"8.8.8.8")]);

    let assert = unpackcgi_cmd()
        .arg(&input)
        .arg(temp.path().join("out"))
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is valid JSON");
    assert_eq!(parsed["operation"], "unpack");
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["files_extracted"], 1);
    assert_eq!(parsed["data"]["output_paths"][0], "NetWork.NetDNS");
}

#[test]
fn test_missing_input_is_fatal() {
    let temp = TempDir::new().expect("failed to create temp dir");

    unpackcgi_cmd()
        .arg(temp.path().join("does_not_exist.bin"))
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn test_corrupt_blob_is_fatal() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let input = temp.path().join("noise.bin");
    fs::write(&input, vec![0xFFu8; 64]).unwrap();

    unpackcgi_cmd()
        .arg(&input)
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_traversal_entry_skipped_with_warning() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let input = temp.path().join("cgi_config.bin");
    let output = temp.path().join("out");
    write_record_blob(&input, &[("../evil.txt", b"x"), ("ok.txt", b"y")]);

    unpackcgi_cmd()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Entries skipped: 1"));

    assert!(output.join("ok.txt").is_file());
    assert!(!temp.path().join("evil.txt").exists());
}

#[test]
fn test_max_files_limit_is_fatal() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let input = temp.path().join("cgi_config.bin");
    write_record_blob(&input, &[("a", b"1"), ("b", b"2")]);

    unpackcgi_cmd()
        .arg(&input)
        .arg(temp.path().join("out"))
        .arg("--max-files")
        .arg("1")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("limit exceeded"));
}
