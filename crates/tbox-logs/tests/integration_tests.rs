// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Integration tests for tbox-logs
//!
//! These tests load a saved build record and collate it to disk.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use similar_asserts::assert_eq;
use tbox_logs::{BuildRecord, LogsError, StepOutcome, collated_file_name, write_collated};

/// Get the fixtures directory for test data
fn fixtures_dir() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("tbox-logs-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn test_load_fixture_build() {
    let build = BuildRecord::load(&fixtures_dir().join("build.json")).expect("load");
    assert_eq!(build.builder, "mozilla-central-linux-unittest");
    assert_eq!(build.number, 4021);
    assert_eq!(build.steps.len(), 3);
    assert_eq!(build.steps[1].results, Some(StepOutcome::Warnings));
    assert_eq!(build.author(), Some("dev@example.com"));
    assert_eq!(build.short_revision(), Some("c460aeb7fb2d"));
}

#[test]
fn test_missing_build_record() {
    let err = BuildRecord::load(&fixtures_dir().join("nope.json")).expect_err("Should fail");
    assert!(matches!(err, LogsError::BuildNotFound { .. }));
}

#[test]
fn test_write_collated_fixture() {
    let build = BuildRecord::load(&fixtures_dir().join("build.json")).expect("load");
    let dir = scratch_dir("collate");

    let path = write_collated(&build, &dir).expect("collate");
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some(collated_file_name("mozilla-central-linux-unittest", 4021).as_str())
    );

    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("gz"));
    let file = std::fs::File::open(&path).expect("open collated log");
    let mut text = String::new();
    GzDecoder::new(file)
        .read_to_string(&mut text)
        .expect("collated log is valid gzip");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "========= Started check test complete (results: 0, elapsed: 3 mins, 7 secs) =========="
    );
    assert!(text.contains(
        "======== Finished reftest test complete (results: 1, elapsed: 1 hrs, 12 mins, 2 secs) ========"
    ));
    // The unterminated reftest log still ends on its own line
    assert!(text.contains("REFTEST INFO | Unexpected: 1 (1 unexpected fail)\n======== Finished"));
    assert!(text.contains(
        "========= Started mochitest-plain test (results: not started, elapsed: not started) =========="
    ));
    assert!(text.ends_with("========\n\n"));

    let mut plain = Vec::new();
    tbox_logs::collate(&build, &mut plain).expect("collate to memory");
    assert_eq!(text, String::from_utf8(plain).expect("utf8"));

    std::fs::remove_dir_all(&dir).ok();
}
