// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! CLI parsing tests for every subcommand
//!
//! These tests verify argument parsing, flag placement and the values
//! handed to subcommand execution.

use std::path::PathBuf;

use clap::Parser;
use tbox::config::{Command, Config, KindArg};
use tracing::Level;

// ============================================================================
// Global flags
// ============================================================================

#[test]
fn test_verbose_before_subcommand() {
    let config = Config::try_parse_from(["tbox", "-v", "command", "check"])
        .expect("parse should succeed");
    assert!(config.verbose);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_verbose_wins_over_quiet() {
    let config = Config::try_parse_from(["tbox", "-v", "-q", "command", "check"])
        .expect("parse should succeed");
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_verbose_flag_value_syntax_not_supported() {
    let result = Config::try_parse_from(["tbox", "--verbose=true", "command", "check"]);
    assert!(result.is_err(), "Boolean flags don't support =value syntax");
}

#[test]
fn test_subcommand_is_required() {
    assert!(Config::try_parse_from(["tbox"]).is_err());
}

// ============================================================================
// summarize
// ============================================================================

#[test]
fn test_summarize_args() {
    let config = Config::try_parse_from([
        "tbox",
        "summarize",
        "--harness-name",
        "mochitest-chrome",
        "--kind",
        "mochitest",
        "--json",
        "chrome.log",
    ])
    .expect("parse should succeed");
    match config.command {
        Command::Summarize {
            harness_name,
            kind,
            json,
            log,
        } => {
            assert_eq!(harness_name, "mochitest-chrome");
            assert_eq!(kind, Some(KindArg::Mochitest));
            assert!(json);
            assert_eq!(log, Some(PathBuf::from("chrome.log")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_summarize_requires_harness_name() {
    assert!(Config::try_parse_from(["tbox", "summarize", "x.log"]).is_err());
}

#[test]
fn test_summarize_rejects_unknown_kind() {
    let result = Config::try_parse_from([
        "tbox",
        "summarize",
        "--harness-name",
        "x",
        "--kind",
        "jsunit",
    ]);
    assert!(result.is_err());
}

// ============================================================================
// evaluate
// ============================================================================

#[test]
fn test_evaluate_negative_exit_code() {
    let config = Config::try_parse_from([
        "tbox",
        "evaluate",
        "--harness-name",
        "xpcshell",
        "--exit-code",
        "-1",
    ])
    .expect("parse should succeed");
    assert!(matches!(
        config.command,
        Command::Evaluate { exit_code: -1, .. }
    ));
}

#[test]
fn test_evaluate_requires_exit_code() {
    let result = Config::try_parse_from(["tbox", "evaluate", "--harness-name", "xpcshell"]);
    assert!(result.is_err());
}

// ============================================================================
// collate / command
// ============================================================================

#[test]
fn test_collate_output_flag() {
    let config = Config::try_parse_from(["tbox", "collate", "build.json", "-o", "/tmp/logs"])
        .expect("parse should succeed");
    assert_eq!(config.log_dir(), Some(PathBuf::from("/tmp/logs")));
}

#[test]
fn test_command_properties() {
    let config = Config::try_parse_from([
        "tbox",
        "command",
        "reftest",
        "--packaged",
        "--leak-threshold",
        "484",
        "-P",
        "exepath=firefox/firefox",
        "--property",
        "exedir=firefox",
    ])
    .expect("parse should succeed");
    match config.command {
        Command::StepCommand {
            step,
            packaged,
            leak_threshold,
            properties,
            ..
        } => {
            assert_eq!(step, "reftest");
            assert!(packaged);
            assert_eq!(leak_threshold, Some(484));
            assert_eq!(properties.len(), 2);
            assert_eq!(properties[1], ("exedir".to_string(), "firefox".to_string()));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_command_rejects_malformed_property() {
    let result = Config::try_parse_from(["tbox", "command", "reftest", "-P", "exepath"]);
    assert!(result.is_err());
}
