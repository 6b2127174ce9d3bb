// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Subcommand execution
//!
//! Every command writes its result to the given writer and returns the
//! process exit code, so the binary and the tests drive them the same way.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use tbox_logs::{BuildRecord, write_collated};
use tbox_steps::{StepConfig, builders, complete_step};
use tbox_summary::{HarnessKind, StepLog, Verdict, parse_reader, tinderbox_print};

use crate::config::{Command, Config, KindArg, harness_kind};

/// Process exit code reported for a step verdict
#[must_use]
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Success => 0,
        Verdict::Warning => 1,
        Verdict::Failure => 2,
    }
}

/// Run the configured subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, a log holds a malformed
/// count, or the output cannot be written.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<i32> {
    match &config.command {
        Command::Summarize {
            harness_name,
            kind,
            json,
            log,
        } => summarize(harness_name, *kind, *json, log.as_deref(), out),
        Command::Evaluate {
            harness_name,
            exit_code,
            kind,
            headers,
            json,
            log,
        } => evaluate(
            harness_name,
            *exit_code,
            *kind,
            headers.as_deref(),
            *json,
            log.as_deref(),
            out,
        ),
        Command::Collate { build, .. } => {
            let dir = config
                .log_dir()
                .context("collate has no output directory")?;
            collate(build, &dir, out)
        }
        Command::StepCommand {
            step,
            packaged,
            leak_threshold,
            symbols_path,
            properties,
        } => {
            let config = step_config(step, *packaged, *leak_threshold, symbols_path.as_deref())?;
            let properties: BTreeMap<String, String> = properties.iter().cloned().collect();
            print_step_command(&config, &properties, out)
        }
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open log {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            debug!("reading log from stdin");
            Ok(Box::new(BufReader::new(io::stdin())))
        }
    }
}

/// Read a whole log, replacing invalid UTF-8 rather than rejecting it
fn read_input(path: Option<&Path>) -> Result<String> {
    let mut bytes = Vec::new();
    open_input(path)?
        .read_to_end(&mut bytes)
        .context("Failed to read log")?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Print the summary line (or the parsed counts) for one harness log
///
/// # Errors
///
/// Returns an error if the log cannot be read or holds a malformed count.
pub fn summarize<W: Write>(
    harness_name: &str,
    kind: Option<KindArg>,
    json: bool,
    log: Option<&Path>,
    out: &mut W,
) -> Result<i32> {
    let kind = harness_kind(harness_name, kind);
    let result = parse_reader(&kind, open_input(log)?)
        .with_context(|| format!("Failed to summarize {harness_name} log"))?;
    info!(harness = %harness_name, kind = %kind, "log summarized");

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    } else {
        out.write_all(tinderbox_print(harness_name, &result).as_bytes())?;
    }
    Ok(0)
}

/// Evaluate a finished step and print its verdict and reports
///
/// # Errors
///
/// Returns an error if the log or header file cannot be read, or the log
/// holds a malformed count.
pub fn evaluate<W: Write>(
    harness_name: &str,
    exit_code: i32,
    kind: Option<KindArg>,
    headers: Option<&Path>,
    json: bool,
    log: Option<&Path>,
    out: &mut W,
) -> Result<i32> {
    let mut step_log = StepLog::new(read_input(log)?);
    if let Some(path) = headers {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read headers {}", path.display()))?;
        step_log = step_log.with_headers(String::from_utf8_lossy(&bytes).lines());
    }

    let step = StepConfig::new(harness_name, Vec::<String>::new())
        .with_harness(harness_kind(harness_name, kind));
    let report = complete_step(&step, exit_code, &step_log)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(out, "verdict: {}", report.verdict)?;
        for entry in &report.reports {
            writeln!(out, "--- {} ---", entry.name)?;
            out.write_all(entry.text.as_bytes())?;
            if !entry.text.ends_with('\n') {
                writeln!(out)?;
            }
        }
    }
    Ok(verdict_exit_code(report.verdict))
}

/// Collate a saved build into `dir` and print the written path
///
/// # Errors
///
/// Returns an error if the build record cannot be loaded or the log written.
pub fn collate<W: Write>(build: &Path, dir: &Path, out: &mut W) -> Result<i32> {
    let record = BuildRecord::load(build)
        .with_context(|| format!("Failed to load build record {}", build.display()))?;
    let path: PathBuf = write_collated(&record, dir)?;
    writeln!(out, "{}", path.display())?;
    Ok(0)
}

/// Build the step configuration for a named test step
///
/// # Errors
///
/// Returns an error if `packaged` is requested for a step that has no
/// packaged runner.
pub fn step_config(
    step: &str,
    packaged: bool,
    leak_threshold: Option<u32>,
    symbols_path: Option<&str>,
) -> Result<StepConfig> {
    if step == "package" {
        return Ok(builders::package());
    }
    if !packaged && symbols_path.is_some() {
        warn!(step, "symbols path only applies to packaged runs; ignoring");
    }

    let kind = HarnessKind::from_test_name(step);
    let config = match (packaged, kind) {
        (true, HarnessKind::Reftest) if step == "reftest" || step == "crashtest" => {
            builders::packaged_reftest(step == "crashtest", symbols_path, leak_threshold)
        }
        (true, HarnessKind::Mochitest(variant)) => {
            builders::packaged_mochitest(variant, symbols_path, leak_threshold)
        }
        (true, HarnessKind::TUnit) if step == "xpcshell" => builders::packaged_xpcshell(),
        (true, _) => bail!("No packaged runner for step `{step}`"),
        (false, HarnessKind::Reftest) => builders::reftest(step, leak_threshold, BTreeMap::new()),
        (false, HarnessKind::Mochitest(_)) => {
            builders::mochitest(step, leak_threshold, BTreeMap::new())
        }
        (false, HarnessKind::TUnit) => builders::check(step),
    };
    Ok(config)
}

/// Print a step's rendered command line followed by its environment
///
/// # Errors
///
/// Returns an error if a placeholder names a property that was not given.
pub fn print_step_command<W: Write>(
    step: &StepConfig,
    properties: &BTreeMap<String, String>,
    out: &mut W,
) -> Result<i32> {
    let argv = step.render_command(properties)?;
    writeln!(out, "{}", argv.join(" "))?;
    for (key, value) in &step.env {
        writeln!(out, "{key}={value}")?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_verdict_exit_codes() {
        assert_eq!(verdict_exit_code(Verdict::Success), 0);
        assert_eq!(verdict_exit_code(Verdict::Warning), 1);
        assert_eq!(verdict_exit_code(Verdict::Failure), 2);
    }

    #[test]
    fn test_step_config_dispatch() {
        assert_eq!(
            step_config("check", false, None, None).expect("step").command,
            vec!["make", "-k", "check"]
        );
        assert_eq!(
            step_config("crashtest", true, None, None).expect("step").name,
            "crashtest"
        );
        assert_eq!(
            step_config("mochitest-chrome", true, None, None)
                .expect("step")
                .command
                .last()
                .map(String::as_str),
            Some("--chrome")
        );
        assert_eq!(
            step_config("xpcshell", true, None, None).expect("step").command[0],
            "bash"
        );
    }

    #[test]
    fn test_packaged_step_without_runner() {
        assert!(step_config("jsreftest", true, None, None).is_err());
        assert!(step_config("check", true, None, None).is_err());
    }

    #[test]
    fn test_print_step_command_renders_properties() {
        let step = step_config("reftest", true, Some(20), None).expect("step");
        let properties =
            BTreeMap::from([("exepath".to_string(), "firefox/firefox".to_string())]);
        let mut out = Vec::new();
        print_step_command(&step, &properties, &mut out).expect("print");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "python reftest/runreftest.py --appname=firefox/firefox --leak-threshold=20 \
             reftest/tests/layout/reftests/reftest.list\n"
        );
    }

    #[test]
    fn test_print_step_command_lists_env() {
        let step = step_config("mochitest-plain", false, Some(5), None).expect("step");
        let mut out = Vec::new();
        print_step_command(&step, &BTreeMap::new(), &mut out).expect("print");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "make mochitest-plain\nEXTRA_TEST_ARGS=--leak-threshold=5\n"
        );
    }

    #[test]
    fn test_missing_property_is_an_error() {
        let step = step_config("reftest", true, None, None).expect("step");
        let mut out = Vec::new();
        assert!(print_step_command(&step, &BTreeMap::new(), &mut out).is_err());
    }
}
