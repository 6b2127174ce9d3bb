// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Step verdict policy
//!
//! Maps a finished step's exit code and captured log to a coarse verdict for
//! the build scheduler. Process-level problems (a timeout reported by the
//! process runner, a non-zero exit code) downgrade the step to a warning and
//! leave a separate report entry for triage; the harness-specific content
//! checks can then downgrade a clean exit to a warning as well.
//!
//! The policy never produces [`Verdict::Failure`] itself.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::harness::{HarnessKind, MochitestVariant};
use crate::parser::{TEST_PASS, TEST_UNEXPECTED};
use crate::status::{emphasize_failure_text, tinderbox_line};

/// Header-channel text the process runner emits when it kills a command
pub const TIMEOUT_MARKER: &str = "command timed out";
/// Prefix of the timeout report entry
pub const TIMEOUT_ERROR_PREFIX: &str = "buildbot.slave.commands.TimeoutError: ";
/// Line that proves a reftest run reached its summary with no unexpected results
pub const REFTEST_COMPLETE_MARKER: &str = "REFTEST INFO | Unexpected: 0 (";
/// Substring printed when the mochitest application exits abnormally
pub const MOCHITEST_EXIT_FAILURE: &str = "FAIL Exited";

/// Name of the report entry holding the rendered summary line
pub const SUMMARY_REPORT: &str = "summary";
/// Name of the report entry written on timeout
pub const TIMEOUT_REPORT: &str = "timeout";
/// Name of the report entry written on a non-zero exit code
pub const ERROR_REPORT: &str = "error";

/// Coarse step outcome, ordered by severity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The step ran and its output looked clean
    #[default]
    Success,
    /// The step finished but something needs a human look
    Warning,
    /// The step failed outright
    Failure,
}

impl Verdict {
    /// The more severe of two verdicts
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }

    /// Lowercase name used in reports and CLI output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named log attached to a step's report output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Entry name shown by the dashboard (`summary`, `timeout`, `error`)
    pub name: String,
    /// Entry contents
    pub text: String,
}

impl ReportEntry {
    /// Create a report entry
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// The captured output of a finished step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepLog {
    /// Combined stdout/stderr text, in emission order
    pub stdio: String,
    /// Lines written by the process runner on its header channel
    pub headers: Vec<String>,
}

impl StepLog {
    /// Wrap captured stdio with no header lines
    #[must_use]
    pub fn new(stdio: impl Into<String>) -> Self {
        Self {
            stdio: stdio.into(),
            headers: Vec::new(),
        }
    }

    /// Attach header-channel lines
    #[must_use]
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// The first header line reporting a command timeout
    #[must_use]
    pub fn timeout_line(&self) -> Option<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .find(|line| line.contains(TIMEOUT_MARKER))
    }
}

/// Verdict and extra report entries for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvaluation {
    /// Overall step verdict
    pub verdict: Verdict,
    /// Report entries produced while evaluating (timeout / error diagnostics)
    pub reports: Vec<ReportEntry>,
}

impl StepEvaluation {
    fn success() -> Self {
        Self {
            verdict: Verdict::Success,
            reports: Vec::new(),
        }
    }

    /// True when the verdict came from a timeout or non-zero exit
    #[must_use]
    pub fn is_process_error(&self) -> bool {
        self.reports
            .iter()
            .any(|r| r.name == TIMEOUT_REPORT || r.name == ERROR_REPORT)
    }
}

/// Evaluate the process-level outcome shared by every step
///
/// A timeout short-circuits the exit-code check so only one diagnostic is
/// reported.
#[must_use]
pub fn process_verdict(name: &str, exit_code: i32, log: &StepLog) -> StepEvaluation {
    if let Some(line) = log.timeout_line() {
        warn!(step = name, line, "step timed out");
        let text = format!(
            "{TIMEOUT_ERROR_PREFIX}{line}\n{}",
            tinderbox_line(name, &emphasize_failure_text("timeout"))
        );
        return StepEvaluation {
            verdict: Verdict::Warning,
            reports: vec![ReportEntry::new(TIMEOUT_REPORT, text)],
        };
    }

    if exit_code != 0 {
        warn!(step = name, exit_code, "step exited with non-zero status");
        return StepEvaluation {
            verdict: Verdict::Warning,
            reports: vec![ReportEntry::new(
                ERROR_REPORT,
                format!("Unknown Error: command finished with exit code: {exit_code}"),
            )],
        };
    }

    StepEvaluation::success()
}

/// Content checks for a reftest log that exited cleanly
///
/// Returns `true` when the log is clean.
#[must_use]
pub fn reftest_log_clean(stdio: &str) -> bool {
    let mut completed = false;
    for line in stdio.lines() {
        if line.starts_with(TEST_UNEXPECTED) {
            debug!(line, "reftest harness error");
            return false;
        }
        completed |= line.starts_with(REFTEST_COMPLETE_MARKER);
    }
    if !completed {
        debug!("reftest log has no clean completion line");
    }
    completed
}

/// Content checks for a mochitest log that exited cleanly
#[must_use]
pub fn mochitest_log_clean(variant: &MochitestVariant, stdio: &str) -> bool {
    if stdio.contains(TEST_UNEXPECTED) || stdio.contains(MOCHITEST_EXIT_FAILURE) {
        return false;
    }
    // browser-chrome prints its own summary and no per-test TEST-PASS lines
    match variant {
        MochitestVariant::BrowserChrome => true,
        _ => stdio.contains(TEST_PASS),
    }
}

/// Content checks for a unit-test log that exited cleanly
#[must_use]
pub fn tunit_log_clean(stdio: &str) -> bool {
    !stdio.contains(TEST_UNEXPECTED)
}

/// Decide the verdict for a finished step
///
/// Steps without a harness only get the process-level checks.
#[must_use]
pub fn evaluate_step(
    name: &str,
    harness: Option<&HarnessKind>,
    exit_code: i32,
    log: &StepLog,
) -> StepEvaluation {
    let mut evaluation = process_verdict(name, exit_code, log);
    if evaluation.verdict != Verdict::Success {
        return evaluation;
    }

    let clean = match harness {
        None => true,
        Some(HarnessKind::Reftest) => reftest_log_clean(&log.stdio),
        Some(HarnessKind::Mochitest(variant)) => mochitest_log_clean(variant, &log.stdio),
        Some(HarnessKind::TUnit) => tunit_log_clean(&log.stdio),
    };
    if !clean {
        evaluation.verdict = Verdict::Warning;
    }

    info!(step = name, verdict = %evaluation.verdict, "step evaluated");
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const CLEAN_REFTEST: &str = "REFTEST INFO | Successful: 10 (10 pass)\n\
                                 REFTEST INFO | Unexpected: 0 (0 unexpected)\n";

    #[test]
    fn test_verdict_ordering() {
        assert!(Verdict::Success < Verdict::Warning);
        assert!(Verdict::Warning < Verdict::Failure);
        assert_eq!(Verdict::Success.worst(Verdict::Warning), Verdict::Warning);
        assert_eq!(Verdict::Failure.worst(Verdict::Warning), Verdict::Failure);
    }

    #[test]
    fn test_nonzero_exit_is_warning() {
        let log = StepLog::new(CLEAN_REFTEST);
        let eval = evaluate_step("reftest", Some(&HarnessKind::Reftest), 1, &log);
        assert_eq!(eval.verdict, Verdict::Warning);
        assert_eq!(
            eval.reports,
            vec![ReportEntry::new(
                ERROR_REPORT,
                "Unknown Error: command finished with exit code: 1"
            )]
        );
    }

    #[test]
    fn test_timeout_short_circuits() {
        let log = StepLog::new("").with_headers(["command timed out: 1200 seconds without output"]);
        let eval = evaluate_step("mochitest-plain", None, 1, &log);
        assert_eq!(eval.verdict, Verdict::Warning);
        assert_eq!(eval.reports.len(), 1);
        assert_eq!(eval.reports[0].name, TIMEOUT_REPORT);
        assert_eq!(
            eval.reports[0].text,
            "buildbot.slave.commands.TimeoutError: command timed out: 1200 seconds without output\n\
             TinderboxPrint: mochitest-plain<br/><em class=\"testfail\">timeout</em>\n"
        );
    }

    #[test]
    fn test_clean_reftest_is_success() {
        let eval = evaluate_step("reftest", Some(&HarnessKind::Reftest), 0, &StepLog::new(CLEAN_REFTEST));
        assert_eq!(eval.verdict, Verdict::Success);
        assert!(eval.reports.is_empty());
    }

    #[test]
    fn test_reftest_missing_completion_line() {
        let log = StepLog::new("REFTEST INFO | Unexpected: 3 (3 unexpected)\n");
        assert!(!reftest_log_clean(&log.stdio));
    }

    #[test]
    fn test_reftest_harness_error_must_start_line() {
        let stdio = format!("{CLEAN_REFTEST}REFTEST TEST-UNEXPECTED-FAIL | a.html\n");
        assert!(reftest_log_clean(&stdio));
        let stdio = format!("{CLEAN_REFTEST}TEST-UNEXPECTED-FAIL | automation.py | negative leaks caught!\n");
        assert!(!reftest_log_clean(&stdio));
    }

    #[test]
    fn test_mochitest_checks() {
        let plain = MochitestVariant::Plain;
        assert!(mochitest_log_clean(&plain, "INFO TEST-PASS | a.html\n"));
        assert!(!mochitest_log_clean(&plain, "INFO Passed: 0\n"));
        assert!(!mochitest_log_clean(&plain, "INFO TEST-PASS | a\nFAIL Exited with code 1\n"));
        assert!(mochitest_log_clean(&MochitestVariant::BrowserChrome, "Pass: 4\n"));
        assert!(!mochitest_log_clean(
            &MochitestVariant::BrowserChrome,
            "TEST-UNEXPECTED-FAIL | browser_a.js\n"
        ));
    }

    #[test]
    fn test_tunit_residual_unexpected() {
        let log = StepLog::new("TEST-PASS a\nTEST-UNEXPECTED-FAIL b\n");
        let eval = evaluate_step("check", Some(&HarnessKind::TUnit), 0, &log);
        assert_eq!(eval.verdict, Verdict::Warning);
        assert!(!eval.is_process_error());
    }

    #[test]
    fn test_policy_never_fails() {
        for code in [-1, 0, 1, 2, 137] {
            for kind in [
                HarnessKind::Reftest,
                HarnessKind::TUnit,
                HarnessKind::Mochitest(MochitestVariant::Plain),
            ] {
                let eval = evaluate_step("x", Some(&kind), code, &StepLog::new("garbage"));
                assert_ne!(eval.verdict, Verdict::Failure);
            }
        }
    }
}
