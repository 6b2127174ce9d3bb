// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Harness families and the counts parsed from their logs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Count value meaning "no result line was found for this field"
pub const UNDETERMINED: i64 = -1;

/// Harness name whose result summary uses the short `Pass:`/`Fail:`/`Todo:` form
pub const BROWSER_CHROME_NAME: &str = "mochitest-browser-chrome";

/// The test-harness family that produced a log
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarnessKind {
    /// reftest, crashtest and jsreftest runners
    Reftest,
    /// mochitest runners, one variant per suite flavour
    Mochitest(MochitestVariant),
    /// Unit-test runners that print one line per test (`make check`, xpcshell)
    #[serde(rename = "tunit")]
    TUnit,
}

impl HarnessKind {
    /// Derive the harness family from a test or step name
    ///
    /// `reftest`, `crashtest` and anything ending in `reftest` are reftests,
    /// `mochitest` and `mochitest-<variant>` are mochitests, and every other
    /// name falls back to the unit-test grammar.
    #[must_use]
    pub fn from_test_name(name: &str) -> Self {
        if name == "crashtest" || name.ends_with("reftest") {
            return Self::Reftest;
        }
        match name.strip_prefix("mochitest") {
            Some("") => Self::Mochitest(MochitestVariant::Plain),
            Some(rest) => match rest.strip_prefix('-') {
                Some(variant) => Self::Mochitest(MochitestVariant::from_name(variant)),
                None => Self::TUnit,
            },
            None => Self::TUnit,
        }
    }

    /// Short family name used in logs and CLI output
    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            Self::Reftest => "reftest",
            Self::Mochitest(_) => "mochitest",
            Self::TUnit => "tunit",
        }
    }
}

impl fmt::Display for HarnessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mochitest(variant) => write!(f, "mochitest-{variant}"),
            other => f.write_str(other.family()),
        }
    }
}

/// Mochitest suite flavour
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MochitestVariant {
    /// Plain content mochitests
    Plain,
    /// Chrome-privileged mochitests
    Chrome,
    /// Browser-chrome mochitests, which print their own summary format
    BrowserChrome,
    /// Accessibility mochitests
    A11y,
    /// Any other suite passed through by name
    Other(String),
}

impl MochitestVariant {
    /// Parse a variant from the suffix of `mochitest-<variant>`
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "plain" => Self::Plain,
            "chrome" => Self::Chrome,
            "browser-chrome" => Self::BrowserChrome,
            "a11y" => Self::A11y,
            other => Self::Other(other.to_string()),
        }
    }

    /// The suffix used in step names and runner flags
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => "plain",
            Self::Chrome => "chrome",
            Self::BrowserChrome => "browser-chrome",
            Self::A11y => "a11y",
            Self::Other(name) => name,
        }
    }

    /// Full suite name, e.g. `mochitest-chrome`
    #[must_use]
    pub fn suite_name(&self) -> String {
        format!("mochitest-{}", self.as_str())
    }
}

impl fmt::Display for MochitestVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leak-detector outcome for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeakStatus {
    /// No leak reported
    #[default]
    Clean,
    /// The leak detector reported a leak
    Leaked,
    /// The leak detector itself failed (e.g. missing total-leaks line)
    CheckFailed,
}

/// Counts and flags reduced from one harness log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessResult {
    /// Passed tests, or [`UNDETERMINED`]
    pub passed: i64,
    /// Unexpected failures, or [`UNDETERMINED`]
    pub failed: i64,
    /// Known failures / todo items, when the harness reports them
    pub known_failed: Option<i64>,
    /// The browser crashed during the run
    pub crashed: bool,
    /// Leak-detector outcome
    pub leaked: LeakStatus,
}

impl HarnessResult {
    /// A result with zero counts and no flags
    #[must_use]
    pub fn empty() -> Self {
        Self {
            passed: 0,
            failed: 0,
            known_failed: None,
            crashed: false,
            leaked: LeakStatus::Clean,
        }
    }

    /// True when any count holds the "could not determine" sentinel
    #[must_use]
    pub fn is_undetermined(&self) -> bool {
        self.passed < 0 || self.failed < 0 || self.known_failed.is_some_and(|k| k < 0)
    }

    /// True when the harness produced no recognizable result at all
    #[must_use]
    pub fn is_implicit_failure(&self) -> bool {
        self.passed == 0 && self.failed == 0 && matches!(self.known_failed, None | Some(0))
    }

    /// True when the summary renders as `T-FAIL`
    #[must_use]
    pub fn is_test_failure(&self) -> bool {
        self.is_undetermined() || self.is_implicit_failure()
    }

    /// Render the one-line status for this result
    #[must_use]
    pub fn summary_text(&self) -> String {
        crate::status::summary_text(
            self.passed,
            self.failed,
            self.known_failed,
            self.crashed,
            self.leaked,
        )
    }
}

impl Default for HarnessResult {
    fn default() -> Self {
        Self::empty()
    }
}
