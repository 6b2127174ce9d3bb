// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Status line rendering
//!
//! Turns a [`HarnessResult`] into the short `pass/fail[/known]` text shown on
//! the build dashboard, with failure indicators wrapped in highlight markup.
//!
//! # Example
//!
//! ```
//! use tbox_summary::status::summary_text;
//! use tbox_summary::LeakStatus;
//!
//! let text = summary_text(10, 2, None, false, LeakStatus::Clean);
//! assert_eq!(text, r#"10/<em class="testfail">2</em>"#);
//! ```

use crate::harness::{HarnessResult, LeakStatus};

/// Marker rendered when no usable counts were found
pub const TEST_FAILURE_MARKER: &str = "T-FAIL";
/// Marker appended when the browser crashed
pub const CRASH_MARKER: &str = "CRASH";
/// Marker appended when a leak was detected
pub const LEAK_MARKER: &str = "LEAK";
/// Marker appended when the leak detector itself failed
pub const LEAK_CHECK_FAILED_MARKER: &str = "L-FAIL";
/// Separator placed before each appended marker
pub const MARKER_SEPARATOR: &str = "&nbsp;";

/// Wrap text in the dashboard's failure highlight
#[must_use]
pub fn emphasize_failure_text(text: &str) -> String {
    format!("<em class=\"testfail\">{text}</em>")
}

/// Render the status text for a set of counts and flags
///
/// Negative counts mean "could not determine" and render as `T-FAIL`, as does
/// a run with no passes, no failures and no known failures.
#[must_use]
pub fn summary_text(
    passed: i64,
    failed: i64,
    known_failed: Option<i64>,
    crashed: bool,
    leaked: LeakStatus,
) -> String {
    let explicit_failure = passed < 0 || failed < 0 || known_failed.is_some_and(|k| k < 0);
    let implicit_failure = passed == 0 && failed == 0 && matches!(known_failed, None | Some(0));

    let mut summary = if explicit_failure || implicit_failure {
        emphasize_failure_text(TEST_FAILURE_MARKER)
    } else {
        let failed_text = if failed > 0 {
            emphasize_failure_text(&failed.to_string())
        } else {
            failed.to_string()
        };
        match known_failed {
            Some(known) => format!("{passed}/{failed_text}/{known}"),
            None => format!("{passed}/{failed_text}"),
        }
    };

    if crashed {
        summary.push_str(MARKER_SEPARATOR);
        summary.push_str(&emphasize_failure_text(CRASH_MARKER));
    }

    match leaked {
        LeakStatus::Clean => {}
        LeakStatus::Leaked => {
            summary.push_str(MARKER_SEPARATOR);
            summary.push_str(&emphasize_failure_text(LEAK_MARKER));
        }
        LeakStatus::CheckFailed => {
            summary.push_str(MARKER_SEPARATOR);
            summary.push_str(&emphasize_failure_text(LEAK_CHECK_FAILED_MARKER));
        }
    }

    summary
}

/// Render the full `TinderboxPrint` line for a named step
#[must_use]
pub fn tinderbox_print(name: &str, result: &HarnessResult) -> String {
    tinderbox_line(name, &result.summary_text())
}

/// Render a `TinderboxPrint` line around already-formatted status text
#[must_use]
pub fn tinderbox_line(name: &str, text: &str) -> String {
    format!("TinderboxPrint: {name}<br/>{text}\n")
}
