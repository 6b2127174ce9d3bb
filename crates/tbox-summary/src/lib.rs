// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! tbox-summary: Test-harness log summarization for tbox
//!
//! This library crate reduces the captured output of a test step to the
//! one-line status shown on the build dashboard, and decides the coarse
//! verdict the scheduler uses for the step.
//!
//! # Example
//!
//! ```
//! use tbox_summary::{HarnessKind, StepLog, Verdict, evaluate_step, parse_log, tinderbox_print};
//!
//! let log = "TEST-PASS | test_a.js\nTEST-PASS | test_b.js\n";
//! let result = parse_log(&HarnessKind::TUnit, log).unwrap();
//! assert_eq!(tinderbox_print("check", &result), "TinderboxPrint: check<br/>2/0\n");
//!
//! let evaluation = evaluate_step("check", Some(&HarnessKind::TUnit), 0, &StepLog::new(log));
//! assert_eq!(evaluation.verdict, Verdict::Success);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod harness;
pub mod parser;
pub mod status;
pub mod verdict;

pub use error::SummaryError;
pub use harness::{HarnessKind, HarnessResult, LeakStatus, MochitestVariant, UNDETERMINED};
pub use parser::{LineScanner, StreamingParser, parse_lines, parse_log, parse_reader};
pub use status::{emphasize_failure_text, summary_text, tinderbox_print};
pub use verdict::{ReportEntry, StepEvaluation, StepLog, Verdict, evaluate_step};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::SummaryError;
    pub use crate::harness::{HarnessKind, HarnessResult, LeakStatus, MochitestVariant};
    pub use crate::parser::{StreamingParser, parse_log};
    pub use crate::status::tinderbox_print;
    pub use crate::verdict::{ReportEntry, StepEvaluation, StepLog, Verdict, evaluate_step};
}
