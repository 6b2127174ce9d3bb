// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Step completion
//!
//! Called once the host has captured a step's full output: summarizes the
//! log with the step's harness grammar and decides the step verdict.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tbox_summary::verdict::SUMMARY_REPORT;
use tbox_summary::{
    HarnessResult, ReportEntry, StepLog, Verdict, evaluate_step, parse_log, tinderbox_print,
};

use crate::error::StepError;
use crate::step::StepConfig;

/// Everything the host needs to display and schedule a finished step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name
    pub name: String,
    /// Step verdict
    pub verdict: Verdict,
    /// Verdict contributed to the whole build, after the step's flags
    pub build_verdict: Verdict,
    /// Parsed harness counts, for steps that run tests
    pub result: Option<HarnessResult>,
    /// Report entries in the order they were produced
    pub reports: Vec<ReportEntry>,
}

impl StepReport {
    /// Look up a report entry by name
    #[must_use]
    pub fn report(&self, name: &str) -> Option<&ReportEntry> {
        self.reports.iter().find(|r| r.name == name)
    }

    /// The rendered `TinderboxPrint` summary line, if the step has one
    #[must_use]
    pub fn summary_line(&self) -> Option<&str> {
        self.report(SUMMARY_REPORT).map(|r| r.text.as_str())
    }
}

/// Summarize and evaluate a finished step
///
/// # Errors
///
/// Returns `StepError::Summary` if the log contains a malformed count.
pub fn complete_step(
    step: &StepConfig,
    exit_code: i32,
    log: &StepLog,
) -> Result<StepReport, StepError> {
    let mut reports = Vec::new();

    let result = match &step.harness {
        Some(kind) => {
            let result = parse_log(kind, &log.stdio)?;
            debug!(step = %step.name, harness = %kind, ?result, "step output summarized");
            reports.push(ReportEntry::new(
                SUMMARY_REPORT,
                tinderbox_print(&step.name, &result),
            ));
            Some(result)
        }
        None => None,
    };

    let evaluation = evaluate_step(&step.name, step.harness.as_ref(), exit_code, log);
    reports.extend(evaluation.reports);
    let build_verdict = step.flags.build_effect(evaluation.verdict);

    info!(
        step = %step.name,
        verdict = %evaluation.verdict,
        build_verdict = %build_verdict,
        "step complete"
    );

    Ok(StepReport {
        name: step.name.clone(),
        verdict: evaluation.verdict,
        build_verdict,
        result,
        reports,
    })
}
