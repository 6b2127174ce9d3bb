// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Error types for tbox-summary

use thiserror::Error;

/// Errors that can occur while summarizing a step log
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A count field held text that is not a valid integer
    #[error("Invalid count on line {line_number}: {reason} (line: {line:?})")]
    InvalidCount {
        /// 1-based line number within the scanned log
        line_number: usize,
        /// The offending log line
        line: String,
        /// Why the count could not be parsed
        reason: String,
    },

    /// Error reading a step log
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SummaryError {
    pub(crate) fn invalid_count(line: &str, reason: impl ToString) -> Self {
        // The line number is filled in by the streaming parser
        Self::InvalidCount {
            line_number: 0,
            line: line.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn at_line(self, number: usize) -> Self {
        match self {
            Self::InvalidCount { line, reason, .. } => Self::InvalidCount {
                line_number: number,
                line,
                reason,
            },
            other => other,
        }
    }
}
