// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Error types for tbox-steps

use thiserror::Error;

/// Errors that can occur while preparing or completing a step
#[derive(Debug, Error)]
pub enum StepError {
    /// Error summarizing the step output
    #[error("Summary error: {0}")]
    Summary(#[from] tbox_summary::SummaryError),

    /// A command placeholder named a property the build does not have
    #[error("Missing build property: {property}")]
    MissingProperty {
        /// The property name inside `%(...)s`
        property: String,
    },

    /// A `%(` placeholder was never closed with `)s`
    #[error("Unterminated property placeholder in {text:?}")]
    UnterminatedPlaceholder {
        /// The command argument containing the placeholder
        text: String,
    },
}
