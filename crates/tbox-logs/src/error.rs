// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Error types for tbox-logs

use thiserror::Error;

/// Errors that can occur while loading or collating build logs
#[derive(Debug, Error)]
pub enum LogsError {
    /// Error parsing a build record
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Error reading a build record or writing the collated log
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No build record at the given path
    #[error("Build record not found: {path}")]
    BuildNotFound {
        /// The path that was searched
        path: String,
    },
}
