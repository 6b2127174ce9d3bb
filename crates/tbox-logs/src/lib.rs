// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! tbox-logs: Build log collation for tbox
//!
//! This library crate loads a finished build record and writes all of its
//! step logs into a single gzip-compressed text file for archiving.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tbox_logs::{BuildRecord, write_collated};
//!
//! let build = BuildRecord::load(Path::new("builds/1234.json")).expect("load build");
//! let path = write_collated(&build, Path::new("/tmp")).expect("collate");
//! println!("wrote {}", path.display());
//! ```

#![warn(missing_docs)]

pub mod build;
pub mod collate;
pub mod error;

pub use build::{BuildRecord, Change, LogRecord, StepOutcome, StepRecord};
pub use collate::{collate, collated_file_name, format_interval, write_collated};
pub use error::LogsError;
