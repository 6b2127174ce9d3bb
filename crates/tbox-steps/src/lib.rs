// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! tbox-steps: Test step records for tbox
//!
//! This library crate describes build steps as plain values and turns a
//! finished step's captured output into the report the build host displays.
//!
//! # Example
//!
//! ```
//! use tbox_steps::{builders, complete_step};
//! use tbox_summary::{StepLog, Verdict};
//!
//! let step = builders::check("check");
//! let report = complete_step(&step, 0, &StepLog::new("TEST-PASS | a\n")).unwrap();
//! assert_eq!(report.verdict, Verdict::Success);
//! assert_eq!(report.summary_line(), Some("TinderboxPrint: check<br/>1/0\n"));
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod builders;
pub mod error;
pub mod step;

pub use adapter::{StepReport, complete_step};
pub use error::StepError;
pub use step::{StepConfig, StepFlags, render_properties};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::adapter::{StepReport, complete_step};
    pub use crate::builders;
    pub use crate::error::StepError;
    pub use crate::step::{StepConfig, StepFlags};
}
