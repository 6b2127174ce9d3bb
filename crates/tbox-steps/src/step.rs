// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Step records
//!
//! A step is a plain value describing one command the build host runs:
//! its name, argv, environment, and the harness grammar its output follows.
//! Steps are built once and passed by value; nothing is shared between them.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tbox_summary::{HarnessKind, Verdict};

use crate::error::StepError;

/// How a step's verdict affects the rest of the build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFlags {
    /// Stop the build when this step fails; does not change the build result
    pub halt_on_failure: bool,
    /// Fail the build when this step fails
    pub flunk_on_failure: bool,
    /// Mark the build as warnings when this step fails
    pub warn_on_failure: bool,
    /// Mark the build as warnings when this step warns
    pub warn_on_warnings: bool,
}

impl StepFlags {
    /// The verdict this step contributes to the overall build
    ///
    /// Only `flunk_on_failure` and `warn_on_failure` act on a failed step,
    /// and only `warn_on_warnings` acts on a warning.
    #[must_use]
    pub fn build_effect(&self, verdict: Verdict) -> Verdict {
        match verdict {
            Verdict::Success => Verdict::Success,
            Verdict::Warning if self.warn_on_warnings => Verdict::Warning,
            Verdict::Warning => Verdict::Success,
            Verdict::Failure if self.flunk_on_failure => Verdict::Failure,
            Verdict::Failure if self.warn_on_failure => Verdict::Warning,
            Verdict::Failure => Verdict::Success,
        }
    }

    /// True when a step with this verdict stops the build
    #[must_use]
    pub fn halts(&self, verdict: Verdict) -> bool {
        self.halt_on_failure && verdict == Verdict::Failure
    }
}

/// A build step the host will run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Step name, also used as the summary line title
    pub name: String,
    /// Command argv; may contain `%(property)s` placeholders
    pub command: Vec<String>,
    /// Extra environment for the command
    pub env: BTreeMap<String, String>,
    /// Harness grammar of the step's output, if it runs tests
    pub harness: Option<HarnessKind>,
    /// Working directory relative to the build directory
    pub workdir: Option<String>,
    /// Maximum time without output before the host kills the command
    #[serde(with = "duration_secs", default)]
    pub timeout: Option<Duration>,
    /// Text shown while the step runs
    pub description: String,
    /// Text shown once the step has finished
    pub description_done: String,
    /// Build-level effect of this step's verdict
    pub flags: StepFlags,
}

impl StepConfig {
    /// Create a step with no environment, harness or flags
    #[must_use]
    pub fn new<I, S>(name: &str, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            command: command.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            harness: None,
            workdir: None,
            timeout: None,
            description: name.to_string(),
            description_done: name.to_string(),
            flags: StepFlags::default(),
        }
    }

    /// Set the harness grammar used to summarize the output
    #[must_use]
    pub fn with_harness(mut self, harness: HarnessKind) -> Self {
        self.harness = Some(harness);
        self
    }

    /// Replace the step environment
    #[must_use]
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Add one environment variable
    #[must_use]
    pub fn with_env_var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.insert(key.to_string(), value.into());
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn with_workdir(mut self, workdir: &str) -> Self {
        self.workdir = Some(workdir.to_string());
        self
    }

    /// Set the no-output timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the running and finished descriptions
    #[must_use]
    pub fn with_description(mut self, running: &str, done: &str) -> Self {
        self.description = running.to_string();
        self.description_done = done.to_string();
        self
    }

    /// Set the build-effect flags
    #[must_use]
    pub fn with_flags(mut self, flags: StepFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Describe the step for the dashboard
    #[must_use]
    pub fn describe(&self, done: bool) -> &str {
        if done {
            &self.description_done
        } else {
            &self.description
        }
    }

    /// Resolve `%(name)s` placeholders in the command from build properties
    ///
    /// # Errors
    ///
    /// Returns `StepError::MissingProperty` when a placeholder has no value and
    /// `StepError::UnterminatedPlaceholder` when a `%(` has no closing `)s`.
    pub fn render_command(
        &self,
        properties: &BTreeMap<String, String>,
    ) -> Result<Vec<String>, StepError> {
        self.command
            .iter()
            .map(|arg| render_properties(arg, properties))
            .collect()
    }
}

/// Substitute `%(name)s` placeholders in one string
///
/// # Errors
///
/// Returns an error for unknown properties or unterminated placeholders.
pub fn render_properties(
    text: &str,
    properties: &BTreeMap<String, String>,
) -> Result<String, StepError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("%(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find(")s")
            .ok_or_else(|| StepError::UnterminatedPlaceholder {
                text: text.to_string(),
            })?;
        let key = &after[..end];
        let value = properties
            .get(key)
            .ok_or_else(|| StepError::MissingProperty {
                property: key.to_string(),
            })?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}
