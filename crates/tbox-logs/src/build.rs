// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Finished build records
//!
//! A build record is the host's saved state for one finished build: its
//! properties, the changes it built, and every step with its logs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tbox_summary::Verdict;

use crate::error::LogsError;

/// Final result recorded by the host for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    /// Step succeeded
    Success,
    /// Step finished with warnings
    Warnings,
    /// Step failed
    Failure,
    /// Step was skipped
    Skipped,
    /// Step raised an exception in the host
    Exception,
}

impl StepOutcome {
    /// Numeric result code used in collated logs
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Warnings => 1,
            Self::Failure => 2,
            Self::Skipped => 3,
            Self::Exception => 4,
        }
    }
}

impl From<Verdict> for StepOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Success => Self::Success,
            Verdict::Warning => Self::Warnings,
            Verdict::Failure => Self::Failure,
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One named log captured for a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Log name (`stdio`, `summary`, ...)
    pub name: String,
    /// Log contents, including header-channel text
    pub text: String,
}

/// One step of a finished build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Status words shown for the step, joined with spaces
    pub text: Vec<String>,
    /// When the step started
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the step finished
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Final step result, absent if the step never ran
    #[serde(default)]
    pub results: Option<StepOutcome>,
    /// Logs in capture order
    #[serde(default)]
    pub logs: Vec<LogRecord>,
}

impl StepRecord {
    /// Wall-clock time the step ran, if it both started and finished
    #[must_use]
    pub fn elapsed(&self) -> Option<TimeDelta> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// A change included in the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Author of the change
    pub who: String,
    /// Revision of the change, if known
    #[serde(default)]
    pub revision: Option<String>,
}

/// A finished build as saved by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Builder name
    pub builder: String,
    /// Build number on that builder
    pub number: u64,
    /// Build properties
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    /// Changes built
    #[serde(default)]
    pub changes: Vec<Change>,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

impl BuildRecord {
    /// Parse a build record from JSON
    ///
    /// # Errors
    ///
    /// Returns `LogsError::JsonParse` if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, LogsError> {
        serde_json::from_str(json).map_err(LogsError::from)
    }

    /// Load a build record from a file
    ///
    /// # Errors
    ///
    /// Returns `LogsError::BuildNotFound` if the file does not exist, or an
    /// IO/JSON error if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, LogsError> {
        if !path.exists() {
            return Err(LogsError::BuildNotFound {
                path: path.display().to_string(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// A string-valued build property
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }

    /// The build's author: the `who` property, else the first change's author
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.property("who")
            .or_else(|| self.changes.first().map(|c| c.who.as_str()))
    }

    /// The `buildid` property
    #[must_use]
    pub fn build_id(&self) -> Option<&str> {
        self.property("buildid")
    }

    /// The first 12 characters of the `revision` property
    #[must_use]
    pub fn short_revision(&self) -> Option<&str> {
        self.property("revision")
            .map(|rev| rev.get(..12).unwrap_or(rev))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn sample_build() -> BuildRecord {
        BuildRecord::from_json(
            r#"{
                "builder": "mozilla-central-linux-unittest",
                "number": 1234,
                "properties": {
                    "buildid": "20260117023306",
                    "revision": "1945ab9c752534e733c38ba0109dc3b741f0a6eb",
                    "slavename": "moz2-linux-slave07"
                },
                "changes": [{"who": "dev@example.com"}],
                "steps": []
            }"#,
        )
        .expect("Should parse")
    }

    #[test]
    fn test_properties() {
        let build = sample_build();
        assert_eq!(build.build_id(), Some("20260117023306"));
        assert_eq!(build.short_revision(), Some("1945ab9c7525"));
        assert_eq!(build.property("missing"), None);
    }

    #[test]
    fn test_author_falls_back_to_changes() {
        let mut build = sample_build();
        assert_eq!(build.author(), Some("dev@example.com"));

        build
            .properties
            .insert("who".to_string(), Value::String("try@example.com".to_string()));
        assert_eq!(build.author(), Some("try@example.com"));

        build.properties.remove("who");
        build.changes.clear();
        assert_eq!(build.author(), None);
    }

    #[test]
    fn test_short_revision_handles_short_input() {
        let mut build = sample_build();
        build
            .properties
            .insert("revision".to_string(), Value::String("abc".to_string()));
        assert_eq!(build.short_revision(), Some("abc"));
    }

    #[test]
    fn test_step_elapsed() {
        let start = Utc.with_ymd_and_hms(2026, 1, 17, 2, 0, 0).unwrap();
        let step = StepRecord {
            text: vec!["reftest".to_string()],
            started_at: Some(start),
            finished_at: Some(start + TimeDelta::seconds(95)),
            results: Some(StepOutcome::Success),
            logs: Vec::new(),
        };
        assert_eq!(step.elapsed(), Some(TimeDelta::seconds(95)));
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(StepOutcome::from(Verdict::Warning).to_string(), "1");
        assert_eq!(StepOutcome::Exception.code(), 4);
    }

    #[test]
    fn test_invalid_json() {
        assert!(BuildRecord::from_json("not json").is_err());
    }
}
