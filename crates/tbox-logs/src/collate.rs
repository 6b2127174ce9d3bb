// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Build log collation
//!
//! Writes every step's logs of a finished build into one gzip-compressed
//! text file, each step framed by `Started`/`Finished` banners carrying its
//! result and elapsed time.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::build::{BuildRecord, StepRecord};
use crate::error::LogsError;

const NOT_STARTED: &str = "not started";

/// Format an interval the way the build host does: `1 hrs, 2 mins, 3 secs`
#[must_use]
pub fn format_interval(interval: TimeDelta) -> String {
    let mut secs = interval.num_seconds().max(0);
    let mut parts = Vec::new();
    if secs > 3600 {
        parts.push(format!("{} hrs", secs / 3600));
        secs %= 3600;
    }
    if secs > 60 {
        parts.push(format!("{} mins", secs / 60));
        secs %= 60;
    }
    parts.push(format!("{secs} secs"));
    parts.join(", ")
}

/// File name of the compressed collated log for a build
#[must_use]
pub fn collated_file_name(builder: &str, number: u64) -> String {
    format!("{builder}-build{number}.txt.gz")
}

/// The banner text for a step: its status words, result and elapsed time
#[must_use]
pub fn step_banner(step: &StepRecord) -> String {
    let elapsed = step
        .elapsed()
        .map_or_else(|| NOT_STARTED.to_string(), format_interval);
    let results = step
        .results
        .map_or_else(|| NOT_STARTED.to_string(), |r| r.to_string());
    format!(
        "{} (results: {results}, elapsed: {elapsed})",
        step.text.join(" ")
    )
}

/// Write the collated log for a build
///
/// # Errors
///
/// Returns `LogsError::Io` if writing fails.
pub fn collate<W: Write>(build: &BuildRecord, mut out: W) -> Result<(), LogsError> {
    for step in &build.steps {
        let banner = step_banner(step);
        writeln!(out, "========= Started {banner} ==========")?;
        for log in &step.logs {
            out.write_all(log.text.as_bytes())?;
            if !log.text.ends_with('\n') {
                out.write_all(b"\n")?;
            }
        }
        writeln!(out, "======== Finished {banner} ========")?;
        writeln!(out)?;
        debug!(step = %banner, logs = step.logs.len(), "collated step");
    }
    out.flush()?;
    Ok(())
}

/// Collate a build into `<dir>/<builder>-build<number>.txt.gz`
///
/// # Errors
///
/// Returns `LogsError::Io` if the file cannot be created or written.
pub fn write_collated(build: &BuildRecord, dir: &Path) -> Result<PathBuf, LogsError> {
    let path = dir.join(collated_file_name(&build.builder, build.number));
    let file = File::create(&path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    collate(build, &mut encoder)?;
    encoder.finish()?.flush()?;
    info!(path = %path.display(), steps = build.steps.len(), "wrote collated build log");
    Ok(path)
}
