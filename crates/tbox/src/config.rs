// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Configuration for the tbox command line
//!
//! This module provides the argument types for every subcommand, the log
//! level selection, and up-front validation of input and output paths.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tbox_summary::{HarnessKind, MochitestVariant};

/// tbox - summarize test-harness logs for the build dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "tbox")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so stdout only carries command output.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

/// Harness family selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    /// reftest / crashtest grammar
    Reftest,
    /// mochitest grammar; the variant comes from the harness name
    Mochitest,
    /// one-line-per-test grammar
    Tunit,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the TinderboxPrint summary line for a harness log
    ///
    /// The log is read from LOG, or from stdin when LOG is omitted.
    ///
    /// Example:
    ///   tbox summarize --harness-name reftest reftest.log
    Summarize {
        /// Harness name shown in the summary line
        #[arg(long)]
        harness_name: String,

        /// Grammar to parse with (derived from the harness name if omitted)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Print the parsed counts as JSON instead of the summary line
        #[arg(long)]
        json: bool,

        /// Log file to read
        log: Option<PathBuf>,
    },

    /// Decide the verdict of a finished step
    ///
    /// Exits 0 for success, 1 for warnings and 2 for failure.
    ///
    /// Example:
    ///   tbox evaluate --harness-name mochitest-plain --exit-code 0 mochitest.log
    Evaluate {
        /// Step (harness) name
        #[arg(long)]
        harness_name: String,

        /// Exit code of the step's command
        #[arg(long, allow_negative_numbers = true)]
        exit_code: i32,

        /// Grammar to check with (derived from the harness name if omitted)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// File holding the host's header-channel lines
        #[arg(long)]
        headers: Option<PathBuf>,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,

        /// Log file to read
        log: Option<PathBuf>,
    },

    /// Write all step logs of a finished build into one file
    Collate {
        /// Build record (JSON) to collate
        build: PathBuf,

        /// Output directory
        ///
        /// Defaults to ~/.local/share/tbox/logs (or platform equivalent).
        #[arg(short, long, env = "TBOX_LOG_DIR")]
        output: Option<PathBuf>,
    },

    /// Print the command line and environment of a test step
    ///
    /// Example:
    ///   tbox command mochitest-chrome --packaged -P exepath=firefox/firefox
    #[command(name = "command")]
    StepCommand {
        /// Step name: check, reftest, crashtest, mochitest-<variant>, xpcshell or package
        step: String,

        /// Use the packaged-test runner instead of the make target
        #[arg(long)]
        packaged: bool,

        /// Leak threshold handed to the harness (0 means the harness default)
        #[arg(long)]
        leak_threshold: Option<u32>,

        /// Symbols path for crash stack processing
        #[arg(long)]
        symbols_path: Option<String>,

        /// Build property used to fill `%(name)s` placeholders (KEY=VALUE)
        #[arg(short = 'P', long = "property", value_parser = parse_property)]
        properties: Vec<(String, String)>,
    },
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

impl KindArg {
    /// Resolve to a harness kind, taking the mochitest variant from `name`
    #[must_use]
    pub fn resolve(self, name: &str) -> HarnessKind {
        match self {
            Self::Reftest => HarnessKind::Reftest,
            Self::Tunit => HarnessKind::TUnit,
            Self::Mochitest => HarnessKind::Mochitest(
                name.strip_prefix("mochitest-")
                    .map_or(MochitestVariant::Plain, MochitestVariant::from_name),
            ),
        }
    }
}

/// Harness kind for a name, honouring an explicit `--kind`
#[must_use]
pub fn harness_kind(name: &str, kind: Option<KindArg>) -> HarnessKind {
    kind.map_or_else(|| HarnessKind::from_test_name(name), |k| k.resolve(name))
}

impl Config {
    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    /// Directory collated logs are written to
    ///
    /// Default location is platform-specific:
    /// - macOS: ~/Library/Application Support/tbox/logs
    /// - Linux: ~/.local/share/tbox/logs
    /// - Windows: %LOCALAPPDATA%\tbox\logs
    #[must_use]
    pub fn log_dir(&self) -> Option<PathBuf> {
        match &self.command {
            Command::Collate { output, .. } => Some(output.clone().unwrap_or_else(|| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("tbox")
                    .join("logs")
            })),
            _ => None,
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input log, header file or build record doesn't exist
    /// - The collation output directory cannot be created
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.command {
            Command::Summarize { log, .. } => check_input(log.as_ref()),
            Command::Evaluate { log, headers, .. } => {
                check_input(log.as_ref())?;
                check_input(headers.as_ref())
            }
            Command::Collate { build, .. } => {
                check_input(Some(build))?;
                if let Some(dir) = self.log_dir() {
                    if dir.exists() && !dir.is_dir() {
                        return Err(ConfigError::OutputNotDirectory(dir));
                    }
                    if !dir.exists() {
                        std::fs::create_dir_all(&dir)
                            .map_err(|e| ConfigError::OutputDirectoryCreateFailed(dir, e))?;
                    }
                }
                Ok(())
            }
            Command::StepCommand { .. } => Ok(()),
        }
    }
}

fn check_input(path: Option<&PathBuf>) -> Result<(), ConfigError> {
    match path {
        Some(path) if !path.is_file() => Err(ConfigError::InputNotFound(path.clone())),
        _ => Ok(()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Output path exists but is not a directory
    #[error("Output path is not a directory: {0}")]
    OutputNotDirectory(PathBuf),

    /// Failed to create the output directory
    #[error("Failed to create output directory {0}: {1}")]
    OutputDirectoryCreateFailed(PathBuf, std::io::Error),
}
