// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! tbox: summarize test-harness logs and decide build step verdicts
//!
//! This binary reads harness logs and saved build records and prints the
//! dashboard summary line, the step verdict, or a collated build log.

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use tbox::commands;
use tbox::config::Config;

fn main() -> ExitCode {
    let config = Config::parse();

    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&config) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(config: &Config) -> anyhow::Result<i32> {
    config.validate().context("Invalid configuration")?;
    debug!(?config, "starting tbox");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = commands::run(config, &mut out)?;
    out.flush()?;
    Ok(code)
}
