// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! tbox library
//!
//! This module exports the command-line configuration and subcommand
//! execution of tbox for use in integration tests and as a library.

pub mod commands;
pub mod config;
