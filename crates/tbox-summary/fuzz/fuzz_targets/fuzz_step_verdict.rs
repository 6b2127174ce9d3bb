// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Fuzz target for the step verdict policy

#![no_main]

use libfuzzer_sys::fuzz_target;

use tbox_summary::{HarnessKind, StepLog, Verdict, evaluate_step};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let exit_code = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    if let Ok(input) = std::str::from_utf8(&data[4..]) {
        let (headers, stdio) = input.split_once('\0').unwrap_or(("", input));
        let log = StepLog::new(stdio).with_headers(headers.lines());
        let eval = evaluate_step("fuzz", Some(&HarnessKind::Reftest), exit_code, &log);
        assert_ne!(eval.verdict, Verdict::Failure);
    }
});
