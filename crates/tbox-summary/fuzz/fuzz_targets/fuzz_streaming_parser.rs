// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Fuzz target for the streaming harness parser
//!
//! Feeds arbitrary text line-by-line through every harness grammar.

#![no_main]

use libfuzzer_sys::fuzz_target;

use tbox_summary::{HarnessKind, MochitestVariant, StreamingParser};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for kind in [
            HarnessKind::Reftest,
            HarnessKind::Mochitest(MochitestVariant::Plain),
            HarnessKind::Mochitest(MochitestVariant::BrowserChrome),
            HarnessKind::TUnit,
        ] {
            let mut parser = StreamingParser::new(&kind);

            // Malformed counts return errors; nothing may panic
            for line in input.lines() {
                let _ = parser.process_line(line);
            }

            let result = parser.finish();
            let _ = result.summary_text();
        }
    }
});
