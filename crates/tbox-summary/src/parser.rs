// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Harness log parsing
//!
//! Each harness family prints its results with its own line grammar:
//! - reftest prints one `REFTEST INFO | <category>: <n> (` line per category
//! - mochitest prints `INFO Passed:` style totals (or `Pass:` for browser-chrome)
//! - unit-test runners print one `TEST-PASS` / `TEST-UNEXPECTED-*` line per test
//!
//! Reftest and mochitest totals are last-line-wins: a later summary line for
//! the same category replaces an earlier one. Unit-test counts accumulate.
//!
//! # Example
//!
//! ```
//! use tbox_summary::parser::{parse_log, StreamingParser};
//! use tbox_summary::HarnessKind;
//!
//! let log = "REFTEST INFO | Successful: 10 (10 pass)\nREFTEST INFO | Unexpected: 2 (2 fail)\n";
//! let result = parse_log(&HarnessKind::Reftest, log).unwrap();
//! assert_eq!(result.passed, 10);
//!
//! // Or feed lines as they arrive
//! let mut parser = StreamingParser::new(&HarnessKind::TUnit);
//! parser.process_line("TEST-PASS | test_a.js").unwrap();
//! assert_eq!(parser.finish().passed, 1);
//! ```

use std::io::BufRead;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{debug, trace};

use crate::error::SummaryError;
use crate::harness::{HarnessKind, HarnessResult, LeakStatus, MochitestVariant, UNDETERMINED};

static REFTEST_INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^REFTEST INFO \| (Successful|Unexpected|Known problems): (\d+) \(")
        .expect("reftest info pattern is valid")
});

static HARNESS_ERRORS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^TEST-UNEXPECTED-FAIL \| .* \| (",
        r"Browser crashed \(minidump found\)",
        r"|missing output line for total leaks!",
        r"|negative leaks caught!",
        r"|leaked \d+ bytes during test execution)",
    ))
    .expect("harness error pattern is valid")
});

static LEAK_ERRORS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^TEST-UNEXPECTED-FAIL \| .* \| (",
        r"missing output line for total leaks!",
        r"|negative leaks caught!",
        r"|leaked \d+ bytes during test execution)",
    ))
    .expect("leak error pattern is valid")
});

const CRASH_PHRASE: &str = "Browser crashed (minidump found)";
const MISSING_LEAK_TOTAL_PHRASE: &str = "missing output line for total leaks!";

/// Substring marking a passing unit test
pub const TEST_PASS: &str = "TEST-PASS";
/// Substring marking any unexpected unit-test outcome
pub const TEST_UNEXPECTED: &str = "TEST-UNEXPECTED-";

// ============================================================================
// Shared scanner contract
// ============================================================================

/// A line-oriented scanner for one harness grammar
pub trait LineScanner {
    /// Feed the next log line, in emission order
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidCount` if a count field is not an integer.
    fn scan_line(&mut self, line: &str) -> Result<(), SummaryError>;

    /// Consume the scanner and return the reduced counts
    fn finish(self) -> HarnessResult
    where
        Self: Sized;
}

/// Apply a harness-error line to the crash/leak flags
///
/// Returns `true` when the line matched the pattern.
fn apply_harness_error(
    pattern: &Regex,
    line: &str,
    crashed: &mut bool,
    leaked: &mut LeakStatus,
) -> bool {
    let Some(caps) = pattern.captures(line) else {
        return false;
    };
    match &caps[1] {
        CRASH_PHRASE => {
            debug!(line, "harness reported a crash");
            *crashed = true;
        }
        MISSING_LEAK_TOTAL_PHRASE => {
            debug!(line, "leak detector failed");
            *leaked = LeakStatus::CheckFailed;
        }
        _ => {
            debug!(line, "harness reported a leak");
            *leaked = LeakStatus::Leaked;
        }
    }
    true
}

fn parse_count(line: &str, text: &str) -> Result<i64, SummaryError> {
    text.parse::<i64>()
        .map_err(|e| SummaryError::invalid_count(line, format!("{text:?}: {e}")))
}

// ============================================================================
// Reftest
// ============================================================================

/// Scanner for reftest-family logs
#[derive(Debug, Clone)]
pub struct ReftestScanner {
    successful: i64,
    unexpected: i64,
    known_problems: i64,
    crashed: bool,
    leaked: LeakStatus,
}

impl ReftestScanner {
    /// Create a scanner with every count undetermined
    #[must_use]
    pub fn new() -> Self {
        Self {
            successful: UNDETERMINED,
            unexpected: UNDETERMINED,
            known_problems: UNDETERMINED,
            crashed: false,
            leaked: LeakStatus::Clean,
        }
    }
}

impl Default for ReftestScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LineScanner for ReftestScanner {
    fn scan_line(&mut self, line: &str) -> Result<(), SummaryError> {
        if let Some(caps) = REFTEST_INFO_RE.captures(line) {
            let count = parse_count(line, &caps[2])?;
            let category = &caps[1];
            trace!(category, count, "reftest info line");
            match category {
                "Successful" => self.successful = count,
                "Unexpected" => self.unexpected = count,
                _ => self.known_problems = count,
            }
            return Ok(());
        }
        apply_harness_error(&HARNESS_ERRORS_RE, line, &mut self.crashed, &mut self.leaked);
        Ok(())
    }

    fn finish(self) -> HarnessResult {
        HarnessResult {
            passed: self.successful,
            failed: self.unexpected,
            known_failed: Some(self.known_problems),
            crashed: self.crashed,
            leaked: self.leaked,
        }
    }
}

// ============================================================================
// Mochitest
// ============================================================================

/// The substrings that introduce a mochitest total line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultIdents {
    /// Identifier of the passed-count line
    pub pass: &'static str,
    /// Identifier of the failed-count line
    pub fail: &'static str,
    /// Identifier of the todo-count line
    pub todo: &'static str,
}

impl ResultIdents {
    /// Identifiers printed by the standard mochitest runner
    pub const STANDARD: Self = Self {
        pass: "INFO Passed:",
        fail: "INFO Failed:",
        todo: "INFO Todo:",
    };

    /// Identifiers printed by the browser-chrome runner
    pub const BROWSER_CHROME: Self = Self {
        pass: "Pass:",
        fail: "Fail:",
        todo: "Todo:",
    };

    /// Pick the identifier set for a mochitest variant
    #[must_use]
    pub fn for_variant(variant: &MochitestVariant) -> Self {
        match variant {
            MochitestVariant::BrowserChrome => Self::BROWSER_CHROME,
            _ => Self::STANDARD,
        }
    }
}

/// Scanner for mochitest-family logs
#[derive(Debug, Clone)]
pub struct MochitestScanner {
    idents: ResultIdents,
    passed: i64,
    failed: i64,
    todo: i64,
    crashed: bool,
    leaked: LeakStatus,
}

impl MochitestScanner {
    /// Create a scanner for the given suite variant
    #[must_use]
    pub fn new(variant: &MochitestVariant) -> Self {
        Self {
            idents: ResultIdents::for_variant(variant),
            passed: 0,
            failed: 0,
            todo: 0,
            crashed: false,
            leaked: LeakStatus::Clean,
        }
    }

    /// The identifier set this scanner matches
    #[must_use]
    pub fn idents(&self) -> ResultIdents {
        self.idents
    }

    fn last_token_count(line: &str) -> Result<i64, SummaryError> {
        let token = line
            .split_whitespace()
            .next_back()
            .ok_or_else(|| SummaryError::invalid_count(line, "no count token"))?;
        parse_count(line, token)
    }
}

impl LineScanner for MochitestScanner {
    fn scan_line(&mut self, line: &str) -> Result<(), SummaryError> {
        if line.contains(self.idents.pass) {
            self.passed = Self::last_token_count(line)?;
            trace!(passed = self.passed, "mochitest pass total");
            return Ok(());
        }
        if line.contains(self.idents.fail) {
            self.failed = Self::last_token_count(line)?;
            trace!(failed = self.failed, "mochitest fail total");
            return Ok(());
        }
        if line.contains(self.idents.todo) {
            self.todo = Self::last_token_count(line)?;
            trace!(todo = self.todo, "mochitest todo total");
            return Ok(());
        }
        apply_harness_error(&HARNESS_ERRORS_RE, line, &mut self.crashed, &mut self.leaked);
        Ok(())
    }

    fn finish(self) -> HarnessResult {
        HarnessResult {
            passed: self.passed,
            failed: self.failed,
            known_failed: Some(self.todo),
            crashed: self.crashed,
            leaked: self.leaked,
        }
    }
}

// ============================================================================
// TUnit
// ============================================================================

/// Scanner for unit-test logs that print one line per test
#[derive(Debug, Clone, Default)]
pub struct TUnitScanner {
    passed: i64,
    failed: i64,
    leaked: LeakStatus,
}

impl TUnitScanner {
    /// Create a scanner with zero counts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineScanner for TUnitScanner {
    fn scan_line(&mut self, line: &str) -> Result<(), SummaryError> {
        if line.contains(TEST_PASS) {
            self.passed += 1;
            return Ok(());
        }
        if line.contains(TEST_UNEXPECTED) {
            // Leak-detector lines set the leak state instead of counting as failures
            let mut crashed = false;
            if !apply_harness_error(&LEAK_ERRORS_RE, line, &mut crashed, &mut self.leaked) {
                self.failed += 1;
            }
        }
        Ok(())
    }

    fn finish(self) -> HarnessResult {
        HarnessResult {
            passed: self.passed,
            failed: self.failed,
            known_failed: None,
            crashed: false,
            leaked: self.leaked,
        }
    }
}

// ============================================================================
// Streaming Parser
// ============================================================================

#[derive(Debug, Clone)]
enum Scanner {
    Reftest(ReftestScanner),
    Mochitest(MochitestScanner),
    TUnit(TUnitScanner),
}

/// A streaming parser that dispatches to the scanner for one harness family
#[derive(Debug, Clone)]
pub struct StreamingParser {
    scanner: Scanner,
    lines_seen: usize,
}

impl StreamingParser {
    /// Create a parser for the given harness
    #[must_use]
    pub fn new(kind: &HarnessKind) -> Self {
        let scanner = match kind {
            HarnessKind::Reftest => Scanner::Reftest(ReftestScanner::new()),
            HarnessKind::Mochitest(variant) => Scanner::Mochitest(MochitestScanner::new(variant)),
            HarnessKind::TUnit => Scanner::TUnit(TUnitScanner::new()),
        };
        Self {
            scanner,
            lines_seen: 0,
        }
    }

    /// Process a single line of output
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidCount` if a count field is not an integer.
    pub fn process_line(&mut self, line: &str) -> Result<(), SummaryError> {
        self.lines_seen += 1;
        let scanned = match &mut self.scanner {
            Scanner::Reftest(s) => s.scan_line(line),
            Scanner::Mochitest(s) => s.scan_line(line),
            Scanner::TUnit(s) => s.scan_line(line),
        };
        scanned.map_err(|e| e.at_line(self.lines_seen))
    }

    /// Number of lines processed so far
    #[must_use]
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Finalize and return the reduced result
    #[must_use]
    pub fn finish(self) -> HarnessResult {
        let result = match self.scanner {
            Scanner::Reftest(s) => s.finish(),
            Scanner::Mochitest(s) => s.finish(),
            Scanner::TUnit(s) => s.finish(),
        };
        debug!(lines = self.lines_seen, ?result, "harness log parsed");
        result
    }
}

// ============================================================================
// Parsing Functions
// ============================================================================

/// Parse a sequence of log lines for the given harness
///
/// # Errors
///
/// Returns `SummaryError::InvalidCount` if a count field is not an integer.
pub fn parse_lines<I, S>(kind: &HarnessKind, lines: I) -> Result<HarnessResult, SummaryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = StreamingParser::new(kind);
    for line in lines {
        parser.process_line(line.as_ref())?;
    }
    Ok(parser.finish())
}

/// Parse a complete captured log
///
/// # Errors
///
/// Returns `SummaryError::InvalidCount` if a count field is not an integer.
pub fn parse_log(kind: &HarnessKind, log: &str) -> Result<HarnessResult, SummaryError> {
    parse_lines(kind, log.lines())
}

/// Parse a log from a buffered reader
///
/// Lines are split on raw bytes; invalid UTF-8 is replaced with U+FFFD so a
/// garbled line never hides the rest of the log.
///
/// # Errors
///
/// Returns `SummaryError::Io` on read failure or `SummaryError::InvalidCount`
/// if a count field is not an integer.
pub fn parse_reader<R: BufRead>(
    kind: &HarnessKind,
    mut reader: R,
) -> Result<HarnessResult, SummaryError> {
    let mut parser = StreamingParser::new(kind);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        parser.process_line(line.trim_end_matches(['\n', '\r']))?;
    }
    Ok(parser.finish())
}

/// Parse a reftest-family log
///
/// # Errors
///
/// Returns `SummaryError::InvalidCount` if a count overflows.
pub fn parse_reftest<I, S>(lines: I) -> Result<HarnessResult, SummaryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_lines(&HarnessKind::Reftest, lines)
}

/// Parse a mochitest-family log for the given suite variant
///
/// # Errors
///
/// Returns `SummaryError::InvalidCount` if a total line does not end in an integer.
pub fn parse_mochitest<I, S>(
    variant: &MochitestVariant,
    lines: I,
) -> Result<HarnessResult, SummaryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_lines(&HarnessKind::Mochitest(variant.clone()), lines)
}

/// Parse a unit-test log
///
/// # Errors
///
/// Never fails in practice; unit-test logs carry no count fields.
pub fn parse_tunit<I, S>(lines: I) -> Result<HarnessResult, SummaryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_lines(&HarnessKind::TUnit, lines)
}
