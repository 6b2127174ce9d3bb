// Copyright (c) 2026 - present tbox contributors
// SPDX-License-Identifier: MIT

//! Constructors for the test steps of a unit-test build
//!
//! Each constructor returns a [`StepConfig`] with the command, environment
//! and harness grammar of one kind of test run. A leak threshold only changes
//! the command line or environment handed to the harness; it never changes
//! how the output is parsed.

use std::collections::BTreeMap;

use tbox_summary::{HarnessKind, MochitestVariant};

use crate::step::{StepConfig, StepFlags};

/// Environment variable the in-tree test targets read extra harness flags from
pub const EXTRA_TEST_ARGS: &str = "EXTRA_TEST_ARGS";

const WARN_ON_FAILURE: StepFlags = StepFlags {
    halt_on_failure: false,
    flunk_on_failure: false,
    warn_on_failure: true,
    warn_on_warnings: false,
};

const WARN_ON_ANY: StepFlags = StepFlags {
    halt_on_failure: false,
    flunk_on_failure: false,
    warn_on_failure: true,
    warn_on_warnings: true,
};

fn leak_threshold_arg(threshold: Option<u32>) -> Option<String> {
    // A zero threshold means "use the harness default"
    threshold
        .filter(|t| *t > 0)
        .map(|t| format!("--leak-threshold={t}"))
}

fn test_step(test_name: &str, command: Vec<String>, harness: HarnessKind) -> StepConfig {
    let running = format!("{test_name} test");
    let done = format!("{running} complete");
    StepConfig::new(test_name, command)
        .with_harness(harness)
        .with_description(&running, &done)
}

/// `make check` style unit tests
///
/// The `check` target runs recursively with `-k` so one failing directory
/// does not hide the rest; any other name runs its own make target.
#[must_use]
pub fn check(test_name: &str) -> StepConfig {
    let command = if test_name == "check" {
        vec!["make".to_string(), "-k".to_string(), test_name.to_string()]
    } else {
        vec!["make".to_string(), test_name.to_string()]
    };
    test_step(test_name, command, HarnessKind::TUnit).with_flags(WARN_ON_FAILURE)
}

/// Reftest-family suite run through its make target
#[must_use]
pub fn reftest(
    test_name: &str,
    leak_threshold: Option<u32>,
    env: BTreeMap<String, String>,
) -> StepConfig {
    let mut step = test_step(
        test_name,
        vec!["make".to_string(), test_name.to_string()],
        HarnessKind::Reftest,
    )
    .with_env(env)
    .with_flags(WARN_ON_FAILURE);
    if let Some(arg) = leak_threshold_arg(leak_threshold) {
        step.env.insert(EXTRA_TEST_ARGS.to_string(), arg);
    }
    step
}

/// Mochitest suite run through its make target
///
/// The variant is taken from the `mochitest-<variant>` test name.
#[must_use]
pub fn mochitest(
    test_name: &str,
    leak_threshold: Option<u32>,
    env: BTreeMap<String, String>,
) -> StepConfig {
    let variant = test_name
        .strip_prefix("mochitest-")
        .map_or(MochitestVariant::Plain, MochitestVariant::from_name);
    let mut step = test_step(
        test_name,
        vec!["make".to_string(), test_name.to_string()],
        HarnessKind::Mochitest(variant),
    )
    .with_env(env)
    .with_flags(WARN_ON_FAILURE);
    if let Some(arg) = leak_threshold_arg(leak_threshold) {
        step.env.insert(EXTRA_TEST_ARGS.to_string(), arg);
    }
    step
}

/// Mochitests run from a packaged test archive
#[must_use]
pub fn packaged_mochitest(
    variant: MochitestVariant,
    symbols_path: Option<&str>,
    leak_threshold: Option<u32>,
) -> StepConfig {
    let name = variant.suite_name();
    let mut command: Vec<String> = [
        "python",
        "mochitest/runtests.py",
        "--appname=%(exepath)s",
        "--utility-path=bin",
        "--extra-profile-file=bin/plugins",
        "--certificate-path=certs",
        "--autorun",
        "--close-when-done",
        "--console-level=INFO",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    if let Some(path) = symbols_path {
        command.push(format!("--symbols-path={path}"));
    }
    command.extend(leak_threshold_arg(leak_threshold));
    if variant != MochitestVariant::Plain {
        command.push(format!("--{}", variant.as_str()));
    }

    StepConfig::new(&name, command)
        .with_harness(HarnessKind::Mochitest(variant))
        .with_flags(WARN_ON_ANY)
}

/// Reftests or crashtests run from a packaged test archive
#[must_use]
pub fn packaged_reftest(
    crashtest: bool,
    symbols_path: Option<&str>,
    leak_threshold: Option<u32>,
) -> StepConfig {
    let name = if crashtest { "crashtest" } else { "reftest" };
    let mut command = vec![
        "python".to_string(),
        "reftest/runreftest.py".to_string(),
        "--appname=%(exepath)s".to_string(),
    ];
    if let Some(path) = symbols_path {
        command.push(format!("--symbols-path={path}"));
    }
    command.extend(leak_threshold_arg(leak_threshold));
    command.push(if crashtest {
        "reftest/tests/testing/crashtest/crashtests.list".to_string()
    } else {
        "reftest/tests/layout/reftests/reftest.list".to_string()
    });

    StepConfig::new(name, command)
        .with_harness(HarnessKind::Reftest)
        .with_flags(WARN_ON_ANY)
}

/// xpcshell unit tests run from a packaged test archive
#[must_use]
pub fn packaged_xpcshell() -> StepConfig {
    let script = [
        "cp bin/xpcshell %(exedir)s",
        "cp -R bin/components/* %(exedir)s/components/",
        "cp -R bin/plugins/* %(exedir)s/plugins/",
        "python -u xpcshell/runxpcshelltests.py \
         --manifest=xpcshell/tests/all-test-dirs.list %(exedir)s/xpcshell",
    ]
    .join(" && ");
    StepConfig::new("xpcshell", ["bash".to_string(), "-c".to_string(), script])
        .with_harness(HarnessKind::TUnit)
        .with_flags(WARN_ON_ANY)
}

/// Package the build
#[must_use]
pub fn package() -> StepConfig {
    StepConfig::new("package", ["make"])
        .with_description("packaging", "package")
        .with_flags(WARN_ON_FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_check_commands() {
        assert_eq!(check("check").command, vec!["make", "-k", "check"]);
        assert_eq!(check("xpcshell-tests").command, vec!["make", "xpcshell-tests"]);
        assert_eq!(check("check").harness, Some(HarnessKind::TUnit));
        assert_eq!(check("check").describe(false), "check test");
        assert_eq!(check("check").describe(true), "check test complete");
    }

    #[test]
    fn test_reftest_leak_threshold_goes_to_env() {
        let step = reftest("reftest", Some(484), BTreeMap::new());
        assert_eq!(step.command, vec!["make", "reftest"]);
        assert_eq!(
            step.env.get(EXTRA_TEST_ARGS).map(String::as_str),
            Some("--leak-threshold=484")
        );
        assert!(!reftest("reftest", Some(0), BTreeMap::new()).env.contains_key(EXTRA_TEST_ARGS));
    }

    #[test]
    fn test_caller_env_is_copied() {
        let env = BTreeMap::from([("DISPLAY".to_string(), ":2".to_string())]);
        let step = mochitest("mochitest-chrome", Some(10), env.clone());
        assert_eq!(env.len(), 1);
        assert_eq!(step.env.len(), 2);
        assert_eq!(
            step.harness,
            Some(HarnessKind::Mochitest(MochitestVariant::Chrome))
        );
    }

    #[test]
    fn test_packaged_mochitest_command() {
        let step = packaged_mochitest(MochitestVariant::BrowserChrome, Some("symbols"), Some(7));
        assert_eq!(step.name, "mochitest-browser-chrome");
        let tail: Vec<&str> = step.command.iter().rev().take(3).rev().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["--symbols-path=symbols", "--leak-threshold=7", "--browser-chrome"]
        );
        assert!(step.flags.warn_on_warnings);
    }

    #[test]
    fn test_packaged_plain_mochitest_has_no_variant_flag() {
        let step = packaged_mochitest(MochitestVariant::Plain, None, None);
        assert_eq!(step.command.last().map(String::as_str), Some("--console-level=INFO"));
    }

    #[test]
    fn test_packaged_reftest_manifest_is_last() {
        let crash = packaged_reftest(true, None, Some(100));
        assert_eq!(crash.name, "crashtest");
        assert_eq!(
            crash.command.last().map(String::as_str),
            Some("reftest/tests/testing/crashtest/crashtests.list")
        );
        let reftest = packaged_reftest(false, None, None);
        assert_eq!(reftest.command.len(), 4);
    }

    #[test]
    fn test_packaged_xpcshell_script() {
        let step = packaged_xpcshell();
        assert_eq!(step.command[0], "bash");
        assert_eq!(step.command[1], "-c");
        assert!(step.command[2].starts_with("cp bin/xpcshell %(exedir)s && "));
        assert!(step.command[2].ends_with("%(exedir)s/xpcshell"));
    }

    #[test]
    fn test_package_has_no_harness() {
        let step = package();
        assert_eq!(step.harness, None);
        assert_eq!(step.describe(false), "packaging");
    }
}
