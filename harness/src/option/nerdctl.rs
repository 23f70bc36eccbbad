//! # nerdctl Dialect Detection
//!
//! File: harness/src/option/nerdctl.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Subjects wrap a particular nerdctl release, and several observable behaviors
//! differ between the 1.x and 2.x lines. This module holds the version patterns
//! used to classify a version string and the patterns used to pull a version
//! out of `nerdctl --version` / `finch version` output.
//!
//! Versions are matched by prefix, so qualifiers after the numeric triple
//! (`2.0.2.m`, `1.7.7-rc1`) are tolerated, and `x` stands for "any" in a
//! component (`2.x.x`).
//!
use regex::Regex;
use std::sync::LazyLock;

/// Pattern value for any nerdctl 1.x release.
pub const NERDCTL_1XX: &str = "1.x.x";
/// Pattern value for any nerdctl 2.x release.
pub const NERDCTL_2XX: &str = "2.x.x";
/// Dialect assumed when no version is configured.
pub const DEFAULT_NERDCTL_VERSION: &str = NERDCTL_2XX;

static NERDCTL_1XX_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^1\.[x0-9]+\.[x0-9]+").ok());
static NERDCTL_2XX_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^2\.[x0-9]+\.[x0-9]+").ok());
static ANY_VERSION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[x0-9]+\.[x0-9]+").ok());

/// Matches the output of `nerdctl --version`, e.g. "nerdctl version 2.0.2".
pub(crate) static NERDCTL_VERSION_OUTPUT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"nerdctl\s+version\s+(\S+)").ok());
/// Matches the nerdctl section of `finch version`, e.g. "nerdctl:\n  Version: v2.0.2".
pub(crate) static FINCH_VERSION_OUTPUT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"nerdctl:\s+Version:\s+(\S+)").ok());

fn matches(re: &LazyLock<Option<Regex>>, version: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(version))
}

/// True when `version` belongs to the nerdctl 1.x line.
pub fn is_nerdctl_1xx(version: &str) -> bool {
    matches(&NERDCTL_1XX_RE, version)
}

/// True when `version` belongs to the nerdctl 2.x line.
pub fn is_nerdctl_2xx(version: &str) -> bool {
    matches(&NERDCTL_2XX_RE, version)
}

/// True when `version` starts with a MAJOR.MINOR.PATCH triple (components may be `x`).
pub fn is_valid_version(version: &str) -> bool {
    matches(&ANY_VERSION_RE, version)
}

/// Extracts the first capture group of `re` from `output`.
pub(crate) fn capture_version(re: &LazyLock<Option<Regex>>, output: &str) -> Option<String> {
    re.as_ref()?
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_patterns() {
        assert!(is_nerdctl_1xx("1.7.7"));
        assert!(is_nerdctl_1xx(NERDCTL_1XX));
        assert!(!is_nerdctl_1xx("2.0.2"));
        assert!(is_nerdctl_2xx("2.0.2"));
        assert!(is_nerdctl_2xx("2.0.2.m"));
        assert!(is_nerdctl_2xx(DEFAULT_NERDCTL_VERSION));
        assert!(!is_nerdctl_2xx("v2.0.2"));
        assert!(!is_nerdctl_2xx("12.0.0"));
    }

    #[test]
    fn test_valid_version() {
        assert!(is_valid_version("3.1.0"));
        assert!(is_valid_version("1.x.x"));
        assert!(!is_valid_version("latest"));
        assert!(!is_valid_version("2.0"));
    }

    #[test]
    fn test_capture_nerdctl_output() {
        let out = "nerdctl version 2.0.2\n";
        assert_eq!(
            capture_version(&NERDCTL_VERSION_OUTPUT_RE, out).as_deref(),
            Some("2.0.2")
        );
        assert_eq!(capture_version(&NERDCTL_VERSION_OUTPUT_RE, "nerdctl"), None);
    }

    #[test]
    fn test_capture_finch_output() {
        let out = "Client:\n Version:\tv1.5.0\n\nnerdctl:\n Version:\tv2.0.2\n GitCommit:\tabc\n";
        assert_eq!(
            capture_version(&FINCH_VERSION_OUTPUT_RE, out).as_deref(),
            Some("v2.0.2")
        );
    }
}
