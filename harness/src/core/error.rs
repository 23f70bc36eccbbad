//! # Common Tests Error Types
//!
//! File: harness/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The harness has two failure regimes. Problems discovered while *configuring*
//! a run (an empty subject, a subject we cannot query for its version, a
//! malformed config file) are returned as values so the suite bootstrap can
//! abort with a clear message. Problems discovered while *asserting* (wrong
//! exit code, timeout, content mismatch) are panics that fail the current test
//! and never reach this module.
//!
//! ## Architecture
//!
//! - `HarnessError`: A `thiserror` enum covering every configuration-time failure.
//! - `Result<T>`: An alias for `anyhow::Result<T>` so callers can attach context.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use common_tests::core::error::HarnessError;
//! use common_tests::option::TestOption;
//!
//! match TestOption::new(Vec::<String>::new(), vec![]) {
//!     Err(HarnessError::MissingSubject) => eprintln!("set COMMON_TESTS_SUBJECT"),
//!     Err(e) => eprintln!("{e}"),
//!     Ok(_) => unreachable!(),
//! }
//! ```
//!
use thiserror::Error;

/// Configuration-time failures of the harness.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("missing subject")]
    MissingSubject,

    #[error("unsupported subject {name}")]
    UnsupportedSubject { name: String },

    #[error("failed to parse nerdctl version from: {output}")]
    VersionParse { output: String },

    #[error("invalid nerdctl version '{value}', expected a MAJOR.MINOR.PATCH pattern such as 2.0.2 or 1.x.x")]
    InvalidNerdctlVersion { value: String },

    #[error("failed to run {subject} to query its version: {source}")]
    VersionQuery {
        subject: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result using anyhow::Error so context can be layered on.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(HarnessError::MissingSubject.to_string(), "missing subject");

        let unsupported = HarnessError::UnsupportedSubject {
            name: "podman".into(),
        };
        assert_eq!(unsupported.to_string(), "unsupported subject podman");

        let parse = HarnessError::VersionParse {
            output: "garbage".into(),
        };
        assert_eq!(
            parse.to_string(),
            "failed to parse nerdctl version from: garbage"
        );

        let config = HarnessError::Config("subject must not be empty".into());
        assert_eq!(
            config.to_string(),
            "Configuration error: subject must not be empty"
        );
    }

    #[test]
    fn test_version_query_keeps_source() {
        let err = HarnessError::VersionQuery {
            subject: "finch".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("no such file"));
    }
}
