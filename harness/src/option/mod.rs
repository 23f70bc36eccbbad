//! # Test Option
//!
//! File: harness/src/option/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A `TestOption` captures *what* is being tested and *how* to invoke it: the
//! subject (program name plus fixed prefix arguments), environment overrides
//! applied to every invocation, and the feature flags that describe dialect
//! differences between subjects.
//!
//! It is built once per suite and shared by reference with every test. The
//! subject never changes after construction; only the environment overrides
//! can be reshaped (`update_env` / `delete_env`) for tests that exercise
//! environment handling.
//!
//! ## Architecture
//!
//! - **`TestOption::new`**: Rejects an empty subject, applies default features,
//!   then applies each `Modifier` in order and validates the result.
//! - **`TestOption::new_cmd`**: Produces a `std::process::Command` for
//!   `subject[0] subject[1..] args..` with the ambient environment overlaid by
//!   the overrides.
//! - **Feature queries**: `supports_env_var_passthrough`, `is_nerdctl_v1`, `is_nerdctl_v2`.
//! - **`get_nerdctl_version`**: Asks a `nerdctl` or `finch` subject for the nerdctl version it wraps.
//!
//! If a test needs more than this (credentials for login tests, say), wrap a
//! `TestOption` in a bigger struct rather than growing this one.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use common_tests::option::{modifier, TestOption};
//!
//! // Subject ["limactl", "shell", "finch", "nerdctl"] invokes
//! // `limactl shell finch nerdctl pull alpine` for args ["pull", "alpine"].
//! let o = TestOption::new(["limactl", "shell", "finch", "nerdctl"], vec![])?;
//! let cmd = o.new_cmd(["pull", "alpine"]);
//! ```
//!
pub mod modifier;
pub mod nerdctl;

use crate::core::error::HarnessError;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

pub use modifier::Modifier;

/// Dialect knobs of the subject, resolved at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    /// Whether the subject forwards host environment variables into containers.
    pub env_var_passthrough: bool,
    /// The nerdctl version (or `N.x.x` pattern) the subject wraps.
    pub nerdctl_version: String,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            env_var_passthrough: true,
            nerdctl_version: nerdctl::DEFAULT_NERDCTL_VERSION.to_string(),
        }
    }
}

/// Identity and environment of the subject under test.
#[derive(Debug, Clone)]
pub struct TestOption {
    subject: Vec<String>,
    env: Vec<String>,
    features: Features,
}

impl TestOption {
    /// Builds an option for `subject`, applying `modifiers` in order.
    ///
    /// `subject` is used as the prefix of every invocation, so it must contain
    /// at least the program name.
    ///
    /// # Errors
    ///
    /// * `HarnessError::MissingSubject` - `subject` is empty.
    /// * `HarnessError::InvalidNerdctlVersion` - a modifier set a version that is not a MAJOR.MINOR.PATCH pattern.
    pub fn new<I, S>(
        subject: I,
        modifiers: impl IntoIterator<Item = Modifier>,
    ) -> Result<Self, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subject: Vec<String> = subject.into_iter().map(Into::into).collect();
        if subject.is_empty() {
            return Err(HarnessError::MissingSubject);
        }

        let mut o = Self {
            subject,
            env: Vec::new(),
            features: Features::default(),
        };
        for modifier in modifiers {
            modifier.modify(&mut o);
        }

        if !nerdctl::is_valid_version(&o.features.nerdctl_version) {
            return Err(HarnessError::InvalidNerdctlVersion {
                value: o.features.nerdctl_version,
            });
        }
        debug!(subject = ?o.subject, features = ?o.features, "Initialized test option");
        Ok(o)
    }

    /// Creates a command for `subject[0]` with `subject[1..]` followed by `args`.
    ///
    /// The command's environment is set explicitly: the ambient process
    /// environment with the overrides applied last.
    pub fn new_cmd<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.subject[0]);
        cmd.args(&self.subject[1..]);
        cmd.args(args);
        cmd.env_clear();
        cmd.envs(self.environment());
        cmd
    }

    /// Returns the environment an invocation runs with.
    pub fn environment(&self) -> BTreeMap<OsString, OsString> {
        let mut merged: BTreeMap<OsString, OsString> = std::env::vars_os().collect();
        for entry in &self.env {
            let (key, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
            merged.insert(key.into(), value.into());
        }
        merged
    }

    /// Sets the override for `key`, replacing an existing one in place.
    pub fn update_env(&mut self, key: &str, value: &str) {
        let entry = format!("{key}={value}");
        match self.env_index(key) {
            Some(i) => self.env[i] = entry,
            None => self.env.push(entry),
        }
    }

    /// Removes the override for `key`; a missing key is a no-op.
    pub fn delete_env(&mut self, key: &str) {
        if let Some(i) = self.env_index(key) {
            self.env.remove(i);
        }
    }

    fn env_index(&self, key: &str) -> Option<usize> {
        self.env
            .iter()
            .position(|entry| entry.split('=').next() == Some(key))
    }

    /// The overrides in `KEY=VALUE` form, in insertion order.
    pub fn env_overrides(&self) -> &[String] {
        &self.env
    }

    /// The subject prefix.
    pub fn subject(&self) -> &[String] {
        &self.subject
    }

    /// The resolved feature flags.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Whether the subject forwards host environment variables into containers.
    pub fn supports_env_var_passthrough(&self) -> bool {
        self.features.env_var_passthrough
    }

    /// The configured nerdctl version or pattern, e.g. "2.x.x".
    pub fn nerdctl_version(&self) -> &str {
        &self.features.nerdctl_version
    }

    /// True when the configured nerdctl version is a 1.x release.
    pub fn is_nerdctl_v1(&self) -> bool {
        nerdctl::is_nerdctl_1xx(&self.features.nerdctl_version)
    }

    /// True when the configured nerdctl version is a 2.x release.
    pub fn is_nerdctl_v2(&self) -> bool {
        nerdctl::is_nerdctl_2xx(&self.features.nerdctl_version)
    }

    /// Queries the subject for the nerdctl version it wraps.
    ///
    /// `nerdctl` is asked with `--version`, `finch` with `version`. Only the
    /// program (not the prefix arguments) is invoked, matched by file name so
    /// absolute paths work.
    ///
    /// # Errors
    ///
    /// * `HarnessError::UnsupportedSubject` - the program is neither `nerdctl` nor `finch`.
    /// * `HarnessError::VersionQuery` - the program could not be run or exited non-zero.
    /// * `HarnessError::VersionParse` - no version could be found in the output.
    pub fn get_nerdctl_version(&self) -> Result<String, HarnessError> {
        let program = &self.subject[0];
        let name = Path::new(program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(program);

        let (arg, pattern) = match name {
            "nerdctl" => ("--version", &nerdctl::NERDCTL_VERSION_OUTPUT_RE),
            "finch" => ("version", &nerdctl::FINCH_VERSION_OUTPUT_RE),
            _ => {
                return Err(HarnessError::UnsupportedSubject {
                    name: program.clone(),
                })
            }
        };

        let output = Command::new(program).arg(arg).output().map_err(|source| {
            HarnessError::VersionQuery {
                subject: program.clone(),
                source,
            }
        })?;
        if !output.status.success() {
            return Err(HarnessError::VersionQuery {
                subject: program.clone(),
                source: std::io::Error::other(format!(
                    "{} {} exited with {}",
                    program, arg, output.status
                )),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        nerdctl::capture_version(pattern, &text).ok_or_else(|| HarnessError::VersionParse {
            output: text.into_owned(),
        })
    }
}
