//! # Option Modifiers
//!
//! File: harness/src/option/modifier.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A `Modifier` customizes a `TestOption` while it is being constructed. Keeping
//! customizations as values (instead of extra parameters on `TestOption::new`)
//! lets new knobs be added without touching the constructor's signature.
//!
//! Modifiers are applied strictly in the order they are passed, so a later
//! modifier wins over an earlier one touching the same setting.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::option::{modifier, TestOption};
//!
//! let o = TestOption::new(
//!     ["finch"],
//!     vec![
//!         modifier::env(["COMPOSE_FILE=/tmp/compose.yml"]),
//!         modifier::with_nerdctl_version("1.7.7"),
//!     ],
//! )?;
//! ```
//!
use super::TestOption;
use std::fmt;

/// A deferred, single-use mutation of a `TestOption` under construction.
///
/// It is not intended to be built outside this module; use the constructor
/// functions below.
pub struct Modifier {
    f: Box<dyn FnOnce(&mut TestOption) + Send>,
}

impl Modifier {
    fn new(f: impl FnOnce(&mut TestOption) + Send + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    pub(crate) fn modify(self, o: &mut TestOption) {
        (self.f)(o)
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Modifier")
    }
}

/// Specifies the environment overrides used during testing.
///
/// Entries use the `KEY=VALUE` form and replace any overrides set before.
pub fn env<I, S>(entries: I) -> Modifier
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
    Modifier::new(move |o| o.env = entries)
}

/// Declares that the subject does not pass host environment variables
/// through to containers (e.g. `run --env FOO` without a value).
pub fn with_no_environment_variable_passthrough() -> Modifier {
    Modifier::new(|o| o.features.env_var_passthrough = false)
}

/// Declares the nerdctl version the subject wraps, e.g. "1.7.7" or "2.x.x".
///
/// The value is validated when `TestOption::new` finishes applying modifiers.
pub fn with_nerdctl_version(version: impl Into<String>) -> Modifier {
    let version = version.into();
    Modifier::new(move |o| o.features.nerdctl_version = version)
}
