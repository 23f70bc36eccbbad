//! # Version Gating
//!
//! File: harness/src/common/subject/version.rs
//! Author: Christi Mahu
//!
//! Some scenarios only make sense from a given nerdctl release on. Rust tests
//! cannot skip themselves at runtime, so `require_nerdctl_version` answers
//! whether the test should proceed and the test returns early on `false`:
//!
//! ```rust,ignore
//! if !version::require_nerdctl_version(&o, ">=2.0.0") {
//!     return;
//! }
//! ```
//!
use crate::core::error::Result;
use crate::option::TestOption;
use anyhow::Context;
use semver::{Version, VersionReq};
use tracing::info;

/// Whether `version` (optionally `v`-prefixed) satisfies `constraint`.
///
/// # Errors
///
/// Fails when either side cannot be parsed.
pub fn satisfies(version: &str, constraint: &str) -> Result<bool> {
    matches_version(&parse_constraint(constraint)?, version)
}

fn parse_constraint(constraint: &str) -> Result<VersionReq> {
    VersionReq::parse(constraint)
        .with_context(|| format!("failed to construct constraint from {constraint}"))
}

fn matches_version(req: &VersionReq, version: &str) -> Result<bool> {
    let trimmed = version.trim().trim_start_matches('v');
    let parsed = Version::parse(trimmed)
        .with_context(|| format!("failed to construct semver from {version}"))?;
    Ok(req.matches(&parsed))
}

/// Queries the subject's nerdctl version and checks it against `constraint`.
///
/// The constraint is parsed first, so a malformed one fails before the
/// subject is run.
///
/// # Returns
///
/// `false` when the test should be skipped.
///
/// # Panics
///
/// Panics if the constraint is malformed, or the version cannot be queried or parsed.
pub fn require_nerdctl_version(o: &TestOption, constraint: &str) -> bool {
    let req = match parse_constraint(constraint) {
        Ok(req) => req,
        Err(e) => panic!("{e:#}"),
    };
    let version = match o.get_nerdctl_version() {
        Ok(version) => version,
        Err(e) => panic!("failed to get nerdctl version: {e}"),
    };
    match matches_version(&req, &version) {
        Ok(true) => true,
        Ok(false) => {
            info!("nerdctl version {version} does not satisfy constraint {constraint}, skipping");
            false
        }
        Err(e) => panic!("{e:#}"),
    }
}
