//! # Exit Expectations (`common::process::expect`)
//!
//! File: harness/src/common/process/expect.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Decides whether a finished (or still running) subject process met the
//! expectations a `Command` was configured with. The decision is a plain
//! function over a `ProcessHandle`, returning `ExpectationFailure` instead of
//! panicking, so it can be unit tested against a fake process. `Command::run`
//! is the single place that turns a failure into a test panic.
//!
//! ## Architecture
//!
//! `ExitPolicy` holds three independent flags:
//!
//! - **`wait`**: Block until exit or timeout. When off, nothing else is checked.
//! - **`check_exit_code`**: Compare the exit code against `succeed`.
//! - **`succeed`**: Require exit code 0 (`true`) or anything else (`false`).
//!
//! A timeout kills the process before reporting, so a hung subject never
//! outlives the test that started it.
//!
use super::session::{Exit, ProcessHandle};
use std::io;
use std::time::Duration;
use thiserror::Error;

/// What a test expects from a subject invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPolicy {
    pub wait: bool,
    pub check_exit_code: bool,
    pub succeed: bool,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self {
            wait: true,
            check_exit_code: true,
            succeed: true,
        }
    }
}

/// The ways an invocation can miss its expectations.
#[derive(Error, Debug)]
pub enum ExpectationFailure {
    #[error("did not exit within {0:?}")]
    Timeout(Duration),

    #[error("failed to wait for exit: {0}")]
    Wait(#[source] io::Error),

    #[error("expected exit code 0, got {}", describe_code(.code))]
    UnexpectedFailure { code: Option<i32> },

    #[error("expected a non-zero exit code, got 0")]
    UnexpectedSuccess,
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

/// Applies `policy` to `handle`.
///
/// # Returns
///
/// * `Ok(None)` - The policy does not wait; the process may still be running.
/// * `Ok(Some(exit))` - The process exited and met the policy.
///
/// # Errors
///
/// Returns an `ExpectationFailure` describing the first expectation that was
/// not met. On `Timeout` the process has already been killed.
pub fn enforce<H>(
    handle: &mut H,
    policy: ExitPolicy,
    timeout: Duration,
) -> Result<Option<Exit>, ExpectationFailure>
where
    H: ProcessHandle + ?Sized,
{
    if !policy.wait {
        return Ok(None);
    }

    let exit = match handle.wait_timeout(timeout) {
        Ok(Some(exit)) => exit,
        Ok(None) => {
            if let Err(e) = handle.kill() {
                tracing::warn!("Failed to kill timed out process: {}", e);
            }
            return Err(ExpectationFailure::Timeout(timeout));
        }
        Err(e) => return Err(ExpectationFailure::Wait(e)),
    };

    if policy.check_exit_code {
        match (policy.succeed, exit.success()) {
            (true, false) => return Err(ExpectationFailure::UnexpectedFailure { code: exit.code }),
            (false, true) => return Err(ExpectationFailure::UnexpectedSuccess),
            _ => {}
        }
    }
    Ok(Some(exit))
}
