//! # Retry and Polling (`common::wait`)
//!
//! File: harness/src/common/wait.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Many side effects of the subject become observable some time after the
//! triggering command returns: a published port starts accepting, a follow-mode
//! `logs` session receives a line. This module offers the only two waiting
//! shapes the harness uses, both with fixed intervals:
//!
//! - **`retry`**: Run an attempt up to `max_retry` times, sleeping between failures.
//!   Used by the discovery helpers.
//! - **`eventually`**: Re-evaluate a condition until it holds or a wall-clock
//!   deadline passes. Used with non-waiting sessions whose output races the test.
//!
//! Neither is meant to mask a failing subject; use them only where the effect is
//! asynchronous by nature.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let session = process::run_without_wait(&o, ["logs", "-f", "ctr-test"]);
//! process::run(&o, ["exec", "ctr-test", "sh", "-c", "echo hello >> /proc/1/fd/1"]);
//! wait::assert_eventually("follow output", Duration::from_secs(30), Duration::from_secs(1), || {
//!     String::from_utf8_lossy(&session.out()).trim() == "hello"
//! });
//! ```
//!
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Returned when every attempt of `retry` failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// Number of attempts that were made.
    pub attempts: usize,
    /// Error of the final attempt; `None` only when `max_retry` was zero.
    pub last_error: Option<E>,
}

/// Runs `attempt` up to `max_retry` times, sleeping `interval` after each failure
/// that is followed by another attempt.
///
/// The closure receives the zero-based attempt index.
///
/// # Errors
///
/// Returns `RetryExhausted` carrying the last error when no attempt succeeded.
pub fn retry<T, E, F>(
    max_retry: usize,
    interval: Duration,
    mut attempt: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(usize) -> Result<T, E>,
{
    let mut last_error = None;
    for i in 0..max_retry {
        match attempt(i) {
            Ok(value) => return Ok(value),
            Err(e) => {
                last_error = Some(e);
                if i + 1 < max_retry {
                    sleep(interval);
                }
            }
        }
    }
    Err(RetryExhausted {
        attempts: max_retry,
        last_error,
    })
}

/// Polls `check` every `interval` until it returns true or `timeout` elapses.
///
/// `check` is always evaluated at least once, and once more after the deadline
/// passes, so a condition that becomes true during the last sleep is not missed.
pub fn eventually<F>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return check();
        }
        sleep(interval);
    }
}

/// Like `eventually`, but fails the current test when the condition never holds.
///
/// # Panics
///
/// Panics with `what` in the message when `timeout` elapses.
pub fn assert_eventually<F>(what: &str, timeout: Duration, interval: Duration, check: F)
where
    F: FnMut() -> bool,
{
    if !eventually(timeout, interval, check) {
        panic!("timed out after {timeout:?} waiting for {what}");
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_makes_exactly_max_attempts() {
        let mut calls = 0;
        let result: Result<(), _> = retry(4, Duration::from_millis(1), |_| {
            calls += 1;
            Err::<(), _>(format!("attempt {calls}"))
        });
        let exhausted = result.unwrap_err();
        assert_eq!(calls, 4);
        assert_eq!(exhausted.attempts, 4);
        assert_eq!(exhausted.last_error.as_deref(), Some("attempt 4"));
    }

    #[test]
    fn test_retry_stops_on_first_success() {
        let mut calls = 0;
        let value = retry(5, Duration::from_millis(1), |i| {
            calls += 1;
            if i == 2 {
                Ok(i)
            } else {
                Err("not yet")
            }
        })
        .unwrap();
        assert_eq!(value, 2);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_with_zero_attempts() {
        let exhausted = retry(0, Duration::ZERO, |_| Ok::<_, ()>(())).unwrap_err();
        assert_eq!(exhausted.attempts, 0);
        assert!(exhausted.last_error.is_none());
    }

    #[test]
    fn test_eventually_sees_late_condition() {
        let start = Instant::now();
        let ok = eventually(Duration::from_secs(2), Duration::from_millis(10), || {
            start.elapsed() > Duration::from_millis(50)
        });
        assert!(ok);
    }

    #[test]
    fn test_eventually_times_out() {
        let start = Instant::now();
        assert!(!eventually(
            Duration::from_millis(50),
            Duration::from_millis(10),
            || false
        ));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    #[should_panic(expected = "waiting for the impossible")]
    fn test_assert_eventually_panics() {
        assert_eventually(
            "the impossible",
            Duration::from_millis(20),
            Duration::from_millis(5),
            || false,
        );
    }
}
