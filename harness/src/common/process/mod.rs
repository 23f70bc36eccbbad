//! # Subject Process Execution (`common::process`)
//!
//! File: harness/src/common/process/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Everything a test does to the subject goes through this module: build a
//! `Command` from a `TestOption` plus arguments, run it, and inspect the
//! resulting `Session`.
//!
//! ## Architecture
//!
//! - **`command`**: The consuming `Command` builder and `run`.
//! - **`expect`**: `ExitPolicy` and the pure check that decides whether an invocation met it.
//! - **`session`**: The spawned process, its buffered output and the `ProcessHandle` trait.
//! - **`run`**: One-line wrappers (`run`, `stdout_str`, `stderr_str`, ...).
//!
//! Failures here are test failures: nothing in this module returns an error
//! for a subject that misbehaves.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::common::process;
//!
//! process::run(&o, ["pull", &image]);
//! let id = process::stdout_str(&o, ["images", "--quiet", &image]);
//! assert!(!id.is_empty());
//! ```
//!
pub mod command;
pub mod expect;
pub mod run;
pub mod session;

pub use command::{Command, DEFAULT_TIMEOUT};
pub use expect::{ExitPolicy, ExpectationFailure};
pub use run::{
    run, run_without_successful_exit, run_without_wait, stderr, stderr_as_lines, stderr_str,
    stdout, stdout_as_lines, stdout_str,
};
pub use session::{Exit, ProcessHandle, Session};
