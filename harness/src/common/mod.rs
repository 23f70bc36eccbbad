//! # Common Tests Shared Utilities (`common`)
//!
//! File: harness/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module is the organizational root of everything a test scenario calls
//! between "build an option" and "assert on the result": running the subject,
//! waiting for asynchronous side effects, staging files, and inspecting or
//! resetting the subject's resource state.
//!
//! ## Architecture
//!
//! - **`process`**: `Command` builder, live `Session` handle and the `run`/`stdout` wrappers.
//! - **`network`**: Free port allocation, dial-and-read and HTTP status checks.
//! - **`fs`**: Scratch directories under the home directory and small file helpers.
//! - **`env`**: Lookups against the ambient process environment.
//! - **`wait`**: Fixed-count retries and bounded polling.
//! - **`subject`**: Resource queries, the cleanup sweep, the local registry and shared state assertions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::common::{network, process, subject};
//!
//! let port = network::get_free_port();
//! process::run(&o, ["run", "-d", "-p", &format!("{port}:80"), &nginx]);
//! network::http_get_and_assert(&format!("http://localhost:{port}"), 200, 20, Duration::from_millis(500));
//! subject::remove_all(&o, &Retained::default());
//! ```
//!

/// Ambient environment lookups.
pub mod env;
/// Scratch-space helpers for staging subject inputs.
pub mod fs;
/// Readiness checks: free ports, socket reads, HTTP status checks.
pub mod network;
/// Invoking the subject and inspecting the resulting session.
pub mod process;
/// Resource queries, cleanup, local registry and state assertions.
pub mod subject;
/// Retry and polling primitives shared by the readiness checks.
pub mod wait;
