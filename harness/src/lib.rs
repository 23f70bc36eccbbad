//! # Common Tests Library
//!
//! File: harness/src/lib.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared end-to-end test building blocks for container CLIs compatible with
//! the Docker command line (`finch`, `nerdctl`, and wrappers around them).
//! Downstream projects link this crate into their own test binaries, describe
//! their CLI as a "subject", and assert on what it prints and does.
//!
//! ## Architecture
//!
//! - **`option`**: `TestOption`, how to invoke the subject and which dialect it speaks.
//! - **`common::process`**: Run the subject once with a timeout and exit-code expectation.
//! - **`common::network`** and **`common::wait`**: Wait for asynchronous side effects.
//! - **`common::fs`**: Stage files for the subject under the home directory.
//! - **`common::subject`**: Query, sweep and assert on the subject's resources; run the local registry.
//! - **`suite`**: The shared context a test run threads through every test.
//! - **`core`**: Configuration, errors and logging.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::common::process;
//! use common_tests::common::subject::LocalImage;
//! use common_tests::Suite;
//!
//! let mut suite = Suite::load()?;
//! suite.setup();
//! let alpine = suite.image(LocalImage::Default);
//! let out = process::stdout_str(suite.option(), ["run", "--rm", &alpine, "echo", "hi"]);
//! assert_eq!(out, "hi");
//! suite.teardown();
//! ```
//!
pub mod common;
pub mod core;
pub mod option;
pub mod suite;

pub use crate::core::error::{HarnessError, Result};
pub use option::{modifier, Modifier, TestOption};
pub use suite::Suite;
