//! # Scratch-Space Utilities (`common::fs`)
//!
//! File: harness/src/common/fs/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Tests often need files on disk for the subject to read: a Dockerfile for
//! `build`, a compose file, a path for `save --output`. This module stages
//! those inputs.
//!
//! ## Architecture
//!
//! - **`io`**: Small `Result`-returning file operations (`write_file`, `read_file_to_string`, `check_if_file_exists`).
//! - **`scratch`**: Named directories under the home directory with a recognizable
//!   prefix (`finch-test`, `finch-compose`, `finch-test-save`). These panic on
//!   failure, like every other assertion-time helper.
//!
//! Scratch directories are created under the home directory rather than the
//! system temp directory because VM-backed subjects only share the home
//! directory with their guest. They are never removed automatically.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::common::fs::scratch;
//!
//! let context = scratch::create_build_context("FROM alpine\nCMD [\"true\"]\n");
//! process::run(&o, ["build", "-t", "test-image", context.to_str().unwrap()]);
//! std::fs::remove_dir_all(&context)?;
//! ```
//!

/// Result-returning file helpers.
pub mod io;
/// Scratch directories and staged subject inputs.
pub mod scratch;

pub use io::{check_if_file_exists, write_file};
pub use scratch::{
    create_build_context, create_compose_yml_context, create_tar_file_path, create_temp_dir,
    create_temp_file,
};
