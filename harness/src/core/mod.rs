//! # Common Tests Core Infrastructure
//!
//! File: harness/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the infrastructure every other part of the harness
//! leans on: configuration loading, error types, and logging setup.
//!
//! ## Architecture
//!
//! - `config`: Layered suite configuration (defaults, TOML files, environment variables).
//! - `error`: The `HarnessError` enum for configuration-time failures and the `Result` alias.
//! - `logging`: Subscriber installation and the line-oriented test-log sink.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::core::config::SuiteConfig;
//! use common_tests::core::error::{HarnessError, Result};
//! use common_tests::core::logging;
//! ```
//!
pub mod config;
pub mod error;
pub mod logging;
