//! # Network Readiness Helpers (`common::network`)
//!
//! File: harness/src/common/network/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A subject reports success as soon as a container is started, but the
//! service inside it may take a moment to accept connections. These helpers
//! let a test wait for that side effect with a fixed number of attempts at a
//! fixed interval, and fail the test when it never shows up.
//!
//! ## Architecture
//!
//! - **`discovery`**: `get_free_port` picks an unused loopback port for `-p` mappings.
//! - **`dial`**: `dial_and_read` connects over TCP or a unix socket and compares the first bytes read.
//! - **`http`**: `http_get_and_assert` issues GETs until one succeeds and checks its status code.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::common::network;
//!
//! let port = network::get_free_port();
//! process::run(&o, ["run", "-d", "-p", &format!("{port}:80"), &nginx]);
//! network::http_get_and_assert(&format!("http://localhost:{port}"), 200, 20, Duration::from_secs(1));
//! ```
//!
pub mod dial;
pub mod discovery;
pub mod http;

pub use dial::dial_and_read;
pub use discovery::get_free_port;
pub use http::http_get_and_assert;
