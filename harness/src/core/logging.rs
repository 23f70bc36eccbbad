//! # Common Tests Logging
//!
//! File: harness/src/core/logging.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Everything the subject prints is interesting when a test fails and noise when
//! it passes. The harness therefore routes subject output into `tracing` at the
//! DEBUG level by default, and tests opt into seeing it with `RUST_LOG`.
//!
//! ## Architecture
//!
//! - **`init_test_logging`**: Installs a compact `tracing-subscriber` formatter that
//!   writes through libtest's capture writer, so output only shows for failing
//!   tests. Safe to call from every test; only the first call installs anything.
//! - **`LogWriter`**: An `io::Write` adapter that splits bytes into lines and emits
//!   each complete line as a `debug!` event under the `common_tests::subject`
//!   target. It is the default stdout/stderr sink of every `Command`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! #[test]
//! fn pulls_alpine() {
//!     common_tests::core::logging::init_test_logging();
//!     // RUST_LOG=common_tests=debug cargo test -- --nocapture
//! }
//! ```
//!
use std::io::{self, Write};
use tracing_subscriber::{fmt, EnvFilter};

/// Level used when `RUST_LOG` is not set.
const DEFAULT_TEST_LEVEL: &str = "warn";

/// Installs the test subscriber once per process.
///
/// Uses `try_init` so a second call (or a subscriber installed by the
/// downstream test binary) is silently kept.
pub fn init_test_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_LEVEL));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_test_writer()
        .with_target(true)
        .compact()
        .try_init();
}

/// Maps a `-v` count to a filter directive, the same ladder the binary uses.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// # Log Writer (`LogWriter`)
///
/// Line-buffering sink that forwards subject output to `tracing`.
///
/// Partial lines are held until a newline arrives or the writer is flushed or
/// dropped, so a line split across two pipe reads is still logged once.
#[derive(Debug)]
pub struct LogWriter {
    stream: &'static str,
    pending: Vec<u8>,
}

impl LogWriter {
    /// Creates a writer that tags every line with `stream` (e.g. "stdout").
    pub fn new(stream: &'static str) -> Self {
        Self {
            stream,
            pending: Vec::new(),
        }
    }

    fn emit(&self, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        let text = text.trim_end_matches('\r');
        tracing::debug!(target: "common_tests::subject", stream = self.stream, "{}", text);
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line[..line.len() - 1]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
