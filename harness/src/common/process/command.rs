//! # Subject Command Builder (`common::process::command`)
//!
//! File: harness/src/common/process/command.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A `Command` describes exactly one invocation of the subject: the arguments
//! appended to the subject prefix, where stdout goes, where stdin comes from,
//! how long to wait and what exit code to expect. It is built with consuming
//! methods and executed once with `run`.
//!
//! ## Architecture
//!
//! Defaults:
//!
//! - 10 second timeout
//! - wait for exit, check the exit code, require exit code 0
//! - stdout and stderr copied to the test log
//! - stdin closed
//!
//! `run` never returns an error. A subject that cannot be started, exits with
//! the wrong code, or outlives its timeout fails the calling test with a panic
//! that includes everything the subject printed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::common::process::Command;
//!
//! // Expect a failure within 30 seconds.
//! let session = Command::new(&o, ["run", "--rm", "unknown-image"])
//!     .without_successful_exit()
//!     .with_timeout_in_seconds(30)
//!     .run();
//! assert!(session.err_str().contains("not found"));
//! ```
//!
use super::expect::{self, ExitPolicy};
use super::session::Session;
use crate::core::logging::LogWriter;
use crate::option::TestOption;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One-shot description of a subject invocation.
pub struct Command<'a> {
    opt: &'a TestOption,
    args: Vec<String>,
    stdout: Option<Box<dyn Write + Send>>,
    stdin: Option<Box<dyn Read + Send>>,
    timeout: Duration,
    policy: ExitPolicy,
}

impl<'a> Command<'a> {
    /// Creates a command running `opt`'s subject followed by `args`.
    pub fn new<I, S>(opt: &'a TestOption, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            opt,
            args: args.into_iter().map(Into::into).collect(),
            stdout: None,
            stdin: None,
            timeout: DEFAULT_TIMEOUT,
            policy: ExitPolicy::default(),
        }
    }

    /// Sets how long `run` waits for the subject to exit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in whole seconds.
    pub fn with_timeout_in_seconds(self, seconds: u64) -> Self {
        self.with_timeout(Duration::from_secs(seconds))
    }

    /// Expects the subject to exit with a non-zero code.
    pub fn without_successful_exit(mut self) -> Self {
        self.policy.wait = true;
        self.policy.check_exit_code = true;
        self.policy.succeed = false;
        self
    }

    /// Returns from `run` right after the subject starts.
    ///
    /// The caller owns the running session and must terminate it if the
    /// subject does not exit on its own.
    pub fn without_wait(mut self) -> Self {
        self.policy.wait = false;
        self
    }

    /// Waits for exit but accepts any exit code.
    pub fn without_checking_exit_code(mut self) -> Self {
        self.policy.wait = true;
        self.policy.check_exit_code = false;
        self
    }

    /// Copies stdout into `sink` instead of the test log.
    ///
    /// The session still buffers stdout, so `Session::out` keeps working.
    pub fn with_stdout(mut self, sink: impl Write + Send + 'static) -> Self {
        self.stdout = Some(Box::new(sink));
        self
    }

    /// Feeds `source` to the subject's stdin.
    pub fn with_stdin(mut self, source: impl Read + Send + 'static) -> Self {
        self.stdin = Some(Box::new(source));
        self
    }

    /// The policy `run` will enforce.
    pub fn policy(&self) -> ExitPolicy {
        self.policy
    }

    /// The timeout `run` will apply.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Starts the subject and enforces the configured expectations.
    ///
    /// # Returns
    ///
    /// The session, exited unless `without_wait` was set.
    ///
    /// # Panics
    ///
    /// Panics if the subject cannot be started, does not exit within the
    /// timeout (it is killed first), or exits with an unexpected code.
    pub fn run(self) -> Session {
        let cmd = self.opt.new_cmd(&self.args);
        let sink = self
            .stdout
            .unwrap_or_else(|| Box::new(LogWriter::new("stdout")));

        let mut session = match Session::start(cmd, sink, self.stdin) {
            Ok(session) => session,
            Err(e) => panic!(
                "failed to start `{} {}`: {}",
                self.opt.subject().join(" "),
                self.args.join(" "),
                e
            ),
        };

        if let Err(failure) = expect::enforce(&mut session, self.policy, self.timeout) {
            panic!(
                "`{}` {}\nstdout:\n{}\nstderr:\n{}",
                session.description(),
                failure,
                session.out_str(),
                session.err_str()
            );
        }
        debug!(command = %session.description(), code = ?session.exit_code(), "Command finished");
        session
    }
}

impl std::fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("subject", &self.opt.subject())
            .field("args", &self.args)
            .field("timeout", &self.timeout)
            .field("policy", &self.policy)
            .finish()
    }
}
