//! # Subject Session (`common::process::session`)
//!
//! File: harness/src/common/process/session.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A `Session` is the handle a test holds on one spawned subject process. It has
//! exactly three capabilities, captured by the `ProcessHandle` trait so the exit
//! policy logic can be exercised against a fake:
//!
//! - wait for exit with a wall-clock timeout,
//! - snapshot the output buffered so far,
//! - force termination.
//!
//! ## Architecture
//!
//! On start, stdout and stderr are piped and each pipe is drained by a reader
//! thread. Every chunk is appended to a shared buffer (so tests can read the
//! output at any point, including while the process is still running) and
//! copied to the configured sink. stdin, when provided, is fed by a writer
//! thread that closes the pipe once the source is exhausted.
//!
//! A session only counts as exited once the process has been reaped *and*
//! both readers have hit end of file, so the buffers hold the complete output
//! before a test inspects them. Both must happen within the wait's timeout: a
//! subject that leaves a background descendant holding its stdout or stderr
//! is still running as far as the caller is concerned. After a kill the
//! readers are left to finish in the background.
//!
//! Sessions are not killed on drop. A test that starts a long-lived process
//! (`logs --follow`, `events`) must call `terminate` itself.
//!
use crate::core::logging::LogWriter;
use std::io::{self, Read, Write};
use std::process::{Child, Command as StdCommand, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl Exit {
    /// True for exit code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// The capability set of a spawned process that assertions rely on.
pub trait ProcessHandle {
    /// Waits up to `timeout`; `Ok(None)` means the process, or a descendant
    /// holding its output open, is still running.
    fn wait_timeout(&mut self, timeout: Duration) -> io::Result<Option<Exit>>;

    /// Copy of everything written to stdout so far.
    fn stdout_contents(&self) -> Vec<u8>;

    /// Copy of everything written to stderr so far.
    fn stderr_contents(&self) -> Vec<u8>;

    /// Forcibly terminates the process.
    fn kill(&mut self) -> io::Result<()>;
}

type Buffer = Arc<Mutex<Vec<u8>>>;

/// Live or completed subject process with buffered output.
pub struct Session {
    description: String,
    child: Child,
    stdout: Buffer,
    stderr: Buffer,
    readers_done: Receiver<()>,
    open_readers: usize,
    reaped: Option<Exit>,
    exit: Option<Exit>,
}

impl Session {
    /// Spawns `cmd` with piped output, copying stdout into `stdout_sink` and
    /// stderr into the test log.
    ///
    /// # Errors
    ///
    /// Returns the spawn error (e.g. the program does not exist).
    pub fn start(
        mut cmd: StdCommand,
        stdout_sink: Box<dyn Write + Send>,
        stdin: Option<Box<dyn Read + Send>>,
    ) -> io::Result<Self> {
        let description = describe(&cmd);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        debug!(command = %description, "Starting subject session");
        let mut child = cmd.spawn()?;

        let stdout = Buffer::default();
        let stderr = Buffer::default();
        let (done_tx, readers_done) = mpsc::channel();
        let mut open_readers = 0;

        if let Some(pipe) = child.stdout.take() {
            drain(pipe, Arc::clone(&stdout), stdout_sink, done_tx.clone());
            open_readers += 1;
        }
        if let Some(pipe) = child.stderr.take() {
            drain(
                pipe,
                Arc::clone(&stderr),
                Box::new(LogWriter::new("stderr")),
                done_tx,
            );
            open_readers += 1;
        }
        if let (Some(mut source), Some(mut pipe)) = (stdin, child.stdin.take()) {
            thread::spawn(move || {
                // A subject that exits without reading all of stdin closes the
                // pipe early; that is not a harness failure.
                if let Err(e) = io::copy(&mut source, &mut pipe) {
                    debug!("stdin copy stopped early: {}", e);
                }
            });
        }

        Ok(Self {
            description,
            child,
            stdout,
            stderr,
            readers_done,
            open_readers,
            reaped: None,
            exit: None,
        })
    }

    /// The command line this session was started with, for messages.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// OS process id of the subject.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Snapshot of stdout so far.
    pub fn out(&self) -> Vec<u8> {
        self.stdout_contents()
    }

    /// Snapshot of stderr so far.
    pub fn err(&self) -> Vec<u8> {
        self.stderr_contents()
    }

    /// Snapshot of stdout so far as lossy UTF-8.
    pub fn out_str(&self) -> String {
        String::from_utf8_lossy(&self.out()).into_owned()
    }

    /// Snapshot of stderr so far as lossy UTF-8.
    pub fn err_str(&self) -> String {
        String::from_utf8_lossy(&self.err()).into_owned()
    }

    /// Exit code once the session has been waited on; `None` while running
    /// or when the process died from a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit.and_then(|e| e.code)
    }

    /// True once the process is known to have exited.
    pub fn exited(&self) -> bool {
        self.exit.is_some()
    }

    /// Waits for the process to exit.
    ///
    /// # Panics
    ///
    /// Panics if the process is still running after `timeout`, or waiting fails.
    pub fn wait(&mut self, timeout: Duration) -> Exit {
        match self.wait_timeout(timeout) {
            Ok(Some(exit)) => exit,
            Ok(None) => panic!(
                "`{}` did not exit within {:?}\nstdout:\n{}\nstderr:\n{}",
                self.description,
                timeout,
                self.out_str(),
                self.err_str()
            ),
            Err(e) => panic!("failed to wait for `{}`: {}", self.description, e),
        }
    }

    /// Sends SIGKILL (or the platform equivalent). Killing an exited process
    /// is a no-op.
    pub fn terminate(&mut self) {
        if let Err(e) = ProcessHandle::kill(self) {
            warn!(command = %self.description, "Failed to kill session: {}", e);
        }
    }

    /// Waits until both output readers reached end of file, or `deadline`.
    fn await_readers(&mut self, deadline: Instant) -> bool {
        while self.open_readers > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.readers_done.recv_timeout(left) {
                Ok(()) => self.open_readers -= 1,
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!(command = %self.description, "Output worker stopped without reporting");
                    self.open_readers = 0;
                }
            }
        }
        true
    }
}

impl ProcessHandle for Session {
    fn wait_timeout(&mut self, timeout: Duration) -> io::Result<Option<Exit>> {
        if let Some(exit) = self.exit {
            return Ok(Some(exit));
        }
        let deadline = Instant::now() + timeout;

        let exit = match self.reaped {
            Some(exit) => exit,
            None => match self.child.wait_timeout(timeout)? {
                Some(status) => {
                    let exit = Exit {
                        code: status.code(),
                    };
                    self.reaped = Some(exit);
                    exit
                }
                None => return Ok(None),
            },
        };

        if !self.await_readers(deadline) {
            debug!(
                command = %self.description,
                code = ?exit.code,
                "Subject exited but its output is still held open"
            );
            return Ok(None);
        }
        debug!(command = %self.description, code = ?exit.code, "Subject session exited");
        self.exit = Some(exit);
        Ok(Some(exit))
    }

    fn stdout_contents(&self) -> Vec<u8> {
        snapshot(&self.stdout)
    }

    fn stderr_contents(&self) -> Vec<u8> {
        snapshot(&self.stderr)
    }

    fn kill(&mut self) -> io::Result<()> {
        if self.exit.is_some() {
            return Ok(());
        }
        let exit = match self.reaped {
            Some(exit) => exit,
            None => {
                match self.child.kill() {
                    Ok(()) => {}
                    // Exited between the last wait and now.
                    Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
                    Err(e) => return Err(e),
                }
                Exit {
                    code: self.child.wait()?.code(),
                }
            }
        };
        // Descendants may still hold the pipes open; the readers finish on
        // their own once they let go.
        self.open_readers = 0;
        self.exit = Some(exit);
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("command", &self.description)
            .field("pid", &self.child.id())
            .field("exit", &self.exit)
            .finish()
    }
}

fn snapshot(buffer: &Buffer) -> Vec<u8> {
    match buffer.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn drain(
    mut pipe: impl Read + Send + 'static,
    buffer: Buffer,
    mut sink: Box<dyn Write + Send>,
    done: Sender<()>,
) {
    thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            let n = match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("output pipe closed with error: {}", e);
                    break;
                }
            };
            match buffer.lock() {
                Ok(mut guard) => guard.extend_from_slice(&chunk[..n]),
                Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..n]),
            }
            // The sink is best effort; the buffer is the source of truth.
            let _ = sink.write_all(&chunk[..n]);
        }
        let _ = sink.flush();
        let _ = done.send(());
    });
}

fn describe(cmd: &StdCommand) -> String {
    let mut words = vec![cmd.get_program().to_string_lossy().into_owned()];
    words.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    words.join(" ")
}
