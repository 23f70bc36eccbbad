//! # Run Shortcuts (`common::process::run`)
//!
//! File: harness/src/common/process/run.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Most assertions need nothing beyond "run this with the defaults and give me
//! stdout". These wrappers cover those cases so test bodies stay one line.
//! Everything here panics on an unexpected exit, exactly like `Command::run`.
//!
//! `stdout_str` trims surrounding whitespace because almost every caller
//! compares a single value (an ID, a version). `stderr_str` does not, since
//! error output is usually matched with `contains`.
//!
use super::command::Command;
use super::session::Session;
use crate::option::TestOption;

/// Runs the subject with `args`, requiring exit code 0.
pub fn run<I, S>(o: &TestOption, args: I) -> Session
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Command::new(o, args).run()
}

/// Runs the subject with `args`, requiring a non-zero exit code.
pub fn run_without_successful_exit<I, S>(o: &TestOption, args: I) -> Session
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Command::new(o, args).without_successful_exit().run()
}

/// Starts the subject with `args` and returns without waiting.
///
/// The returned session must be terminated by the caller if the subject
/// does not exit on its own.
pub fn run_without_wait<I, S>(o: &TestOption, args: I) -> Session
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Command::new(o, args).without_wait().run()
}

/// Runs successfully and returns raw stdout.
pub fn stdout<I, S>(o: &TestOption, args: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    run(o, args).out()
}

/// Runs successfully and returns stdout with surrounding whitespace removed.
pub fn stdout_str<I, S>(o: &TestOption, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    run(o, args).out_str().trim().to_string()
}

/// Runs successfully and returns the lines of stdout.
pub fn stdout_as_lines<I, S>(o: &TestOption, args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    to_lines(&run(o, args).out_str())
}

/// Runs successfully and returns raw stderr.
///
/// Subjects print progress (e.g. `build`) to stderr on success. For the
/// stderr of an expected failure use `run_without_successful_exit(..).err()`.
pub fn stderr<I, S>(o: &TestOption, args: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    run(o, args).err()
}

/// Runs successfully and returns stderr as text, untrimmed.
pub fn stderr_str<I, S>(o: &TestOption, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    run(o, args).err_str()
}

/// Runs successfully and returns the lines of stderr.
pub fn stderr_as_lines<I, S>(o: &TestOption, args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    to_lines(&stderr_str(o, args))
}

/// Splits `text` into lines without their `\n` / `\r\n` terminators.
///
/// Blank lines in the middle are kept so indices line up with the output;
/// only the empty remainder after a final newline is dropped.
pub fn to_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

// --- Unit Tests ---
#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell() -> TestOption {
        TestOption::new(["sh", "-c"], vec![]).unwrap()
    }

    #[test]
    fn test_stdout_str_is_trimmed() {
        assert_eq!(stdout_str(&shell(), ["echo '  v1.2.3  '"]), "v1.2.3");
    }

    #[test]
    fn test_stdout_raw_and_lines() {
        let o = shell();
        assert_eq!(stdout(&o, ["printf 'a\\nb\\n'"]), b"a\nb\n");
        assert_eq!(stdout_as_lines(&o, ["printf 'a\\n\\nb\\n'"]), ["a", "", "b"]);
        assert!(stdout_as_lines(&o, ["true"]).is_empty());
    }

    #[test]
    fn test_stderr_of_successful_command() {
        let o = shell();
        let progress = "echo '#1 [internal] load build definition' >&2; exit 0";
        assert_eq!(stderr_str(&o, [progress]), "#1 [internal] load build definition\n");
        assert_eq!(stderr(&o, ["printf e >&2"]), b"e");
        assert_eq!(stderr_as_lines(&o, ["printf 'x\\ny\\n' >&2"]), ["x", "y"]);
    }

    #[test]
    #[should_panic(expected = "expected exit code 0, got 1")]
    fn test_stderr_str_requires_success() {
        stderr_str(&shell(), ["echo oops >&2; exit 1"]);
    }

    #[test]
    fn test_stderr_of_expected_failure() {
        let session = run_without_successful_exit(&shell(), ["echo ' oops' >&2; exit 1"]);
        assert_eq!(session.err_str(), " oops\n");
    }

    #[test]
    fn test_run_without_wait() {
        let mut session = run_without_wait(&shell(), ["exec sleep 60"]);
        assert!(!session.exited());
        session.terminate();
    }

    #[test]
    fn test_to_lines_handles_crlf() {
        assert_eq!(to_lines("a\r\nb\r\n"), ["a", "b"]);
    }

    #[test]
    fn test_to_lines_keeps_interior_blank_lines() {
        assert_eq!(to_lines("a\n\nb"), ["a", "", "b"]);
        assert_eq!(to_lines("a\n\n"), ["a", ""]);
        assert!(to_lines("").is_empty());
    }
}
