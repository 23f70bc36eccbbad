//! # Integration Test Helpers
//!
//! File: harness/tests/common.rs
//! Author: Christi Mahu
//!
//! Shared setup for the integration tests: an isolated working directory for
//! the `common-tests` binary and a scripted fake subject.
//!

// Each test file uses a different subset of these helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONFIG_VARS: [&str; 5] = [
    "COMMON_TESTS_SUBJECT",
    "COMMON_TESTS_NERDCTL_VERSION",
    "COMMON_TESTS_ENV_PASSTHROUGH",
    "COMMON_TESTS_LOCAL_REGISTRY",
    "COMMON_TESTS_CONFIG",
];

/// A scratch directory the binary runs in, with no configuration leaking in
/// from the user, the project or the environment.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create workspace");
        // Stops the project config search here.
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git");
        fs::create_dir(dir.path().join("xdg")).expect("Failed to create xdg dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `common-tests` running inside the workspace.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("common-tests")
            .expect("Failed to find common-tests binary for testing");
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg"));
        for var in CONFIG_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Writes a fake subject that logs its arguments to `calls.log` and
    /// reports no resources. Returns the subject words.
    pub fn fake_subject(&self) -> String {
        self.scripted_subject("")
    }

    /// Like `fake_subject`, but answers with a running `local-registry`
    /// container `registry-ctr` from image `registry-img`, next to a
    /// `leftover` container.
    pub fn fake_subject_with_registry(&self) -> String {
        self.scripted_subject(
            r#"  "inspect local-registry --format {{.ID}}") echo registry-ctr ;;
  "images -q "*) echo registry-img ;;
  "ps --all --quiet --no-trunc") printf 'registry-ctr\nleftover\n' ;;
  "images --all --quiet") echo registry-img ;;
"#,
        )
    }

    fn scripted_subject(&self, cases: &str) -> String {
        let log = self.path().join("calls.log");
        let script = self.path().join("fake-subject.sh");
        fs::write(
            &script,
            format!(
                "echo \"$*\" >> '{}'\ncase \"$*\" in\n{cases}esac\nexit 0\n",
                log.display()
            ),
        )
        .expect("Failed to write fake subject");
        format!("sh {}", script.display())
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).expect("Failed to write workspace file");
        path
    }
}
