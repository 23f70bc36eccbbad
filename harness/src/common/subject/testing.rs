//! Scripted stand-in for a container CLI, used by the unit tests of the
//! sweep and the registry choreography.
//!
//! The fake appends each invocation's arguments to a log file and answers the
//! listing commands from editable state files, so a test can shape what the
//! "subject" reports and then assert on exactly what it was asked to do.

use crate::common::fs::io::{read_file_to_string, write_file};
use crate::option::{modifier, TestOption};
use std::path::PathBuf;
use tempfile::TempDir;

/// Registry identity the fake reports for `run -d`, and for `inspect` once it ran.
pub const FAKE_REGISTRY_CONTAINER_ID: &str = "registry-container-id";
/// Image ID the fake reports for `images -q`.
pub const FAKE_REGISTRY_IMAGE_ID: &str = "registry-image-id";

const SCRIPT: &str = r#"echo "$*" >> "$FAKE_LOG"
case "$*" in
  "ps --all --quiet --no-trunc") cat "$FAKE_STATE/containers" ;;
  "images --all --quiet") cat "$FAKE_STATE/image_ids" ;;
  "images --all --format {{.Repository}}:{{.Tag}}") cat "$FAKE_STATE/image_names" ;;
  "volume ls --quiet") cat "$FAKE_STATE/volumes" ;;
  "network ls --format {{.Name}}") cat "$FAKE_STATE/networks" ;;
  "run -d -p "*) echo registry-container-id | tee "$FAKE_STATE/registry" ;;
  "images -q"|"images -q "*) echo registry-image-id ;;
  "inspect local-registry --format {{.ID}}")
    if [ -s "$FAKE_STATE/registry" ]; then
      cat "$FAKE_STATE/registry"
    else
      echo "no such container: local-registry" >&2
      exit 1
    fi ;;
esac
exit 0
"#;

const STATE_FILES: [&str; 6] = [
    "containers",
    "image_ids",
    "image_names",
    "volumes",
    "networks",
    "registry",
];

pub struct FakeSubject {
    dir: TempDir,
    option: TestOption,
}

impl FakeSubject {
    /// Creates a fake with every listing empty.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-subject.sh");
        write_file(&script, SCRIPT).unwrap();
        for name in STATE_FILES {
            write_file(&dir.path().join(name), "").unwrap();
        }
        let log = dir.path().join("calls.log");
        write_file(&log, "").unwrap();

        // Run through `sh` so the script never needs the executable bit.
        let option = TestOption::new(
            ["sh".to_string(), script.to_string_lossy().into_owned()],
            vec![modifier::env([
                format!("FAKE_LOG={}", log.display()),
                format!("FAKE_STATE={}", dir.path().display()),
            ])],
        )
        .unwrap();
        Self { dir, option }
    }

    pub fn option(&self) -> &TestOption {
        &self.option
    }

    /// Replaces the listing the fake prints for `name`.
    pub fn set(&self, name: &str, lines: &[&str]) {
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        write_file(&self.path(name), &content).unwrap();
    }

    /// Every invocation so far, one space-joined argument list per entry.
    pub fn calls(&self) -> Vec<String> {
        read_file_to_string(&self.path("calls.log"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Invocations that change state, i.e. everything except the listings.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| {
                !matches!(
                    call.as_str(),
                    "ps --all --quiet --no-trunc"
                        | "images --all --quiet"
                        | "images --all --format {{.Repository}}:{{.Tag}}"
                        | "volume ls --quiet"
                        | "network ls --format {{.Name}}"
                )
            })
            .collect()
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
