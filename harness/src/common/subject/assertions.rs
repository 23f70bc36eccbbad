//! # State Assertions
//!
//! File: harness/src/common/subject/assertions.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared checks scenarios use to state what the subject's world should look
//! like after a command: which containers run, which images and volumes
//! exist, what a file contains on the host or inside a container. Each one
//! fails the test with a message naming the resource.
//!
//! `container_should_not_exist` is the exception: it returns a `Result` so it
//! can be polled with `wait::eventually` while a container is being removed
//! asynchronously.
//!
use crate::common::fs::scratch::create_build_context;
use crate::common::process::{run, run_without_successful_exit, stdout, stdout_str};
use crate::core::error::Result;
use crate::option::TestOption;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Output of the image built by `build_image`.
pub const DUMMY_OUTPUT: &str = "finch-test-dummy-output";

/// Pulls `image` quietly and asserts it is now listed.
pub fn pull_image(o: &TestOption, image: &str) {
    run(o, ["pull", "-q", image]);
    assert!(
        !stdout(o, ["images", "--quiet", image]).is_empty(),
        "image {image} is not listed after pull"
    );
}

/// Force-removes `image` and asserts it is no longer listed.
pub fn remove_image(o: &TestOption, image: &str) {
    run(o, ["rmi", "--force", image]);
    assert!(
        stdout(o, ["images", "--quiet", image]).is_empty(),
        "image {image} is still listed after rmi"
    );
}

fn containers_matching(o: &TestOption, all: bool, name: &str) -> Vec<u8> {
    let filter = format!("name={name}");
    if all {
        stdout(o, ["ps", "-a", "-q", "--filter", filter.as_str()])
    } else {
        stdout(o, ["ps", "-q", "--filter", filter.as_str()])
    }
}

/// Asserts each named container is running.
pub fn container_should_be_running(o: &TestOption, names: &[&str]) {
    for name in names {
        assert!(
            !containers_matching(o, false, name).is_empty(),
            "container {name} should be running"
        );
    }
}

/// Asserts no named container is running.
pub fn container_should_not_be_running(o: &TestOption, names: &[&str]) {
    for name in names {
        assert!(
            containers_matching(o, false, name).is_empty(),
            "container {name} should not be running"
        );
    }
}

/// Asserts each named container exists, running or not.
pub fn container_should_exist(o: &TestOption, names: &[&str]) {
    for name in names {
        assert!(
            !containers_matching(o, true, name).is_empty(),
            "container {name} should exist"
        );
    }
}

/// Checks that no named container exists.
///
/// # Errors
///
/// Returns an error naming the first container that still exists.
pub fn container_should_not_exist(o: &TestOption, names: &[&str]) -> Result<()> {
    for name in names {
        if !containers_matching(o, true, name).is_empty() {
            anyhow::bail!("container '{name}' exists but should not");
        }
    }
    Ok(())
}

/// Asserts `image` is listed.
pub fn image_should_exist(o: &TestOption, image: &str) {
    assert!(
        !stdout(o, ["images", "-q", image]).is_empty(),
        "image {image} should exist"
    );
}

/// Asserts `image` is not listed.
pub fn image_should_not_exist(o: &TestOption, image: &str) {
    assert!(
        stdout(o, ["images", "-q", image]).is_empty(),
        "image {image} should not exist"
    );
}

fn volumes_matching(o: &TestOption, name: &str) -> Vec<u8> {
    let filter = format!("name={name}");
    stdout(o, ["volume", "ls", "-q", "--filter", filter.as_str()])
}

/// Asserts volume `name` exists.
pub fn volume_should_exist(o: &TestOption, name: &str) {
    assert!(!volumes_matching(o, name).is_empty(), "volume {name} should exist");
}

/// Asserts volume `name` does not exist.
pub fn volume_should_not_exist(o: &TestOption, name: &str) {
    assert!(volumes_matching(o, name).is_empty(), "volume {name} should not exist");
}

/// Asserts `path` is a regular file holding exactly `content`.
pub fn file_should_exist(path: impl AsRef<Path>, content: &str) {
    let path = path.as_ref();
    assert!(path.is_file(), "{:?} should be a regular file", path);
    match fs::read_to_string(path) {
        Ok(actual) => assert_eq!(actual, content, "unexpected content in {:?}", path),
        Err(e) => panic!("failed to read {:?}: {e}", path),
    }
}

/// Asserts nothing exists at `path`.
pub fn file_should_not_exist(path: impl AsRef<Path>) {
    let path = path.as_ref();
    assert!(!path.exists(), "{:?} should not exist", path);
}

/// Asserts `path` inside `container` holds `content` (compared after trimming).
pub fn file_should_exist_in_container(o: &TestOption, container: &str, path: &str, content: &str) {
    assert_eq!(
        stdout_str(o, ["exec", container, "cat", path]),
        content,
        "unexpected content of {path} in container {container}"
    );
}

/// Asserts `cat path` inside `container` fails because the file is missing.
pub fn file_should_not_exist_in_container(o: &TestOption, container: &str, path: &str) {
    let session = run_without_successful_exit(o, ["exec", container, "cat", path]);
    let stderr = session.err_str();
    assert!(
        stderr.contains("No such file or directory"),
        "expected {path} to be missing in container {container}, stderr: {stderr}"
    );
}

/// Removes a scratch directory when dropped, even if the test panicked.
struct ScratchGuard(PathBuf);

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.0) {
            warn!("Failed to remove build context {:?}: {}", self.0, e);
        }
    }
}

/// Dockerfile of the image `build_image` produces.
pub fn dummy_dockerfile(base_image: &str) -> String {
    format!("FROM {base_image}\nCMD [\"echo\", \"{DUMMY_OUTPUT}\"]\n")
}

/// Builds `image` from `base_image` with a command that prints `DUMMY_OUTPUT`.
pub fn build_image(o: &TestOption, image: &str, base_image: &str) {
    let context = ScratchGuard(create_build_context(&dummy_dockerfile(base_image)));
    let context_path = context.0.to_string_lossy().into_owned();
    run(o, ["build", "-q", "-t", image, context_path.as_str()]);
}
