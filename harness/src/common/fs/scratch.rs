//! # Scratch Directories
//!
//! File: harness/src/common/fs/scratch.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Every helper here creates a fresh, uniquely named directory under the home
//! directory and returns a path inside it. The directory is *kept*: removing
//! it is the caller's job once the subject is done with it.
//!
//! | Helper                       | Directory prefix   | Returns                          |
//! |------------------------------|--------------------|----------------------------------|
//! | `create_temp_dir`            | caller's choice    | the directory                    |
//! | `create_temp_file`           | `finch-test`       | the file                         |
//! | `create_build_context`       | `finch-test`       | the directory holding `Dockerfile` |
//! | `create_compose_yml_context` | `finch-compose`    | the directory and `docker-compose.yml` |
//! | `create_tar_file_path`       | `finch-test-save`  | `test.tar` (not created)         |
//!
use super::io::write_file;
use crate::core::error::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TEMP_FILE_PREFIX: &str = "finch-test";
pub const COMPOSE_PREFIX: &str = "finch-compose";
pub const SAVE_PREFIX: &str = "finch-test-save";

pub const DOCKERFILE_NAME: &str = "Dockerfile";
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";
pub const TAR_FILE_NAME: &str = "test.tar";

/// Creates a directory named `<prefix><random>` under the home directory.
///
/// # Panics
///
/// Panics if the home directory is unknown or the directory cannot be created.
pub fn create_temp_dir(prefix: &str) -> PathBuf {
    or_fail(temp_dir_in(&home(), prefix))
}

/// Creates `filename` with `content` inside a new `finch-test` directory and
/// returns the file's path.
///
/// # Panics
///
/// Panics if the directory or file cannot be created.
pub fn create_temp_file(filename: &str, content: &str) -> PathBuf {
    or_fail(temp_file_in(&home(), filename, content))
}

/// Creates a build context holding a `Dockerfile` with `dockerfile` as its
/// content and returns the context directory.
///
/// # Panics
///
/// Panics if the directory or file cannot be created.
pub fn create_build_context(dockerfile: &str) -> PathBuf {
    or_fail(build_context_in(&home(), dockerfile))
}

/// Creates a `finch-compose` directory holding `docker-compose.yml`.
///
/// # Returns
///
/// `(directory, compose_file_path)`.
///
/// # Panics
///
/// Panics if the directory or file cannot be created.
pub fn create_compose_yml_context(compose_yml: &str) -> (PathBuf, PathBuf) {
    or_fail(compose_context_in(&home(), compose_yml))
}

/// Creates a `finch-test-save` directory and returns the path of a
/// `test.tar` inside it, for `save --output`. The file itself is not created.
///
/// # Panics
///
/// Panics if the directory cannot be created.
pub fn create_tar_file_path() -> PathBuf {
    or_fail(temp_dir_in(&home(), SAVE_PREFIX)).join(TAR_FILE_NAME)
}

fn home() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home,
        None => panic!("cannot determine the home directory for scratch space"),
    }
}

fn or_fail<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{e:#}"),
    }
}

fn temp_dir_in(base: &Path, prefix: &str) -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir_in(base)
        .with_context(|| format!("Failed to create a {prefix} directory in {:?}", base))?
        .keep();
    debug!("Created scratch directory {:?}", dir);
    Ok(dir)
}

fn temp_file_in(base: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let path = temp_dir_in(base, TEMP_FILE_PREFIX)?.join(filename);
    write_file(&path, content)?;
    Ok(path)
}

fn build_context_in(base: &Path, dockerfile: &str) -> Result<PathBuf> {
    let file = temp_file_in(base, DOCKERFILE_NAME, dockerfile)?;
    file.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("{:?} has no parent directory", file))
}

fn compose_context_in(base: &Path, compose_yml: &str) -> Result<(PathBuf, PathBuf)> {
    let dir = temp_dir_in(base, COMPOSE_PREFIX)?;
    let file = dir.join(COMPOSE_FILE_NAME);
    write_file(&file, compose_yml)?;
    Ok((dir, file))
}
