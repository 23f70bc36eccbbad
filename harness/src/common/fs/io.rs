//! # File I/O Helpers
//!
//! File: harness/src/common/fs/io.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Thin wrappers over `std::fs` that attach the offending path to every error
//! with `anyhow::Context`.
//!
//! - **`write_file`**: Creates or truncates a file with mode `0644` on unix.
//! - **`read_file_to_string`**: Reads a whole file.
//! - **`check_if_file_exists`**: Reports whether anything exists at a path.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Permission bits for files the harness creates.
pub const FILE_MODE: u32 = 0o644;

/// Writes `data` to `path`, creating the file if needed and replacing any
/// previous content.
///
/// The parent directory must already exist.
///
/// # Errors
///
/// Returns an error with the path attached if the file cannot be opened or written.
pub fn write_file(path: &Path, data: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open {:?} for writing", path))?;
    file.write_all(data.as_bytes())
        .with_context(|| format!("Failed to write to file {:?}", path))?;
    debug!("Wrote {} bytes to {:?}", data.len(), path);
    Ok(())
}

/// Reads the entire content of `path` into a string.
///
/// # Errors
///
/// Returns an error with the path attached if the file cannot be read or is not UTF-8.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// True when `path` exists (file, directory or anything else `stat` accepts).
pub fn check_if_file_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).is_ok()
}
