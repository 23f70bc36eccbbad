//! # Subject State Management (`common::subject`)
//!
//! File: harness/src/common/subject/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Helpers that look at or reshape the subject's resource state, as opposed
//! to `process`, which only knows how to run one command.
//!
//! ## Architecture
//!
//! - **`query`**: `get_all_container_ids`, `get_all_image_ids`, `get_all_image_names`, `get_all_volume_names`, `get_all_network_names`.
//! - **`cleanup`**: The `remove_all` sweep and the `Retained` exclusions.
//! - **`registry`**: The local registry lifecycle and the image catalog.
//! - **`assertions`**: Should-exist / should-not-exist checks and `build_image`.
//! - **`version`**: Gating a test on the subject's nerdctl version.
//!
pub mod assertions;
pub mod cleanup;
pub mod query;
pub mod registry;
pub mod version;

#[cfg(all(test, unix))]
pub(crate) mod testing;

pub use cleanup::{remove_all, Retained};
pub use registry::{ImageCatalog, LocalImage, LocalRegistry, RegistrySettings};
pub use version::require_nerdctl_version;
