//! # Cleanup Sweep
//!
//! File: harness/src/common/subject/cleanup.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `remove_all` returns the subject to an empty state between tests: no
//! containers, no images, no volumes, no custom networks. Resources named in a
//! `Retained` (the local registry's container and image) survive the sweep.
//!
//! ## Architecture
//!
//! The sweep runs four best-effort batches in order:
//!
//! 1. **Containers**: `rm --force <ids>` for every container except the retained one.
//! 2. **Images**: `rmi --force <ids>`, then a second pass `rmi --force <names>`
//!    for whatever names are still listed. Removing by ID does not always
//!    clear every tag, so the second pass retries once by the other key.
//! 3. **Volumes**: `volume prune --force --all` when any volume exists.
//! 4. **Networks**: `network rm <names>` for everything except `bridge`, `host` and `none`.
//!
//! An empty batch logs "No ... to be removed" and skips the invocation, since
//! an empty environment is the normal steady state.
//!
use super::query;
use crate::common::process::run;
use crate::option::TestOption;
use tracing::{info, instrument};

/// Networks every subject creates and that cannot be removed.
pub const DEFAULT_NETWORKS: [&str; 3] = ["bridge", "host", "none"];

/// Resources the sweep must leave in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Retained {
    /// Full ID of a container to keep.
    pub container_id: Option<String>,
    /// ID of an image to keep.
    pub image_id: Option<String>,
    /// `repository:tag` of an image to keep.
    pub image_name: Option<String>,
}

impl Retained {
    fn keeps(slot: &Option<String>, value: &str) -> bool {
        slot.as_deref() == Some(value)
    }
}

/// Removes all containers, images, volumes and custom networks except the
/// retained ones.
///
/// # Panics
///
/// Panics if a removal command fails.
#[instrument(skip(o))]
pub fn remove_all(o: &TestOption, retained: &Retained) {
    remove_containers(o, retained);
    remove_images(o, retained);
    remove_volumes(o);
    remove_networks(o);
}

/// Force-removes every container except `retained.container_id`.
#[instrument(skip_all)]
pub fn remove_containers(o: &TestOption, retained: &Retained) {
    let ids: Vec<String> = query::get_all_container_ids(o)
        .into_iter()
        .filter(|id| !Retained::keeps(&retained.container_id, id))
        .collect();
    if ids.is_empty() {
        info!("No containers to be removed");
        return;
    }
    info!(count = ids.len(), "Removing containers");
    run(o, ["rm", "--force"].into_iter().map(String::from).chain(ids));
}

/// Force-removes every image except the retained one, first by ID and then
/// by name.
#[instrument(skip_all)]
pub fn remove_images(o: &TestOption, retained: &Retained) {
    let ids: Vec<String> = query::get_all_image_ids(o)
        .into_iter()
        .filter(|id| !Retained::keeps(&retained.image_id, id))
        .collect();
    if nothing_to_remove(&ids) {
        return;
    }
    info!(count = ids.len(), "Removing images by ID");
    run(o, ["rmi", "--force"].into_iter().map(String::from).chain(ids));

    let names: Vec<String> = query::get_all_image_names(o)
        .into_iter()
        .filter(|name| !Retained::keeps(&retained.image_name, name))
        .collect();
    if nothing_to_remove(&names) {
        return;
    }
    info!(count = names.len(), "Removing leftover images by name");
    run(o, ["rmi", "--force"].into_iter().map(String::from).chain(names));
}

/// Prunes all volumes when at least one exists.
#[instrument(skip_all)]
pub fn remove_volumes(o: &TestOption) {
    if query::get_all_volume_names(o).is_empty() {
        info!("No volumes to be removed");
        return;
    }
    run(o, ["volume", "prune", "--force", "--all"]);
}

/// Removes every network except the built-in ones.
#[instrument(skip_all)]
pub fn remove_networks(o: &TestOption) {
    let custom: Vec<String> = query::get_all_network_names(o)
        .into_iter()
        .filter(|name| !DEFAULT_NETWORKS.contains(&name.as_str()))
        .collect();
    if custom.is_empty() {
        info!("No networks to be removed");
        return;
    }
    run(o, ["network", "rm"].into_iter().map(String::from).chain(custom));
}

fn nothing_to_remove(images: &[String]) -> bool {
    if images.is_empty() {
        info!("No images to be removed");
        return true;
    }
    false
}
