//! # Local Registry Lifecycle
//!
//! File: harness/src/common/subject/registry.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Public registries are slow and rate-limited under parallel CI. Before a
//! suite runs, `LocalRegistry::setup` starts a throwaway registry container on
//! a free host port and copies every catalog image into it. Tests then pull
//! `localhost:<port>/...` references, which are fast, offline and resolve to
//! the same content as their upstream counterparts.
//!
//! ## Architecture
//!
//! Setup, in order:
//!
//! 1. Sweep the environment with `remove_all` (nothing retained yet).
//! 2. Pick a free host port and `run -d -p <port>:5000 --name local-registry <image>`.
//! 3. Record the container ID and the registry image ID (`images -q`, the only image left).
//! 4. Wait for `GET /v2/` to answer 200, unless readiness retries is 0.
//! 5. For each catalog entry: `pull`, `tag` as the local reference, `push`, and
//!    `rmi` the upstream reference so only the local copy stays resident.
//!
//! `cleanup` reverses this: resolve the registry container by name, remove it,
//! then force-remove whatever images are left.
//!
//! The registry's identity is exposed as a `Retained` so the sweep between
//! tests leaves it running.
//!
use super::cleanup::{remove_all, Retained};
use crate::common::network::{get_free_port, http_get_and_assert};
use crate::common::process::{run, stdout_as_lines, stdout_str, Command};
use crate::option::TestOption;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument};

/// Container name of the registry.
pub const REGISTRY_NAME: &str = "local-registry";
/// Port the registry listens on inside its container.
pub const REGISTRY_CONTAINER_PORT: u16 = 5000;
/// Default registry image.
pub const REGISTRY_IMAGE: &str = "public.ecr.aws/docker/library/registry:latest";
/// Default number of readiness attempts before setup fails.
pub const DEFAULT_READINESS_RETRIES: usize = 30;

const READINESS_INTERVAL: Duration = Duration::from_millis(500);
/// Pulls and pushes move whole images and regularly exceed the default timeout.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// Logical names of the images tests pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalImage {
    /// Current alpine; the base of most scenarios.
    Default,
    /// An older alpine, for tests that need two distinct images.
    OlderAlpine,
    AmazonLinux2,
    Nginx,
}

impl LocalImage {
    pub const ALL: [LocalImage; 4] = [
        LocalImage::Default,
        LocalImage::OlderAlpine,
        LocalImage::AmazonLinux2,
        LocalImage::Nginx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocalImage::Default => "default",
            LocalImage::OlderAlpine => "older_alpine",
            LocalImage::AmazonLinux2 => "amazon_linux2",
            LocalImage::Nginx => "nginx",
        }
    }
}

impl fmt::Display for LocalImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Upstream reference for every `LocalImage`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageCatalog {
    pub default: String,
    pub older_alpine: String,
    pub amazon_linux2: String,
    pub nginx: String,
}

impl Default for ImageCatalog {
    fn default() -> Self {
        Self {
            default: "public.ecr.aws/docker/library/alpine:latest".to_string(),
            older_alpine: "public.ecr.aws/docker/library/alpine:3.13".to_string(),
            amazon_linux2: "public.ecr.aws/amazonlinux/amazonlinux:2".to_string(),
            nginx: "public.ecr.aws/docker/library/nginx:latest".to_string(),
        }
    }
}

impl ImageCatalog {
    /// The upstream reference of `image`.
    pub fn upstream(&self, image: LocalImage) -> &str {
        match image {
            LocalImage::Default => &self.default,
            LocalImage::OlderAlpine => &self.older_alpine,
            LocalImage::AmazonLinux2 => &self.amazon_linux2,
            LocalImage::Nginx => &self.nginx,
        }
    }

    /// Every entry in `LocalImage::ALL` order.
    pub fn entries(&self) -> impl Iterator<Item = (LocalImage, &str)> + '_ {
        LocalImage::ALL
            .into_iter()
            .map(move |image| (image, self.upstream(image)))
    }
}

/// How the registry container is started and checked for readiness.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrySettings {
    /// Registry image to run.
    pub image: String,
    /// `GET /v2/` attempts before setup fails; 0 disables the check.
    pub readiness_retries: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            image: REGISTRY_IMAGE.to_string(),
            readiness_retries: DEFAULT_READINESS_RETRIES,
        }
    }
}

/// Reference of `upstream` inside a registry on `localhost:<host_port>`.
///
/// The registry host (everything up to the first `/`) is replaced, so
/// `public.ecr.aws/docker/library/alpine:latest` becomes
/// `localhost:<port>/docker/library/alpine:latest`. A reference without a
/// host is kept whole.
pub fn local_reference(host_port: u16, upstream: &str) -> String {
    let name = upstream
        .split_once('/')
        .map_or(upstream, |(_, name)| name);
    format!("localhost:{host_port}/{name}")
}

/// A running local registry populated with the catalog images.
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    container_id: String,
    image_id: String,
    image_name: String,
    host_port: u16,
    images: BTreeMap<LocalImage, String>,
}

impl LocalRegistry {
    /// Starts the registry and pushes every catalog image into it.
    ///
    /// # Panics
    ///
    /// Panics if any step fails; the suite cannot run without its images.
    #[instrument(skip_all, fields(image = %settings.image))]
    pub fn setup(o: &TestOption, catalog: &ImageCatalog, settings: &RegistrySettings) -> Self {
        remove_all(o, &Retained::default());

        let host_port = get_free_port();
        info!(host_port, "Starting local registry");
        let container_id = stdout_str(
            o,
            [
                "run".to_string(),
                "-d".to_string(),
                "-p".to_string(),
                format!("{host_port}:{REGISTRY_CONTAINER_PORT}"),
                "--name".to_string(),
                REGISTRY_NAME.to_string(),
                settings.image.clone(),
            ],
        );
        // The sweep above left the registry image as the only image.
        let image_id = stdout_str(o, ["images", "-q"]);

        if settings.readiness_retries > 0 {
            http_get_and_assert(
                &format!("http://localhost:{host_port}/v2/"),
                200,
                settings.readiness_retries,
                READINESS_INTERVAL,
            );
        }

        let mut images = BTreeMap::new();
        for (image, upstream) in catalog.entries() {
            let local = local_reference(host_port, upstream);
            info!(%image, upstream, local = %local, "Mirroring image into local registry");
            transfer(o, ["pull", upstream]);
            run(o, ["tag", upstream, local.as_str()]);
            transfer(o, ["push", local.as_str()]);
            run(o, ["rmi", upstream]);
            images.insert(image, local);
        }

        Self {
            container_id,
            image_id,
            image_name: settings.image.clone(),
            host_port,
            images,
        }
    }

    /// Removes the registry container and every remaining image.
    ///
    /// # Panics
    ///
    /// Panics if the registry container cannot be found or removed.
    #[instrument(skip_all, fields(host_port = self.host_port))]
    pub fn cleanup(self, o: &TestOption) {
        let container_id = stdout_str(o, ["inspect", REGISTRY_NAME, "--format", "{{.ID}}"]);
        run(o, ["rm", "-f", container_id.as_str()]);

        let image_ids = stdout_as_lines(o, ["images", "-q"]);
        if image_ids.is_empty() {
            info!("No images to be removed");
            return;
        }
        run(o, ["rmi".to_string(), "-f".to_string()].into_iter().chain(image_ids));
        info!("Local registry removed");
    }

    /// Identity of a registry container left running by an earlier setup.
    ///
    /// Returns `None` when no container named `local-registry` exists, so a
    /// standalone sweep can keep a registry that another suite still needs.
    pub fn running(o: &TestOption, settings: &RegistrySettings) -> Option<Retained> {
        let inspect = Command::new(o, ["inspect", REGISTRY_NAME, "--format", "{{.ID}}"])
            .without_checking_exit_code()
            .run();
        if inspect.exit_code() != Some(0) {
            return None;
        }
        let container_id = inspect.out_str().trim().to_string();
        if container_id.is_empty() {
            return None;
        }

        let image_id = stdout_as_lines(o, ["images", "-q", settings.image.as_str()])
            .into_iter()
            .next();
        Some(Retained {
            container_id: Some(container_id),
            image_id,
            image_name: Some(settings.image.clone()),
        })
    }

    /// Identity the cleanup sweep must keep.
    pub fn retained(&self) -> Retained {
        Retained {
            container_id: Some(self.container_id.clone()),
            image_id: Some(self.image_id.clone()),
            image_name: Some(self.image_name.clone()),
        }
    }

    /// Local reference of `image`.
    pub fn image(&self, image: LocalImage) -> Option<&str> {
        self.images.get(&image).map(String::as_str)
    }

    /// Every mirrored image with its local reference.
    pub fn images(&self) -> &BTreeMap<LocalImage, String> {
        &self.images
    }

    pub fn host_port(&self) -> u16 {
        self.host_port
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }
}

fn transfer<const N: usize>(o: &TestOption, args: [&str; N]) {
    Command::new(o, args).with_timeout(TRANSFER_TIMEOUT).run();
}
