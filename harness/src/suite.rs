//! # Suite Context
//!
//! File: harness/src/suite.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A `Suite` is everything a test run shares: the `TestOption` describing the
//! subject, the image catalog and, while it runs, the local registry. It is
//! set up once before the first test and torn down once after the last.
//! Tests receive it by reference, so the registry's identity and image
//! references are never hidden in globals.
//!
//! ## Architecture
//!
//! - **`Suite::load` / `Suite::from_config`**: Resolve configuration and build the option.
//! - **`Suite::setup`**: Start the local registry when enabled.
//! - **`Suite::image`**: Reference a test should pull for a logical image, local when the
//!   registry runs and upstream otherwise.
//! - **`Suite::remove_all`**: The between-tests sweep, keeping the registry alive.
//! - **`Suite::teardown`**: Remove the registry and its images.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use common_tests::suite::Suite;
//! use common_tests::common::subject::LocalImage;
//! use common_tests::common::process;
//!
//! let mut suite = Suite::load()?;
//! suite.setup();
//!
//! let alpine = suite.image(LocalImage::Default);
//! process::run(suite.option(), ["pull", &alpine]);
//! suite.remove_all();
//!
//! suite.teardown();
//! ```
//!
use crate::common::subject::{
    assertions, remove_all, ImageCatalog, LocalImage, LocalRegistry, RegistrySettings, Retained,
};
use crate::core::config::{self, SuiteConfig};
use crate::core::error::Result;
use crate::option::TestOption;
use tracing::{info, warn};

/// Shared state of one test run.
#[derive(Debug)]
pub struct Suite {
    option: TestOption,
    images: ImageCatalog,
    registry_settings: RegistrySettings,
    use_local_registry: bool,
    registry: Option<LocalRegistry>,
}

impl Suite {
    /// Builds a suite from the layered configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration cannot be loaded or describes an invalid option.
    pub fn load() -> Result<Self> {
        Self::from_config(&config::load_suite_config()?)
    }

    /// Builds a suite from resolved settings.
    ///
    /// # Errors
    ///
    /// Fails when the settings describe an invalid option.
    pub fn from_config(config: &SuiteConfig) -> Result<Self> {
        Ok(Self {
            option: config.to_option()?,
            images: config.images.clone(),
            registry_settings: config.registry.clone(),
            use_local_registry: config.local_registry,
            registry: None,
        })
    }

    /// Wraps an existing option with default images and no local registry.
    pub fn with_option(option: TestOption) -> Self {
        Self {
            option,
            images: ImageCatalog::default(),
            registry_settings: RegistrySettings::default(),
            use_local_registry: false,
            registry: None,
        }
    }

    /// The option every command of the suite runs with.
    pub fn option(&self) -> &TestOption {
        &self.option
    }

    /// Mutable access for tests that reshape the environment overrides.
    pub fn option_mut(&mut self) -> &mut TestOption {
        &mut self.option
    }

    /// Starts the local registry if enabled and not already running.
    ///
    /// # Panics
    ///
    /// Panics if the registry cannot be started or populated.
    pub fn setup(&mut self) {
        if !self.use_local_registry {
            info!("Local registry disabled, tests pull upstream images");
            return;
        }
        if self.registry.is_some() {
            warn!("Local registry already running, skipping setup");
            return;
        }
        self.registry = Some(LocalRegistry::setup(
            &self.option,
            &self.images,
            &self.registry_settings,
        ));
    }

    /// The running registry, if any.
    pub fn registry(&self) -> Option<&LocalRegistry> {
        self.registry.as_ref()
    }

    /// Reference to pull for `image`.
    pub fn image(&self, image: LocalImage) -> String {
        self.registry
            .as_ref()
            .and_then(|registry| registry.image(image))
            .unwrap_or_else(|| self.images.upstream(image))
            .to_string()
    }

    /// Resources the sweep keeps: the registry's, or nothing.
    pub fn retained(&self) -> Retained {
        self.registry
            .as_ref()
            .map(LocalRegistry::retained)
            .unwrap_or_default()
    }

    /// Removes every resource except the local registry.
    pub fn remove_all(&self) {
        remove_all(&self.option, &self.retained());
    }

    /// Builds `name` on top of the default image; see `assertions::build_image`.
    pub fn build_image(&self, name: &str) {
        assertions::build_image(&self.option, name, &self.image(LocalImage::Default));
    }

    /// Removes the local registry, if one was started.
    pub fn teardown(&mut self) {
        match self.registry.take() {
            Some(registry) => registry.cleanup(&self.option),
            None => info!("No local registry to clean up"),
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn suite_without_registry() -> Suite {
        let config = SuiteConfig {
            subject: vec!["nerdctl".into()],
            local_registry: false,
            ..SuiteConfig::default()
        };
        Suite::from_config(&config).unwrap()
    }

    #[test]
    fn test_upstream_images_without_registry() {
        let mut suite = suite_without_registry();
        suite.setup();
        assert!(suite.registry().is_none());
        assert_eq!(
            suite.image(LocalImage::Default),
            "public.ecr.aws/docker/library/alpine:latest"
        );
        assert_eq!(suite.retained(), Retained::default());
    }

    #[test]
    fn test_teardown_without_registry_is_noop() {
        let mut suite = suite_without_registry();
        suite.teardown();
        assert!(suite.registry().is_none());
    }

    #[test]
    fn test_option_mut_reshapes_env() {
        let mut suite = Suite::with_option(TestOption::new(["finch"], vec![]).unwrap());
        suite.option_mut().update_env("COMPOSE_FILE", "a.yml");
        assert_eq!(suite.option().env_overrides(), ["COMPOSE_FILE=a.yml"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_registry_lifecycle_against_fake_subject() {
        use crate::common::subject::testing::{FakeSubject, FAKE_REGISTRY_CONTAINER_ID};

        let fake = FakeSubject::new();
        let mut suite = Suite {
            option: fake.option().clone(),
            images: ImageCatalog::default(),
            registry_settings: RegistrySettings {
                readiness_retries: 0,
                ..RegistrySettings::default()
            },
            use_local_registry: true,
            registry: None,
        };

        suite.setup();
        let port = suite.registry().map(LocalRegistry::host_port).unwrap();
        assert_eq!(
            suite.image(LocalImage::AmazonLinux2),
            format!("localhost:{port}/amazonlinux/amazonlinux:2")
        );
        assert_eq!(
            suite.retained().container_id.as_deref(),
            Some(FAKE_REGISTRY_CONTAINER_ID)
        );

        // The sweep leaves the registry container alone.
        fake.set("containers", &[FAKE_REGISTRY_CONTAINER_ID, "other"]);
        suite.remove_all();
        assert!(fake.mutations().contains(&"rm --force other".to_string()));

        suite.teardown();
        assert!(suite.registry().is_none());
        assert!(fake
            .calls()
            .contains(&format!("rm -f {FAKE_REGISTRY_CONTAINER_ID}")));
    }
}
