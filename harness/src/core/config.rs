//! # Suite Configuration
//!
//! File: harness/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A downstream test binary needs to know which subject to drive and how that
//! subject behaves before a single test runs. This module resolves those
//! settings from layered sources, so the same test binary can be pointed at
//! `finch`, `nerdctl` or a VM-wrapped `limactl shell ... nerdctl` without
//! recompiling.
//!
//! ## Architecture
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults (subject `finch`, passthrough on, local registry on).
//! 2. User file `config.toml` in the platform config directory.
//! 3. Project file `.common-tests.toml` in the current directory or an
//!    ancestor, searching no further than the first directory holding `.git`.
//! 4. The file named by `COMMON_TESTS_CONFIG`.
//! 5. Environment variables (`COMMON_TESTS_SUBJECT`, `COMMON_TESTS_NERDCTL_VERSION`,
//!    `COMMON_TESTS_ENV_PASSTHROUGH`, `COMMON_TESTS_LOCAL_REGISTRY`).
//!
//! Every file layer is a `ConfigFile` whose fields are all optional, so a
//! file only overrides what it mentions. Unknown keys are rejected.
//!
//! ## Examples
//!
//! ```toml
//! # .common-tests.toml
//! subject = ["limactl", "shell", "finch", "nerdctl"]
//! nerdctl_version = "1.7.7"
//! env = ["CONTAINERD_SNAPSHOTTER=overlayfs"]
//!
//! [local_registry]
//! readiness_retries = 60
//!
//! [images]
//! nginx = "mirror.example/library/nginx:latest"
//! ```
//!
//! ```rust,ignore
//! let cfg = config::load_suite_config()?;
//! let o = cfg.to_option()?;
//! ```
//!
use crate::common::subject::registry::{ImageCatalog, RegistrySettings};
use crate::core::error::{HarnessError, Result};
use crate::option::{modifier, Modifier, TestOption};
use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Whitespace-separated subject, e.g. `limactl shell finch nerdctl`.
pub const ENV_SUBJECT: &str = "COMMON_TESTS_SUBJECT";
/// nerdctl version (or `N.x.x` pattern) the subject wraps.
pub const ENV_NERDCTL_VERSION: &str = "COMMON_TESTS_NERDCTL_VERSION";
/// Boolean; whether the subject forwards host variables into containers.
pub const ENV_PASSTHROUGH: &str = "COMMON_TESTS_ENV_PASSTHROUGH";
/// Boolean; whether the suite mirrors images into a local registry.
pub const ENV_LOCAL_REGISTRY: &str = "COMMON_TESTS_LOCAL_REGISTRY";
/// Path of an extra configuration file applied above the project file.
pub const ENV_CONFIG_FILE: &str = "COMMON_TESTS_CONFIG";

const PROJECT_CONFIG_FILENAME: &str = ".common-tests.toml";
const USER_CONFIG_FILENAME: &str = "config.toml";
const DEFAULT_SUBJECT: &str = "finch";

/// One configuration file. Absent keys leave the lower layer untouched.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub subject: Option<Vec<String>>,
    pub nerdctl_version: Option<String>,
    pub env_var_passthrough: Option<bool>,
    pub env: Option<Vec<String>>,
    #[serde(default)]
    pub local_registry: RegistryFile,
    #[serde(default)]
    pub images: ImagesFile,
}

/// `[local_registry]` table.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegistryFile {
    pub enabled: Option<bool>,
    pub image: Option<String>,
    pub readiness_retries: Option<usize>,
}

/// `[images]` table, overriding individual upstream references.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ImagesFile {
    pub default: Option<String>,
    pub older_alpine: Option<String>,
    pub amazon_linux2: Option<String>,
    pub nginx: Option<String>,
}

/// Fully resolved suite settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteConfig {
    /// Program name followed by fixed prefix arguments.
    pub subject: Vec<String>,
    /// `None` keeps the option's default dialect.
    pub nerdctl_version: Option<String>,
    pub env_var_passthrough: bool,
    /// `KEY=VALUE` overrides for every invocation.
    pub env: Vec<String>,
    pub local_registry: bool,
    pub registry: RegistrySettings,
    pub images: ImageCatalog,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            subject: vec![DEFAULT_SUBJECT.to_string()],
            nerdctl_version: None,
            env_var_passthrough: true,
            env: Vec::new(),
            local_registry: true,
            registry: RegistrySettings::default(),
            images: ImageCatalog::default(),
        }
    }
}

impl SuiteConfig {
    /// Overlays the keys present in `file`.
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(subject) = file.subject {
            self.subject = subject;
        }
        if let Some(version) = file.nerdctl_version {
            self.nerdctl_version = Some(version);
        }
        if let Some(passthrough) = file.env_var_passthrough {
            self.env_var_passthrough = passthrough;
        }
        if let Some(env) = file.env {
            self.env = env;
        }

        let registry = file.local_registry;
        if let Some(enabled) = registry.enabled {
            self.local_registry = enabled;
        }
        if let Some(image) = registry.image {
            self.registry.image = image;
        }
        if let Some(retries) = registry.readiness_retries {
            self.registry.readiness_retries = retries;
        }

        let images = file.images;
        for (slot, value) in [
            (&mut self.images.default, images.default),
            (&mut self.images.older_alpine, images.older_alpine),
            (&mut self.images.amazon_linux2, images.amazon_linux2),
            (&mut self.images.nginx, images.nginx),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    /// Overlays the `COMMON_TESTS_*` variables found through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Config` for a boolean variable that is not a
    /// recognized boolean.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(subject) = lookup(ENV_SUBJECT) {
            self.subject = subject.split_whitespace().map(str::to_string).collect();
        }
        if let Some(version) = lookup(ENV_NERDCTL_VERSION) {
            self.nerdctl_version = Some(version.trim().to_string());
        }
        if let Some(value) = lookup(ENV_PASSTHROUGH) {
            self.env_var_passthrough = parse_bool(ENV_PASSTHROUGH, &value)?;
        }
        if let Some(value) = lookup(ENV_LOCAL_REGISTRY) {
            self.local_registry = parse_bool(ENV_LOCAL_REGISTRY, &value)?;
        }
        Ok(())
    }

    /// Expands `~` in the subject words.
    fn expand_paths(&mut self) {
        for word in &mut self.subject {
            *word = shellexpand::tilde(word).into_owned();
        }
        debug!("Expanded subject: {:?}", self.subject);
    }

    /// Checks the resolved settings.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Config` for an empty subject or a blank registry image.
    pub fn validate(&self) -> Result<()> {
        if self.subject.is_empty() {
            anyhow::bail!(HarnessError::Config(format!(
                "subject must not be empty (set {} or `subject` in {})",
                ENV_SUBJECT, PROJECT_CONFIG_FILENAME
            )));
        }
        if self.local_registry && self.registry.image.trim().is_empty() {
            anyhow::bail!(HarnessError::Config(
                "local_registry.image must not be empty".to_string()
            ));
        }
        Ok(())
    }

    /// The modifiers that express these settings on a `TestOption`.
    pub fn modifiers(&self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        if !self.env.is_empty() {
            modifiers.push(modifier::env(self.env.clone()));
        }
        if !self.env_var_passthrough {
            modifiers.push(modifier::with_no_environment_variable_passthrough());
        }
        if let Some(version) = &self.nerdctl_version {
            modifiers.push(modifier::with_nerdctl_version(version.clone()));
        }
        modifiers
    }

    /// Builds the option every test of the suite shares.
    ///
    /// # Errors
    ///
    /// Fails when the subject is empty or the nerdctl version is malformed.
    pub fn to_option(&self) -> Result<TestOption> {
        let option = TestOption::new(self.subject.clone(), self.modifiers())
            .context("Failed to build the test option from configuration")?;
        Ok(option)
    }
}

/// Resolves the suite configuration from every source.
///
/// # Errors
///
/// Fails when a present configuration file cannot be read or parsed, an
/// environment variable is malformed, or validation fails.
pub fn load_suite_config() -> Result<SuiteConfig> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    load_suite_config_from(&current_dir, user_config_path(), |key| {
        std::env::var(key).ok()
    })
}

/// `load_suite_config` with every ambient input made explicit.
pub fn load_suite_config_from<F>(
    start_dir: &Path,
    user_file: Option<PathBuf>,
    lookup: F,
) -> Result<SuiteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = SuiteConfig::default();

    if let Some(path) = user_file.filter(|p| p.is_file()) {
        info!("Loading user configuration from: {}", path.display());
        config.apply_file(load_config_file(&path)?);
    }
    if let Some(path) = find_project_config_path(start_dir) {
        info!("Loading project configuration from: {}", path.display());
        config.apply_file(load_config_file(&path)?);
    }
    if let Some(path) = lookup(ENV_CONFIG_FILE).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(shellexpand::tilde(&path).into_owned());
        info!("Loading configuration from {}: {}", ENV_CONFIG_FILE, path.display());
        config.apply_file(load_config_file(&path)?);
    }
    config.apply_env(&lookup)?;
    config.expand_paths();
    config.validate().context("Configuration validation failed")?;

    debug!("Final suite configuration: {:?}", config);
    Ok(config)
}

fn user_config_path() -> Option<PathBuf> {
    match ProjectDirs::from("com", "CommonTests", "common-tests") {
        Some(dirs) => Some(dirs.config_dir().join(USER_CONFIG_FILENAME)),
        None => {
            warn!("Could not determine user config directory.");
            None
        }
    }
}

fn find_project_config_path(start_dir: &Path) -> Option<PathBuf> {
    let mut path = start_dir;
    loop {
        let candidate = path.join(PROJECT_CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

/// Reads and parses one configuration file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid TOML for `ConfigFile`.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(HarnessError::Config(format!(
            "{key} must be a boolean (true/false), got '{other}'"
        ))
        .into()),
    }
}
