//! # Targzip Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration system for targzip, handling loading,
//! merging, validation, and conversion of configuration data into the runtime
//! `ArchiveSettings` consumed by every archive operation.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.targzip.toml` in current directory or ancestors
//! 2. User-specific `<config dir>/targzip/config.toml`
//! 3. Default values defined in the code
//!
//! Files are merged as TOML tables before deserialization, key by key within each
//! section. A key present in the project file wins even when its value equals the
//! built-in default, so a project can restore a default the user file overrides.
//!
//! Paths are expanded (`~` to home directory) and values are validated before use.
//!
//! ## Examples
//!
//! ```toml
//! [archive]
//! copy_buffer_size = 65536
//!
//! [gzip]
//! chunk_size = 65536
//! pipe_capacity = 16
//! handoff = "overlapped"
//!
//! [extract]
//! path_policy = "reject"
//! default_destination = "~/unpacked"
//! ```
//!
//! ```rust,ignore
//! let cfg = config::load_config()?;
//! let settings = cfg.settings();
//! let names = tar_gz::view_path(archive, &settings)?;
//! ```
//!
use crate::common::archive::{ArchiveSettings, Handoff, PathPolicy};
use crate::core::error::{Result, TargzipError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub gzip: GzipConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Settings for writing tar containers.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Size of the fixed copy buffer used for entry bodies, in bytes.
    #[serde(default = "default_copy_buffer_size")]
    pub copy_buffer_size: usize,
}

/// Settings for the gzip bridge.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GzipConfig {
    /// Bytes decoded per chunk by the background worker.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Number of chunks the pipe holds before the worker blocks.
    #[serde(default = "default_pipe_capacity")]
    pub pipe_capacity: usize,
    /// Whether the tar reader overlaps with the decode worker or waits for it.
    #[serde(default)]
    pub handoff: Handoff,
}

/// Settings for extraction.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    /// What to do with entry names that escape the destination.
    #[serde(default)]
    pub path_policy: PathPolicy,
    /// Destination used by the CLI when none is given (can use ~). Will be expanded.
    #[serde(default = "default_destination")]
    pub default_destination: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            copy_buffer_size: default_copy_buffer_size(),
        }
    }
}

impl Default for GzipConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            pipe_capacity: default_pipe_capacity(),
            handoff: Handoff::default(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            path_policy: PathPolicy::default(),
            default_destination: default_destination(),
        }
    }
}

impl Config {
    /// Builds the runtime settings passed to archive operations.
    pub fn settings(&self) -> ArchiveSettings {
        ArchiveSettings {
            copy_buffer_size: self.archive.copy_buffer_size,
            chunk_size: self.gzip.chunk_size,
            pipe_capacity: self.gzip.pipe_capacity,
            handoff: self.gzip.handoff,
            path_policy: self.extract.path_policy,
        }
    }
}

fn default_copy_buffer_size() -> usize {
    ArchiveSettings::DEFAULT_COPY_BUFFER_SIZE
}
fn default_chunk_size() -> usize {
    ArchiveSettings::DEFAULT_CHUNK_SIZE
}
fn default_pipe_capacity() -> usize {
    ArchiveSettings::DEFAULT_PIPE_CAPACITY
}
fn default_destination() -> String {
    ".".to_string()
}

const PROJECT_CONFIG_FILENAME: &str = ".targzip.toml";

/// Loads, merges, expands and validates the configuration.
pub fn load_config() -> Result<Config> {
    let user_layer = load_user_config()?;
    let project_layer = load_project_config()?;
    let merged_config = build_config(user_layer, project_layer)?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn build_config(user: Option<toml::Table>, project: Option<toml::Table>) -> Result<Config> {
    let merged = merge_layers(user.unwrap_or_default(), project);
    let mut config: Config = toml::Value::Table(merged)
        .try_into()
        .context("Failed to read merged configuration")?;
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

fn load_user_config() -> Result<Option<toml::Table>> {
    let Some(proj_dirs) = ProjectDirs::from("org", "targzip", "targzip") else {
        debug!("Could not determine user config directory.");
        return Ok(None);
    };
    let config_path = proj_dirs.config_dir().join("config.toml");
    if config_path.exists() {
        info!("Loading user configuration from: {}", config_path.display());
        load_layer_from_path(&config_path).map(Some)
    } else {
        debug!(
            "User configuration file not found at {}",
            config_path.display()
        );
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<toml::Table>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_layer_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.targzip.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
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

/// Reads one configuration file as a raw table, after checking it against `Config`
/// so schema errors name the file they come from.
fn load_layer_from_path(path: &Path) -> Result<toml::Table> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str::<Config>(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Overlays `project` on `user`. Sections are merged key by key; any other value
/// present in `project` replaces the user's.
fn merge_layers(mut user: toml::Table, project: Option<toml::Table>) -> toml::Table {
    let Some(project) = project else {
        return user;
    };
    for (key, value) in project {
        match value {
            toml::Value::Table(overlay) => {
                if let Some(toml::Value::Table(base)) = user.get_mut(&key) {
                    base.extend(overlay);
                } else {
                    user.insert(key, toml::Value::Table(overlay));
                }
            }
            other => {
                user.insert(key, other);
            }
        }
    }
    user
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.extract.default_destination =
        shellexpand::tilde(&config.extract.default_destination).into_owned();
    debug!(
        "Expanded default extraction destination: {}",
        config.extract.default_destination
    );
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    let checks = [
        ("archive.copy_buffer_size", config.archive.copy_buffer_size),
        ("gzip.chunk_size", config.gzip.chunk_size),
        ("gzip.pipe_capacity", config.gzip.pipe_capacity),
    ];
    for (name, value) in checks {
        if value == 0 {
            return Err(anyhow!(TargzipError::Config(format!(
                "{name} must be greater than zero"
            ))));
        }
    }
    if config.extract.default_destination.is_empty() {
        return Err(anyhow!(TargzipError::Config(
            "extract.default_destination cannot be empty".to_string()
        )));
    }
    Ok(())
}
