//! Toolchain configuration files.
//!
//! vcforge reads two optional configuration files:
//! - Global: `~/.vcforge/toolchain.toml` - User-wide defaults
//! - Project: `.vcforge/toolchain.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Visual Studio version assumed when none is configured (VS 2010).
pub const DEFAULT_MSVC_VERSION: u32 = 100;

/// Toolchain configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Toolchain settings
    pub toolchain: ToolchainSettings,
}

/// Settings used to locate the MSVC installation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Visual Studio version number, as embedded in `VS{version}COMNTOOLS`
    pub msvc_version: Option<u32>,

    /// Explicit common-tools directory, used instead of `VS{version}COMNTOOLS`
    pub install_hint: Option<PathBuf>,
}

impl ToolchainConfig {
    /// Load toolchain configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain config: {}", path.display()))
    }

    /// Load toolchain configuration with fallback to defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to load toolchain config from {}: {:#}",
                    path.display(),
                    e
                );
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save toolchain configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize toolchain config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write toolchain config: {}", path.display()))?;

        Ok(())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainConfig) {
        if other.toolchain.msvc_version.is_some() {
            self.toolchain.msvc_version = other.toolchain.msvc_version;
        }
        if other.toolchain.install_hint.is_some() {
            self.toolchain.install_hint = other.toolchain.install_hint;
        }
    }

    /// The configured Visual Studio version, or the default.
    pub fn msvc_version(&self) -> u32 {
        self.toolchain.msvc_version.unwrap_or(DEFAULT_MSVC_VERSION)
    }
}

/// Load merged toolchain configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.vcforge/toolchain.toml)
/// 2. Global config (~/.vcforge/toolchain.toml)
/// 3. Defaults
pub fn load_toolchain_config(global_path: Option<&Path>, project_path: &Path) -> ToolchainConfig {
    let mut config = ToolchainConfig::default();

    if let Some(global_path) = global_path {
        config.merge(ToolchainConfig::load_or_default(global_path));
    }

    config.merge(ToolchainConfig::load_or_default(project_path));

    config
}

/// Load the merged configuration for a project rooted at `project_root`.
pub fn load_for_project(project_root: &Path) -> ToolchainConfig {
    let global = global_toolchain_config_path();
    load_toolchain_config(
        global.as_deref(),
        &project_toolchain_config_path(project_root),
    )
}

/// Get the global vcforge config directory (~/.vcforge).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".vcforge"))
}

/// Get the global toolchain config path (~/.vcforge/toolchain.toml).
pub fn global_toolchain_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("toolchain.toml"))
}

/// Get the project toolchain config path (.vcforge/toolchain.toml).
pub fn project_toolchain_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".vcforge").join("toolchain.toml")
}
