//! Configuration file support.
//!
//! Two optional locations are read:
//! - Global: `<config dir>/hermes-build/config.toml` - machine-wide defaults
//! - Project: `<sources>/.hermes-build/config.toml` - checkout-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// NuGet package id; also the stem of the nuspec, props and targets files.
pub const DEFAULT_PACKAGE_ID: &str = "Microsoft.JavaScript.Hermes";

/// Repository stamped into package metadata.
pub const DEFAULT_REPO_URL: &str = "https://github.com/microsoft/hermes-windows";

/// Visual Studio major version passed to `vswhere -version`.
pub const DEFAULT_VS_VERSION: &str = "17";

/// Orchestrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// NuGet packaging settings
    pub package: PackageConfig,

    /// Visual Studio discovery settings
    pub toolchain: ToolchainSettings,
}

/// NuGet packaging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PackageConfig {
    /// Package id (e.g., Microsoft.JavaScript.Hermes)
    pub id: Option<String>,

    /// Source repository URL written to the package metadata
    pub repo_url: Option<String>,
}

/// Visual Studio discovery settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Version range understood by `vswhere -version` (e.g., "17")
    pub vs_version: Option<String>,

    /// Explicit path to vswhere.exe
    pub vswhere: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.package.repo_url {
            Url::parse(url).with_context(|| format!("`package.repo-url` is not a URL: {}", url))?;
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.package.id.is_some() {
            self.package.id = other.package.id;
        }
        if other.package.repo_url.is_some() {
            self.package.repo_url = other.package.repo_url;
        }
        if other.toolchain.vs_version.is_some() {
            self.toolchain.vs_version = other.toolchain.vs_version;
        }
        if other.toolchain.vswhere.is_some() {
            self.toolchain.vswhere = other.toolchain.vswhere;
        }
    }

    pub fn package_id(&self) -> &str {
        self.package.id.as_deref().unwrap_or(DEFAULT_PACKAGE_ID)
    }

    pub fn repo_url(&self) -> &str {
        self.package.repo_url.as_deref().unwrap_or(DEFAULT_REPO_URL)
    }

    pub fn vs_version(&self) -> &str {
        self.toolchain
            .vs_version
            .as_deref()
            .unwrap_or(DEFAULT_VS_VERSION)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config path.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "hermes-build")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Get the project config path inside a Hermes checkout.
pub fn project_config_path(sources_root: &Path) -> PathBuf {
    sources_root.join(".hermes-build").join("config.toml")
}
