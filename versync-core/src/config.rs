//! TOML configuration for discovery and workspace execution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the optional project configuration file.
pub const CONFIG_FILE_NAME: &str = "versync.toml";

/// Default name of the per-module version file.
pub const DEFAULT_VERSION_FILE: &str = ".version";

/// Directories never descended into, regardless of user configuration.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    "vendor",
    "tmp",
    "build",
    "dist",
    ".cache",
    "__pycache__",
    "target",
];

fn default_true() -> bool {
    true
}

fn default_module_max_depth() -> usize {
    10
}

fn default_manifest_max_depth() -> usize {
    3
}

fn default_version_file() -> String {
    DEFAULT_VERSION_FILE.to_string()
}

/// Project configuration as defined in `versync.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version_file")]
    pub version_file: String,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version_file: default_version_file(),
            discovery: DiscoveryConfig::default(),
            workspace: WorkspaceConfig::default(),
        }
    }
}

/// Discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When false only the root directory is examined.
    #[serde(default = "default_true")]
    pub recursive: bool,
    #[serde(default = "default_module_max_depth")]
    pub module_max_depth: usize,
    #[serde(default = "default_manifest_max_depth")]
    pub manifest_max_depth: usize,
    /// User exclude patterns, merged with [`DEFAULT_EXCLUDES`].
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recursive: true,
            module_max_depth: default_module_max_depth(),
            manifest_max_depth: default_manifest_max_depth(),
            exclude: Vec::new(),
        }
    }
}

impl DiscoveryConfig {
    /// Built-in excludes followed by user patterns, first occurrence wins.
    pub fn effective_excludes(&self) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(DEFAULT_EXCLUDES.len() + self.exclude.len());
        let candidates = DEFAULT_EXCLUDES
            .iter()
            .map(|s| s.to_string())
            .chain(self.exclude.iter().map(|s| s.trim().to_string()));
        for pattern in candidates {
            if !pattern.is_empty() && !merged.contains(&pattern) {
                merged.push(pattern);
            }
        }
        merged
    }
}

/// Defaults for multi-module operations; CLI flags override these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Config {
    /// Parses a configuration document.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `versync.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let config: Config = toml::from_str(&content).map_err(|error| Error::Toml {
            error,
            context: path.display().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let name = self.version_file.trim();
        if name.is_empty() {
            return Err(Error::Config("version_file must not be empty".to_string()));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(Error::Config(format!(
                "version_file must be a bare file name, got '{}'",
                self.version_file
            )));
        }
        Ok(())
    }
}
