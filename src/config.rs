//! @acp:module "Configuration"
//! @acp:summary "Discovery configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::discovery::{Discovery, DEFAULT_EXTENSION};
use crate::enumerate::{exclude_filter, BaseLocation};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".cmdscan.json";

/// @acp:summary "Discovery configuration (.cmdscan.json)"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Location of command modules: a directory or a dotted package reference.
    /// Unset means the caller's built-in location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<String>,

    /// Extension of command module sources
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Run the static pre-filter before loading
    #[serde(default = "default_true")]
    pub safe: bool,

    /// Glob patterns over module stems to leave out
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Roots for absolute package references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_roots: Vec<PathBuf>,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_exclude() -> Vec<String> {
    vec![
        // Private modules (_base, _util, ...)
        "_*".to_string(),
        // Module roots
        "mod".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commands: None,
            extension: default_extension(),
            safe: true,
            exclude: default_exclude(),
            search_roots: Vec::new(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Configured location, or `fallback` when unset
    pub fn location(&self, fallback: BaseLocation, anchor: Option<&Path>) -> BaseLocation {
        match &self.commands {
            Some(value) => BaseLocation::parse(value, anchor),
            None => fallback,
        }
    }

    /// Apply extension, filter, toggle and search roots to `discovery`
    pub fn apply(&self, discovery: Discovery) -> anyhow::Result<Discovery> {
        Ok(discovery
            .extension(self.extension.clone())
            .boxed_name_filter(exclude_filter(&self.exclude)?)
            .search_roots(self.search_roots.clone())
            .safe(self.safe))
    }
}
