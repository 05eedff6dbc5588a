use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

pub const CONFIG_FILE: &str = "propschema.toml";

/// Settings read from `propschema.toml`; command-line flags take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schema: SchemaSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaSettings {
    /// Declare `_id` on closed documents
    #[serde(default)]
    pub with_id: bool,
    /// Use the model name as the document title
    #[serde(default)]
    pub title_from_name: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

/// Loaded configuration and the file it came from.
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    pub config_path: Option<PathBuf>,
    pub config: Config,
}

impl ProjectContext {
    /// Search the current directory and its ancestors for `propschema.toml`
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Defaults apply when no file is found
    pub fn find_from(start: &Path) -> Result<Self> {
        match Self::find_config(start) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(config_path: PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", config_path.display()))?;
        log::debug!("loaded configuration from {}", config_path.display());
        Ok(Self {
            config_path: Some(config_path),
            config,
        })
    }

    fn find_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }
}
