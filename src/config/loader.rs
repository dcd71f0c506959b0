//! Configuration loading

use anyhow::{Context, Result};
use std::path::Path;

use super::{paths, schema::Config};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the config file, or defaults if none exists
    pub fn load() -> Result<Config> {
        let path = paths::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_file(&path)
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}
