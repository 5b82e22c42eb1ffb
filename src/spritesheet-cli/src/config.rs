//! Configuration management for the spritesheet CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default binary atlas for `export`
    pub sprite_sheet_bin: Option<PathBuf>,
    /// Default sheet allow-list for `export`
    pub requirements: Option<PathBuf>,
    /// Default directory for `export` and `pack` output
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("spritesheet");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from the user config file, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))
    }

    /// Atlas binary: explicit path, then config, then `spritesheetf.bin`
    pub fn sprite_sheet_bin(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.sprite_sheet_bin.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SPRITE_SHEET_BIN))
    }

    /// Requirements file: explicit path, then config, then the default name
    pub fn requirements(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.requirements.clone())
            .unwrap_or_else(|| PathBuf::from(spritesheet::DEFAULT_REQUIREMENTS_FILE))
    }

    /// Output directory: explicit path, then config, then the working directory
    pub fn output_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// File name the game data extractor gives the atlas binary
pub const DEFAULT_SPRITE_SHEET_BIN: &str = "spritesheetf.bin";
