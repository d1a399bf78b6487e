use crate::constants::SETTINGS_FILE;
use crate::domain::Settings;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read settings file")?;

        let settings: Settings = toml::from_str(&content)
            .context("Failed to parse TOML settings")?;

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(?path, "No settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save settings to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize settings to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write settings file")?;

        Ok(())
    }

    /// Create default settings file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Self::default();
        settings.save(path)?;
        Ok(settings)
    }
}

/// `<config dir>/ankilink/settings.toml`
pub fn default_settings_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not find config directory")?;
    Ok(config_dir.join("ankilink").join(SETTINGS_FILE))
}
