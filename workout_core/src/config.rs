//! Configuration file support for Treino.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/treino/config.toml`.

use crate::generator::{GeneratorSettings, DEFAULT_OVERSHOOT_TOLERANCE, DEFAULT_TIME_PER_SET};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Recommended workout generator tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_time_per_set")]
    pub time_per_set_seconds: u32,

    #[serde(default = "default_overshoot_tolerance")]
    pub overshoot_tolerance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            time_per_set_seconds: default_time_per_set(),
            overshoot_tolerance: default_overshoot_tolerance(),
        }
    }
}

impl From<&GeneratorConfig> for GeneratorSettings {
    fn from(config: &GeneratorConfig) -> Self {
        GeneratorSettings {
            time_per_set: config.time_per_set_seconds,
            overshoot_tolerance: config.overshoot_tolerance,
        }
    }
}

/// Catalog editing behaviour
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Refuse a second exercise with the same name in one sub-group
    #[serde(default)]
    pub reject_duplicates: bool,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("treino")
}

fn default_time_per_set() -> u32 {
    DEFAULT_TIME_PER_SET
}

fn default_overshoot_tolerance() -> f64 {
    DEFAULT_OVERSHOOT_TOLERANCE
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.generator.time_per_set_seconds == 0 {
            return Err(Error::Config("generator.time_per_set_seconds must be positive".into()));
        }
        let tolerance = self.generator.overshoot_tolerance;
        if tolerance.is_nan() || tolerance < 1.0 {
            return Err(Error::Config(format!(
                "generator.overshoot_tolerance must be at least 1.0 (got {})",
                tolerance
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("treino").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings::from(&self.generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generator.time_per_set_seconds, 45);
        assert_eq!(config.generator.overshoot_tolerance, 1.2);
        assert!(!config.catalog.reject_duplicates);
        assert!(config.data.data_dir.ends_with("treino"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("treino/config.toml");

        let mut config = Config::default();
        config.catalog.reject_duplicates = true;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert!(parsed.catalog.reject_duplicates);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[generator]
time_per_set_seconds = 30
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generator.time_per_set_seconds, 30);
        assert_eq!(config.generator.overshoot_tolerance, 1.2); // default

        let settings = config.generator_settings();
        assert_eq!(settings.time_per_set, 30);
    }

    #[test]
    fn test_rejects_tolerance_below_one() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[generator]\novershoot_tolerance = 0.5\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));

        std::fs::write(&path, "[generator]\novershoot_tolerance = nan\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));

        std::fs::write(&path, "[generator]\novershoot_tolerance = 1.0\n").unwrap();
        assert!(Config::load_from(&path).is_ok());
    }
}
