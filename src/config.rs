//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::constants::*;
use crate::protocol::LineSelector;
use crate::tier::TierPreference;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Volume control defaults
    pub control: ControlConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Volume control defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Line used when none is given on the command line
    pub line: LineSelector,

    /// Backend tier, `auto` probes the OS
    pub tier: TierPreference,

    /// Also drive the waveform register on legacy hosts
    pub wave_register: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            line: LineSelector::PrimaryOutput,
            tier: TierPreference::Auto,
            wave_register: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", APP_NAME, APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [control]
            line = "line-in"
            "#,
        )
        .unwrap();

        assert_eq!(config.control.line, LineSelector::LegacyLineIn);
        assert_eq!(config.control.tier, TierPreference::Auto);
        assert!(!config.control.wave_register);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.control.tier = TierPreference::Legacy;
        config.control.wave_register = true;
        config.control.line = LineSelector::LegacyMidiSynth;

        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains(r#"line = "midi""#));
        assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let err = AppConfig::from_toml("[control]\ntier = \"ancient\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("mastervol-test-missing/config.toml");
        let config = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("mastervol-test-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut config = AppConfig::default();
        config.logging.filter = "mastervol=debug".into();

        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(loaded, config);
    }
}
