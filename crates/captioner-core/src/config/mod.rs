//! Configuration management for the captioner.
//!
//! Configuration is loaded from the platform config directory (falling back to
//! `~/.captioner/config.toml`), with every field defaulted.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Feature extractor settings
    pub extractor: ExtractorConfig,

    /// Caption decoder settings
    pub decoder: DecoderConfig,

    /// Vocabulary settings
    pub vocabulary: VocabularyConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.captioner.captioner/config.toml
    /// - Linux: ~/.config/captioner/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\captioner\config\config.toml
    ///
    /// Falls back to ~/.captioner/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "captioner", "captioner")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".captioner").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Resolved path of the feature extractor model.
    pub fn extractor_model_path(&self) -> PathBuf {
        self.resolve_artifact(&self.extractor.model)
    }

    /// Resolved path of the sequence predictor model.
    pub fn decoder_model_path(&self) -> PathBuf {
        self.resolve_artifact(&self.decoder.model)
    }

    /// Resolved path of the vocabulary artifact.
    pub fn vocabulary_path(&self) -> PathBuf {
        self.resolve_artifact(&self.vocabulary.file)
    }

    /// Artifacts are relative to the model directory unless absolute.
    fn resolve_artifact(&self, file: &Path) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(&file.to_string_lossy()).into_owned());
        if expanded.is_absolute() {
            expanded
        } else {
            self.model_dir().join(expanded)
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
