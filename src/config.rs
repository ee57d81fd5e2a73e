//! Configuration management and validation.
//!
//! Provides the settings for a conversion run: taxonomy service access,
//! coordinate transform options, validation policy and reporting. Settings
//! come from defaults, an optional TOML config file and CLI overrides, in
//! that order.

use crate::constants::{
    APP_NAME, CONFIG_FILE_NAME, DEFAULT_LENGTH_SCALE, DEFAULT_VERNACULAR_LANGUAGE, WORMS_BASE_URL,
};
use crate::error::{KrmError, Result};
use crate::transform::TransformOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Taxonomy service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// WoRMS REST base URL
    pub base_url: String,

    /// Language of the vernacular names to keep
    pub language: String,

    /// Skip the service and emit only the Aphia ID
    pub offline: bool,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            base_url: WORMS_BASE_URL.to_string(),
            language: DEFAULT_VERNACULAR_LANGUAGE.to_string(),
            offline: false,
        }
    }
}

/// Global configuration for KRM conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KrmConfig {
    pub taxonomy: TaxonomyConfig,

    /// Multiplier applied to coordinates (1.0 keeps file units)
    pub length_scale: f64,

    /// Require every coordinate row to match the first row's field count
    pub strict_arity: bool,

    /// Validate the specimen metadata file against the schema as well
    pub validate_specimen: bool,

    /// Treat schema violations as fatal instead of reporting them
    pub fail_on_invalid: bool,

    /// Print a silhouette summary after conversion
    pub print_summary: bool,

    /// Write TOML with one array element per line
    pub pretty_output: bool,
}

impl Default for KrmConfig {
    fn default() -> Self {
        Self {
            taxonomy: TaxonomyConfig::default(),
            length_scale: DEFAULT_LENGTH_SCALE,
            strict_arity: false,
            validate_specimen: true,
            fail_on_invalid: false,
            print_summary: false,
            pretty_output: false,
        }
    }
}

impl KrmConfig {
    /// Default config file location in the user config directory
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| KrmError::Configuration {
            message: "Could not determine user config directory".to_string(),
        })?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load settings from a TOML file; missing keys keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(KrmError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: KrmConfig = toml::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load an explicit config file, else the default one if it exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => Self::load_from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn with_offline(mut self) -> Self {
        self.taxonomy.offline = true;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.taxonomy.language = language.into();
        self
    }

    pub fn with_strict_arity(mut self) -> Self {
        self.strict_arity = true;
        self
    }

    pub fn with_length_scale(mut self, scale: f64) -> Self {
        self.length_scale = scale;
        self
    }

    pub fn with_fail_on_invalid(mut self) -> Self {
        self.fail_on_invalid = true;
        self
    }

    pub fn with_summary(mut self) -> Self {
        self.print_summary = true;
        self
    }

    /// Coordinate transform options derived from this configuration
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            length_scale: self.length_scale,
            strict_arity: self.strict_arity,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.length_scale.is_finite() || self.length_scale <= 0.0 {
            return Err(KrmError::Configuration {
                message: format!(
                    "length_scale must be a positive number, got {}",
                    self.length_scale
                ),
            });
        }

        if self.taxonomy.language.trim().is_empty() {
            return Err(KrmError::Configuration {
                message: "taxonomy.language must not be empty".to_string(),
            });
        }

        if !self.taxonomy.offline && !self.taxonomy.base_url.starts_with("http") {
            return Err(KrmError::Configuration {
                message: format!(
                    "taxonomy.base_url must be an http(s) URL, got '{}'",
                    self.taxonomy.base_url
                ),
            });
        }

        Ok(())
    }
}
