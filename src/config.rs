//! Configuration for the file bridge
//!
//! Every field has a default matching the image panel the bridge was built
//! for, so an empty JSON object (or no file at all) is a valid configuration.

use crate::bridge::chunker::CHUNK_SIZE;
use crate::bridge::file_operations::FileFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Bytes requested per read while loading a file
    pub chunk_size: usize,
    /// Filters used when the caller passes none
    pub input_filters: Vec<FileFilter>,
    pub default_output_name: String,
    pub open_title: String,
    pub save_title: String,
    /// Where native dialogs start browsing
    pub start_directory: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            chunk_size: CHUNK_SIZE,
            input_filters: vec![FileFilter::images()],
            default_output_name: "no_bg_output.png".to_string(),
            open_title: "Select an image".to_string(),
            save_title: "Save processed image".to_string(),
            start_directory: None,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be greater than zero".to_string()));
        }
        if self.default_output_name.trim().is_empty() {
            return Err(ConfigError::Invalid("default_output_name must not be empty".to_string()));
        }
        Ok(())
    }
}
