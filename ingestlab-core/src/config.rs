//! Loader configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! data_dir = "data/raw"
//! chunk_size = 10000
//! delimiter = ","
//!
//! [yahoo]
//! timeout_secs = 30
//! ```

use crate::data::IngestError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default output directory for fetched series.
pub const DEFAULT_DATA_DIR: &str = "data/raw";

/// Default number of rows per chunk when streaming a CSV file.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Directory that fetched price series are written to.
    pub data_dir: PathBuf,
    /// Rows per chunk for `stream` reads.
    pub chunk_size: usize,
    /// Single-byte field delimiter for every CSV read.
    pub delimiter: char,
    pub yahoo: YahooConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            delimiter: ',',
            yahoo: YahooConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, IngestError> {
        let content = std::fs::read_to_string(path).map_err(|e| IngestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string and check it.
    pub fn from_toml(content: &str) -> Result<Self, IngestError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| IngestError::Config(format!("parse config TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkSize);
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// The delimiter as the single byte the CSV readers expect.
    pub fn delimiter_byte(&self) -> Result<u8, IngestError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                IngestError::Config(format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }
}

/// Settings for the Yahoo Finance chart API client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}
