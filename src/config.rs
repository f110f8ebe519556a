//! Configuration for loading images and driving the memory channel.
//!
//! Every section has sensible defaults; a partial JSON document only needs
//! to name the fields it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{InjectError, Result};

/// Master configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    /// File reading limits.
    pub io: IOConfig,
    /// ELF parsing options.
    pub elf: ElfConfig,
    /// Process memory channel limits.
    pub memory: MemoryConfig,
}

impl InjectConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| InjectError::Config(e.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(crate::io::error::IoError::from)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| InjectError::Config(e.to_string()))
    }

    /// The subset used by `ElfImage::load_with`.
    pub fn loader(&self) -> LoaderConfig {
        LoaderConfig {
            io: self.io.clone(),
            elf: self.elf.clone(),
        }
    }
}

/// I/O configuration for file reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Maximum file size to load (default: 104857600 = 100MB).
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_file_size: 104857600, // 100MB
        }
    }
}

/// ELF parsing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElfConfig {
    /// Check magic, class and data encoding before decoding the header
    /// (default: true). When off, every input is taken to be a little-endian
    /// ELF64 object.
    pub validate_ident: bool,
}

impl Default for ElfConfig {
    fn default() -> Self {
        Self {
            validate_ident: true,
        }
    }
}

/// Process memory channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Largest single read or write in bytes (default: 16777216 = 16MB).
    pub max_transfer: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_transfer: 16 * 1024 * 1024,
        }
    }
}

/// Options for `ElfImage::load_with`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    pub io: IOConfig,
    pub elf: ElfConfig,
}
