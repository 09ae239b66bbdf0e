//! Configuration module for the multipart uploader
//!
//! Loaded from JSON (usually a section of the host application's config).
//! Every field has a default, so `{}` is a valid configuration.

use encoding_rs::Encoding;
use serde::Deserialize;
use thiserror::Error;

use crate::streaming::DEFAULT_SLOTS;

/// Uploader configuration
#[derive(Clone, Debug, Deserialize)]
pub struct UploadConfig {
    /// Size of each ring chunk in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Number of chunks in the ring (raised automatically for tiny chunks)
    #[serde(default = "default_ring_slots")]
    pub ring_slots: usize,

    /// Charset label used to decode text fields and part headers
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Largest accepted part header block
    #[serde(default = "default_max_header_size")]
    pub max_header_size: usize,

    /// Largest accepted file part, unlimited when absent
    #[serde(default)]
    pub max_file_size: Option<u64>,

    /// Return an empty form instead of failing when the body does not
    /// start with the opening boundary
    #[serde(default)]
    pub lenient_opening_boundary: bool,
}

fn default_buffer_size() -> usize {
    8 * 1024 // 8KB
}

fn default_ring_slots() -> usize {
    DEFAULT_SLOTS
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

fn default_max_header_size() -> usize {
    8 * 1024 // 8KB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            ring_slots: default_ring_slots(),
            charset: default_charset(),
            max_header_size: default_max_header_size(),
            max_file_size: None,
            lenient_opening_boundary: false,
        }
    }
}

impl UploadConfig {
    /// Parse configuration from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config_str = std::str::from_utf8(bytes)?;
        let config: Self = serde_json::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style override of the chunk size
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Builder-style override of the charset label
    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = charset.to_string();
        self
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        self.encoding()?;
        Ok(())
    }

    /// Resolve the charset label
    pub fn encoding(&self) -> Result<&'static Encoding, ConfigError> {
        Encoding::for_label(self.charset.trim().as_bytes())
            .ok_or_else(|| ConfigError::UnknownCharset(self.charset.clone()))
    }
}

/// Configuration parsing errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("buffer_size must be greater than zero")]
    ZeroBufferSize,
    #[error("Unknown charset: {0}")]
    UnknownCharset(String),
}
