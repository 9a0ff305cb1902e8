//! Model — GelfConfig.

use serde::{Deserialize, Serialize};

/// Well-known metadata URL answering the platform's self-reported host name
/// with a plain-text body.
pub const DEFAULT_METADATA_URL: &str =
    "http://rancher-metadata.rancher.internal/latest/self/host/name";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GelfConfig {
    /// Metadata endpoint queried once at startup for the host identity.
    pub metadata_url: String,
    /// Upper bound on the metadata query; past it the identity resolution
    /// falls back to the OS hostname.
    pub metadata_timeout_ms: u64,
}

impl Default for GelfConfig {
    fn default() -> Self {
        Self {
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            metadata_timeout_ms: 3000,
        }
    }
}

impl GelfConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.metadata_url.is_empty() {
            return Err("metadata_url must not be empty".to_string());
        }
        if self.metadata_timeout_ms == 0 {
            return Err("metadata_timeout_ms must be > 0".to_string());
        }
        Ok(())
    }
}
