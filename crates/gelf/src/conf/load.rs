//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::GelfConfig;

impl GelfConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("GELF_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/router/gelf.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading GELF adapter configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("GELF_METADATA_URL") {
            config.metadata_url = url;
        }
        if let Some(timeout) = std::env::var("GELF_METADATA_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.metadata_timeout_ms = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: GelfConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
