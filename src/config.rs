//! Desk configuration
//!
//! Resolution order:
//! 1. `BULK_UPLOADER_CONFIG` environment variable (path to a TOML file)
//! 2. `<config dir>/bulk-uploader/config.toml`
//! 3. Compiled defaults
//!
//! A missing or broken file is not fatal: a warning is logged and defaults
//! are used. `BULK_UPLOADER_BASE_URL` overrides `base_url` in every case.

use crate::error::{Result, UploadError};
use crate::upload::decoder::DEFAULT_MAX_FILE_BYTES;
use crate::upload::preview::DEFAULT_PREVIEW_ROWS;
use crate::upload::registry::SchemaRegistry;
use crate::upload::types::UploadTypeDescriptor;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_PATH_ENV: &str = "BULK_UPLOADER_CONFIG";
pub const BASE_URL_ENV: &str = "BULK_UPLOADER_BASE_URL";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub templates_dir: PathBuf,
    pub preview_rows: usize,
    pub max_file_bytes: u64,
    /// Replaces the built-in upload types when non-empty
    pub upload_types: Vec<UploadTypeDescriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            templates_dir: PathBuf::from("templates"),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            upload_types: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| UploadError::Config(e.to_string()))?;
        if config.preview_rows == 0 {
            return Err(UploadError::Config(
                "preview_rows must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Never fails; see the module docs for the fallback rules.
    pub fn load() -> Self {
        let mut config = match config_file_path() {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!(
                        "Ignoring configuration at {}: {}. Using defaults",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        };

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            info!("{} overrides base_url", BASE_URL_ENV);
            config.base_url = base_url;
        }

        config
    }

    pub fn registry(&self) -> Result<SchemaRegistry> {
        if self.upload_types.is_empty() {
            Ok(SchemaRegistry::builtin())
        } else {
            SchemaRegistry::new(self.upload_types.clone())
        }
    }

    pub fn template_path(&self, descriptor: &UploadTypeDescriptor) -> PathBuf {
        self.templates_dir.join(&descriptor.template)
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("bulk-uploader").join("config.toml"))
        .filter(|p| p.exists())
}
