use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::{AssetConfig, CameraConfig, RenderConfig, WindowConfig};
use crate::utils::error::{DemoError, Result};

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "flycam.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub assets: AssetConfig,
}

impl DemoConfig {
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads a config file. A missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DemoError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_toml_str(&text)
            .map(Some)
            .map_err(|e| DemoError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Like [`DemoConfig::load`], but any problem falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(config)) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Ok(None) => {
                log::debug!("No config at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::error!("{}; using defaults", e);
                Self::default()
            }
        }
    }
}
