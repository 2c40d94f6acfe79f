//! Logical asset names to files on disk.

pub mod shaders;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AssetConfig;
use crate::utils::error::{DemoError, Result};

pub use shaders::ShaderSources;

/// Environment variable that overrides the asset root.
pub const ASSET_ROOT_ENV: &str = "FLYCAM_ASSET_ROOT";
pub const DEFAULT_ASSET_ROOT: &str = "assets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    root: PathBuf,
}

impl AssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `FLYCAM_ASSET_ROOT`, else the config, else `./assets`.
    pub fn from_config(config: &AssetConfig) -> Self {
        let root = env::var_os(ASSET_ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| config.root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_ROOT));
        log::debug!("Asset root: {:?}", root);
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a `/`-separated logical name onto the root. Absolute names are
    /// returned unchanged.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        name.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    pub fn read_text(&self, name: &str) -> Result<String> {
        let path = self.resolve(name);
        fs::read_to_string(&path).map_err(|source| DemoError::FileRead { path, source })
    }
}
