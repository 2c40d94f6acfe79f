use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Overrides the asset root; `FLYCAM_ASSET_ROOT` still wins over this.
    pub root: Option<PathBuf>,
    pub vertex_shader: String,
    pub fragment_shader: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: None,
            vertex_shader: "shaders/mesh.vert".to_string(),
            fragment_shader: "shaders/mesh.frag".to_string(),
        }
    }
}
