use serde::{Deserialize, Serialize};

use crate::render::debug::DebugPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub near_plane: f32,
    pub far_plane: f32,
    /// Fixed rotation of the model about +Y, in degrees.
    pub model_rotation: f32,
    pub debug: DebugPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.5, 0.7, 0.3],
            near_plane: 0.1,
            far_plane: 1000.0,
            model_rotation: 45.0,
            debug: DebugPolicy::default(),
        }
    }
}
