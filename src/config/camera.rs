use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Start pose and control tuning for the fly camera. Angles are degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: 6.0,
            mouse_sensitivity: 0.25,
            zoom: 45.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
        }
    }
}
