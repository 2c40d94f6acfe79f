use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub gl_version: (u8, u8),
    /// Hide and grab the cursor. Mouse look then follows raw mouse motion.
    pub grab_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "flycam".to_string(),
            width: 800,
            height: 600,
            gl_version: (4, 5),
            grab_cursor: true,
        }
    }
}
