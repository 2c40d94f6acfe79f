pub mod assets;
pub mod config;
pub mod engine;
pub mod input;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use assets::{AssetResolver, ShaderSources};
pub use config::DemoConfig;
pub use engine::{FrameLoop, Present, Scene};
pub use input::{InputEvent, InputState};
pub use render::camera::Camera;
pub use render::shaders::{ShaderError, ShaderProgram};
pub use utils::error::{DemoError, Result};
