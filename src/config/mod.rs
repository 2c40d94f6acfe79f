pub mod assets;
pub mod camera;
pub mod core;
pub mod rendering;
pub mod window;

pub use assets::AssetConfig;
pub use camera::CameraConfig;
pub use core::DemoConfig;
pub use rendering::RenderConfig;
pub use window::WindowConfig;
