pub mod backend;
pub mod camera;
pub mod debug;
pub mod mesh;
pub mod shaders;

#[cfg(test)]
pub mod testing;

pub use backend::{GlBackend, GlFunctions};
pub use camera::{Camera, CameraMovement};
pub use debug::{DebugHook, DebugPolicy};
pub use mesh::{GpuMesh, MeshData, Renderable};
pub use shaders::ShaderProgram;
