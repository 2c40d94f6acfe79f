use std::path::PathBuf;
use thiserror::Error;

use crate::render::shaders::ShaderError;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("Window creation failed: {0}")]
    WindowCreation(String),

    #[error("Failed to load OpenGL functions: {0}")]
    GraphicsContextLoad(String),

    #[error("Failed to present frame: {0}")]
    Present(String),

    #[error("Invalid config {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("OpenGL driver reported a fatal error: {0}")]
    DriverFault(String),
}

pub type Result<T> = std::result::Result<T, DemoError>;
