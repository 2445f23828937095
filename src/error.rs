use wayland_client::backend::WaylandError;
use wayland_client::{ConnectError, DispatchError};

use crate::opengl::shaders::ShaderError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that stops the program. Shader problems only end up here when shaders are
/// built strictly; the lenient path logs them and carries on.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("OpenGL call failed: {0:?}")]
    OpenGL(glcore::GLCoreError),
    #[error("failed to load OpenGL entry points")]
    Loader,
    #[error("graphics context: {0}")]
    Glutin(#[from] glutin::error::Error),
    #[error("failed to connect to the wayland compositor: {0}")]
    Connect(#[from] ConnectError),
    #[error("wayland dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("wayland connection failed: {0}")]
    Wayland(#[from] WaylandError),
    #[error("window size must be non-zero, got {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("compositor does not advertise {0}")]
    MissingGlobal(&'static str),
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

impl From<glcore::GLCoreError> for Error {
    fn from(value: glcore::GLCoreError) -> Self {
        Error::OpenGL(value)
    }
}
