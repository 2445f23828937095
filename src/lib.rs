pub mod config;
pub mod error;
pub mod gpu_surface;
pub mod lessons;
pub mod opengl;
pub mod state;
pub mod trace;
pub mod window;

pub use error::{Error, Result};
