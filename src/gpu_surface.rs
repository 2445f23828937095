use std::ffi::{CString, c_void};
use std::num::NonZero;
use std::ptr::NonNull;

use glcore::GLCore;
use glutin::config::{Api, Config as SurfaceConfig, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, DisplayApiPreference};
use glutin::error::{Error as GlutError, ErrorKind as GlutErrorKind};
use glutin::prelude::{GlDisplay, NotCurrentGlContext};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::{HasDisplayHandle, RawWindowHandle, WaylandWindowHandle};
use tracing::{debug, warn};
use wayland_client::Proxy;
use wayland_client::protocol::wl_display::WlDisplay;
use wayland_client::protocol::wl_surface::WlSurface;

use crate::error::{Error, Result};

/// Context version the shaders are written against (`#version 330 core`).
pub const GL_VERSION: (u8, u8) = (3, 3);

#[derive(Debug, Clone)]
pub struct GlAbstraction {
    display: Display,
    config: SurfaceConfig,
}

fn raw_window_handle(surface: &WlSurface) -> std::result::Result<RawWindowHandle, GlutError> {
    let surface_ptr = NonNull::new(surface.id().as_ptr() as *mut c_void)
        .ok_or(GlutError::from(GlutErrorKind::BadNativeWindow))?;
    Ok(RawWindowHandle::Wayland(WaylandWindowHandle::new(surface_ptr)))
}

impl GlAbstraction {
    pub fn new(wl_display: &WlDisplay) -> Result<Self> {
        let binding = wl_display
            .backend()
            .upgrade()
            .ok_or(GlutError::from(GlutErrorKind::BadDisplay))?;
        let raw_display_handle = binding
            .display_handle()
            .map_err(|_| GlutError::from(GlutErrorKind::BadDisplay))?
            .as_raw();
        let display = unsafe { Display::new(raw_display_handle, DisplayApiPreference::Egl) }?;

        let config_template = ConfigTemplateBuilder::new()
            .with_buffer_type(glutin::config::ColorBufferType::Rgb {
                r_size: 8,
                g_size: 8,
                b_size: 8,
            })
            .with_depth_size(24)
            .with_api(Api::OPENGL)
            .build();
        let config = unsafe { display.find_configs(config_template) }?
            .reduce(
                |config, best| match config.num_samples() > best.num_samples() {
                    true => config,
                    false => best,
                },
            )
            .ok_or(GlutError::from(GlutErrorKind::BadConfig))?;
        debug!("picked EGL config with {} samples", config.num_samples());

        Ok(GlAbstraction { display, config })
    }

    pub fn create_context(&self, surface: &WlSurface) -> Result<NotCurrentContext> {
        let context_attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(GL_VERSION.0, GL_VERSION.1))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle(surface)?));
        Ok(unsafe { self.display.create_context(&self.config, &context_attrs) }?)
    }

    pub fn create_surface(
        &self,
        surface: &WlSurface,
        width: NonZero<u32>,
        height: NonZero<u32>,
    ) -> Result<Surface<WindowSurface>> {
        let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle(surface)?,
            width,
            height,
        );
        Ok(unsafe {
            self.display
                .create_window_surface(&self.config, &surface_attrs)
        }?)
    }
}

/// A current OpenGL context bound to one wayland surface.
pub struct GpuSurface {
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    renderer: GLCore,
}

impl std::fmt::Debug for GpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuSurface").finish_non_exhaustive()
    }
}

impl GpuSurface {
    pub fn new(
        abstraction: &GlAbstraction,
        surface: &WlSurface,
        width: NonZero<u32>,
        height: NonZero<u32>,
        vsync: bool,
    ) -> Result<GpuSurface> {
        let not_context = abstraction.create_context(surface)?;
        let surface = abstraction.create_surface(surface, width, height)?;
        let context = not_context.make_current(&surface)?;

        let interval = match vsync {
            true => SwapInterval::Wait(NonZero::<u32>::MIN),
            false => SwapInterval::DontWait,
        };
        if let Err(err) = surface.set_swap_interval(&context, interval) {
            warn!("unable to set swap interval: {err}");
        }

        let renderer = GLCore::new(|fn_name| match CString::new(fn_name) {
            Ok(c_str) => abstraction.display.get_proc_address(&c_str),
            Err(_) => std::ptr::null(),
        })
        .map_err(|_| Error::Loader)?;

        Ok(GpuSurface {
            context,
            surface,
            renderer,
        })
    }

    pub fn resize(&mut self, width: NonZero<u32>, height: NonZero<u32>) {
        self.surface.resize(&self.context, width, height);
    }

    pub fn swap_buffers(&mut self) -> Result<()> {
        Ok(self.surface.swap_buffers(&self.context)?)
    }

    pub fn get_renderer(&self) -> GLCore {
        self.renderer
    }
}
