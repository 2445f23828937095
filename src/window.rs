use std::mem::ManuallyDrop;
use std::num::NonZero;

use glcore::GLCore;
use tracing::{debug, info};
use wayland_client::EventQueue;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_protocols::xdg::shell::client::{xdg_surface::XdgSurface, xdg_toplevel::XdgToplevel};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gpu_surface::GpuSurface;
use crate::state::{KEY_ESCAPE, WaylandState, WindowEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizes {
    pub width: NonZero<u32>,
    pub height: NonZero<u32>,
}

impl Sizes {
    pub fn new(width: u32, height: u32) -> Option<Sizes> {
        Some(Sizes {
            width: NonZero::new(width)?,
            height: NonZero::new(height)?,
        })
    }
}

/// What the render loop needs to know about the window, kept apart from the wayland
/// objects so input handling can be exercised on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFlags {
    pub size: Sizes,
    pub should_close: bool,
}

impl WindowFlags {
    pub fn new(size: Sizes) -> WindowFlags {
        WindowFlags {
            size,
            should_close: false,
        }
    }

    /// Applies one event. Returns the new size when the framebuffer has to follow.
    pub fn apply(&mut self, event: WindowEvent) -> Option<Sizes> {
        match event {
            WindowEvent::Resized { width, height } => {
                let size = Sizes::new(width, height)?;
                if size == self.size {
                    return None;
                }
                self.size = size;
                Some(size)
            }
            WindowEvent::CloseRequested | WindowEvent::KeyPressed(KEY_ESCAPE) => {
                self.should_close = true;
                None
            }
            WindowEvent::Configured | WindowEvent::KeyPressed(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct Window {
    flags: WindowFlags,
    // Dropped by hand, before the wayland surface it renders into is destroyed
    gpu_surface: ManuallyDrop<GpuSurface>,
    toplevel: XdgToplevel,
    xdg_surface: XdgSurface,
    wayland_surface: WlSurface,
}

impl Window {
    /// Maps an `xdg_toplevel`, waits for the first configure, then creates the GL
    /// context on it.
    pub fn create(
        config: &Config,
        state: &mut WaylandState,
        event_queue: &mut EventQueue<WaylandState>,
    ) -> Result<Window> {
        let queue_handle = event_queue.handle();
        let protocols = state.protocols()?;

        let wayland_surface = protocols.get_compositor().create_surface(&queue_handle, ());
        let xdg_surface = protocols
            .get_wm_base()
            .get_xdg_surface(&wayland_surface, &queue_handle, ());
        let toplevel = xdg_surface.get_toplevel(&queue_handle, ());
        toplevel.set_title(config.title.clone());
        toplevel.set_app_id("woodgl".to_owned());
        wayland_surface.commit();

        while !state.is_configured() {
            state.handle_events(event_queue)?;
        }

        let mut flags = WindowFlags::new(
            Sizes::new(config.width, config.height)
                .ok_or(Error::InvalidSize(config.width, config.height))?,
        );
        // The first configure may already carry the compositor's preferred size
        let pending = state.drain_events();
        for event in pending {
            flags.apply(event);
        }

        let gpu_surface = GpuSurface::new(
            &state.gl,
            &wayland_surface,
            flags.size.width,
            flags.size.height,
            config.vsync,
        )?;
        info!(
            "opened {}x{} window \"{}\"",
            flags.size.width, flags.size.height, config.title
        );

        Ok(Window {
            flags,
            gpu_surface: ManuallyDrop::new(gpu_surface),
            toplevel,
            xdg_surface,
            wayland_surface,
        })
    }

    pub fn size(&self) -> Sizes {
        self.flags.size
    }

    pub fn should_close(&self) -> bool {
        self.flags.should_close
    }

    /// Applies an event and resizes the GL surface if needed.
    pub fn handle(&mut self, event: WindowEvent) -> Option<Sizes> {
        let resized = self.flags.apply(event)?;
        debug!("resizing to {}x{}", resized.width, resized.height);
        self.gpu_surface.resize(resized.width, resized.height);
        Some(resized)
    }

    pub fn swap_buffers(&mut self) -> Result<()> {
        self.gpu_surface.swap_buffers()
    }

    pub fn renderer(&self) -> GLCore {
        self.gpu_surface.get_renderer()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        // SAFETY: never touched again after this point
        unsafe { ManuallyDrop::drop(&mut self.gpu_surface) };
        self.toplevel.destroy();
        self.xdg_surface.destroy();
        self.wayland_surface.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> WindowFlags {
        WindowFlags::new(Sizes::new(800, 600).unwrap())
    }

    #[test]
    fn escape_and_close_request_end_the_loop() {
        let mut escape = flags();
        assert_eq!(escape.apply(WindowEvent::KeyPressed(KEY_ESCAPE)), None);
        assert!(escape.should_close);

        let mut close = flags();
        close.apply(WindowEvent::CloseRequested);
        assert!(close.should_close);

        let mut other_key = flags();
        other_key.apply(WindowEvent::KeyPressed(30));
        assert!(!other_key.should_close);
    }

    #[test]
    fn resize_reports_new_size_once() {
        let mut flags = flags();
        let resized = flags.apply(WindowEvent::Resized {
            width: 1024,
            height: 768,
        });
        assert_eq!(resized, Sizes::new(1024, 768));
        assert_eq!(
            flags.apply(WindowEvent::Resized {
                width: 1024,
                height: 768
            }),
            None
        );
    }

    #[test]
    fn zero_sized_configure_is_ignored() {
        let mut flags = flags();
        assert_eq!(
            flags.apply(WindowEvent::Resized {
                width: 0,
                height: 480
            }),
            None
        );
        assert_eq!(flags.size, Sizes::new(800, 600).unwrap());
    }
}
