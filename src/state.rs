use std::io::ErrorKind;

use tracing::{debug, trace};
use wayland_client::{
    self, Connection, Dispatch, EventQueue, QueueHandle, WEnum,
    backend::WaylandError,
    delegate_noop,
    protocol::{
        wl_compositor::WlCompositor,
        wl_display::WlDisplay,
        wl_keyboard::{self, KeyState, WlKeyboard},
        wl_registry::{self, WlRegistry},
        wl_seat::{self, Capability, WlSeat},
        wl_surface::WlSurface,
    },
};
use wayland_protocols::xdg::shell::client::{
    xdg_surface::{self, XdgSurface},
    xdg_toplevel::{self, XdgToplevel},
    xdg_wm_base::{self, XdgWmBase},
};

use crate::error::{Error, Result};
use crate::gpu_surface::GlAbstraction;

/// Linux evdev code of the escape key, as delivered by `wl_keyboard.key`.
pub const KEY_ESCAPE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The compositor acknowledged the surface; drawing may start.
    Configured,
    Resized { width: u32, height: u32 },
    CloseRequested,
    KeyPressed(u32),
}

#[derive(Debug, Clone, Default)]
pub struct UnboundProtocols {
    compositor: Option<WlCompositor>,
    wm_base: Option<XdgWmBase>,
}

impl UnboundProtocols {
    fn finalize(&mut self) -> Option<BoundProtocols> {
        match (&self.compositor, &self.wm_base) {
            (Some(_), Some(_)) => Some(BoundProtocols {
                compositor: self.compositor.take()?,
                wm_base: self.wm_base.take()?,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoundProtocols {
    compositor: WlCompositor,
    wm_base: XdgWmBase,
}

impl BoundProtocols {
    pub fn get_compositor(&self) -> &WlCompositor {
        &self.compositor
    }

    pub fn get_wm_base(&self) -> &XdgWmBase {
        &self.wm_base
    }
}

#[derive(Debug)]
pub struct WaylandState {
    pub unbound: UnboundProtocols,
    pub bound: Option<BoundProtocols>,
    pub seat: Option<WlSeat>,
    pub keyboard: Option<WlKeyboard>,
    pub gl: GlAbstraction,
    configured: bool,
    events: Vec<WindowEvent>,
}

impl WaylandState {
    pub fn new(display: &WlDisplay) -> Result<WaylandState> {
        Ok(WaylandState {
            unbound: UnboundProtocols::default(),
            bound: None,
            seat: None,
            keyboard: None,
            gl: GlAbstraction::new(display)?,
            configured: false,
            events: Vec::new(),
        })
    }

    pub fn protocols(&self) -> Result<&BoundProtocols> {
        self.bound.as_ref().ok_or(match self.unbound.compositor {
            None => Error::MissingGlobal("wl_compositor"),
            Some(_) => Error::MissingGlobal("xdg_wm_base"),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Blocks until at least one event has been dispatched.
    pub fn handle_events(&mut self, event_queue: &mut EventQueue<Self>) -> Result<()> {
        event_queue.blocking_dispatch(self)?;
        Ok(())
    }

    /// Dispatches whatever the compositor has sent without waiting for more.
    pub fn poll_events(&mut self, event_queue: &mut EventQueue<Self>) -> Result<()> {
        event_queue.flush()?;
        if let Some(guard) = event_queue.prepare_read() {
            match guard.read() {
                Ok(_) => {}
                Err(WaylandError::Io(err)) if err.kind() == ErrorKind::WouldBlock => {}
                Err(err) => return Err(err.into()),
            }
        }
        event_queue.dispatch_pending(self)?;
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<WindowEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_event(&mut self, event: WindowEvent) {
        trace!("window event {event:?}");
        self.events.push(event);
    }
}

impl Dispatch<WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        proxy: &WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        qhandle: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match interface.as_str() {
                "wl_compositor" => {
                    state.unbound.compositor =
                        Some(proxy.bind::<WlCompositor, _, _>(name, version.min(4), qhandle, ()));
                    state.bound = state.bound.take().or_else(|| state.unbound.finalize());
                }
                "xdg_wm_base" => {
                    state.unbound.wm_base =
                        Some(proxy.bind::<XdgWmBase, _, _>(name, version.min(2), qhandle, ()));
                    state.bound = state.bound.take().or_else(|| state.unbound.finalize());
                }
                "wl_seat" if state.seat.is_none() => {
                    state.seat = Some(proxy.bind::<WlSeat, _, _>(name, version.min(5), qhandle, ()));
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<XdgWmBase, ()> for WaylandState {
    fn event(
        _state: &mut Self,
        proxy: &XdgWmBase,
        event: xdg_wm_base::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            proxy.pong(serial);
        }
    }
}

impl Dispatch<XdgSurface, ()> for WaylandState {
    fn event(
        state: &mut Self,
        proxy: &XdgSurface,
        event: xdg_surface::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            proxy.ack_configure(serial);
            if !state.configured {
                state.configured = true;
                state.push_event(WindowEvent::Configured);
            }
        }
    }
}

impl Dispatch<XdgToplevel, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _proxy: &XdgToplevel,
        event: xdg_toplevel::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        match event {
            // Zero means the compositor leaves the size up to us
            xdg_toplevel::Event::Configure { width, height, .. } if width > 0 && height > 0 => {
                state.push_event(WindowEvent::Resized {
                    width: width as u32,
                    height: height as u32,
                });
            }
            xdg_toplevel::Event::Close => state.push_event(WindowEvent::CloseRequested),
            _ => {}
        }
    }
}

impl Dispatch<WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        proxy: &WlSeat,
        event: wl_seat::Event,
        _data: &(),
        _conn: &Connection,
        qhandle: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(capabilities),
        } = event
        {
            if capabilities.contains(Capability::Keyboard) && state.keyboard.is_none() {
                debug!("seat has a keyboard");
                state.keyboard = Some(proxy.get_keyboard(qhandle, ()));
            }
        }
    }
}

impl Dispatch<WlKeyboard, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _proxy: &WlKeyboard,
        event: wl_keyboard::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        if let wl_keyboard::Event::Key {
            key,
            state: WEnum::Value(KeyState::Pressed),
            ..
        } = event
        {
            state.push_event(WindowEvent::KeyPressed(key));
        }
    }
}

delegate_noop!(WaylandState: ignore WlCompositor);
delegate_noop!(WaylandState: ignore WlSurface);
