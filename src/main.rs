use std::time::Instant;

use tracing::{error, info};
use wayland_client::Connection;

use woodgl::config::Config;
use woodgl::lessons::Scene;
use woodgl::opengl::highlevel::SimpleGL;
use woodgl::state::WaylandState;
use woodgl::window::Window;
use woodgl::{Result, trace};

fn run(config: &Config) -> Result<()> {
    let connection = Connection::connect_to_env()?;

    let display = connection.display();
    let mut event_queue = connection.new_event_queue();
    let queue_handle = event_queue.handle();

    display.get_registry(&queue_handle, ());

    let mut wayland_state = WaylandState::new(&display)?;
    event_queue.roundtrip(&mut wayland_state)?;

    let mut window = Window::create(config, &mut wayland_state, &mut event_queue)?;
    let gl = SimpleGL::new(window.renderer());
    let size = window.size();
    gl.framebuffer_resized(size.width.get(), size.height.get())?;

    // Declared after the window so GPU objects go while the context is still alive
    let scene = Scene::build(&gl, config.lesson, config)?;

    let start = Instant::now();
    let mut frames: u64 = 0;
    while !window.should_close() {
        wayland_state.poll_events(&mut event_queue)?;
        for event in wayland_state.drain_events() {
            if let Some(size) = window.handle(event) {
                gl.framebuffer_resized(size.width.get(), size.height.get())?;
            }
        }

        scene.draw(&gl, start.elapsed())?;
        window.swap_buffers()?;
        frames += 1;
    }

    info!(
        "closing after {frames} frames in {:.1}s",
        start.elapsed().as_secs_f32()
    );
    Ok(())
}

fn main() {
    let config = Config::new().with_args(std::env::args().skip(1));
    let trace = trace::initialize(&config);

    if let Err(err) = run(&config) {
        error!("{err}");
        drop(trace);
        std::process::exit(-1);
    }
}
