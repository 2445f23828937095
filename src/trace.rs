//! Logging setup.

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

const LOG_FILE: &str = "woodgl.log";

/// Flushes the file log, if any, when dropped.
#[allow(missing_copy_implementations)]
#[derive(Debug)]
#[must_use]
pub struct Trace {
    _file_log_guard: Option<WorkerGuard>,
}

/// Initialize the tracing library. `RUST_LOG` overrides the default `info` level.
pub fn initialize(config: &Config) -> Trace {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let (file_layer, _file_log_guard) = match &config.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::Layer::new()
                .compact()
                .with_ansi(false)
                .with_line_number(true)
                .with_writer(non_blocking_file);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(
            fmt::Layer::new()
                .compact()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        );

    if let Err(err) = registry.try_init() {
        eprintln!("setting tracing default failed: {err}");
    }
    Trace { _file_log_guard }
}
