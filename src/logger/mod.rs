//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output with color control
//! - File output with multiple formats (Full, Compact, JSON)
//! - Size-based file rotation
//! - Changing the level at runtime through [`LogLevelHandle`]

pub mod config;
pub mod error;
pub mod rotation;
pub(crate) mod writer;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig};
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt,
    layer::{Layered, SubscriberExt},
    reload,
    util::SubscriberInitExt,
};
use writer::RotatingFileWriter;

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Handle to the active level filter, returned by [`init_logger`].
#[derive(Clone)]
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogLevelHandle {
    /// Replace the active filter with `level` ("trace" .. "error").
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        let filter = build_filter(level)?;
        self.handle
            .reload(filter)
            .map_err(|e| LoggerError::subscriber(e.to_string()))
    }

    pub fn current_filter(&self) -> Option<String> {
        self.handle.with_current(|filter| filter.to_string()).ok()
    }
}

/// Initialize the global logger with the given configuration
pub fn init_logger(config: LoggerConfig) -> Result<LogLevelHandle, LoggerError> {
    let (subscriber, handle) = build_subscriber(&config)?;
    subscriber
        .try_init()
        .map_err(|e| LoggerError::subscriber(e.to_string()))?;
    Ok(handle)
}

/// Assemble the subscriber without installing it.
pub fn build_subscriber(
    config: &LoggerConfig,
) -> Result<(impl Subscriber + Send + Sync + 'static, LogLevelHandle), LoggerError> {
    config.validate()?;

    let (filter, handle) = reload::Layer::new(build_filter(&config.level)?);

    // File layer must precede the console layer or ANSI codes leak into
    // span fields written to the file (tokio-rs/tracing#1817).
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }

    let subscriber = tracing_subscriber::registry().with(filter).with(layers);

    Ok((subscriber, LogLevelHandle { handle }))
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    config::parse_level(level)?;
    EnvFilter::try_new(level.to_lowercase()).map_err(|e| LoggerError::config(e.to_string()))
}

fn console_layer(config: &ConsoleConfig) -> BoxedLayer {
    let use_ansi = config.colored && std::io::stdout().is_terminal();

    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
        .boxed()
}

fn file_layer(config: &FileConfig) -> Result<BoxedLayer, LoggerError> {
    let writer = RotatingFileWriter::new(config)?;

    let layer = match config.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };

    Ok(layer)
}
