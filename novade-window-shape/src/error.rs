//! Error handling for the NovaDE window shape engine.
//!
//! All fallible operations in this crate return [`ShapeResult`], whose error
//! type [`ShapeError`] covers argument validation, allocation failure and the
//! shaped-window lifecycle. Configuration loading has its own [`ConfigError`],
//! and failures reported by the window host are wrapped in [`HostError`].
//!
//! No error in this crate is retried internally; every failure is returned to
//! the immediate caller.

use std::path::PathBuf;
use thiserror::Error;

use crate::window::WindowId;

/// Convenience alias for results produced by this crate.
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Errors produced while building shape masks or driving a shaped window.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// A caller supplied an unusable value: zero-sized surface, unsupported
    /// packing density, malformed shape mode text and similar.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Memory for the shape tree arena or the bitmap buffer could not be reserved.
    /// Nothing partially built survives this error.
    #[error("Out of memory while building window shape")]
    OutOfMemory,

    /// The window was not created as a shapeable window.
    #[error("Window {0} is not shapeable")]
    NotShapeable(WindowId),

    /// The window is shapeable but no shape has been applied yet.
    #[error("Window {0} has no shape set")]
    NoShapeSet(WindowId),

    /// The shape surface does not match the window (size mismatch or a pixel
    /// format that cannot express the chosen mode).
    #[error("Invalid shape argument: {0}")]
    InvalidShapeArgument(String),

    /// The window id is not tracked by the shaped window manager.
    #[error("Unknown window: {0}")]
    UnknownWindow(WindowId),

    /// The window host rejected a request.
    #[error("Window host error: {0}")]
    Host(#[from] HostError),
}

/// Failure reported by a [`WindowHost`](crate::window::WindowHost) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    /// Creates a new host error with a descriptive message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message supplied by the host.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while loading or validating a [`ShapeConfig`](crate::config::ShapeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Failed to read shape configuration from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML or does not match the schema.
    #[error("Failed to parse shape configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but holds values the engine cannot use.
    #[error("Shape configuration validation failed: {0}")]
    Validation(String),
}

/// Errors raised while installing the global `tracing` subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("Failed to set log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed.
    #[error("Failed to initialize logging: {0}")]
    Initialization(String),
}
