//! Error types for slabview.

use thiserror::Error;

/// The main error type for view configuration and input data.
#[derive(Error, Debug)]
pub enum ViewError {
    /// A view mode string did not name a known mode.
    #[error("unknown view mode: '{0}' (expected \"3D\" or \"2D\")")]
    UnknownViewMode(String),

    /// A configuration option failed validation.
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// Image data does not match its declared size.
    #[error("image size mismatch: expected {expected} intensities, got {actual}")]
    ImageSizeMismatch { expected: usize, actual: usize },

    /// Image dimensions multiply past the addressable length.
    #[error("image size {0:?} is too large to address")]
    ImageTooLarge([u32; 3]),

    /// Image has a zero-length dimension.
    #[error("image has a zero-length dimension: {0:?}")]
    EmptyImage([u32; 3]),

    /// Viewport has no drawable area.
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for slabview core operations.
pub type Result<T> = std::result::Result<T, ViewError>;
