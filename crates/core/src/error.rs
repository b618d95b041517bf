//! Error types for the halftone core.

use thiserror::Error;

/// Errors produced by surface construction, color parsing, and export.
///
/// Geometry and mapping functions are total and never produce these.
#[derive(Debug, Error)]
pub enum HalftoneError {
    /// Width or height was zero (or overflowed) when creating a surface.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A settings document could not be interpreted.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// An export format name that no backend handles.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// An encoder rejected the rendered surface.
    #[error("encode error: {0}")]
    Encode(String),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(String),
}
