//! Failures surfaced by the `halftone` binary.
//!
//! Clap handles malformed arguments itself and exits with 2. Everything
//! that goes wrong after parsing lands here and picks one of:
//!
//! | code | cause |
//! |------|-------|
//! | 10 | rendering (bad surface dimensions) |
//! | 11 | filesystem (settings file, output path) |
//! | 12 | user input (image decode, settings JSON, format name) |
//! | 13 | encoding (PNG/JPEG/SVG bytes, JSON report) |

use halftone_core::HalftoneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Render(HalftoneError),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Render(_) => 10,
            Self::Io(_) => 11,
            Self::Input(_) => 12,
            Self::Serialization(_) => 13,
        }
    }
}

impl From<HalftoneError> for CliError {
    fn from(e: HalftoneError) -> Self {
        match e {
            HalftoneError::Io(msg) => Self::Io(msg),
            HalftoneError::Encode(msg) => Self::Serialization(msg),
            e @ (HalftoneError::UnsupportedFormat(_)
            | HalftoneError::InvalidSettings(_)
            | HalftoneError::InvalidColor(_)) => Self::Input(e.to_string()),
            other => Self::Render(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
