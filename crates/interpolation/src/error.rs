//! Error types for the interpolation crate.

use thiserror::Error;

/// Interpolation lookup errors.
///
/// An empty stream is not an error: it builds an engine without fields and
/// every later lookup reports `MissingField`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpError {
    /// The engine has no interpolator for this field.
    #[error("stream '{stream}' has no interpolated field '{field}'")]
    MissingField {
        /// Stream the engine was built from.
        stream: String,
        /// Requested field.
        field: String,
    },

    /// The group has no engine for this stream.
    #[error("no interpolation engine for stream '{stream}'")]
    UnknownGroup {
        /// Requested stream.
        stream: String,
    },
}

impl InterpError {
    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(stream: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            stream: stream.into(),
            field: field.into(),
        }
    }

    /// Creates an unknown group error.
    #[must_use]
    pub fn unknown_group(stream: impl Into<String>) -> Self {
        Self::UnknownGroup {
            stream: stream.into(),
        }
    }
}

/// Result type for interpolation operations.
pub type Result<T> = std::result::Result<T, InterpError>;
