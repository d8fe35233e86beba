//! Layered error definitions
//!
//! Categorized by source: schema / config / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Schema Errors =====
    /// Record does not match the stream schema
    #[error("schema mismatch in stream '{stream}': {message}")]
    SchemaMismatch { stream: String, message: String },

    /// Schema declares the same field twice
    #[error("duplicate field '{field}' in schema")]
    DuplicateField { field: String },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create schema mismatch error
    pub fn schema_mismatch(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}
