//! Domain error types
//!
//! This module defines the error hierarchy for Cardiomask. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Cardiomask error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CardiomaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed MFER tag-length-value encoding
    #[error("MFER decode error: {0}")]
    Decode(String),

    /// Malformed XML document
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Filename does not match the `{identifier}_{date}.{ext}` convention
    #[error("File name format error: {0}")]
    Format(String),

    /// Seed/confirmation mismatch during session authentication
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Pseudonym store failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// Transport or file I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CardiomaskError {
    /// Whether the error is scoped to a single file.
    ///
    /// File-scoped errors are logged and the offending file is skipped;
    /// everything else ends the current operation.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            CardiomaskError::Decode(_)
                | CardiomaskError::XmlParse(_)
                | CardiomaskError::Format(_)
                | CardiomaskError::Storage(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CardiomaskError {
    fn from(err: std::io::Error) -> Self {
        CardiomaskError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CardiomaskError {
    fn from(err: serde_json::Error) -> Self {
        CardiomaskError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CardiomaskError {
    fn from(err: toml::de::Error) -> Self {
        CardiomaskError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from rusqlite errors
impl From<rusqlite::Error> for CardiomaskError {
    fn from(err: rusqlite::Error) -> Self {
        CardiomaskError::Storage(err.to_string())
    }
}
