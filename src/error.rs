//! Error types for QR Studio operations

use thiserror::Error;

/// Result type alias using QR Studio's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for QR Studio operations
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing to encode; the composer produced an empty payload
    #[error("QR data is required")]
    EmptyPayload,

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// PNG serialization failed
    #[error("Failed to write PNG: {0}")]
    Png(String),

    /// Malformed HTTP traffic on the render route
    #[error("HTTP error: {0}")]
    Http(String),

    /// The render service answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Server {
        /// HTTP status code from the response line
        status: u16,
        /// Error message extracted from the JSON body
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

// Implement From conversions for common error types

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Png(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
