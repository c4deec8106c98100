//! Error types for conversion operations
//!
//! The string conversion path is total and never produces these errors. They
//! surface only at the fallible edges: decoding raw bytes and parsing
//! caller-supplied names.

use thiserror::Error;

/// Errors that can occur around HTML to Markdown conversion
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Character encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ConversionError {
    /// Get numeric error code
    pub fn code(&self) -> u32 {
        match self {
            ConversionError::EncodingError(_) => 2,
            ConversionError::InvalidInput(_) => 5,
        }
    }
}
