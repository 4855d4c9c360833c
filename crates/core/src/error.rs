//! Error types for vecmini
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Variants follow three failure classes:
//! - caller mistakes (`InvalidInput`, `DimensionMismatch`) are rejected before any I/O
//! - file-system failures (`Io`) are fatal on write paths
//! - damaged persisted data (`Corruption`, `Serialization`) is tolerated on read paths

use std::io;
use thiserror::Error;

/// Result type alias for vecmini operations
pub type VectorResult<T> = std::result::Result<T, VectorError>;

/// Error types for vector storage and search
#[derive(Debug, Error)]
pub enum VectorError {
    /// Invalid argument supplied by the caller
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// Two vectors of different length were compared
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension of the left-hand (query) vector
        expected: usize,
        /// Dimension of the right-hand vector
        got: usize,
    },

    /// I/O error while touching the WAL or snapshot file
    #[error("I/O error ({context}): {source}")]
    Io {
        /// Operation and path that failed
        context: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Encoder/decoder message
        message: String,
    },

    /// Data corruption detected in a persisted file
    #[error("Data corruption: {message}")]
    Corruption {
        /// Description of the corruption
        message: String,
    },

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl VectorError {
    /// Create an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        VectorError::InvalidInput {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the operation that produced it
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        VectorError::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a `Serialization` error
    pub fn serialization(message: impl Into<String>) -> Self {
        VectorError::Serialization {
            message: message.into(),
        }
    }

    /// Create a `Corruption` error
    pub fn corruption(message: impl Into<String>) -> Self {
        VectorError::Corruption {
            message: message.into(),
        }
    }

    /// Create a `Config` error
    pub fn config(message: impl Into<String>) -> Self {
        VectorError::Config {
            message: message.into(),
        }
    }

    /// True for errors the caller can fix by changing arguments
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            VectorError::InvalidInput { .. } | VectorError::DimensionMismatch { .. }
        )
    }

    /// True for file-system failures
    pub fn is_io(&self) -> bool {
        matches!(self, VectorError::Io { .. })
    }
}
