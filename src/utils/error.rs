//! Error Handling Module
//!
//! Defines custom error types for the PPDAE training pipeline.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for PPDAE operations
#[derive(Error, Debug)]
pub enum PpdaeError {
    /// Unrecognized dataset host selector. Fatal, no recovery.
    #[error("unknown dataset host '{0}', expected one of: local, colab, exalearn")]
    UnknownHost(String),

    /// Error with dataset operations
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Error with model operations
    #[error("Model error: {0}")]
    Model(String),

    /// Error with training
    #[error("Training error: {0}")]
    Training(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error writing metrics or image artifacts
    #[error("Tracking error: {0}")]
    Tracking(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reading an on-disk numpy array
    #[error("Failed to read npy array: {0}")]
    Npy(#[from] ndarray_npy::ReadNpyError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Convenience Result type for PPDAE operations
pub type Result<T> = std::result::Result<T, PpdaeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PpdaeError::UnknownHost("laptop".to_string());
        assert!(err.to_string().contains("laptop"));
        assert!(err.to_string().contains("exalearn"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PpdaeError = io.into();
        assert!(matches!(err, PpdaeError::Io(_)));
    }
}
