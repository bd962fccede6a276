// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the propagator.

use thiserror::Error;

/// Result type alias for propagator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Propagator error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or mismatched constructor argument
    #[error("Construction error: {0}")]
    Construction(String),
    /// Input of the right kind but with invalid content
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Method name not recognized
    #[error("Unknown propagation method: {0}")]
    UnknownMethod(String),
    /// Method recognized but not available for this configuration
    #[error("Method '{method}' is not supported for {configuration}")]
    UnsupportedMethod {
        method: String,
        configuration: String,
    },
    /// Kernel invoked on the wrong relaxation representation
    #[error("Representation mismatch: {0}")]
    Representation(String),
    /// Declared but not yet available
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    /// Propagation aborted through the cancellation flag
    #[error("Propagation cancelled at time step {step}")]
    Cancelled { step: usize },
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// True for methods that are declared but have no implementation.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented(_))
    }

    /// True for errors caused by the caller's input rather than missing features.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::Construction(_)
                | Error::InvalidInput(_)
                | Error::UnknownMethod(_)
                | Error::UnsupportedMethod { .. }
                | Error::Representation(_)
        )
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
