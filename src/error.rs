//! Error types and handling for Octoheat
//!
//! This module defines the error types used throughout the application.
//! Every failure of a run ends up as one of these and is reported once by
//! the binary's terminal handler.

use thiserror::Error;

/// Result type alias for Octoheat operations
pub type Result<T> = std::result::Result<T, OctoheatError>;

/// Main error type for Octoheat
#[derive(Debug, Error)]
pub enum OctoheatError {
    /// A required configuration value was not supplied by any source
    #[error("Missing configuration value: {field}")]
    ConfigurationMissing { field: String },

    /// The printer reported an API version we do not talk to
    #[error("Bad API version")]
    BadApiVersion,

    /// The printer is busy; nothing may be commanded
    #[error("Not doing anything since a job is running (state: {state})")]
    JobInProgress { state: String },

    /// A decoded payload lacked a required key
    #[error("Invalid API response: {payload}")]
    InvalidResponse { payload: String },

    /// Transport-level failures from the HTTP layer
    #[error("Network error: {message}")]
    Network { message: String },

    /// Configuration file errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

impl OctoheatError {
    /// Create a new missing-configuration error
    pub fn configuration_missing<S: Into<String>>(field: S) -> Self {
        OctoheatError::ConfigurationMissing {
            field: field.into(),
        }
    }

    /// Create a new job-in-progress error
    pub fn job_in_progress<S: Into<String>>(state: S) -> Self {
        OctoheatError::JobInProgress {
            state: state.into(),
        }
    }

    /// Create a new invalid-response error from the offending payload
    pub fn invalid_response(payload: &serde_json::Value) -> Self {
        OctoheatError::InvalidResponse {
            payload: payload.to_string(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        OctoheatError::Network {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        OctoheatError::Config {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        OctoheatError::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        OctoheatError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a normal no-op outcome rather than a fault.
    ///
    /// A running print job stops the pass on purpose; callers report it
    /// without treating the run as failed.
    pub fn is_expected(&self) -> bool {
        matches!(self, OctoheatError::JobInProgress { .. })
    }
}

impl From<std::io::Error> for OctoheatError {
    fn from(err: std::io::Error) -> Self {
        OctoheatError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for OctoheatError {
    fn from(err: serde_yaml::Error) -> Self {
        OctoheatError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for OctoheatError {
    fn from(err: serde_json::Error) -> Self {
        OctoheatError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for OctoheatError {
    fn from(err: reqwest::Error) -> Self {
        OctoheatError::network(err.to_string())
    }
}

impl From<url::ParseError> for OctoheatError {
    fn from(err: url::ParseError) -> Self {
        OctoheatError::Validation {
            field: "endpoint".to_string(),
            message: err.to_string(),
        }
    }
}
