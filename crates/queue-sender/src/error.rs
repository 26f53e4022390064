//! Error types for sender construction and send operations.

use crate::message::RejectedEntry;
use thiserror::Error;

/// Comprehensive error type for all sender operations
#[derive(Debug, Error)]
pub enum SenderError {
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),

    #[error("Serialization failed: {0}")]
    SerializationError(#[from] SerializationError),

    #[error("Queue not found: {queue_url}")]
    QueueNotFound { queue_url: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Request throttled: {message}")]
    Throttled { message: String },

    #[error("Operation timed out: {message}")]
    Timeout { message: String },

    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Provider error ({provider}): {code} - {message}")]
    ProviderError {
        provider: String,
        code: String,
        message: String,
    },

    #[error("{} of {total} batch entries were rejected", rejected.len())]
    PartialBatchFailure {
        total: usize,
        rejected: Vec<RejectedEntry>,
    },
}

/// Stage of a send operation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Loading or validating configuration, before any send
    Configuration,
    /// Converting a payload to JSON, before any network activity
    Encoding,
    /// The network call to the queue service
    Transport,
}

impl SenderError {
    /// Get the stage that produced this error
    pub fn stage(&self) -> ErrorStage {
        match self {
            Self::ConfigurationError(_) => ErrorStage::Configuration,
            Self::SerializationError(_) => ErrorStage::Encoding,
            _ => ErrorStage::Transport,
        }
    }

    /// Check if the error is transient.
    ///
    /// Advisory only: the sender never retries, callers decide.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConfigurationError(_) => false,
            Self::SerializationError(_) => false,
            Self::QueueNotFound { .. } => false,
            Self::AuthenticationFailed { .. } => false,
            Self::PermissionDenied { .. } => false,
            Self::Throttled { .. } => true,
            Self::Timeout { .. } => true,
            Self::ConnectionFailed { .. } => true,
            Self::InvalidRequest { .. } => false,
            Self::ProviderError { .. } => true, // Unclassified service errors are usually 5xx
            Self::PartialBatchFailure { rejected, .. } => {
                rejected.iter().all(|entry| !entry.sender_fault)
            }
        }
    }
}

/// Errors while converting payloads to JSON
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to convert to json: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("failed to convert to json: batch entry {index}: {source}")]
    BatchEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Configuration parsing failed: {message}")]
    Parsing { message: String },

    #[error("Credentials could not be resolved: {message}")]
    Credentials { message: String },
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        Self::Parsing {
            message: err.to_string(),
        }
    }
}

/// Errors for malformed identifiers returned by the queue service
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    Required { field: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
