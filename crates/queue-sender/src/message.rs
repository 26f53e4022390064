//! Message types for send operations including the queue and message identifiers.

use crate::error::{ConfigurationError, SenderError, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Validated destination queue URL
///
/// SQS addresses queues by URL (`https://sqs.<region>.amazonaws.com/<account>/<name>`).
/// Any absolute `http` or `https` URL is accepted so that local endpoints work too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueueUrl(String);

impl QueueUrl {
    /// Create new queue URL with validation
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigurationError> {
        let url = url.into();
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(ConfigurationError::Missing {
                key: "queue_url".to_string(),
            });
        }

        let parsed = Url::parse(trimmed).map_err(|e| ConfigurationError::Invalid {
            message: format!("queue_url '{}' is not a valid URL: {}", trimmed, e),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigurationError::Invalid {
                message: format!(
                    "queue_url '{}' must use http or https, found '{}'",
                    trimmed,
                    parsed.scheme()
                ),
            });
        }

        if parsed.host_str().is_none() {
            return Err(ConfigurationError::Invalid {
                message: format!("queue_url '{}' has no host", trimmed),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get queue URL as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueUrl {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for QueueUrl {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QueueUrl> for String {
    fn from(url: QueueUrl) -> Self {
        url.0
    }
}

/// Identifier assigned to an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generate new random message ID
    pub fn new() -> Self {
        let id = uuid::Uuid::new_v4();
        Self(id.to_string())
    }

    /// Get message ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "message_id".to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

// ============================================================================
// Batch Types
// ============================================================================

/// A serialized payload paired with its position in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// Decimal index of the payload within the batch call
    pub id: String,
    /// JSON encoding of the payload
    pub body: String,
}

impl BatchEntry {
    /// Create entry for the payload at `index`
    pub fn new(index: usize, body: String) -> Self {
        Self {
            id: index.to_string(),
            body,
        }
    }
}

/// Batch entry the service accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedEntry {
    pub id: String,
    pub message_id: MessageId,
}

/// Batch entry the service rejected while accepting the batch call itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    pub id: String,
    pub code: String,
    pub message: Option<String>,
    /// True when the entry itself was at fault rather than the service
    pub sender_fault: bool,
}

/// Per-entry outcome of one batch call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    accepted: Vec<AcceptedEntry>,
    rejected: Vec<RejectedEntry>,
}

impl BatchReport {
    /// Create report from accepted and rejected entries
    pub fn new(accepted: Vec<AcceptedEntry>, rejected: Vec<RejectedEntry>) -> Self {
        Self { accepted, rejected }
    }

    pub fn accepted(&self) -> &[AcceptedEntry] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[RejectedEntry] {
        &self.rejected
    }

    /// Number of entries the service reported on
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    /// Check that no entry was rejected
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Look up the message ID assigned to the payload at `index`
    pub fn message_id_for(&self, index: usize) -> Option<&MessageId> {
        let id = index.to_string();
        self.accepted
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.message_id)
    }

    /// Convert into message IDs ordered by batch position, failing on any rejection
    pub fn into_result(self) -> Result<Vec<MessageId>, SenderError> {
        if !self.rejected.is_empty() {
            return Err(SenderError::PartialBatchFailure {
                total: self.total(),
                rejected: self.rejected,
            });
        }

        let mut accepted = self.accepted;
        accepted.sort_by_key(|entry| entry.id.parse::<usize>().unwrap_or(usize::MAX));
        Ok(accepted.into_iter().map(|entry| entry.message_id).collect())
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
