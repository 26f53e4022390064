//! In-memory queue transport for testing and development.
//!
//! This transport never touches the network. It:
//! - Records every call in order, with its destination and serialized bodies
//! - Assigns random message IDs to accepted messages
//! - Can fail every call with a configured error
//! - Can reject chosen batch entry IDs to simulate partial batch failures
//!
//! Clones share the same recorded state, so a test can hand one clone to a
//! sender and inspect the other.

use crate::client::QueueTransport;
use crate::error::SenderError;
use crate::message::{AcceptedEntry, BatchEntry, BatchReport, MessageId, QueueUrl, RejectedEntry};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

type FailureFactory = Arc<dyn Fn() -> SenderError + Send + Sync>;

/// A call observed by the in-memory transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// One `send_message` call
    Send { queue: QueueUrl, body: String },
    /// One `send_message_batch` call
    Batch {
        queue: QueueUrl,
        entries: Vec<BatchEntry>,
    },
}

impl RecordedCall {
    /// Destination of the call
    pub fn queue(&self) -> &QueueUrl {
        match self {
            Self::Send { queue, .. } => queue,
            Self::Batch { queue, .. } => queue,
        }
    }
}

#[derive(Default)]
struct TransportState {
    calls: Vec<RecordedCall>,
    failure: Option<FailureFactory>,
    rejected_ids: HashSet<String>,
}

/// Queue transport that records calls instead of sending them
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<TransportState>>,
}

impl InMemoryTransport {
    /// Create new transport with no recorded calls
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent call with the error produced by `failure`
    ///
    /// Failed calls are still recorded, as a real request would still have been sent.
    pub async fn fail_with<F>(&self, failure: F)
    where
        F: Fn() -> SenderError + Send + Sync + 'static,
    {
        self.state.lock().await.failure = Some(Arc::new(failure));
    }

    /// Stop failing calls
    pub async fn clear_failure(&self) {
        self.state.lock().await.failure = None;
    }

    /// Reject the batch entries with these IDs in subsequent batch calls
    pub async fn reject_entries<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock().await;
        state.rejected_ids = ids.into_iter().map(Into::into).collect();
    }

    /// Get all recorded calls in order
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of calls made so far
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.calls.len()
    }

    /// Get the bodies of every message sent, across single and batch calls
    pub async fn sent_bodies(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .flat_map(|call| match call {
                RecordedCall::Send { body, .. } => vec![body.clone()],
                RecordedCall::Batch { entries, .. } => {
                    entries.iter().map(|entry| entry.body.clone()).collect()
                }
            })
            .collect()
    }

    /// Forget all recorded calls
    pub async fn clear(&self) {
        self.state.lock().await.calls.clear();
    }
}

impl std::fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl QueueTransport for InMemoryTransport {
    async fn send_message(
        &self,
        queue: &QueueUrl,
        body: String,
    ) -> Result<MessageId, SenderError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::Send {
            queue: queue.clone(),
            body,
        });

        if let Some(failure) = &state.failure {
            return Err(failure());
        }

        Ok(MessageId::new())
    }

    async fn send_message_batch(
        &self,
        queue: &QueueUrl,
        entries: Vec<BatchEntry>,
    ) -> Result<BatchReport, SenderError> {
        let mut state = self.state.lock().await;

        let (rejected, accepted): (Vec<_>, Vec<_>) = entries
            .iter()
            .partition(|entry| state.rejected_ids.contains(&entry.id));

        let accepted = accepted
            .into_iter()
            .map(|entry| AcceptedEntry {
                id: entry.id.clone(),
                message_id: MessageId::new(),
            })
            .collect();
        let rejected = rejected
            .into_iter()
            .map(|entry| RejectedEntry {
                id: entry.id.clone(),
                code: "InvalidMessageContents".to_string(),
                message: Some("rejected by in-memory transport".to_string()),
                sender_fault: true,
            })
            .collect();

        state.calls.push(RecordedCall::Batch {
            queue: queue.clone(),
            entries,
        });

        if let Some(failure) = &state.failure {
            return Err(failure());
        }

        Ok(BatchReport::new(accepted, rejected))
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
