//! Transport trait used by senders to reach a queue.

use crate::error::SenderError;
use crate::message::{BatchEntry, BatchReport, MessageId, QueueUrl};
use async_trait::async_trait;

/// Interface implemented by queue transports (AWS SQS, in-memory)
///
/// Every method maps to exactly one outbound request. Implementations never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Enqueue a single serialized message body
    async fn send_message(&self, queue: &QueueUrl, body: String)
        -> Result<MessageId, SenderError>;

    /// Enqueue all entries with one batch request
    async fn send_message_batch(
        &self,
        queue: &QueueUrl,
        entries: Vec<BatchEntry>,
    ) -> Result<BatchReport, SenderError>;

    /// Short transport name used in logs
    fn name(&self) -> &'static str;
}
