//! # Queue Sender
//!
//! Publishes JSON-serialized messages to AWS SQS queues, one at a time or in
//! batches.
//!
//! This library provides:
//! - Typed ([`Sender<T>`]) and untyped ([`AnySender`]) senders bound to one queue
//! - Construction from the ambient AWS configuration chain, an explicit
//!   `SdkConfig`, or file/environment configuration
//! - Per-entry outcomes for batch sends
//! - An in-memory transport for tests
//!
//! The sender is deliberately thin: no retries, no chunking, no size checks.
//! Each call is one request and every failure is returned to the caller.
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for construction and send operations
//! - [`message`] - Queue URL, message ID and batch outcome types
//! - [`provider`] - Sender and AWS configuration
//! - [`client`] - Transport trait
//! - [`providers`] - SQS and in-memory transports
//! - [`sender`] - The senders
//!
//! ## Example
//!
//! ```no_run
//! use queue_sender::Sender;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct OrderPlaced {
//!     id: u64,
//! }
//!
//! # async fn example() -> Result<(), queue_sender::SenderError> {
//! let sender: Sender<OrderPlaced> =
//!     Sender::from_env("https://sqs.us-east-1.amazonaws.com/123456789012/orders").await?;
//!
//! sender.send(&OrderPlaced { id: 1 }).await?;
//! sender
//!     .send_batch(&[OrderPlaced { id: 2 }, OrderPlaced { id: 3 }])
//!     .await?
//!     .into_result()?;
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod client;
pub mod error;
pub mod message;
pub mod provider;
pub mod providers;
pub mod sender;

// Re-export commonly used types at crate root for convenience
pub use client::QueueTransport;
pub use error::{ConfigurationError, ErrorStage, SenderError, SerializationError, ValidationError};
pub use message::{AcceptedEntry, BatchEntry, BatchReport, MessageId, QueueUrl, RejectedEntry};
pub use provider::{AwsSqsConfig, SenderConfig};
pub use providers::{InMemoryTransport, RecordedCall, SqsTransport};
pub use sender::{AnySender, Sender};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
