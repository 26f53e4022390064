//! Queue transport implementations.
//!
//! This module contains concrete implementations of the `QueueTransport` trait
//! for different queue backends.

pub mod aws;
pub mod memory;

pub use aws::SqsTransport;
pub use memory::{InMemoryTransport, RecordedCall};
