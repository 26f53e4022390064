//! Senders that publish JSON payloads to a fixed queue.
//!
//! [`Sender<T>`] is bound to one payload type at compile time. [`AnySender`]
//! accepts any serializable value per call, for queues that carry more than one
//! message shape.
//!
//! Both senders:
//! - Serialize every payload to JSON before any network activity
//! - Issue exactly one transport call per `send` or non-empty `send_batch`
//! - Number batch entries `"0"`, `"1"`, ... in input order
//! - Never retry; failures are returned to the caller
//!
//! Cancellation is the caller's: dropping the returned future aborts the
//! in-flight request. Wrap calls in `tokio::time::timeout` for a deadline.

use crate::client::QueueTransport;
use crate::error::{ConfigurationError, SenderError, SerializationError};
use crate::message::{BatchEntry, BatchReport, MessageId, QueueUrl};
use crate::provider::{ensure_resolvable, SenderConfig};
use crate::providers::SqsTransport;
use aws_config::SdkConfig;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, field, info, instrument, warn, Span};

#[cfg(test)]
#[path = "sender_tests.rs"]
mod tests;

// ============================================================================
// Untyped Sender
// ============================================================================

/// Sender that accepts any serializable value
#[derive(Clone)]
pub struct AnySender {
    transport: Arc<dyn QueueTransport>,
    queue: QueueUrl,
}

impl AnySender {
    /// Create sender over an arbitrary transport
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `queue_url` is not a valid URL.
    pub fn with_transport(
        transport: Arc<dyn QueueTransport>,
        queue_url: impl Into<String>,
    ) -> Result<Self, SenderError> {
        let queue = QueueUrl::new(queue_url)?;
        info!(queue_url = %queue, transport = transport.name(), "Created queue sender");
        Ok(Self { transport, queue })
    }

    /// Create sender over an existing SQS client
    pub fn from_client(
        client: aws_sdk_sqs::Client,
        queue_url: impl Into<String>,
    ) -> Result<Self, SenderError> {
        Self::with_transport(Arc::new(SqsTransport::new(client)), queue_url)
    }

    /// Create sender from shared AWS configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration has no region or no
    /// credentials provider, or if `queue_url` is invalid.
    pub fn from_sdk_config(
        sdk_config: &SdkConfig,
        queue_url: impl Into<String>,
    ) -> Result<Self, SenderError> {
        ensure_resolvable(sdk_config)?;
        Self::with_transport(
            Arc::new(SqsTransport::from_sdk_config(sdk_config)),
            queue_url,
        )
    }

    /// Create sender from shared AWS configuration with SQS-specific adjustments
    ///
    /// `customize` receives the SQS client configuration builder seeded from
    /// `sdk_config` and returns the builder to use. Credentials are resolved on
    /// the first send.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the customized client has no region or
    /// no credentials provider, or if `queue_url` is invalid.
    pub fn from_sdk_config_with<F>(
        sdk_config: &SdkConfig,
        queue_url: impl Into<String>,
        customize: F,
    ) -> Result<Self, SenderError>
    where
        F: FnOnce(aws_sdk_sqs::config::Builder) -> aws_sdk_sqs::config::Builder,
    {
        let sqs_config = customize(aws_sdk_sqs::config::Builder::from(sdk_config)).build();

        if sqs_config.region().is_none() {
            return Err(ConfigurationError::Missing {
                key: "region".to_string(),
            }
            .into());
        }

        if sqs_config.credentials_provider().is_none() {
            return Err(ConfigurationError::Missing {
                key: "credentials".to_string(),
            }
            .into());
        }

        Self::from_client(aws_sdk_sqs::Client::from_conf(sqs_config), queue_url)
    }

    /// Create sender by loading AWS configuration with the given settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid or the AWS
    /// configuration chain cannot resolve a region or credentials.
    pub async fn connect(config: &SenderConfig) -> Result<Self, SenderError> {
        let queue = config.queue_url()?;
        let sdk_config = config.aws.load_sdk_config().await?;
        Self::from_sdk_config(&sdk_config, queue)
    }

    /// Create sender from the default AWS configuration chain
    pub async fn from_env(queue_url: impl Into<String>) -> Result<Self, SenderError> {
        Self::connect(&SenderConfig::new(queue_url)).await
    }

    /// Get the destination queue URL
    pub fn queue_url(&self) -> &QueueUrl {
        &self.queue
    }

    /// Bind this sender to a single payload type
    pub fn typed<T: Serialize>(self) -> Sender<T> {
        Sender {
            inner: self,
            _payload: PhantomData,
        }
    }

    /// Serialize `value` to JSON and enqueue it as one message
    ///
    /// # Errors
    ///
    /// Returns a serialization error, without sending, if `value` cannot be
    /// represented as JSON; otherwise any transport error from the send call.
    #[instrument(skip(self, value), fields(queue_url = %self.queue))]
    pub async fn send<V>(&self, value: &V) -> Result<MessageId, SenderError>
    where
        V: Serialize + ?Sized,
    {
        let body = serde_json::to_string(value).map_err(SerializationError::from)?;

        let message_id = self
            .transport
            .send_message(&self.queue, body)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to send message");
                e
            })?;

        debug!(message_id = %message_id, "Message sent");
        Ok(message_id)
    }

    /// Serialize every value to JSON and enqueue them with one batch call
    ///
    /// An empty input sends nothing and returns an empty report. The batch is
    /// not split or size-checked; service limits surface as transport errors.
    ///
    /// # Errors
    ///
    /// Returns a serialization error naming the failed entry, without sending,
    /// if any value cannot be represented as JSON; otherwise any transport
    /// error from the batch call. Entries rejected individually by the service
    /// are reported in the returned [`BatchReport`], not as an error.
    #[instrument(skip(self, values), fields(queue_url = %self.queue, entries = field::Empty))]
    pub async fn send_batch<I, V>(&self, values: I) -> Result<BatchReport, SenderError>
    where
        I: IntoIterator<Item = V>,
        V: Serialize,
    {
        let entries = encode_batch(values)?;
        Span::current().record("entries", entries.len());

        if entries.is_empty() {
            debug!("Empty batch, nothing to send");
            return Ok(BatchReport::default());
        }

        let entry_count = entries.len();
        let report = self
            .transport
            .send_message_batch(&self.queue, entries)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to send message batch");
                e
            })?;

        if report.is_complete() {
            debug!(accepted = report.accepted().len(), "Message batch sent");
        } else {
            warn!(
                total = entry_count,
                rejected = report.rejected().len(),
                "Queue rejected some batch entries"
            );
        }

        Ok(report)
    }
}

impl fmt::Debug for AnySender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnySender")
            .field("queue", &self.queue)
            .field("transport", &self.transport.name())
            .finish()
    }
}

/// Serialize values into positionally numbered batch entries
///
/// Stops at the first value that fails to serialize.
pub(crate) fn encode_batch<I, V>(values: I) -> Result<Vec<BatchEntry>, SerializationError>
where
    I: IntoIterator<Item = V>,
    V: Serialize,
{
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::to_string(&value)
                .map(|body| BatchEntry::new(index, body))
                .map_err(|source| SerializationError::BatchEntry { index, source })
        })
        .collect()
}

// ============================================================================
// Typed Sender
// ============================================================================

/// Sender bound to a single payload type
pub struct Sender<T> {
    inner: AnySender,
    _payload: PhantomData<fn(&T)>,
}

impl<T: Serialize> Sender<T> {
    /// Create sender over an arbitrary transport
    pub fn with_transport(
        transport: Arc<dyn QueueTransport>,
        queue_url: impl Into<String>,
    ) -> Result<Self, SenderError> {
        AnySender::with_transport(transport, queue_url).map(AnySender::typed)
    }

    /// Create sender over an existing SQS client
    pub fn from_client(
        client: aws_sdk_sqs::Client,
        queue_url: impl Into<String>,
    ) -> Result<Self, SenderError> {
        AnySender::from_client(client, queue_url).map(AnySender::typed)
    }

    /// Create sender from shared AWS configuration
    ///
    /// See [`AnySender::from_sdk_config`].
    pub fn from_sdk_config(
        sdk_config: &SdkConfig,
        queue_url: impl Into<String>,
    ) -> Result<Self, SenderError> {
        AnySender::from_sdk_config(sdk_config, queue_url).map(AnySender::typed)
    }

    /// Create sender from shared AWS configuration with SQS-specific adjustments
    ///
    /// See [`AnySender::from_sdk_config_with`].
    pub fn from_sdk_config_with<F>(
        sdk_config: &SdkConfig,
        queue_url: impl Into<String>,
        customize: F,
    ) -> Result<Self, SenderError>
    where
        F: FnOnce(aws_sdk_sqs::config::Builder) -> aws_sdk_sqs::config::Builder,
    {
        AnySender::from_sdk_config_with(sdk_config, queue_url, customize).map(AnySender::typed)
    }

    /// Create sender by loading AWS configuration with the given settings
    pub async fn connect(config: &SenderConfig) -> Result<Self, SenderError> {
        AnySender::connect(config).await.map(AnySender::typed)
    }

    /// Create sender from the default AWS configuration chain
    pub async fn from_env(queue_url: impl Into<String>) -> Result<Self, SenderError> {
        AnySender::from_env(queue_url).await.map(AnySender::typed)
    }

    /// Get the destination queue URL
    pub fn queue_url(&self) -> &QueueUrl {
        self.inner.queue_url()
    }

    /// Drop the payload type binding
    pub fn into_any(self) -> AnySender {
        self.inner
    }

    /// Serialize `value` to JSON and enqueue it as one message
    ///
    /// See [`AnySender::send`].
    pub async fn send(&self, value: &T) -> Result<MessageId, SenderError> {
        self.inner.send(value).await
    }

    /// Serialize every value to JSON and enqueue them with one batch call
    ///
    /// See [`AnySender::send_batch`].
    pub async fn send_batch(&self, values: &[T]) -> Result<BatchReport, SenderError> {
        self.inner.send_batch(values).await
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("payload", &std::any::type_name::<T>())
            .field("queue", &self.inner.queue)
            .field("transport", &self.inner.transport.name())
            .finish()
    }
}
