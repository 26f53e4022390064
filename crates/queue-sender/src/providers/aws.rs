//! AWS SQS transport implementation using the AWS SDK.
//!
//! Each operation issues exactly one SDK call:
//!
//! - `send_message` maps to `SendMessage`
//! - `send_message_batch` maps to `SendMessageBatch`
//!
//! The transport does not validate SQS limits (10 entries per batch, 256KB per
//! message). Requests that exceed them fail at the service and surface as
//! [`SenderError::InvalidRequest`].
//!
//! ## Error Mapping
//!
//! Service errors are classified by their SQS error code, falling back to the
//! HTTP status for unknown codes. Both the JSON protocol codes
//! (`QueueDoesNotExist`) and the legacy query codes
//! (`AWS.SimpleQueueService.NonExistentQueue`) are recognised.
//!
//! Dispatch failures are split by cause: timeouts and I/O errors are transient,
//! while client-side faults such as a missing credentials provider are
//! reported as [`SenderError::InvalidRequest`].
//!
//! Retries are whatever the supplied SDK client is configured for. Clients built
//! from [`crate::SenderConfig`] make a single attempt.

use crate::client::QueueTransport;
use crate::error::SenderError;
use crate::message::{AcceptedEntry, BatchEntry, BatchReport, MessageId, QueueUrl, RejectedEntry};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sqs::types::SendMessageBatchRequestEntry;
use aws_sdk_sqs::Client;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[cfg(test)]
#[path = "aws_tests.rs"]
mod tests;

const PROVIDER: &str = "AwsSqs";

// ============================================================================
// AWS SQS Transport
// ============================================================================

/// AWS SQS transport backed by an `aws_sdk_sqs::Client`
///
/// The SDK client is reference counted internally, so cloning the transport is
/// cheap and clones share connection pools and credential caches.
#[derive(Clone)]
pub struct SqsTransport {
    client: Client,
}

impl SqsTransport {
    /// Wrap an existing SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build an SDK client from shared AWS configuration
    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }

    /// Get the underlying SDK client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl fmt::Debug for SqsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqsTransport")
            .field("region", &self.client.config().region())
            .finish()
    }
}

#[async_trait]
impl QueueTransport for SqsTransport {
    async fn send_message(
        &self,
        queue: &QueueUrl,
        body: String,
    ) -> Result<MessageId, SenderError> {
        let output = self
            .client
            .send_message()
            .queue_url(queue.as_str())
            .message_body(body)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, queue))?;

        Ok(parse_message_id(output.message_id()))
    }

    async fn send_message_batch(
        &self,
        queue: &QueueUrl,
        entries: Vec<BatchEntry>,
    ) -> Result<BatchReport, SenderError> {
        let request_entries = entries
            .into_iter()
            .map(|entry| {
                SendMessageBatchRequestEntry::builder()
                    .id(entry.id)
                    .message_body(entry.body)
                    .build()
                    .map_err(|e| SenderError::InvalidRequest {
                        message: format!("Failed to build batch entry: {}", e),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client
            .send_message_batch()
            .queue_url(queue.as_str())
            .set_entries(Some(request_entries))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, queue))?;

        let accepted = output
            .successful()
            .iter()
            .map(|entry| AcceptedEntry {
                id: entry.id().to_string(),
                message_id: parse_message_id(Some(entry.message_id())),
            })
            .collect();

        let rejected = output
            .failed()
            .iter()
            .map(|entry| RejectedEntry {
                id: entry.id().to_string(),
                code: entry.code().to_string(),
                message: entry.message().map(str::to_string),
                sender_fault: entry.sender_fault(),
            })
            .collect();

        Ok(BatchReport::new(accepted, rejected))
    }

    fn name(&self) -> &'static str {
        "aws-sqs"
    }
}

/// Parse the service-assigned message ID
///
/// SQS always returns an ID for accepted messages; a missing one is logged and
/// replaced so that the successful enqueue is still reported as such.
fn parse_message_id(raw: Option<&str>) -> MessageId {
    match raw.map(MessageId::from_str) {
        Some(Ok(id)) => id,
        _ => {
            warn!("SQS response carried no message ID; generated a local one");
            MessageId::new()
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map an SDK error for an operation on `queue` to a [`SenderError`]
pub(crate) fn map_sdk_error<E>(err: SdkError<E>, queue: &QueueUrl) -> SenderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::TimeoutError(_) => SenderError::Timeout { message },
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            SenderError::Timeout { message }
        }
        SdkError::DispatchFailure(failure) if failure.is_io() => {
            SenderError::ConnectionFailed { message }
        }
        // Missing identity resolvers and other client-side faults never reach the network
        SdkError::DispatchFailure(_) => SenderError::InvalidRequest { message },
        SdkError::ConstructionFailure(_) => SenderError::InvalidRequest { message },
        SdkError::ResponseError(_) => SenderError::ProviderError {
            provider: PROVIDER.to_string(),
            code: "ResponseError".to_string(),
            message,
        },
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            classify_service_error(
                service_error.code(),
                service_error.message(),
                Some(context.raw().status().as_u16()),
                queue,
            )
        }
        _ => SenderError::ProviderError {
            provider: PROVIDER.to_string(),
            code: "Unknown".to_string(),
            message,
        },
    }
}

/// Classify an SQS service error by code, falling back to HTTP status
pub(crate) fn classify_service_error(
    code: Option<&str>,
    message: Option<&str>,
    status_code: Option<u16>,
    queue: &QueueUrl,
) -> SenderError {
    let code = code.unwrap_or("Unknown");
    let message = message.unwrap_or("Unknown error");
    let detail = format!("{}: {}", code, message);

    match code {
        "AWS.SimpleQueueService.NonExistentQueue" | "QueueDoesNotExist" => {
            SenderError::QueueNotFound {
                queue_url: queue.to_string(),
            }
        }
        "InvalidClientTokenId"
        | "UnrecognizedClientException"
        | "SignatureDoesNotMatch"
        | "InvalidSecurity"
        | "ExpiredToken"
        | "MissingAuthenticationToken" => SenderError::AuthenticationFailed { message: detail },
        "AccessDenied" | "AccessDeniedException" | "KmsAccessDenied" => {
            SenderError::PermissionDenied { message: detail }
        }
        "ThrottlingException" | "Throttling" | "RequestThrottled" | "OverLimit" => {
            SenderError::Throttled { message: detail }
        }
        "TooManyEntriesInBatchRequest"
        | "AWS.SimpleQueueService.TooManyEntriesInBatchRequest"
        | "BatchRequestTooLong"
        | "AWS.SimpleQueueService.BatchRequestTooLong"
        | "EmptyBatchRequest"
        | "AWS.SimpleQueueService.EmptyBatchRequest"
        | "BatchEntryIdsNotDistinct"
        | "AWS.SimpleQueueService.BatchEntryIdsNotDistinct"
        | "InvalidBatchEntryId"
        | "AWS.SimpleQueueService.InvalidBatchEntryId"
        | "InvalidMessageContents"
        | "InvalidParameterValue"
        | "MissingParameter"
        | "UnsupportedOperation"
        | "AWS.SimpleQueueService.UnsupportedOperation" => {
            SenderError::InvalidRequest { message: detail }
        }
        _ if matches!(status_code, Some(401) | Some(403)) => {
            SenderError::AuthenticationFailed { message: detail }
        }
        _ => SenderError::ProviderError {
            provider: PROVIDER.to_string(),
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}
