//! Common test utilities for queue-sender integration tests
//!
//! This module provides:
//! - A mock SQS endpoint speaking the AWS JSON 1.0 protocol
//! - SDK clients wired to the mock endpoint with static credentials
//! - Response builders for successful and failed SQS operations

use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::retry::RetryConfig;
use aws_sdk_sqs::config::{Credentials, Region};
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEND_MESSAGE: &str = "AmazonSQS.SendMessage";
pub const SEND_MESSAGE_BATCH: &str = "AmazonSQS.SendMessageBatch";

const AWS_JSON: &str = "application/x-amz-json-1.0";

/// Install a test log writer once per test binary
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start a mock SQS endpoint
pub async fn start_sqs() -> MockServer {
    init_tracing();
    MockServer::start().await
}

/// Queue URL hosted by the mock endpoint
pub fn queue_url(server: &MockServer, name: &str) -> String {
    format!("{}/000000000000/{}", server.uri(), name)
}

/// SDK client pointed at the mock endpoint, with retries disabled
pub fn sqs_client(server: &MockServer) -> aws_sdk_sqs::Client {
    sqs_client_for(&server.uri())
}

/// SDK client pointed at an arbitrary endpoint, with retries disabled
pub fn sqs_client_for(endpoint: &str) -> aws_sdk_sqs::Client {
    let config = aws_sdk_sqs::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .endpoint_url(endpoint)
        .retry_config(RetryConfig::disabled())
        .build();

    aws_sdk_sqs::Client::from_conf(config)
}

/// Local endpoint with nothing listening on it
#[allow(dead_code)]
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Mock matching one SQS JSON operation
pub fn sqs_operation(target: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", target))
}

/// Successful JSON protocol response
pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), AWS_JSON)
}

/// Response for an accepted `SendMessage`
pub fn send_message_ok(message_id: &str) -> ResponseTemplate {
    json_response(serde_json::json!({
        "MessageId": message_id,
        "MD5OfMessageBody": "51b0a325d8c7fa0b1d2b8a0ed2df8e2d",
    }))
}

/// Service error in the JSON protocol shape
#[allow(dead_code)]
pub fn service_error(status: u16, error_type: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(
        serde_json::json!({
            "__type": error_type,
            "message": message,
        })
        .to_string(),
        AWS_JSON,
    )
}

/// JSON bodies of every request received for `target`
#[allow(dead_code)]
pub async fn request_bodies(server: &MockServer, target: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| {
            request
                .headers
                .get("x-amz-target")
                .and_then(|value| value.to_str().ok())
                == Some(target)
        })
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}
