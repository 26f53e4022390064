//! Sender configuration and AWS provider settings.
//!
//! Configuration is loaded with the `config` crate. Sources are applied in
//! order, later sources overriding earlier ones:
//!
//! 1. An optional file (TOML, JSON or YAML, detected by extension)
//! 2. Environment variables prefixed `QUEUE_SENDER` with `__` as separator,
//!    e.g. `QUEUE_SENDER__AWS__REGION=eu-west-1` sets `aws.region`
//!
//! AWS settings left unset fall through to the standard AWS configuration chain
//! (environment, shared profile files, container and instance metadata).

use crate::error::ConfigurationError;
use crate::message::QueueUrl;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_sqs::config::{Credentials, Region};
use aws_sdk_sqs::error::DisplayErrorContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "QUEUE_SENDER";

/// Provider name attached to credentials taken from configuration
const STATIC_CREDENTIALS_SOURCE: &str = "queue-sender-config";

/// Configuration for sender construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Destination queue URL
    pub queue_url: String,

    /// AWS client settings
    #[serde(default)]
    pub aws: AwsSqsConfig,
}

impl SenderConfig {
    /// Create configuration for `queue_url` with default AWS settings
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            aws: AwsSqsConfig::default(),
        }
    }

    /// Load configuration from an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns error if the file is given but missing or malformed, if a value
    /// cannot be coerced to its field type, or if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading sender configuration from file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: SenderConfig = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration without loading AWS settings
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.queue_url()?;
        self.aws.validate()
    }

    /// Get the validated destination queue URL
    pub fn queue_url(&self) -> Result<QueueUrl, ConfigurationError> {
        QueueUrl::new(self.queue_url.as_str())
    }
}

/// AWS SQS client configuration
///
/// Every field is optional; unset fields defer to the AWS configuration chain.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSqsConfig {
    /// AWS region, e.g. "us-east-1"
    pub region: Option<String>,

    /// Named profile from the shared AWS config files
    pub profile: Option<String>,

    /// Endpoint override, e.g. a LocalStack URL
    pub endpoint_url: Option<String>,

    /// Static access key; requires `secret_access_key`
    pub access_key_id: Option<String>,

    /// Static secret key; requires `access_key_id`
    pub secret_access_key: Option<String>,

    /// SDK attempts per call (1 = no SDK-level retry)
    pub max_attempts: u32,

    /// Resolve credentials at construction time
    pub verify_credentials: bool,
}

impl Default for AwsSqsConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            max_attempts: 1,
            verify_credentials: true,
        }
    }
}

impl fmt::Debug for AwsSqsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSqsConfig")
            .field("region", &self.region)
            .field("profile", &self.profile)
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<REDACTED>"),
            )
            .field("max_attempts", &self.max_attempts)
            .field("verify_credentials", &self.verify_credentials)
            .finish()
    }
}

impl AwsSqsConfig {
    /// Validate field combinations and formats
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (key, value) in [
            ("aws.region", &self.region),
            ("aws.profile", &self.profile),
            ("aws.endpoint_url", &self.endpoint_url),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ConfigurationError::Invalid {
                    message: format!("{} must not be empty when set", key),
                });
            }
        }

        if let Some(endpoint) = &self.endpoint_url {
            url::Url::parse(endpoint).map_err(|e| ConfigurationError::Invalid {
                message: format!("aws.endpoint_url '{}' is not a valid URL: {}", endpoint, e),
            })?;
        }

        match (&self.access_key_id, &self.secret_access_key) {
            (Some(_), None) => {
                return Err(ConfigurationError::Missing {
                    key: "aws.secret_access_key".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigurationError::Missing {
                    key: "aws.access_key_id".to_string(),
                })
            }
            _ => {}
        }

        if self.max_attempts == 0 {
            return Err(ConfigurationError::Invalid {
                message: "aws.max_attempts must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Load shared AWS configuration with these settings applied
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The settings are invalid
    /// - No region could be resolved
    /// - No credentials provider could be resolved
    /// - `verify_credentials` is set and resolving credentials fails
    pub async fn load_sdk_config(&self) -> Result<SdkConfig, ConfigurationError> {
        self.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(self.max_attempts));

        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        if let Some(endpoint) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(access_key), Some(secret_key)) =
            (&self.access_key_id, &self.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                STATIC_CREDENTIALS_SOURCE,
            ));
        }

        let sdk_config = loader.load().await;
        ensure_resolvable(&sdk_config)?;

        if self.verify_credentials {
            verify_credentials(&sdk_config).await?;
        }

        debug!(region = ?sdk_config.region(), "Loaded AWS configuration");
        Ok(sdk_config)
    }
}

/// Check that shared AWS configuration has a region and a credentials provider
pub fn ensure_resolvable(sdk_config: &SdkConfig) -> Result<(), ConfigurationError> {
    if sdk_config.region().is_none() {
        return Err(ConfigurationError::Missing {
            key: "region".to_string(),
        });
    }

    if sdk_config.credentials_provider().is_none() {
        return Err(ConfigurationError::Missing {
            key: "credentials".to_string(),
        });
    }

    Ok(())
}

/// Resolve credentials once so that missing or invalid credentials fail early
pub async fn verify_credentials(sdk_config: &SdkConfig) -> Result<(), ConfigurationError> {
    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| ConfigurationError::Missing {
            key: "credentials".to_string(),
        })?;

    provider
        .provide_credentials()
        .await
        .map_err(|e| ConfigurationError::Credentials {
            message: DisplayErrorContext(&e).to_string(),
        })?;

    Ok(())
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
