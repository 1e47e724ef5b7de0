//! Webhook delivery error types.

use std::time::Duration;

/// Why a single attempt failed. Every variant is retryable.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The attempt did not complete within the per-attempt timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// Connection, TLS or protocol failure.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
}

/// Errors from webhook deliveries.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientInit(reqwest::Error),
    /// Payload could not be encoded as JSON.
    #[error("failed to serialize payload for {endpoint}: {source}")]
    Serialization {
        endpoint: String,
        source: serde_json::Error,
    },
    /// Every attempt failed.
    #[error("webhook {endpoint} failed after {attempts} attempt(s): {last_error}")]
    Exhausted {
        endpoint: String,
        attempts: u32,
        last_error: String,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl DeliveryError {
    /// Attempts made before giving up, when the error came from the retry loop.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Exhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}
