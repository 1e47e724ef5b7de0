//! JSON POST client with bounded retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::WebhookConfig;
use crate::error::{AttemptError, DeliveryError};
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Longest error response body carried into an [`AttemptError::Status`].
pub const MAX_ERROR_BODY_BYTES: usize = 512;

/// Which snapshot is being delivered, and therefore to which endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStage {
    /// Snapshot sent on entering the scheduling step.
    Qualification,
    /// Final snapshot carrying the chosen slot.
    Scheduling,
}

impl DeliveryStage {
    /// Lowercase stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qualification => "qualification",
            Self::Scheduling => "scheduling",
        }
    }
}

impl std::fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qualification" => Ok(Self::Qualification),
            "scheduling" => Ok(Self::Scheduling),
            other => Err(format!("unknown delivery stage: {other}")),
        }
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// URL the payload was posted to.
    pub endpoint: String,
    /// Attempts it took, including the successful one.
    pub attempts: u32,
    /// HTTP status of the successful response.
    pub status: u16,
}

/// Destination for qualification snapshots.
///
/// Implemented by [`WebhookClient`]; the wizard holds it as
/// `Arc<dyn LeadSink>` so tests can record deliveries instead.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Deliver one snapshot for the given stage.
    async fn deliver(
        &self,
        stage: DeliveryStage,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Webhook client. Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    config: WebhookConfig,
    policy: RetryPolicy,
}

impl WebhookClient {
    /// Create a client from configuration.
    ///
    /// The configured timeout bounds each attempt: connect, send and
    /// response body together.
    pub fn new(config: WebhookConfig) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(DeliveryError::ClientInit)?;
        let policy = config.retry_policy();
        Ok(Self {
            http,
            config,
            policy,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Active retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Configured URL for a stage.
    pub fn endpoint_for(&self, stage: DeliveryStage) -> &Url {
        match stage {
            DeliveryStage::Qualification => &self.config.qualification_url,
            DeliveryStage::Scheduling => &self.config.scheduling_url,
        }
    }

    /// POST `payload` as JSON to `endpoint`, retrying per the policy.
    pub async fn send<P>(&self, endpoint: &Url, payload: &P) -> Result<DeliveryReceipt, DeliveryError>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(|e| DeliveryError::Serialization {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        let timeout = self.config.timeout();

        let outcome = retry_with_backoff(&self.policy, endpoint.as_str(), |attempt| {
            let body = body.clone();
            async move {
                tracing::info!(
                    endpoint = %endpoint,
                    attempt,
                    max_attempts = self.policy.max_attempts(),
                    bytes = body.len(),
                    "sending webhook"
                );
                self.attempt(endpoint, body, timeout).await
            }
        })
        .await;

        match outcome {
            Ok((status, attempts)) => {
                tracing::info!(endpoint = %endpoint, attempts, status, "webhook delivered");
                Ok(DeliveryReceipt {
                    endpoint: endpoint.to_string(),
                    attempts,
                    status,
                })
            }
            Err(exhausted) => Err(DeliveryError::Exhausted {
                endpoint: endpoint.to_string(),
                attempts: exhausted.attempts,
                last_error: exhausted.last_error.to_string(),
            }),
        }
    }

    /// Deliver to the URL configured for `stage`.
    pub async fn send_stage<P>(&self, stage: DeliveryStage, payload: &P) -> Result<DeliveryReceipt, DeliveryError>
    where
        P: Serialize + ?Sized,
    {
        let endpoint = self.endpoint_for(stage).clone();
        self.send(&endpoint, payload).await
    }

    /// Deliver to the qualification URL.
    pub async fn send_qualification<P>(&self, payload: &P) -> Result<DeliveryReceipt, DeliveryError>
    where
        P: Serialize + ?Sized,
    {
        self.send_stage(DeliveryStage::Qualification, payload).await
    }

    /// Deliver to the scheduling URL.
    pub async fn send_scheduling<P>(&self, payload: &P) -> Result<DeliveryReceipt, DeliveryError>
    where
        P: Serialize + ?Sized,
    {
        self.send_stage(DeliveryStage::Scheduling, payload).await
    }

    async fn attempt(&self, endpoint: &Url, body: Vec<u8>, timeout: Duration) -> Result<u16, AttemptError> {
        let resp = self
            .http
            .post(endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(text) => truncate_body(text),
                Err(e) => format!("<unreadable body: {e}>"),
            };
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(status.as_u16())
    }
}

/// Cap an error response body at [`MAX_ERROR_BODY_BYTES`], on a char boundary.
fn truncate_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut cut = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    body.truncate(cut);
    body.push_str("…");
    body
}

fn classify(e: reqwest::Error, timeout: Duration) -> AttemptError {
    if e.is_timeout() {
        AttemptError::Timeout(timeout)
    } else {
        AttemptError::Transport(e)
    }
}

#[async_trait]
impl LeadSink for WebhookClient {
    async fn deliver(
        &self,
        stage: DeliveryStage,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        self.send_stage(stage, payload).await
    }
}
