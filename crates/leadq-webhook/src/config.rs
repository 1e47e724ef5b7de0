//! Webhook endpoint configuration.
//!
//! One explicit object built at startup and passed to [`WebhookClient`].
//! Defaults point at a local n8n instance. Override via environment
//! variables or explicit construction for staging/testing.
//!
//! [`WebhookClient`]: crate::WebhookClient

use std::time::Duration;

use url::Url;

use crate::retry::RetryPolicy;

/// Env var for the qualification (pre-scheduling) endpoint.
pub const ENV_QUALIFICATION_URL: &str = "LEADQ_WEBHOOK_QUALIFICATION_URL";
/// Env var for the scheduling (final) endpoint.
pub const ENV_SCHEDULING_URL: &str = "LEADQ_WEBHOOK_SCHEDULING_URL";
/// Env var for the per-attempt timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "LEADQ_API_TIMEOUT_MS";
/// Env var for the attempt cap.
pub const ENV_MAX_ATTEMPTS: &str = "LEADQ_WEBHOOK_MAX_ATTEMPTS";
/// Env var for the base backoff delay in milliseconds.
pub const ENV_RETRY_DELAY_MS: &str = "LEADQ_WEBHOOK_RETRY_DELAY_MS";

const DEFAULT_QUALIFICATION_URL: &str = "http://localhost:5678/webhook/qualification";
const DEFAULT_SCHEDULING_URL: &str = "http://localhost:5678/webhook/scheduling";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Where and how to deliver webhook snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Receives the snapshot sent on entering the scheduling step.
    pub qualification_url: Url,
    /// Receives the final snapshot with the chosen slot.
    pub scheduling_url: Url,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total attempts per delivery, including the first. Never zero.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each later one.
    pub base_delay_ms: u64,
}

impl WebhookConfig {
    /// Load configuration from process environment variables.
    ///
    /// Variables:
    /// - `LEADQ_WEBHOOK_QUALIFICATION_URL` (default: `http://localhost:5678/webhook/qualification`)
    /// - `LEADQ_WEBHOOK_SCHEDULING_URL` (default: `http://localhost:5678/webhook/scheduling`)
    /// - `LEADQ_API_TIMEOUT_MS` (default: 10000)
    /// - `LEADQ_WEBHOOK_MAX_ATTEMPTS` (default: 3)
    /// - `LEADQ_WEBHOOK_RETRY_DELAY_MS` (default: 1000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unparseable numbers fall back to their defaults. Invalid URLs and a
    /// zero attempt cap are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_attempts = lookup_number(&lookup, ENV_MAX_ATTEMPTS, DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        Ok(Self {
            qualification_url: lookup_url(&lookup, ENV_QUALIFICATION_URL, DEFAULT_QUALIFICATION_URL)?,
            scheduling_url: lookup_url(&lookup, ENV_SCHEDULING_URL, DEFAULT_SCHEDULING_URL)?,
            timeout_ms: lookup_number(&lookup, ENV_TIMEOUT_MS, DEFAULT_TIMEOUT_MS),
            max_attempts,
            base_delay_ms: lookup_number(&lookup, ENV_RETRY_DELAY_MS, DEFAULT_RETRY_DELAY_MS),
        })
    }

    /// Built-in defaults, ignoring the environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_lookup(|_| None)
    }

    /// Configuration pointing both stages at a local mock server (for testing).
    ///
    /// Uses `/webhook/qualification` and `/webhook/scheduling` under `base`,
    /// a short timeout and a short backoff.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base` cannot be parsed.
    pub fn local_mock(base: &str) -> Result<Self, ConfigError> {
        let make_url = |path: &str| -> Result<Url, ConfigError> {
            let raw = format!("{}{path}", base.trim_end_matches('/'));
            Url::parse(&raw).map_err(|e| invalid_url(LOCAL_MOCK_SETTING, &raw, e))
        };
        Ok(Self {
            qualification_url: make_url("/webhook/qualification")?,
            scheduling_url: make_url("/webhook/scheduling")?,
            timeout_ms: 1_000,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: 10,
        })
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry policy derived from the attempt cap and base delay.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

fn lookup_url<F>(lookup: &F, var: &str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(var).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| invalid_url(var, &raw, e))
}

/// `InvalidUrl` always names the setting first, then the value and reason.
fn invalid_url(setting: &str, raw: &str, e: url::ParseError) -> ConfigError {
    ConfigError::InvalidUrl(setting.to_string(), format!("{raw:?}: {e}"))
}

fn lookup_number<F, N>(lookup: &F, var: &str, default: N) -> N
where
    F: Fn(&str) -> Option<String>,
    N: std::str::FromStr,
{
    lookup(var)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Setting name reported when [`WebhookConfig::local_mock`] gets a bad base.
pub const LOCAL_MOCK_SETTING: &str = "local_mock base";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Setting name (env var or [`LOCAL_MOCK_SETTING`]), then value and reason.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("LEADQ_WEBHOOK_MAX_ATTEMPTS must be at least 1")]
    ZeroAttempts,
}
