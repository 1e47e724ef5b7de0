//! # leadq-webhook — Webhook Delivery Service
//!
//! Posts qualification snapshots as JSON to an external webhook (an n8n
//! flow in the default configuration) with bounded retries.
//!
//! ## Delivery Contract
//!
//! - One `POST` per attempt, `Content-Type: application/json`, no auth.
//! - Each attempt is bounded by the configured timeout; a late response
//!   counts as a failed attempt.
//! - Non-2xx responses count as failures for retry purposes.
//! - After a failed attempt `k < max_attempts` the client sleeps
//!   `base_delay * 2^(k-1)` and tries again. No sleep after the last one.
//! - The final failure is surfaced as [`DeliveryError::Exhausted`].
//!
//! Deliveries are strictly sequential. No queue, no circuit breaker.

pub mod client;
pub mod config;
pub mod error;
pub mod retry;

pub use client::{DeliveryReceipt, DeliveryStage, LeadSink, WebhookClient, MAX_ERROR_BODY_BYTES};
pub use config::{ConfigError, WebhookConfig};
pub use error::{AttemptError, DeliveryError};
pub use retry::{retry_with_backoff, Exhausted, RetryPolicy};
