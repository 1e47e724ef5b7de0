//! # leadq-wizard — Headless Qualification Wizard
//!
//! Drives one lead through identity capture, the questionnaire and callback
//! scheduling, invoking the scoring engine and the webhook sink at the two
//! delivery points. No rendering, no persistence.
//!
//! The sink is injected as `Arc<dyn LeadSink>`; production code passes a
//! [`leadq_webhook::WebhookClient`], tests pass a recorder.

pub mod controller;
pub mod error;
pub mod payload;
pub mod scheduling;

pub use controller::{Clock, Notice, WizardController, WizardStep};
pub use error::WizardError;
pub use payload::{AnswerRecord, QualificationSummary, SnapshotContext, WebhookPayload};
pub use scheduling::{parse_slot_time, SchedulingSelection, SlotCalendar};
