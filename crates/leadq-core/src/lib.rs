#![deny(missing_docs)]

//! # leadq-core — Foundational Types for Lead Qualification
//!
//! Every other crate in the workspace depends on this one. It has no
//! internal crate dependencies; only `serde`, `thiserror` and `chrono`
//! from the external ecosystem.
//!
//! ## Contents
//!
//! - [`LeadInfo`]: the identifying information collected in the first two
//!   wizard steps, with per-field validation rules.
//! - [`Timestamp`]: UTC timestamp serialized as RFC 3339 with millisecond
//!   precision, the format the webhook consumers expect.
//! - [`ValidationError`]: one variant per field rule, carrying the
//!   offending field and value.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{LeadField, LeadInfo};
pub use temporal::Timestamp;
