//! # leadq-scoring — Questionnaire Variants and Scoring Engine
//!
//! Holds the questionnaire descriptors and the deterministic engine that
//! turns an [`AnswerSet`] into a [`QualificationResult`].
//!
//! ## Variants as Data
//!
//! Every questionnaire flavour is a single [`QuestionnaireVariant`]
//! descriptor: questions, gate table, tier thresholds. The two shipped
//! variants (`athlete`, `lead`) live in `variants/*.yaml` and are embedded
//! at compile time; additional variants can be loaded through
//! [`VariantRegistry::load_file`].
//!
//! ## Crate Policy
//!
//! - Scoring is pure: no I/O, no clock, no logging on the hot path.
//! - Descriptors are validated once at load; the engine never fails.

pub mod answers;
pub mod engine;
pub mod error;
pub mod questionnaire;
pub mod registry;

pub use answers::AnswerSet;
pub use engine::{compute_result, GateResults, QualificationResult, ScoreTier};
pub use error::VariantError;
pub use questionnaire::{
    AnswerOption, GateRule, Question, QuestionnaireVariant, TierLabel, TierTable, VisibilityRule,
};
pub use registry::VariantRegistry;
