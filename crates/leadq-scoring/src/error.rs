//! Questionnaire variant loading errors.

use std::path::PathBuf;

/// Errors raised while parsing or validating a questionnaire variant.
///
/// Scoring itself never fails; only malformed descriptors do.
#[derive(Debug, thiserror::Error)]
pub enum VariantError {
    /// YAML could not be parsed into a variant descriptor.
    #[error("failed to parse variant descriptor: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Variant file could not be read.
    #[error("failed to read variant file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Two questions share the same id.
    #[error("variant {variant}: duplicate question id {question}")]
    DuplicateQuestion { variant: String, question: u32 },

    /// A question has no options to choose from.
    #[error("variant {variant}: question {question} has no options")]
    NoOptions { variant: String, question: u32 },

    /// A gate or visibility rule points at a question that does not exist.
    #[error("variant {variant}: {rule} references unknown question {question}")]
    UnknownQuestion {
        variant: String,
        rule: String,
        question: u32,
    },

    /// Two gates share the same payload key.
    #[error("variant {variant}: duplicate gate key {key}")]
    DuplicateGate { variant: String, key: String },

    /// Tier thresholds overlap.
    #[error("variant {variant}: premium_min {premium_min} must exceed baseline_max {baseline_max}")]
    TierOrder {
        variant: String,
        baseline_max: u32,
        premium_min: u32,
    },

    /// The highest possible score does not fit in a `u32`.
    #[error("variant {variant}: maximum possible score overflows")]
    ScoreOverflow { variant: String },

    /// A premium threshold is set without premium tier labels, or vice versa.
    #[error("variant {variant}: premium_min and premium labels must be set together")]
    PremiumMismatch { variant: String },
}
