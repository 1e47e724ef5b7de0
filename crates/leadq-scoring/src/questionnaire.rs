//! # Questionnaire Variant Descriptors
//!
//! One parameterized descriptor per questionnaire variant: the question
//! list, the gate decision table and the tier thresholds. Variants are
//! authored in YAML and validated once at load time, so the engine can
//! treat them as well-formed.
//!
//! ## Gate Table
//!
//! Each [`GateRule`] is a set-membership predicate on a single question:
//! the gate passes iff the recorded points for `question` are one of
//! `passing_points`. The table is data, not a rule engine.
//!
//! ## Tier Table
//!
//! ```text
//! score <= baseline_max                      -> baseline
//! score >= premium_min && any gate passed    -> premium
//! otherwise                                  -> commercial
//! ```
//!
//! A score at or above `premium_min` with no gate passed is demoted to
//! commercial.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::error::VariantError;

/// A selectable answer to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Display text.
    pub text: String,
    /// Points awarded when selected.
    pub points: u32,
    /// Marks a high-value option for presentation.
    #[serde(default)]
    pub highlighted: bool,
}

/// Hides a question when an earlier answer has one of the listed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityRule {
    /// Question whose answer controls visibility.
    pub question: u32,
    /// Point values that hide the dependent question.
    pub points: BTreeSet<u32>,
}

/// A single questionnaire item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within the variant.
    pub id: u32,
    /// Question text.
    pub prompt: String,
    /// Options in display order.
    pub options: Vec<AnswerOption>,
    /// Gate tag this question feeds, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    /// Conditional visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_when: Option<VisibilityRule>,
}

impl Question {
    /// Whether this question is shown given the answers recorded so far.
    ///
    /// An unanswered controlling question leaves the dependent visible.
    pub fn is_visible(&self, answers: &AnswerSet) -> bool {
        match &self.hidden_when {
            None => true,
            Some(rule) => match answers.get(rule.question) {
                Some(points) => !rule.points.contains(&points),
                None => true,
            },
        }
    }

    /// The option whose point value matches, if any.
    ///
    /// Point values are unique within each shipped question, so the first
    /// match is the selected option.
    pub fn selected_option(&self, points: u32) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.points == points)
    }

    /// Whether `points` is one of this question's option values.
    pub fn accepts(&self, points: u32) -> bool {
        self.selected_option(points).is_some()
    }

    /// Highest option value.
    pub fn max_points(&self) -> u32 {
        self.options.iter().map(|o| o.points).max().unwrap_or(0)
    }
}

/// Gate decision: passes iff `answers[question] ∈ passing_points`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRule {
    /// Short tag (e.g. `GI`).
    pub tag: String,
    /// Key used in the webhook payload (e.g. `gi_internacional`).
    pub key: String,
    /// Human-readable name.
    pub label: String,
    /// Question the gate inspects.
    pub question: u32,
    /// Point values that open the gate.
    pub passing_points: BTreeSet<u32>,
}

impl GateRule {
    /// Evaluate the gate. Unanswered questions never pass.
    pub fn evaluate(&self, answers: &AnswerSet) -> bool {
        answers
            .get(self.question)
            .is_some_and(|p| self.passing_points.contains(&p))
    }
}

/// Label and description shown for a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLabel {
    /// Tier name as sent downstream.
    pub label: String,
    /// One-line description.
    pub description: String,
}

/// Tier thresholds and labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable {
    /// Inclusive upper bound of the baseline tier.
    pub baseline_max: u32,
    /// Inclusive lower bound of the premium tier. `None` disables premium.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_min: Option<u32>,
    /// Baseline tier label.
    pub baseline: TierLabel,
    /// Commercial tier label.
    pub commercial: TierLabel,
    /// Premium tier label; required iff `premium_min` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<TierLabel>,
    /// Description used instead of the commercial one when a premium-range
    /// score is demoted for lack of a gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demoted_description: Option<String>,
}

/// A complete questionnaire variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireVariant {
    /// Stable identifier (e.g. `athlete`).
    pub id: String,
    /// Display title.
    pub title: String,
    /// `testType` reported on the final webhook snapshot.
    pub test_type: String,
    /// `source` reported on every webhook snapshot.
    pub source: String,
    /// Questions in presentation order.
    pub questions: Vec<Question>,
    /// Gate decision table.
    #[serde(default)]
    pub gates: Vec<GateRule>,
    /// Tier thresholds.
    pub tiers: TierTable,
}

impl QuestionnaireVariant {
    /// Parse and validate a variant from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, VariantError> {
        let variant: Self = serde_yaml::from_str(yaml)?;
        variant.validate()?;
        Ok(variant)
    }

    /// Read, parse and validate a variant from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, VariantError> {
        let content = std::fs::read_to_string(path).map_err(|source| VariantError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Structural checks: unique ids, non-empty options, resolvable
    /// references, ordered thresholds.
    pub fn validate(&self) -> Result<(), VariantError> {
        let mut ids = HashSet::new();
        for q in &self.questions {
            if !ids.insert(q.id) {
                return Err(VariantError::DuplicateQuestion {
                    variant: self.id.clone(),
                    question: q.id,
                });
            }
            if q.options.is_empty() {
                return Err(VariantError::NoOptions {
                    variant: self.id.clone(),
                    question: q.id,
                });
            }
        }

        for q in &self.questions {
            if let Some(rule) = &q.hidden_when {
                if !ids.contains(&rule.question) {
                    return Err(VariantError::UnknownQuestion {
                        variant: self.id.clone(),
                        rule: format!("visibility rule of question {}", q.id),
                        question: rule.question,
                    });
                }
            }
        }

        let mut keys = HashSet::new();
        for gate in &self.gates {
            if !ids.contains(&gate.question) {
                return Err(VariantError::UnknownQuestion {
                    variant: self.id.clone(),
                    rule: format!("gate {}", gate.tag),
                    question: gate.question,
                });
            }
            if !keys.insert(gate.key.as_str()) {
                return Err(VariantError::DuplicateGate {
                    variant: self.id.clone(),
                    key: gate.key.clone(),
                });
            }
        }

        if self.checked_max_score().is_none() {
            return Err(VariantError::ScoreOverflow {
                variant: self.id.clone(),
            });
        }

        match (self.tiers.premium_min, &self.tiers.premium) {
            (Some(premium_min), Some(_)) => {
                if premium_min <= self.tiers.baseline_max {
                    return Err(VariantError::TierOrder {
                        variant: self.id.clone(),
                        baseline_max: self.tiers.baseline_max,
                        premium_min,
                    });
                }
            }
            (None, None) => {}
            _ => {
                return Err(VariantError::PremiumMismatch {
                    variant: self.id.clone(),
                })
            }
        }

        Ok(())
    }

    /// Look up a question by id.
    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions shown for the current answers, in presentation order.
    pub fn visible_questions(&self, answers: &AnswerSet) -> Vec<&Question> {
        self.questions.iter().filter(|q| q.is_visible(answers)).collect()
    }

    /// Sum of each question's highest option value.
    ///
    /// Saturates at `u32::MAX`; variants that would saturate are rejected
    /// by [`validate`](Self::validate).
    pub fn max_possible_score(&self) -> u32 {
        self.checked_max_score().unwrap_or(u32::MAX)
    }

    fn checked_max_score(&self) -> Option<u32> {
        self.questions
            .iter()
            .try_fold(0u32, |acc, q| acc.checked_add(q.max_points()))
    }
}
