//! # Scoring/Gating Engine
//!
//! Pure function from an [`AnswerSet`] and a [`QuestionnaireVariant`] to a
//! [`QualificationResult`]. No side effects, no error conditions: missing
//! answers contribute zero and fail their gates.
//!
//! ## Determinism
//!
//! Gate results are keyed in a `BTreeMap`, so serializing the same result
//! twice yields identical bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::questionnaire::QuestionnaireVariant;

/// Classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    /// Lowest tier.
    Baseline,
    /// Middle tier; also the landing tier for demoted premium scores.
    Commercial,
    /// Top tier; requires at least one gate.
    Premium,
}

impl ScoreTier {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Commercial => "commercial",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-gate outcomes plus the aggregate flag.
///
/// Serializes flat: `{"gi_internacional": true, ..., "hasAnyGate": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResults {
    /// Gate payload key to outcome.
    #[serde(flatten)]
    pub gates: BTreeMap<String, bool>,
    /// Logical OR of every gate.
    #[serde(rename = "hasAnyGate")]
    pub has_any_gate: bool,
}

impl GateResults {
    /// Outcome of a gate by payload key. Unknown keys report `false`.
    pub fn passed(&self, key: &str) -> bool {
        self.gates.get(key).copied().unwrap_or(false)
    }
}

/// Output of [`compute_result`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationResult {
    /// Variant the answers were scored against.
    pub variant: String,
    /// Sum of recorded points.
    pub total_score: u32,
    /// Highest score the variant allows.
    pub max_possible_score: u32,
    /// Gate outcomes.
    pub gates: GateResults,
    /// Assigned tier.
    pub category: ScoreTier,
    /// Tier label as configured on the variant.
    pub label: String,
    /// Tier description as configured on the variant.
    pub description: String,
    /// Score reached the premium threshold but no gate passed.
    pub demoted: bool,
}

/// Score an answer set against a variant.
pub fn compute_result(answers: &AnswerSet, variant: &QuestionnaireVariant) -> QualificationResult {
    let total_score = answers.total();

    let gates: BTreeMap<String, bool> = variant
        .gates
        .iter()
        .map(|g| (g.key.clone(), g.evaluate(answers)))
        .collect();
    let has_any_gate = gates.values().any(|passed| *passed);

    let tiers = &variant.tiers;
    let premium_range = tiers.premium_min.is_some_and(|min| total_score >= min);

    let (category, demoted) = if total_score <= tiers.baseline_max {
        (ScoreTier::Baseline, false)
    } else if premium_range && has_any_gate {
        (ScoreTier::Premium, false)
    } else {
        (ScoreTier::Commercial, premium_range)
    };

    let (label, description) = match category {
        ScoreTier::Baseline => (tiers.baseline.label.clone(), tiers.baseline.description.clone()),
        ScoreTier::Premium => match &tiers.premium {
            Some(p) => (p.label.clone(), p.description.clone()),
            None => (tiers.commercial.label.clone(), tiers.commercial.description.clone()),
        },
        ScoreTier::Commercial => {
            let description = match (&tiers.demoted_description, demoted) {
                (Some(d), true) => d.clone(),
                _ => tiers.commercial.description.clone(),
            };
            (tiers.commercial.label.clone(), description)
        }
    };

    QualificationResult {
        variant: variant.id.clone(),
        total_score,
        max_possible_score: variant.max_possible_score(),
        gates: GateResults {
            gates,
            has_any_gate,
        },
        category,
        label,
        description,
        demoted,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::registry::VariantRegistry;
    use proptest::prelude::*;

    /// Strategy: for each question of the variant, either skip it or pick
    /// one of its option values.
    fn answers_for(variant: &QuestionnaireVariant) -> impl Strategy<Value = AnswerSet> {
        let per_question: Vec<_> = variant
            .questions
            .iter()
            .map(|q| {
                let id = q.id;
                let points: Vec<u32> = q.options.iter().map(|o| o.points).collect();
                proptest::option::of(proptest::sample::select(points))
                    .prop_map(move |p| p.map(|p| (id, p)))
            })
            .collect();
        per_question.prop_map(|picks| picks.into_iter().flatten().collect())
    }

    fn lead() -> QuestionnaireVariant {
        VariantRegistry::builtin().unwrap().get("lead").unwrap().clone()
    }

    proptest! {
        /// Total equals the sum of recorded points.
        #[test]
        fn total_is_sum(answers in answers_for(&lead())) {
            let r = compute_result(&answers, &lead());
            let expected: u32 = answers.iter().map(|(_, p)| p).sum();
            prop_assert_eq!(r.total_score, expected);
        }

        /// A gate passes iff its question's points are in the passing set.
        #[test]
        fn gates_are_membership(answers in answers_for(&lead())) {
            let v = lead();
            let r = compute_result(&answers, &v);
            for gate in &v.gates {
                let expected = answers
                    .get(gate.question)
                    .map(|p| gate.passing_points.contains(&p))
                    .unwrap_or(false);
                prop_assert_eq!(r.gates.passed(&gate.key), expected);
            }
            prop_assert_eq!(r.gates.has_any_gate, r.gates.gates.values().any(|g| *g));
        }

        /// Raising one answer never lowers the tier, unless the raise
        /// removes the only passing gate (demotion).
        #[test]
        fn tier_monotonic_except_demotion(
            answers in answers_for(&lead()),
            question in 1u32..=14,
        ) {
            let v = lead();
            let before = compute_result(&answers, &v);
            let q = v.question(question).unwrap();
            let mut raised = answers.clone();
            raised.record(question, q.max_points());
            let after = compute_result(&raised, &v);
            if after.gates.has_any_gate || !before.gates.has_any_gate {
                prop_assert!(after.category >= before.category);
            }
        }

        /// Premium implies at least one gate.
        #[test]
        fn premium_requires_gate(answers in answers_for(&lead())) {
            let r = compute_result(&answers, &lead());
            if r.category == ScoreTier::Premium {
                prop_assert!(r.gates.has_any_gate);
                prop_assert!(r.total_score >= 191);
            }
        }
    }
}
