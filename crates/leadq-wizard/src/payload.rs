//! Webhook payload snapshots.
//!
//! A payload is assembled once per delivery from the variant, the lead,
//! the answers and the scoring result, and never mutated afterwards.

use serde::{Deserialize, Serialize};

use leadq_core::{LeadInfo, Timestamp};
use leadq_scoring::{AnswerSet, GateResults, QualificationResult, QuestionnaireVariant};

use crate::scheduling::SchedulingSelection;

/// `stage` marker on the snapshot sent when the lead reaches scheduling.
pub const PRE_SCHEDULING_STAGE: &str = "entered-scheduling-screen";
/// Suffix appended to the variant's `testType` on that snapshot.
pub const PRE_SCHEDULING_SUFFIX: &str = "-pre-scheduling";

/// Score summary as consumed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationSummary {
    pub total_score: u32,
    /// Tier label, e.g. `💼 COMERCIAL`.
    pub category: String,
    pub description: String,
    pub max_possible_score: u32,
}

impl From<&QualificationResult> for QualificationSummary {
    fn from(result: &QualificationResult) -> Self {
        Self {
            total_score: result.total_score,
            category: result.label.clone(),
            description: result.description.clone(),
            max_possible_score: result.max_possible_score,
        }
    }
}

/// One visible question and what was picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: u32,
    pub question: String,
    /// Zero when unanswered.
    pub selected_points: u32,
    /// Option text; `null` when unanswered.
    pub selected_option: Option<String>,
    pub gate: Option<String>,
}

/// Body of every webhook POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub timestamp: Timestamp,
    pub test_type: String,
    pub athlete_info: LeadInfo,
    pub qualification: QualificationSummary,
    pub gates: GateResults,
    pub answers: Vec<AnswerRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_call_scheduling: Option<SchedulingSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub source: String,
    /// Where the session originated.
    pub url: String,
}

/// Inputs shared by both snapshots.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotContext<'a> {
    pub variant: &'a QuestionnaireVariant,
    pub lead: &'a LeadInfo,
    pub answers: &'a AnswerSet,
    pub result: &'a QualificationResult,
    pub url: &'a str,
    pub timestamp: Timestamp,
}

impl WebhookPayload {
    /// Snapshot sent on entering the scheduling step.
    pub fn pre_scheduling(ctx: SnapshotContext<'_>) -> Self {
        let mut payload = Self::base(ctx);
        payload.test_type = format!("{}{PRE_SCHEDULING_SUFFIX}", ctx.variant.test_type);
        payload.stage = Some(PRE_SCHEDULING_STAGE.to_string());
        payload
    }

    /// Final snapshot carrying the chosen slot.
    pub fn with_scheduling(ctx: SnapshotContext<'_>, scheduling: SchedulingSelection) -> Self {
        let mut payload = Self::base(ctx);
        payload.video_call_scheduling = Some(scheduling);
        payload
    }

    fn base(ctx: SnapshotContext<'_>) -> Self {
        Self {
            timestamp: ctx.timestamp,
            test_type: ctx.variant.test_type.clone(),
            athlete_info: ctx.lead.clone(),
            qualification: QualificationSummary::from(ctx.result),
            gates: ctx.result.gates.clone(),
            answers: answer_records(ctx.variant, ctx.answers),
            video_call_scheduling: None,
            stage: None,
            source: ctx.variant.source.clone(),
            url: ctx.url.to_string(),
        }
    }
}

/// Answer records over the currently visible questions, in order.
pub fn answer_records(variant: &QuestionnaireVariant, answers: &AnswerSet) -> Vec<AnswerRecord> {
    variant
        .visible_questions(answers)
        .into_iter()
        .map(|q| {
            let points = answers.get(q.id);
            AnswerRecord {
                question_id: q.id,
                question: q.prompt.clone(),
                selected_points: points.unwrap_or(0),
                selected_option: points
                    .and_then(|p| q.selected_option(p))
                    .map(|o| o.text.clone()),
                gate: q.gate.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use leadq_scoring::{compute_result, VariantRegistry};

    fn athlete() -> QuestionnaireVariant {
        VariantRegistry::builtin().unwrap().get("athlete").unwrap().clone()
    }

    fn stamp() -> Timestamp {
        Timestamp::from(Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap())
    }

    #[test]
    fn pre_scheduling_snapshot_shape() {
        let variant = athlete();
        let lead = LeadInfo {
            full_name: "Lucas Pereira".into(),
            ..LeadInfo::default()
        };
        let answers = AnswerSet::from([(1, 24), (2, 18), (3, 10)]);
        let result = compute_result(&answers, &variant);
        let payload = WebhookPayload::pre_scheduling(SnapshotContext {
            variant: &variant,
            lead: &lead,
            answers: &answers,
            result: &result,
            url: "https://next.example/teste",
            timestamp: stamp(),
        });

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["timestamp"], "2026-03-10T12:00:00.000Z");
        assert_eq!(json["testType"], "ab-athlete-mobile-pre-scheduling");
        assert_eq!(json["stage"], "entered-scheduling-screen");
        assert_eq!(json["source"], "athlete-qualification-form-ab");
        assert_eq!(json["athleteInfo"]["fullName"], "Lucas Pereira");
        assert_eq!(json["qualification"]["totalScore"], 52);
        assert_eq!(json["qualification"]["category"], "💼 COMERCIAL");
        assert_eq!(json["qualification"]["maxPossibleScore"], 92);
        assert_eq!(json["gates"]["gi_internacional"], true);
        assert_eq!(json["gates"]["gn_next"], false);
        assert_eq!(json["gates"]["hasAnyGate"], true);
        assert!(json.get("videoCallScheduling").is_none());

        let answers = json["answers"].as_array().unwrap();
        assert_eq!(answers.len(), 5);
        assert_eq!(answers[0]["questionId"], 1);
        assert_eq!(answers[0]["selectedOption"], "Campeonato/treino");
        assert_eq!(answers[0]["gate"], "GI");
        assert_eq!(answers[3]["selectedPoints"], 0);
        assert!(answers[3]["selectedOption"].is_null());
        assert!(answers[3]["gate"].is_null());
    }

    #[test]
    fn hidden_questions_are_left_out() {
        let variant = athlete();
        let answers = AnswerSet::from([(4, 6)]);
        let records = answer_records(&variant, &answers);
        let ids: Vec<u32> = records.iter().map(|r| r.question_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
