//! # Wizard Controller
//!
//! Headless state machine for one qualification session.
//!
//! ```text
//! IdentityBasics → IdentityContact → Question(q1) → … → Question(qN) → Scheduling → Done
//! ```
//!
//! Leaving the last visible question scores the answers and delivers the
//! pre-scheduling snapshot to the qualification endpoint. Confirming a slot
//! delivers the final snapshot to the scheduling endpoint and ends the
//! session. Delivery outcomes come back as [`Notice`]s; a failed delivery
//! never blocks the lead from moving on.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use leadq_core::identity::{validate_birth_date, validate_person_name};
use leadq_core::{LeadField, LeadInfo, Timestamp};
use leadq_scoring::{compute_result, AnswerSet, QualificationResult, QuestionnaireVariant};
use leadq_webhook::{DeliveryStage, LeadSink};

use crate::error::WizardError;
use crate::payload::{SnapshotContext, WebhookPayload};
use crate::scheduling::SchedulingSelection;

/// Source of "now" for validation, slots and payload timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "step", content = "question", rename_all = "snake_case")]
pub enum WizardStep {
    /// Athlete name and birth date.
    IdentityBasics,
    /// City/state and the responsible adult's contact.
    IdentityContact,
    /// Showing the question with this id.
    Question(u32),
    /// Choosing a callback slot.
    Scheduling,
    /// Session finished.
    Done,
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdentityBasics => f.write_str("identity (basics)"),
            Self::IdentityContact => f.write_str("identity (contact)"),
            Self::Question(id) => write!(f, "question {id}"),
            Self::Scheduling => f.write_str("scheduling"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Advisory outcome of a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The endpoint accepted the snapshot.
    Delivered { stage: DeliveryStage, attempts: u32 },
    /// Every attempt failed; the session continues regardless.
    DeliveryFailed { stage: DeliveryStage, message: String },
}

impl Notice {
    /// Whether this notice reports a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::DeliveryFailed { .. })
    }
}

/// One lead's pass through the questionnaire.
pub struct WizardController {
    variant: Arc<QuestionnaireVariant>,
    sink: Arc<dyn LeadSink>,
    clock: Clock,
    page_url: String,
    step: WizardStep,
    lead: LeadInfo,
    answers: AnswerSet,
    scheduling: Option<SchedulingSelection>,
    notices: Vec<Notice>,
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("variant", &self.variant.id)
            .field("page_url", &self.page_url)
            .field("step", &self.step)
            .field("lead", &self.lead)
            .field("answers", &self.answers)
            .field("scheduling", &self.scheduling)
            .field("notices", &self.notices)
            .finish_non_exhaustive()
    }
}

impl WizardController {
    /// Start a session on `variant`, delivering through `sink`.
    pub fn new(variant: Arc<QuestionnaireVariant>, sink: Arc<dyn LeadSink>) -> Self {
        Self {
            variant,
            sink,
            clock: Arc::new(|| DateTime::<FixedOffset>::from(Local::now())),
            page_url: String::new(),
            step: WizardStep::IdentityBasics,
            lead: LeadInfo::default(),
            answers: AnswerSet::new(),
            scheduling: None,
            notices: Vec::new(),
        }
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Value reported as `url` on every snapshot.
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = url.into();
        self
    }

    /// Current wizard step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Questionnaire variant this session runs.
    pub fn variant(&self) -> &QuestionnaireVariant {
        &self.variant
    }

    /// Identity fields entered so far.
    pub fn lead(&self) -> &LeadInfo {
        &self.lead
    }

    /// Points recorded per answered question.
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// The confirmed slot, once scheduled.
    pub fn scheduling(&self) -> Option<&SchedulingSelection> {
        self.scheduling.as_ref()
    }

    /// Every delivery notice raised so far, oldest first.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Current score, gates and tier.
    pub fn result(&self) -> QualificationResult {
        compute_result(&self.answers, &self.variant)
    }

    /// `(position, total)` over the visible questions; position is 0 before
    /// the questionnaire and `total` after it.
    pub fn progress(&self) -> (usize, usize) {
        let visible = self.variant.visible_questions(&self.answers);
        let total = visible.len();
        let position = match self.step {
            WizardStep::IdentityBasics | WizardStep::IdentityContact => 0,
            WizardStep::Question(id) => visible
                .iter()
                .position(|q| q.id == id)
                .map_or(0, |i| i + 1),
            WizardStep::Scheduling | WizardStep::Done => total,
        };
        (position, total)
    }

    /// Set one identity field. Refused once the session is done.
    pub fn update_identity(&mut self, field: LeadField, value: impl Into<String>) -> Result<(), WizardError> {
        if self.step == WizardStep::Done {
            return Err(WizardError::WrongStep {
                operation: "update_identity",
                step: self.step,
            });
        }
        self.lead.set(field, value);
        Ok(())
    }

    /// Record an answer for the question currently shown.
    ///
    /// Changing an answer may hide later questions; their answers are
    /// dropped so they no longer count.
    pub fn answer(&mut self, question: u32, points: u32) -> Result<(), WizardError> {
        let q = self
            .variant
            .question(question)
            .ok_or(WizardError::UnknownQuestion(question))?;
        match self.step {
            WizardStep::Question(current) if current == question => {}
            WizardStep::Question(_) => return Err(WizardError::NotCurrentQuestion(question)),
            step => {
                return Err(WizardError::WrongStep {
                    operation: "answer",
                    step,
                })
            }
        }
        if !q.is_visible(&self.answers) {
            return Err(WizardError::QuestionHidden(question));
        }
        if !q.accepts(points) {
            return Err(WizardError::InvalidAnswer { question, points });
        }
        self.answers.record(question, points);
        self.retract_hidden();
        tracing::debug!(question, points, total = self.answers.total(), "answer recorded");
        Ok(())
    }

    /// Move to the next step.
    ///
    /// Returns the delivery notice when leaving the last question.
    pub async fn advance(&mut self) -> Result<Option<Notice>, WizardError> {
        match self.step {
            WizardStep::IdentityBasics => {
                if !self.lead.identity_step_one_complete() {
                    return Err(self.incomplete("name and birth date are required"));
                }
                let today = self.today();
                let errors: Vec<_> = [
                    validate_person_name("fullName", &self.lead.full_name),
                    validate_birth_date(&self.lead.birth_date, today),
                ]
                .into_iter()
                .filter_map(Result::err)
                .collect();
                if !errors.is_empty() {
                    return Err(WizardError::InvalidIdentity(errors));
                }
                self.step = WizardStep::IdentityContact;
                Ok(None)
            }
            WizardStep::IdentityContact => {
                if !self.lead.identity_step_two_complete() {
                    return Err(self.incomplete("city/state, parent name and phone are required"));
                }
                let errors = self.lead.validate(self.today());
                if !errors.is_empty() {
                    return Err(WizardError::InvalidIdentity(errors));
                }
                match self.next_question_after(None) {
                    Some(id) => {
                        self.step = WizardStep::Question(id);
                        Ok(None)
                    }
                    None => Ok(Some(self.enter_scheduling().await)),
                }
            }
            WizardStep::Question(id) => {
                if !self.answers.contains(id) {
                    return Err(self.incomplete("question is unanswered"));
                }
                match self.next_question_after(Some(id)) {
                    Some(next) => {
                        self.step = WizardStep::Question(next);
                        Ok(None)
                    }
                    None => Ok(Some(self.enter_scheduling().await)),
                }
            }
            WizardStep::Scheduling => Err(self.incomplete("choose a slot to finish")),
            WizardStep::Done => Err(WizardError::WrongStep {
                operation: "advance",
                step: self.step,
            }),
        }
    }

    /// Move one step back. Answers are kept.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.step = match self.step {
            WizardStep::IdentityBasics => WizardStep::IdentityBasics,
            WizardStep::IdentityContact => WizardStep::IdentityBasics,
            WizardStep::Question(id) => match self.previous_question_before(Some(id)) {
                Some(prev) => WizardStep::Question(prev),
                None => WizardStep::IdentityContact,
            },
            WizardStep::Scheduling => match self.previous_question_before(None) {
                Some(last) => WizardStep::Question(last),
                None => WizardStep::IdentityContact,
            },
            WizardStep::Done => {
                return Err(WizardError::WrongStep {
                    operation: "back",
                    step: self.step,
                })
            }
        };
        self.retract_hidden();
        Ok(self.step)
    }

    /// Confirm a slot and deliver the final snapshot. Ends the session
    /// whether or not the delivery succeeds.
    pub async fn schedule(&mut self, selection: SchedulingSelection) -> Result<Notice, WizardError> {
        if self.step != WizardStep::Scheduling {
            return Err(WizardError::WrongStep {
                operation: "schedule",
                step: self.step,
            });
        }
        let result = self.result();
        let payload = WebhookPayload::with_scheduling(self.snapshot_context(&result), selection.clone());
        let notice = self.deliver(DeliveryStage::Scheduling, &payload).await;
        self.scheduling = Some(selection);
        self.step = WizardStep::Done;
        Ok(notice)
    }

    /// Build a selection for `date`/`time` against the session clock and
    /// lead, then [`schedule`](Self::schedule) it.
    pub async fn schedule_slot(&mut self, date: NaiveDate, time: NaiveTime) -> Result<Notice, WizardError> {
        let selection = SchedulingSelection::new(date, time, &self.lead, &(self.clock)())?;
        self.schedule(selection).await
    }

    /// Discard everything and start over.
    pub fn reset(&mut self) {
        self.step = WizardStep::IdentityBasics;
        self.lead = LeadInfo::default();
        self.answers.clear();
        self.scheduling = None;
        self.notices.clear();
        tracing::debug!(variant = %self.variant.id, "wizard reset");
    }

    async fn enter_scheduling(&mut self) -> Notice {
        let result = self.result();
        tracing::info!(
            variant = %self.variant.id,
            total_score = result.total_score,
            category = %result.category,
            has_any_gate = result.gates.has_any_gate,
            "questionnaire complete"
        );
        let payload = WebhookPayload::pre_scheduling(self.snapshot_context(&result));
        let notice = self.deliver(DeliveryStage::Qualification, &payload).await;
        self.step = WizardStep::Scheduling;
        notice
    }

    async fn deliver(&mut self, stage: DeliveryStage, payload: &WebhookPayload) -> Notice {
        let notice = match serde_json::to_value(payload) {
            Err(e) => Notice::DeliveryFailed {
                stage,
                message: format!("failed to encode payload: {e}"),
            },
            Ok(body) => match self.sink.deliver(stage, &body).await {
                Ok(receipt) => Notice::Delivered {
                    stage,
                    attempts: receipt.attempts,
                },
                Err(e) => Notice::DeliveryFailed {
                    stage,
                    message: e.to_string(),
                },
            },
        };
        match &notice {
            Notice::Delivered { attempts, .. } => {
                tracing::info!(%stage, attempts, athlete = %self.lead.full_name, "snapshot delivered");
            }
            Notice::DeliveryFailed { message, .. } => {
                tracing::warn!(%stage, error = %message, "snapshot delivery failed, continuing");
            }
        }
        self.notices.push(notice.clone());
        notice
    }

    fn snapshot_context<'a>(&'a self, result: &'a QualificationResult) -> SnapshotContext<'a> {
        SnapshotContext {
            variant: &self.variant,
            lead: &self.lead,
            answers: &self.answers,
            result,
            url: &self.page_url,
            timestamp: Timestamp::from_datetime((self.clock)().with_timezone(&Utc)),
        }
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().date_naive()
    }

    fn incomplete(&self, reason: &str) -> WizardError {
        WizardError::StepIncomplete {
            step: self.step,
            reason: reason.to_string(),
        }
    }

    /// First visible question after `current` (or the first one at all).
    fn next_question_after(&self, current: Option<u32>) -> Option<u32> {
        let visible = self.variant.visible_questions(&self.answers);
        let start = match current {
            None => 0,
            Some(id) => visible.iter().position(|q| q.id == id)? + 1,
        };
        visible.get(start).map(|q| q.id)
    }

    /// Last visible question before `current` (or the last one at all).
    fn previous_question_before(&self, current: Option<u32>) -> Option<u32> {
        let visible = self.variant.visible_questions(&self.answers);
        let end = match current {
            None => visible.len(),
            Some(id) => visible.iter().position(|q| q.id == id)?,
        };
        end.checked_sub(1).and_then(|i| visible.get(i)).map(|q| q.id)
    }

    fn retract_hidden(&mut self) {
        // Hiding can cascade; repeat until stable.
        loop {
            let hidden: Vec<u32> = self
                .variant
                .questions
                .iter()
                .filter(|q| self.answers.contains(q.id) && !q.is_visible(&self.answers))
                .map(|q| q.id)
                .collect();
            if hidden.is_empty() {
                break;
            }
            for id in hidden {
                self.answers.retract(id);
                tracing::debug!(question = id, "retracted answer to hidden question");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use leadq_scoring::{ScoreTier, VariantRegistry};
    use leadq_webhook::{DeliveryError, DeliveryReceipt};

    #[derive(Default)]
    struct RecordingSink {
        fail: bool,
        calls: Mutex<Vec<(DeliveryStage, serde_json::Value)>>,
    }

    impl RecordingSink {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(DeliveryStage, serde_json::Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LeadSink for RecordingSink {
        async fn deliver(
            &self,
            stage: DeliveryStage,
            payload: &serde_json::Value,
        ) -> Result<DeliveryReceipt, DeliveryError> {
            self.calls.lock().unwrap().push((stage, payload.clone()));
            if self.fail {
                return Err(DeliveryError::Exhausted {
                    endpoint: "http://hooks.test/".into(),
                    attempts: 3,
                    last_error: "endpoint returned 503: down".into(),
                });
            }
            Ok(DeliveryReceipt {
                endpoint: "http://hooks.test/".into(),
                attempts: 1,
                status: 200,
            })
        }
    }

    fn fixed_clock() -> Clock {
        Arc::new(|| DateTime::parse_from_rfc3339("2026-03-10T09:00:00-03:00").unwrap())
    }

    fn wizard(variant: &str, sink: Arc<RecordingSink>) -> WizardController {
        let variant = VariantRegistry::builtin().unwrap().get(variant).unwrap().clone();
        WizardController::new(Arc::new(variant), sink)
            .with_clock(fixed_clock())
            .with_page_url("https://next.example/teste")
    }

    async fn fill_identity(w: &mut WizardController) {
        w.update_identity(LeadField::FullName, "Lucas Pereira").unwrap();
        w.update_identity(LeadField::BirthDate, "2010-05-20").unwrap();
        assert_eq!(w.advance().await.unwrap(), None);
        w.update_identity(LeadField::CityState, "Campinas/SP").unwrap();
        w.update_identity(LeadField::ParentName, "Ana Pereira").unwrap();
        w.update_identity(LeadField::ParentPhone, "(19) 98765-4321").unwrap();
        assert_eq!(w.advance().await.unwrap(), None);
    }

    async fn answer_and_advance(w: &mut WizardController, question: u32, points: u32) -> Option<Notice> {
        assert_eq!(w.step(), WizardStep::Question(question));
        w.answer(question, points).unwrap();
        w.advance().await.unwrap()
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn full_athlete_session_sends_both_snapshots() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink.clone());

        fill_identity(&mut w).await;
        assert_eq!(w.step(), WizardStep::Question(1));
        assert!(answer_and_advance(&mut w, 1, 24).await.is_none());
        assert!(answer_and_advance(&mut w, 2, 18).await.is_none());
        assert!(answer_and_advance(&mut w, 3, 10).await.is_none());
        assert!(answer_and_advance(&mut w, 4, 12).await.is_none());
        assert_eq!(w.progress(), (5, 5));
        let notice = answer_and_advance(&mut w, 5, 0).await.unwrap();

        assert_eq!(
            notice,
            Notice::Delivered {
                stage: DeliveryStage::Qualification,
                attempts: 1
            }
        );
        assert_eq!(w.step(), WizardStep::Scheduling);

        let result = w.result();
        assert_eq!(result.total_score, 64);
        assert_eq!(result.category, ScoreTier::Commercial);

        let notice = w
            .schedule_slot(date("2026-03-11"), NaiveTime::from_hms_opt(19, 0, 0).unwrap())
            .await
            .unwrap();
        assert!(!notice.is_failure());
        assert_eq!(w.step(), WizardStep::Done);
        assert_eq!(w.scheduling().unwrap().scheduled_time, "19:00");
        assert_eq!(w.notices().len(), 2);

        let calls = sink.calls();
        assert_eq!(calls.len(), 2);

        let (stage, first) = &calls[0];
        assert_eq!(*stage, DeliveryStage::Qualification);
        assert_eq!(first["testType"], "ab-athlete-mobile-pre-scheduling");
        assert_eq!(first["stage"], "entered-scheduling-screen");
        assert_eq!(first["url"], "https://next.example/teste");
        assert_eq!(first["timestamp"], "2026-03-10T12:00:00.000Z");
        assert_eq!(first["qualification"]["totalScore"], 64);
        assert!(first.get("videoCallScheduling").is_none());

        let (stage, last) = &calls[1];
        assert_eq!(*stage, DeliveryStage::Scheduling);
        assert_eq!(last["testType"], "ab-athlete-mobile");
        assert!(last.get("stage").is_none());
        assert_eq!(last["videoCallScheduling"]["scheduledDate"], "2026-03-11");
        assert_eq!(last["videoCallScheduling"]["athleteName"], "Lucas Pereira");
        assert_eq!(last["answers"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn identity_steps_block_until_complete_and_valid() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink);

        let err = w.advance().await.unwrap_err();
        assert!(matches!(err, WizardError::StepIncomplete { step: WizardStep::IdentityBasics, .. }));

        w.update_identity(LeadField::FullName, "Lucas 3").unwrap();
        w.update_identity(LeadField::BirthDate, "2024-01-01").unwrap();
        match w.advance().await.unwrap_err() {
            WizardError::InvalidIdentity(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
                assert_eq!(fields, vec!["fullName", "birthDate"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        w.update_identity(LeadField::FullName, "Lucas Pereira").unwrap();
        w.update_identity(LeadField::BirthDate, "2010-05-20").unwrap();
        w.advance().await.unwrap();
        assert_eq!(w.step(), WizardStep::IdentityContact);

        w.update_identity(LeadField::CityState, "Campinas/SP").unwrap();
        w.update_identity(LeadField::ParentName, "Ana Pereira").unwrap();
        w.update_identity(LeadField::ParentPhone, "19987654321").unwrap();
        assert!(matches!(
            w.advance().await.unwrap_err(),
            WizardError::InvalidIdentity(_)
        ));
        assert_eq!(w.step(), WizardStep::IdentityContact);
    }

    #[tokio::test]
    async fn answers_must_be_valid_options_for_the_current_question() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink);
        fill_identity(&mut w).await;

        assert!(matches!(
            w.advance().await.unwrap_err(),
            WizardError::StepIncomplete { step: WizardStep::Question(1), .. }
        ));
        assert_eq!(
            w.answer(1, 5).unwrap_err(),
            WizardError::InvalidAnswer { question: 1, points: 5 }
        );
        assert_eq!(w.answer(2, 24).unwrap_err(), WizardError::NotCurrentQuestion(2));
        assert_eq!(w.answer(99, 1).unwrap_err(), WizardError::UnknownQuestion(99));
        assert!(w.answers().is_empty());
    }

    #[tokio::test]
    async fn hidden_question_is_skipped() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink.clone());
        fill_identity(&mut w).await;
        answer_and_advance(&mut w, 1, 3).await;
        answer_and_advance(&mut w, 2, 4).await;
        answer_and_advance(&mut w, 3, 6).await;
        // "first time I hear about it" hides the events question.
        let notice = answer_and_advance(&mut w, 4, 6).await;

        assert!(notice.is_some());
        assert_eq!(w.step(), WizardStep::Scheduling);
        let result = w.result();
        assert_eq!(result.total_score, 19);
        assert_eq!(result.category, ScoreTier::Baseline);
        assert!(!result.gates.has_any_gate);

        let calls = sink.calls();
        assert_eq!(calls[0].1["answers"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn back_keeps_answers_and_retracts_newly_hidden_ones() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink);
        fill_identity(&mut w).await;
        answer_and_advance(&mut w, 1, 24).await;
        answer_and_advance(&mut w, 2, 18).await;
        answer_and_advance(&mut w, 3, 10).await;
        answer_and_advance(&mut w, 4, 12).await;
        w.answer(5, 12).unwrap();

        assert_eq!(w.back().unwrap(), WizardStep::Question(4));
        assert_eq!(w.answers().get(5), Some(12));
        assert_eq!(w.answers().get(4), Some(12));

        w.answer(4, 6).unwrap();
        assert!(!w.answers().contains(5));
        assert!(!w.result().gates.passed("gn_next"));

        assert_eq!(w.back().unwrap(), WizardStep::Question(3));
        assert_eq!(w.back().unwrap(), WizardStep::Question(2));
        assert_eq!(w.back().unwrap(), WizardStep::Question(1));
        assert_eq!(w.back().unwrap(), WizardStep::IdentityContact);
        assert_eq!(w.back().unwrap(), WizardStep::IdentityBasics);
        assert_eq!(w.back().unwrap(), WizardStep::IdentityBasics);
        assert_eq!(w.answers().len(), 4);
    }

    #[tokio::test]
    async fn back_from_scheduling_returns_to_last_visible_question() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink);
        fill_identity(&mut w).await;
        for (q, p) in [(1, 24), (2, 18), (3, 10), (4, 6)] {
            answer_and_advance(&mut w, q, p).await;
        }
        assert_eq!(w.step(), WizardStep::Scheduling);
        assert_eq!(w.back().unwrap(), WizardStep::Question(4));
    }

    #[tokio::test]
    async fn delivery_failure_is_advisory() {
        let sink = Arc::new(RecordingSink::failing());
        let mut w = wizard("athlete", sink.clone());
        fill_identity(&mut w).await;
        for (q, p) in [(1, 24), (2, 18), (3, 10), (4, 12)] {
            answer_and_advance(&mut w, q, p).await;
        }
        let notice = answer_and_advance(&mut w, 5, 12).await.unwrap();
        match &notice {
            Notice::DeliveryFailed { stage, message } => {
                assert_eq!(*stage, DeliveryStage::Qualification);
                assert!(message.contains("3 attempt(s)"), "message: {message}");
            }
            other => panic!("expected failure notice, got {other:?}"),
        }
        assert_eq!(w.step(), WizardStep::Scheduling);

        let notice = w
            .schedule_slot(date("2026-03-10"), NaiveTime::from_hms_opt(10, 0, 0).unwrap())
            .await
            .unwrap();
        assert!(notice.is_failure());
        assert_eq!(w.step(), WizardStep::Done);
        assert_eq!(sink.calls().len(), 2);
    }

    #[tokio::test]
    async fn schedule_outside_scheduling_step_is_refused() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink.clone());
        let err = w
            .schedule_slot(date("2026-03-11"), NaiveTime::from_hms_opt(12, 0, 0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::WrongStep { operation: "schedule", .. }));
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn past_slot_is_refused_and_session_stays_in_scheduling() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink);
        fill_identity(&mut w).await;
        for (q, p) in [(1, 24), (2, 18), (3, 10), (4, 6)] {
            answer_and_advance(&mut w, q, p).await;
        }
        // Clock is 09:00 local; the 10:00 slot today is still open, but
        // the day before is not selectable.
        let err = w
            .schedule_slot(date("2026-03-09"), NaiveTime::from_hms_opt(10, 0, 0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::SlotUnavailable { .. }));
        assert_eq!(w.step(), WizardStep::Scheduling);
    }

    #[tokio::test]
    async fn reset_discards_everything() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink);
        fill_identity(&mut w).await;
        answer_and_advance(&mut w, 1, 24).await;
        w.reset();
        assert_eq!(w.step(), WizardStep::IdentityBasics);
        assert!(w.answers().is_empty());
        assert_eq!(w.lead(), &LeadInfo::default());
        assert!(w.notices().is_empty());
        assert_eq!(w.result().total_score, 0);
    }

    #[tokio::test]
    async fn done_session_rejects_further_input() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("athlete", sink);
        fill_identity(&mut w).await;
        for (q, p) in [(1, 24), (2, 18), (3, 10), (4, 6)] {
            answer_and_advance(&mut w, q, p).await;
        }
        w.schedule_slot(date("2026-03-11"), NaiveTime::from_hms_opt(22, 0, 0).unwrap())
            .await
            .unwrap();
        assert!(w.advance().await.is_err());
        assert!(w.back().is_err());
        assert!(w.update_identity(LeadField::FullName, "Outro Nome").is_err());
    }

    #[tokio::test]
    async fn lead_variant_premium_requires_gate() {
        let sink = Arc::new(RecordingSink::default());
        let mut w = wizard("lead", sink.clone());
        fill_identity(&mut w).await;
        let picks = [
            (1, 15),
            (2, 20),
            (3, 16),
            (4, 26),
            (5, 10),
            (6, 8),
            (7, 24),
            (8, 12),
            (9, 18),
            (10, 22),
            (11, 18),
            (12, 22),
            (13, 20),
            (14, 22),
        ];
        for (q, p) in picks {
            answer_and_advance(&mut w, q, p).await;
        }
        assert_eq!(w.step(), WizardStep::Scheduling);
        let result = w.result();
        assert_eq!(result.total_score, 253);
        assert_eq!(result.category, ScoreTier::Premium);
        let payload = &sink.calls()[0].1;
        assert_eq!(payload["testType"], "lead-score-pre-scheduling");
        assert_eq!(payload["gates"]["g1_ingles"], true);
        assert_eq!(payload["qualification"]["category"], "🚀 EMBARQUES");
    }
}
