//! Wizard errors. Every variant blocks the requested transition locally;
//! none ends the session.

use chrono::NaiveDate;
use leadq_core::ValidationError;

use crate::controller::WizardStep;

/// Why a wizard operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// Required input for the current step is missing.
    #[error("cannot leave {step}: {reason}")]
    StepIncomplete { step: WizardStep, reason: String },

    /// Identity fields are present but malformed.
    #[error("identity is invalid: {}", join_errors(.0))]
    InvalidIdentity(Vec<ValidationError>),

    /// No question with this id in the active variant.
    #[error("unknown question {0}")]
    UnknownQuestion(u32),

    /// Only the question currently shown can be answered.
    #[error("question {0} is not the current question")]
    NotCurrentQuestion(u32),

    /// The question exists but is hidden by an earlier answer.
    #[error("question {0} is not visible with the current answers")]
    QuestionHidden(u32),

    /// Points do not match any option of the question.
    #[error("{points} is not an option of question {question}")]
    InvalidAnswer { question: u32, points: u32 },

    /// The operation is not available in the current step.
    #[error("{operation} is not available at {step}")]
    WrongStep {
        operation: &'static str,
        step: WizardStep,
    },

    /// The slot time is not one of the calendar's hourly slots.
    #[error("invalid slot time {0:?} (expected HH:00 between 10:00 and 22:00)")]
    InvalidSlotTime(String),

    /// The slot is in the past or outside the selectable dates.
    #[error("slot {date} {time} is not available")]
    SlotUnavailable { date: NaiveDate, time: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
