//! Answer Set: question id to recorded point value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Recorded answers, keyed by question id.
///
/// BTreeMap keeps iteration in question-id order so payloads and logs
/// are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<u32, u32>);

impl AnswerSet {
    /// Empty answer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the points for a question.
    pub fn record(&mut self, question: u32, points: u32) {
        self.0.insert(question, points);
    }

    /// Drop a recorded answer. Returns the previous points, if any.
    pub fn retract(&mut self, question: u32) -> Option<u32> {
        self.0.remove(&question)
    }

    /// Points recorded for a question.
    pub fn get(&self, question: u32) -> Option<u32> {
        self.0.get(&question).copied()
    }

    /// Whether the question has been answered.
    pub fn contains(&self, question: u32) -> bool {
        self.0.contains_key(&question)
    }

    /// Number of recorded answers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No answers recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Discard all answers.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Sum of all recorded points, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.0.values().fold(0u32, |acc, p| acc.saturating_add(*p))
    }

    /// Iterate `(question, points)` in question-id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(q, p)| (*q, *p))
    }
}

impl FromIterator<(u32, u32)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(u32, u32); N]> for AnswerSet {
    fn from(pairs: [(u32, u32); N]) -> Self {
        pairs.into_iter().collect()
    }
}
