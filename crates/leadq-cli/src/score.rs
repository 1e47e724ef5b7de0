//! `leadq score` — score an answer set without running a session.

use anyhow::{bail, Result};
use clap::Args;

use leadq_scoring::{compute_result, AnswerSet, QualificationResult, QuestionnaireVariant, VariantRegistry};

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Variant to score against.
    #[arg(long, default_value = "athlete")]
    pub variant: String,

    /// Selected option as QUESTION=POINTS. Repeatable.
    #[arg(long = "answer", value_name = "Q=P", value_parser = parse_answer)]
    pub answers: Vec<(u32, u32)>,
}

/// Execute the score subcommand: print the result as JSON.
pub fn run_score(args: &ScoreArgs, registry: &VariantRegistry) -> Result<u8> {
    let variant = crate::require_variant(registry, &args.variant)?;
    let result = score_answers(variant, &args.answers)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(0)
}

/// Parse `Q=P`.
pub fn parse_answer(raw: &str) -> Result<(u32, u32), String> {
    let (q, p) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=POINTS, got {raw:?}"))?;
    let question = q
        .trim()
        .parse()
        .map_err(|_| format!("invalid question id {q:?}"))?;
    let points = p
        .trim()
        .parse()
        .map_err(|_| format!("invalid points {p:?}"))?;
    Ok((question, points))
}

/// Check answers against the variant and score them.
///
/// Every answer must match an option, and the final set must not contain
/// answers to questions hidden by the others.
pub fn score_answers(variant: &QuestionnaireVariant, pairs: &[(u32, u32)]) -> Result<QualificationResult> {
    let mut answers = AnswerSet::new();
    for &(question, points) in pairs {
        let Some(q) = variant.question(question) else {
            bail!("variant {} has no question {question}", variant.id);
        };
        if !q.accepts(points) {
            bail!("{points} is not an option of question {question}");
        }
        answers.record(question, points);
    }
    for (question, _) in answers.iter() {
        let visible = variant
            .question(question)
            .is_some_and(|q| q.is_visible(&answers));
        if !visible {
            bail!("question {question} is hidden by the other answers");
        }
    }
    Ok(compute_result(&answers, variant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadq_scoring::ScoreTier;

    fn athlete() -> QuestionnaireVariant {
        VariantRegistry::builtin().unwrap().get("athlete").unwrap().clone()
    }

    #[test]
    fn parse_answer_accepts_pairs() {
        assert_eq!(parse_answer("1=24"), Ok((1, 24)));
        assert_eq!(parse_answer(" 3 = 0 "), Ok((3, 0)));
    }

    #[test]
    fn parse_answer_rejects_garbage() {
        assert!(parse_answer("1").is_err());
        assert!(parse_answer("a=2").is_err());
        assert!(parse_answer("1=-4").is_err());
    }

    #[test]
    fn scores_reference_answers() {
        let result = score_answers(&athlete(), &[(1, 24), (2, 18), (3, 10)]).unwrap();
        assert_eq!(result.total_score, 52);
        assert_eq!(result.category, ScoreTier::Commercial);
    }

    #[test]
    fn later_answer_replaces_earlier() {
        let result = score_answers(&athlete(), &[(1, 24), (1, 3)]).unwrap();
        assert_eq!(result.total_score, 3);
    }

    #[test]
    fn rejects_unknown_question_and_points() {
        assert!(score_answers(&athlete(), &[(99, 1)]).is_err());
        assert!(score_answers(&athlete(), &[(1, 7)]).is_err());
    }

    #[test]
    fn rejects_hidden_answer() {
        // Answering 6 on question 4 hides question 5.
        let err = score_answers(&athlete(), &[(4, 6), (5, 8)]).unwrap_err();
        assert!(err.to_string().contains("hidden"));
    }
}
