//! Open-response answer scoring.
//!
//! Grades a free-text answer by how many of the question's key terms it
//! covers, with a sentiment check to tell a confused learner apart from one
//! who simply missed the point. Evaluation is a pure function of its inputs.

use crate::config::ScoringConfig;
use crate::model::{Question, ScoringResult, Verdict};
use crate::text;

/// Feedback for an empty submission.
pub const EMPTY_ANSWER_FEEDBACK: &str = "Answer required.";

/// Feedback for a submission below the minimum length.
pub const SHORT_ANSWER_FEEDBACK: &str = "Answer too short. Try explaining in a full sentence.";

/// Grades open-response answers against a question's key terms.
#[derive(Debug, Clone, Default)]
pub struct AnswerScoringEngine {
    config: ScoringConfig,
}

impl AnswerScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Evaluate `answer` against `question`.
    ///
    /// Never fails: empty, short or off-topic input yields an incorrect
    /// result with explanatory feedback.
    pub fn evaluate(&self, answer: &str, question: &Question) -> ScoringResult {
        let original = answer.trim();
        let normalized = text::normalize(original);

        if normalized.is_empty() {
            return ScoringResult::rejected(Verdict::Empty, EMPTY_ANSWER_FEEDBACK);
        }
        if normalized.chars().count() < self.config.min_answer_chars {
            return ScoringResult::rejected(Verdict::TooShort, SHORT_ANSWER_FEEDBACK);
        }

        let extracted =
            text::extract_terms(original, &normalized, &self.config.domain_vocabulary);
        let candidates = extracted.all();

        let (matched_terms, missing_terms): (Vec<String>, Vec<String>) = question
            .key_terms
            .iter()
            .cloned()
            .partition(|expected| {
                let expected = expected.trim().to_lowercase();
                candidates
                    .iter()
                    .any(|found| text::terms_overlap(found, &expected))
            });

        let match_ratio = if question.key_terms.is_empty() {
            0.0
        } else {
            matched_terms.len() as f64 / question.key_terms.len() as f64
        };
        let sentiment = text::sentiment(&normalized);
        let confused = sentiment < self.config.confusion_threshold;

        let (verdict, feedback) = if match_ratio >= self.config.correct_threshold {
            (
                Verdict::Correct,
                correct_feedback(&matched_terms, &missing_terms),
            )
        } else if match_ratio >= self.config.partial_threshold {
            (
                Verdict::Partial,
                format!(
                    "You're on the right track. You mentioned: {}. Missing: {}.",
                    matched_terms.join(", "),
                    missing_terms.join(", ")
                ),
            )
        } else if confused {
            (
                Verdict::Confused,
                format!("It sounds like you're unsure. Hint: {}", question.hint),
            )
        } else {
            (
                Verdict::MissingConcepts,
                format!(
                    "Your answer is missing key concepts. Hint: {}",
                    question.hint
                ),
            )
        };

        tracing::debug!(
            question = %question.id,
            match_ratio,
            sentiment,
            verdict = %verdict,
            "evaluated answer"
        );

        ScoringResult {
            is_correct: verdict.is_correct(),
            feedback,
            verdict,
            match_ratio,
            matched_terms,
            missing_terms,
        }
    }
}

fn correct_feedback(matched: &[String], missing: &[String]) -> String {
    let mut feedback = format!("Great answer! You covered: {}.", matched.join(", "));
    if !missing.is_empty() {
        feedback.push_str(&format!(" You could also mention: {}.", missing.join(", ")));
    }
    feedback
}
