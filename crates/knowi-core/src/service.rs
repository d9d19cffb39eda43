//! Off-thread answer evaluation.
//!
//! Text analysis can take long enough to stall a UI thread, so the host
//! submits answers here and receives results over a channel. Each
//! submission produces a `Started` event followed by a `Finished` event.
//! Submissions are never cancelled; [`FeedbackGate`] lets the host drop
//! results that arrive for a question the learner has already left.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::model::{Question, ScoringResult};
use crate::scoring::AnswerScoringEngine;

/// Handle for one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    /// Increases with every submission to the same service.
    pub sequence: u64,
    pub question_id: String,
}

/// Progress of a submitted evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EvaluationEvent {
    Started {
        ticket: Ticket,
    },
    Finished {
        ticket: Ticket,
        result: ScoringResult,
    },
}

impl EvaluationEvent {
    pub fn ticket(&self) -> &Ticket {
        match self {
            EvaluationEvent::Started { ticket } | EvaluationEvent::Finished { ticket, .. } => {
                ticket
            }
        }
    }
}

/// Runs evaluations on tokio's blocking pool.
pub struct ScoringService {
    engine: Arc<AnswerScoringEngine>,
    events: mpsc::UnboundedSender<EvaluationEvent>,
    next_sequence: AtomicU64,
}

impl ScoringService {
    /// Create a service and the receiver its events arrive on.
    pub fn new(engine: AnswerScoringEngine) -> (Self, mpsc::UnboundedReceiver<EvaluationEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let service = Self {
            engine: Arc::new(engine),
            events,
            next_sequence: AtomicU64::new(1),
        };
        (service, receiver)
    }

    /// Submit an answer for evaluation. Must be called inside a tokio
    /// runtime.
    ///
    /// `Started` is sent before this returns; `Finished` follows once the
    /// evaluation completes.
    pub fn submit(&self, answer: impl Into<String>, question: &Question) -> Ticket {
        let ticket = Ticket {
            id: Uuid::new_v4(),
            sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
            question_id: question.id.clone(),
        };

        if self
            .events
            .send(EvaluationEvent::Started {
                ticket: ticket.clone(),
            })
            .is_err()
        {
            tracing::debug!("event receiver dropped, evaluating anyway");
        }

        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();
        let answer = answer.into();
        let question = question.clone();
        let finished_ticket = ticket.clone();

        tokio::spawn(async move {
            let evaluated =
                tokio::task::spawn_blocking(move || engine.evaluate(&answer, &question)).await;
            match evaluated {
                Ok(result) => {
                    let _ = events.send(EvaluationEvent::Finished {
                        ticket: finished_ticket,
                        result,
                    });
                }
                Err(e) => {
                    tracing::error!(
                        "evaluation for {} failed: {e}",
                        finished_ticket.question_id
                    );
                }
            }
        });

        ticket
    }

    /// Evaluate off-thread and await the result directly.
    pub async fn evaluate(
        &self,
        answer: impl Into<String>,
        question: &Question,
    ) -> Result<ScoringResult, JoinError> {
        let engine = Arc::clone(&self.engine);
        let answer = answer.into();
        let question = question.clone();
        tokio::task::spawn_blocking(move || engine.evaluate(&answer, &question)).await
    }
}

/// Decides whether a finished evaluation is still relevant.
///
/// A result is applied only if its question is the one on screen and it
/// belongs to the most recent submission for that question.
#[derive(Debug, Default)]
pub struct FeedbackGate {
    current_question: Option<String>,
    latest: HashMap<String, u64>,
}

impl FeedbackGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// The learner is now looking at `question_id`.
    pub fn focus(&mut self, question_id: &str) {
        self.current_question = Some(question_id.to_string());
    }

    /// The learner left the quiz screen.
    pub fn leave(&mut self) {
        self.current_question = None;
    }

    /// Remember `ticket` as the newest submission for its question.
    pub fn track(&mut self, ticket: &Ticket) {
        let latest = self.latest.entry(ticket.question_id.clone()).or_insert(0);
        *latest = (*latest).max(ticket.sequence);
    }

    pub fn accepts(&self, ticket: &Ticket) -> bool {
        self.current_question.as_deref() == Some(ticket.question_id.as_str())
            && self.latest.get(&ticket.question_id) == Some(&ticket.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Verdict};

    fn question(id: &str) -> Question {
        Question {
            id: id.into(),
            prompt: "What does a loop do?".into(),
            code: None,
            difficulty: Difficulty::Beginner,
            category: "Control flow".into(),
            key_terms: vec!["repeat".into(), "condition".into()],
            hint: "Count the iterations.".into(),
            expected_secs: None,
            xp: None,
        }
    }

    async fn finished(
        rx: &mut mpsc::UnboundedReceiver<EvaluationEvent>,
    ) -> (Ticket, ScoringResult) {
        loop {
            match rx.recv().await.expect("channel closed") {
                EvaluationEvent::Finished { ticket, result } => return (ticket, result),
                EvaluationEvent::Started { .. } => continue,
            }
        }
    }

    #[tokio::test]
    async fn started_precedes_finished() {
        let (service, mut rx) = ScoringService::new(AnswerScoringEngine::default());
        let ticket = service.submit("It will repeat while the condition holds", &question("loops"));

        let first = rx.recv().await.unwrap();
        assert_eq!(first, EvaluationEvent::Started { ticket: ticket.clone() });

        let second = rx.recv().await.unwrap();
        assert_eq!(second.ticket(), &ticket);
        match second {
            EvaluationEvent::Finished { result, .. } => assert!(result.is_correct),
            other => panic!("expected Finished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn every_submission_is_delivered() {
        let (service, mut rx) = ScoringService::new(AnswerScoringEngine::default());
        let q = question("loops");
        let a = service.submit("", &q);
        let b = service.submit("It will repeat while the condition holds", &q);
        assert!(b.sequence > a.sequence);

        let mut results = HashMap::new();
        for _ in 0..2 {
            let (ticket, result) = finished(&mut rx).await;
            results.insert(ticket.sequence, result);
        }
        assert_eq!(results[&a.sequence].verdict, Verdict::Empty);
        assert!(results[&b.sequence].is_correct);
    }

    #[tokio::test]
    async fn direct_evaluate_returns_result() {
        let (service, _rx) = ScoringService::new(AnswerScoringEngine::default());
        let result = service
            .evaluate("no idea at all, sorry", &question("loops"))
            .await
            .unwrap();
        assert_eq!(result.verdict, Verdict::Confused);
    }

    #[tokio::test]
    async fn gate_drops_results_for_left_questions() {
        let (service, mut rx) = ScoringService::new(AnswerScoringEngine::default());
        let mut gate = FeedbackGate::new();

        gate.focus("loops");
        let ticket = service.submit("It will repeat while the condition holds", &question("loops"));
        gate.track(&ticket);
        gate.focus("arrays");

        let (finished_ticket, _) = finished(&mut rx).await;
        assert_eq!(finished_ticket, ticket);
        assert!(!gate.accepts(&finished_ticket));
    }

    #[test]
    fn gate_accepts_only_latest_submission() {
        let mut gate = FeedbackGate::new();
        let older = Ticket {
            id: Uuid::new_v4(),
            sequence: 1,
            question_id: "loops".into(),
        };
        let newer = Ticket {
            id: Uuid::new_v4(),
            sequence: 2,
            question_id: "loops".into(),
        };

        gate.focus("loops");
        gate.track(&older);
        assert!(gate.accepts(&older));
        gate.track(&newer);
        assert!(!gate.accepts(&older));
        assert!(gate.accepts(&newer));

        gate.leave();
        assert!(!gate.accepts(&newer));
    }
}
