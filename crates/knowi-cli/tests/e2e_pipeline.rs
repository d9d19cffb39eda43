//! End-to-end pipeline tests over the built-in catalog.
//!
//! These tests drive a full quest (catalog → off-thread scoring → session
//! tracking → XP) with a manual clock so timing-based scores are exact.

use std::sync::Arc;
use std::time::Duration;

use knowi_core::catalog::builtin_catalog;
use knowi_core::config::KnowiConfig;
use knowi_core::math::MathProblemGenerator;
use knowi_core::model::{Difficulty, Verdict};
use knowi_core::motion::{MotionChallenge, MotionTarget, SelectionOutcome};
use knowi_core::progress::ProgressLedger;
use knowi_core::scoring::AnswerScoringEngine;
use knowi_core::service::{EvaluationEvent, FeedbackGate, ScoringService};
use knowi_core::session::{Interaction, ManualClock, SessionScoreTracker};

fn pipeline() -> (Arc<ManualClock>, SessionScoreTracker, ProgressLedger) {
    let config = KnowiConfig::default();
    let catalog = Arc::new(builtin_catalog().unwrap());
    let clock = Arc::new(ManualClock::new());
    let tracker = SessionScoreTracker::new(config.session)
        .with_clock(clock.clone())
        .with_metadata(catalog);
    (clock, tracker, ProgressLedger::new(&config.progress))
}

#[tokio::test]
async fn graded_quest_awards_scaled_xp() {
    let catalog = builtin_catalog().unwrap();
    let question = catalog.get("stack").unwrap();
    let (service, _events) = ScoringService::new(AnswerScoringEngine::default());
    let (clock, tracker, mut ledger) = pipeline();

    tracker.start_session(&question.id);

    let first = service
        .evaluate("It is a list of things", question)
        .await
        .unwrap();
    assert!(!first.is_correct);
    tracker.record_interaction(&question.id, Interaction::incorrect());

    tracker.record_interaction(&question.id, Interaction::hint());

    let second = service
        .evaluate(
            "The last item you push is the first you pop, always from the top",
            question,
        )
        .await
        .unwrap();
    assert_eq!(second.verdict, Verdict::Correct);
    tracker.record_interaction(&question.id, Interaction::correct());

    clock.advance(Duration::from_secs(40));
    let outcome = tracker.end_session(&question.id);
    assert_eq!(outcome.score, 45.0);
    assert_eq!(outcome.elapsed, Duration::from_secs(40));

    let award = ledger.award(&question.id, &outcome, question.base_xp());
    assert_eq!(question.base_xp(), 75);
    assert_eq!(award.xp, 34);
    assert!(award.first_completion);
    assert!(ledger.is_completed("stack"));
}

#[test]
fn reading_quest_scores_on_speed() {
    let catalog = builtin_catalog().unwrap();
    let question = catalog.get("variables").unwrap();
    let expected = question.expected_secs.unwrap();
    let (clock, tracker, mut ledger) = pipeline();

    tracker.start_session(&question.id);
    tracker.record_interaction(&question.id, Interaction::interaction());
    clock.advance(Duration::from_secs(expected));
    let outcome = tracker.end_session(&question.id);

    // Finishing in exactly the expected time scores the multiplier.
    assert_eq!(outcome.score, 80.0);
    let award = ledger.award(&question.id, &outcome, question.base_xp());
    assert_eq!(award.xp, 40);
}

#[test]
fn fast_reading_is_capped() {
    let (clock, tracker, _) = pipeline();

    tracker.start_session("variables");
    clock.advance(Duration::from_secs(1));
    let outcome = tracker.end_session("variables");
    assert_eq!(outcome.score, 120.0);
}

#[test]
fn unknown_quest_uses_fallback_score() {
    let (clock, tracker, _) = pipeline();

    tracker.start_session("not-in-catalog");
    clock.advance(Duration::from_secs(10));
    assert_eq!(tracker.end_session("not-in-catalog").score, 70.0);

    // Ending twice yields nothing.
    assert_eq!(tracker.end_session("not-in-catalog").score, 0.0);
}

#[tokio::test]
async fn stale_results_are_dropped_after_navigation() {
    let catalog = builtin_catalog().unwrap();
    let loops = catalog.get("loops").unwrap();
    let arrays = catalog.get("arrays").unwrap();
    let (service, mut events) = ScoringService::new(AnswerScoringEngine::default());
    let mut gate = FeedbackGate::new();

    gate.focus(&loops.id);
    let stale = service.submit("It will repeat while the condition holds", loops);
    gate.track(&stale);

    gate.focus(&arrays.id);
    let fresh = service.submit("An array stores elements by index", arrays);
    gate.track(&fresh);

    let mut applied = Vec::new();
    let mut finished = 0;
    while finished < 2 {
        match events.recv().await.unwrap() {
            EvaluationEvent::Started { .. } => {}
            EvaluationEvent::Finished { ticket, .. } => {
                finished += 1;
                if gate.accepts(&ticket) {
                    applied.push(ticket);
                }
            }
        }
    }

    assert_eq!(applied, vec![fresh]);
}

#[test]
fn motion_round_with_generated_problems() {
    let config = KnowiConfig::default();
    let rounds = config.game.escalate_every;
    let mut challenge = MotionChallenge::new(MathProblemGenerator::with_seed(11), config.game);

    for _ in 0..rounds {
        let target = MotionTarget::from_option_index(challenge.current().correct_answer).unwrap();
        challenge.arm();
        match challenge.select(target) {
            SelectionOutcome::Correct { points, .. } => assert!(points > 0),
            other => panic!("expected a correct selection, got {other:?}"),
        }
    }

    assert_eq!(challenge.difficulty(), Difficulty::Intermediate);
    assert_eq!(challenge.solved(), rounds);
}
