//! Score answer example: grade free-text answers and turn the attempts
//! into a session score and XP.
//!
//! ```bash
//! cargo run -p knowi-core --example score_answer
//! ```

use std::sync::Arc;

use knowi_core::catalog::builtin_catalog;
use knowi_core::config::KnowiConfig;
use knowi_core::progress::ProgressLedger;
use knowi_core::scoring::AnswerScoringEngine;
use knowi_core::session::{Interaction, SessionScoreTracker};

fn main() -> anyhow::Result<()> {
    let config = KnowiConfig::default();
    let catalog = Arc::new(builtin_catalog()?);
    let question = catalog
        .get("stack")
        .ok_or_else(|| anyhow::anyhow!("built-in catalog has no 'stack' question"))?;

    let engine = AnswerScoringEngine::new(config.scoring.clone());
    let tracker =
        SessionScoreTracker::new(config.session.clone()).with_metadata(catalog.clone());
    let mut ledger = ProgressLedger::new(&config.progress);

    println!("Q: {}", question.prompt);
    tracker.start_session(&question.id);

    let attempts = [
        "Honestly I have no idea",
        "You push items on and pop them off",
        "The last item you push is the first you pop, always from the top",
    ];

    for answer in attempts {
        let result = engine.evaluate(answer, question);
        println!("\n> {answer}");
        println!("  {} ({:.0}%): {}", result.verdict, result.match_ratio * 100.0, result.feedback);

        let interaction = if result.is_correct {
            Interaction::correct()
        } else {
            Interaction::incorrect()
        };
        tracker.record_interaction(&question.id, interaction);
        if result.is_correct {
            break;
        }
    }

    let outcome = tracker.end_session(&question.id);
    let award = ledger.award(&question.id, &outcome, question.base_xp());
    println!(
        "\nScore {:.0} in {:.1}s, +{} XP (level {})",
        outcome.score,
        outcome.elapsed_secs(),
        award.xp,
        award.level
    );

    Ok(())
}
