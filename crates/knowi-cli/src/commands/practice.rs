//! The `knowi practice` command.
//!
//! Reads one answer per line from stdin. `hint` shows the question's hint
//! (and costs points), `skip` gives up on the current question.

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Table};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use knowi_core::catalog::load_catalog;
use knowi_core::config::load_config_from;
use knowi_core::model::{Question, ScoringResult};
use knowi_core::progress::ProgressLedger;
use knowi_core::scoring::AnswerScoringEngine;
use knowi_core::service::{EvaluationEvent, FeedbackGate, ScoringService, Ticket};
use knowi_core::session::{Interaction, SessionScoreTracker};

use super::parse_difficulty;

/// Graded attempts allowed per question.
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Serialize)]
struct QuestionReport {
    question_id: String,
    verdict: String,
    attempts: u32,
    hints: u32,
    score: f64,
    elapsed_secs: f64,
    xp: u32,
}

#[derive(Debug, Serialize)]
struct PracticeSummary {
    catalog: String,
    finished_at: DateTime<Utc>,
    questions: Vec<QuestionReport>,
    total_xp: u32,
    level: u32,
}

/// Interactive output goes to stdout, or to stderr when stdout carries JSON.
struct Console {
    json: bool,
}

impl Console {
    fn say(&self, message: impl Display) {
        if self.json {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}

pub async fn execute(
    catalog_path: Option<PathBuf>,
    difficulty: Option<String>,
    limit: Option<usize>,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = Arc::new(load_catalog(catalog_path.as_deref())?);
    let difficulty = parse_difficulty(difficulty.as_deref())?;

    let questions: Vec<&Question> = catalog
        .questions
        .iter()
        .filter(|q| difficulty.map_or(true, |d| d == q.difficulty))
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    anyhow::ensure!(!questions.is_empty(), "no questions match the filters");

    let tracker =
        SessionScoreTracker::new(config.session.clone()).with_metadata(catalog.clone());
    let (service, mut events) =
        ScoringService::new(AnswerScoringEngine::new(config.scoring.clone()));
    let mut gate = FeedbackGate::new();
    let mut ledger = ProgressLedger::new(&config.progress);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let console = Console { json };
    let mut reports = Vec::new();

    'questions: for (n, question) in questions.iter().enumerate() {
        console.say(format!(
            "\n[{}/{}] {} ({})",
            n + 1,
            questions.len(),
            question.prompt,
            question.difficulty
        ));
        if let Some(code) = &question.code {
            console.say(code.trim_end());
        }

        tracker.start_session(&question.id);
        gate.focus(&question.id);
        let mut attempts = 0;
        let mut hints = 0;
        let mut verdict = String::from("skipped");

        loop {
            let Some(line) = lines.next_line().await? else {
                tracker.end_session(&question.id);
                console.say("Input closed, ending practice.");
                break 'questions;
            };
            let answer = line.trim();
            if answer.is_empty() {
                continue;
            }

            match answer.to_lowercase().as_str() {
                "hint" => {
                    tracker.record_interaction(&question.id, Interaction::hint());
                    hints += 1;
                    console.say(format!("Hint: {}", question.hint));
                    continue;
                }
                "skip" => {
                    tracker.record_interaction(&question.id, Interaction::incorrect());
                    break;
                }
                _ => {}
            }

            let ticket = service.submit(answer, question);
            gate.track(&ticket);
            let result = next_result(&mut events, &gate, &ticket).await?;

            attempts += 1;
            let interaction = if result.is_correct {
                Interaction::correct()
            } else {
                Interaction::incorrect()
            };
            tracker.record_interaction(&question.id, interaction);
            console.say(&result.feedback);
            verdict = result.verdict.to_string();

            if result.is_correct || attempts >= MAX_ATTEMPTS {
                break;
            }
            console.say("Try again, or type 'hint' or 'skip'.");
        }

        let outcome = tracker.end_session(&question.id);
        let award = ledger.award(&question.id, &outcome, question.base_xp());
        console.say(format!(
            "Score {:.0}, +{} XP{}",
            outcome.score,
            award.xp,
            if award.leveled_up {
                format!(" (level {}!)", award.level)
            } else {
                String::new()
            }
        ));

        reports.push(QuestionReport {
            question_id: question.id.clone(),
            verdict,
            attempts,
            hints,
            score: outcome.score,
            elapsed_secs: outcome.elapsed_secs(),
            xp: award.xp,
        });
    }

    let summary = PracticeSummary {
        catalog: catalog.id.clone(),
        finished_at: Utc::now(),
        questions: reports,
        total_xp: ledger.total_xp(),
        level: ledger.level(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// Wait for the result of `expected`, dropping anything the gate rejects.
async fn next_result(
    events: &mut UnboundedReceiver<EvaluationEvent>,
    gate: &FeedbackGate,
    expected: &Ticket,
) -> Result<ScoringResult> {
    while let Some(event) = events.recv().await {
        match event {
            EvaluationEvent::Started { .. } => continue,
            EvaluationEvent::Finished { ticket, result } => {
                if ticket == *expected && gate.accepts(&ticket) {
                    return Ok(result);
                }
                tracing::debug!("dropping stale feedback for {}", ticket.question_id);
            }
        }
    }
    anyhow::bail!("scoring service stopped before answering")
}

fn print_summary(summary: &PracticeSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        "Question", "Verdict", "Attempts", "Hints", "Score", "Time", "XP",
    ]);

    for r in &summary.questions {
        table.add_row(vec![
            Cell::new(&r.question_id),
            Cell::new(&r.verdict),
            Cell::new(r.attempts),
            Cell::new(r.hints),
            Cell::new(format!("{:.0}", r.score)),
            Cell::new(format!("{:.1}s", r.elapsed_secs)),
            Cell::new(r.xp),
        ]);
    }

    println!("\n{table}");
    println!("Total XP: {} (level {})", summary.total_xp, summary.level);
}
