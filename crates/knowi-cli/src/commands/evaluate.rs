//! The `knowi evaluate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use knowi_core::catalog::load_catalog;
use knowi_core::config::load_config_from;
use knowi_core::scoring::AnswerScoringEngine;
use knowi_core::service::ScoringService;

pub async fn execute(
    question_id: String,
    answer: String,
    catalog_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = load_catalog(catalog_path.as_deref())?;
    let question = catalog.get(&question_id).with_context(|| {
        format!(
            "question '{question_id}' not found in catalog '{}'",
            catalog.id
        )
    })?;

    let (service, _events) = ScoringService::new(AnswerScoringEngine::new(config.scoring));
    let result = service.evaluate(answer, question).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Question: {}", question.prompt);
    println!(
        "Verdict: {} ({:.0}% of key terms)",
        result.verdict,
        result.match_ratio * 100.0
    );
    println!("{}", result.feedback);

    Ok(())
}
