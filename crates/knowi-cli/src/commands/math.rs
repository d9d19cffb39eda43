//! The `knowi math` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use knowi_core::math::MathProblemGenerator;
use knowi_core::model::Difficulty;
use knowi_core::motion::MotionTarget;

pub fn execute(tier: u8, count: usize, seed: Option<u64>, json: bool) -> Result<()> {
    anyhow::ensure!((1..=3).contains(&tier), "tier must be between 1 and 3");
    anyhow::ensure!(count >= 1, "count must be at least 1");

    let mut generator = match seed {
        Some(seed) => MathProblemGenerator::with_seed(seed),
        None => MathProblemGenerator::new(),
    };
    let difficulty = Difficulty::from_tier(tier);
    let problems: Vec<_> = (0..count).map(|_| generator.generate(difficulty)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&problems)?);
        return Ok(());
    }

    let mut header = vec!["#".to_string(), "Problem".to_string()];
    header.extend(MotionTarget::ALL.iter().map(|t| t.label().to_string()));
    header.extend(["Answer".to_string(), "Points".to_string()]);

    let mut table = Table::new();
    table.set_header(header);

    for (i, p) in problems.iter().enumerate() {
        let mut row = vec![Cell::new(i + 1), Cell::new(&p.question)];
        row.extend(p.options.iter().map(Cell::new));
        let answer_target = MotionTarget::from_option_index(p.correct_answer)
            .map(|t| t.label())
            .unwrap_or("?");
        row.push(Cell::new(format!("{} ({answer_target})", p.correct_option())));
        row.push(Cell::new(p.points));
        table.add_row(row);
    }

    println!("Tier {tier} ({difficulty})");
    println!("{table}");
    Ok(())
}
