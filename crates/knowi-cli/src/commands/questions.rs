//! The `knowi questions` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use knowi_core::catalog::load_catalog;

use super::parse_difficulty;

pub fn execute(catalog_path: Option<PathBuf>, difficulty: Option<String>) -> Result<()> {
    let catalog = load_catalog(catalog_path.as_deref())?;
    let difficulty = parse_difficulty(difficulty.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec!["Id", "Difficulty", "Category", "XP", "Prompt"]);

    let mut shown = 0;
    for q in &catalog.questions {
        if difficulty.is_some_and(|d| d != q.difficulty) {
            continue;
        }
        table.add_row(vec![
            Cell::new(&q.id),
            Cell::new(q.difficulty),
            Cell::new(&q.category),
            Cell::new(q.base_xp()),
            Cell::new(&q.prompt),
        ]);
        shown += 1;
    }

    println!("{} ({shown} questions)", catalog.name);
    println!("{table}");
    Ok(())
}
