//! The `knowi validate` command.

use std::path::PathBuf;

use anyhow::Result;

use knowi_core::catalog;

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let catalogs = if catalog_path.is_dir() {
        catalog::load_catalog_directory(&catalog_path)?
    } else {
        vec![catalog::parse_catalog(&catalog_path)?]
    };

    anyhow::ensure!(
        !catalogs.is_empty(),
        "no catalogs found in {}",
        catalog_path.display()
    );

    let mut total_warnings = 0;

    for c in &catalogs {
        println!("Catalog: {} ({} questions)", c.name, c.questions.len());

        let warnings = catalog::validate_catalog(c);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All catalogs valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
