//! The `knowi init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("knowi.toml").exists() {
        println!("knowi.toml already exists, skipping.");
    } else {
        std::fs::write("knowi.toml", SAMPLE_CONFIG)?;
        println!("Created knowi.toml");
    }

    std::fs::create_dir_all("catalogs")?;
    let example_path = Path::new("catalogs/example.toml");
    if example_path.exists() {
        println!("catalogs/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CATALOG)?;
        println!("Created catalogs/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Tune thresholds and penalties in knowi.toml");
    println!("  2. Run: knowi validate catalogs/example.toml");
    println!("  3. Run: knowi practice --catalog catalogs/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# knowi configuration

[scoring]
correct_threshold = 0.7
partial_threshold = 0.4
confusion_threshold = -0.3
min_answer_chars = 5

[session]
hint_penalty = 5.0
max_hint_penalty = 25.0
fallback_score = 70.0
max_efficiency = 1.5
efficiency_multiplier = 80.0

[game]
escalate_every = 5
max_tier = 3
tilt_threshold = 0.35

[progress]
xp_per_level = 500
"#;

const EXAMPLE_CATALOG: &str = r#"[catalog]
id = "example"
name = "Example"
description = "A starter catalog"

[[questions]]
id = "variables"
prompt = "What is a variable?"
difficulty = "beginner"
category = "Basics"
key_terms = ["name", "value", "store"]
hint = "Think of a labelled box."
expected_secs = 60

[[questions]]
id = "functions"
prompt = "Why do programs use functions?"
difficulty = "beginner"
category = "Basics"
key_terms = ["reuse", "parameter", "return"]
hint = "What would you do instead of copying the same code twice?"
expected_secs = 90
"#;
