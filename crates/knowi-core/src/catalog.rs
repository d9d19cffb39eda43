//! TOML question catalog parser.
//!
//! Loads question catalogs from TOML files and directories, and validates
//! them. A built-in programming catalog ships with the crate.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{Difficulty, Question};
use crate::session::QuestMetadata;

/// The catalog embedded in the binary.
pub const BUILTIN_CATALOG: &str = include_str!("../../../catalogs/programming.toml");

/// A named collection of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

impl Catalog {
    /// Look up a question by id.
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions at a given difficulty, in catalog order.
    pub fn by_difficulty(&self, difficulty: Difficulty) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| q.difficulty == difficulty)
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(|q| q.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

impl QuestMetadata for Catalog {
    fn expected_duration(&self, session_id: &str) -> Option<Duration> {
        self.get(session_id)
            .and_then(|q| q.expected_secs)
            .map(Duration::from_secs)
    }
}

/// Intermediate TOML structure for parsing catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    catalog: TomlCatalogHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlCatalogHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    key_terms: Vec<String>,
    #[serde(default)]
    hint: String,
    #[serde(default)]
    expected_secs: Option<u64>,
    #[serde(default)]
    xp: Option<u32>,
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

fn default_category() -> String {
    "General".to_string()
}

/// Parse the embedded catalog.
pub fn builtin_catalog() -> Result<Catalog> {
    parse_catalog_str(BUILTIN_CATALOG, Path::new("<builtin>"))
}

/// Parse a single TOML file into a `Catalog`.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a TOML string into a `Catalog` (useful for testing).
///
/// Fails on structural problems that would make a question ungradeable:
/// missing key terms, unknown difficulty, or a duplicate id.
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut seen_ids = HashSet::new();
    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            if !seen_ids.insert(q.id.clone()) {
                return Err(CatalogError::DuplicateId(q.id));
            }

            let key_terms: Vec<String> = q
                .key_terms
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if key_terms.is_empty() {
                return Err(CatalogError::NoKeyTerms(q.id));
            }

            let difficulty = q
                .difficulty
                .parse::<Difficulty>()
                .map_err(|message| CatalogError::UnknownDifficulty {
                    question: q.id.clone(),
                    message,
                })?;

            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                code: q.code,
                difficulty,
                category: q.category,
                key_terms,
                hint: q.hint,
                expected_secs: q.expected_secs,
                xp: q.xp,
            })
        })
        .collect::<std::result::Result<Vec<_>, CatalogError>>()
        .with_context(|| format!("invalid catalog: {}", source_path.display()))?;

    Ok(Catalog {
        id: parsed.catalog.id,
        name: parsed.catalog.name,
        description: parsed.catalog.description,
        questions,
    })
}

/// Recursively load all `.toml` catalog files from a directory.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Catalog>> {
    let mut catalogs = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            catalogs.extend(load_catalog_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_catalog(&path) {
                Ok(catalog) => catalogs.push(catalog),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    catalogs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(catalogs)
}

/// Load a catalog from a file, or the built-in one when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(p) => parse_catalog(p),
        None => builtin_catalog(),
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a catalog for issues that degrade grading without breaking it.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if catalog.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "catalog has no questions".into(),
        });
    }

    for q in &catalog.questions {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message,
            })
        };

        if q.prompt.trim().is_empty() {
            warn("prompt is empty".into());
        }
        if q.hint.trim().is_empty() {
            warn("hint is empty; confused learners will get no guidance".into());
        }

        let mut seen_terms = HashSet::new();
        for term in &q.key_terms {
            let lower = term.to_lowercase();
            if !seen_terms.insert(lower.clone()) {
                warn(format!("duplicate key term: {term}"));
            }
            // Terms this short overlap with almost any word.
            if lower.chars().count() <= 2 {
                warn(format!("key term '{term}' is too short to match reliably"));
            }
        }

        if q.expected_secs == Some(0) {
            warn("expected_secs is zero".into());
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[catalog]
id = "test-catalog"
name = "Test Catalog"
description = "A test catalog"

[[questions]]
id = "recursion"
prompt = "What is recursion?"
code = """
fn fact(n: u64) -> u64 {
    if n == 0 { 1 } else { n * fact(n - 1) }
}
"""
difficulty = "intermediate"
category = "Functions"
key_terms = ["calls itself", "base case", "smaller"]
hint = "Look at what fact does inside its own body."
expected_secs = 90
xp = 80
"#;

    #[test]
    fn parse_valid_toml() {
        let catalog = parse_catalog_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(catalog.id, "test-catalog");
        assert_eq!(catalog.name, "Test Catalog");
        assert_eq!(catalog.questions.len(), 1);

        let q = &catalog.questions[0];
        assert_eq!(q.id, "recursion");
        assert_eq!(q.difficulty, Difficulty::Intermediate);
        assert!(q.code.as_deref().unwrap().contains("fn fact"));
        assert_eq!(q.key_terms, vec!["calls itself", "base case", "smaller"]);
        assert_eq!(q.base_xp(), 80);
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[catalog]
id = "minimal"
name = "Minimal"

[[questions]]
id = "q1"
prompt = "What is a variable?"
key_terms = ["value"]
"#;
        let catalog = parse_catalog_str(toml, &PathBuf::from("test.toml")).unwrap();
        let q = &catalog.questions[0];
        assert_eq!(q.difficulty, Difficulty::Beginner);
        assert_eq!(q.category, "General");
        assert!(q.code.is_none());
        assert!(q.expected_secs.is_none());
    }

    #[test]
    fn rejects_missing_key_terms() {
        let toml = r#"
[catalog]
id = "broken"
name = "Broken"

[[questions]]
id = "empty-terms"
prompt = "Explain something"
key_terms = ["  "]
"#;
        let err = parse_catalog_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::NoKeyTerms(id)) if id == "empty-terms"
        ));
    }

    #[test]
    fn rejects_unknown_difficulty() {
        let toml = r#"
[catalog]
id = "broken"
name = "Broken"

[[questions]]
id = "q"
prompt = "Explain something"
difficulty = "legendary"
key_terms = ["thing"]
"#;
        let err = parse_catalog_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("unknown difficulty"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let toml = r#"
[catalog]
id = "dupes"
name = "Dupes"

[[questions]]
id = "same"
prompt = "First"
key_terms = ["one"]

[[questions]]
id = "same"
prompt = "Second"
key_terms = ["two"]
"#;
        let err = parse_catalog_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_catalog_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_flags_weak_questions() {
        let toml = r#"
[catalog]
id = "weak"
name = "Weak"

[[questions]]
id = "q"
prompt = "What is IO?"
key_terms = ["io", "input", "Input"]
expected_secs = 0
"#;
        let catalog = parse_catalog_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_catalog(&catalog);
        assert!(warnings.iter().any(|w| w.message.contains("too short")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate key term")));
        assert!(warnings.iter().any(|w| w.message.contains("hint is empty")));
        assert!(warnings.iter().any(|w| w.message.contains("expected_secs")));
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = builtin_catalog().unwrap();
        assert!(!catalog.questions.is_empty());
        assert!(validate_catalog(&catalog).is_empty());
        for d in Difficulty::ALL {
            assert!(catalog.by_difficulty(d).next().is_some(), "no {d} questions");
        }
    }

    #[test]
    fn catalog_provides_quest_durations() {
        let catalog = parse_catalog_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(
            catalog.expected_duration("recursion"),
            Some(Duration::from_secs(90))
        );
        assert_eq!(catalog.expected_duration("missing"), None);
        assert_eq!(catalog.categories(), vec!["Functions"]);
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalogs = load_catalog_directory(dir.path()).unwrap();
        assert_eq!(catalogs.len(), 1);
        assert_eq!(catalogs[0].id, "test-catalog");
    }
}
