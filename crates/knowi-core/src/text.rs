//! Lightweight text analysis for free-text answers.
//!
//! Provides the normalisation, term extraction and sentiment heuristics the
//! scoring engine builds on. Everything here is table driven and
//! allocation-light; there is no model to load.

use std::collections::HashSet;

// ============================================================================
// Lexical tables
// ============================================================================

/// Domain vocabulary scanned by substring containment.
pub static DEFAULT_DOMAIN_VOCABULARY: &[&str] = &[
    "algorithm",
    "argument",
    "array",
    "async",
    "boolean",
    "class",
    "closure",
    "compiler",
    "condition",
    "data structure",
    "encapsulation",
    "exception",
    "function",
    "graph",
    "hash map",
    "index",
    "inheritance",
    "integer",
    "interface",
    "interpreter",
    "iteration",
    "library",
    "linked list",
    "loop",
    "memory",
    "method",
    "module",
    "object",
    "parameter",
    "pointer",
    "polymorphism",
    "queue",
    "recursion",
    "reference",
    "return",
    "scope",
    "stack",
    "string",
    "syntax",
    "thread",
    "tree",
    "variable",
];

/// Function words and filler that never count as content.
static STOP_WORDS: &[&str] = &[
    "about", "after", "again", "all", "also", "and", "any", "are", "because", "been", "before",
    "being", "both", "but", "can", "could", "did", "does", "doing", "each", "even", "every",
    "for", "from", "had", "has", "have", "her", "here", "hers", "him", "his", "how", "into",
    "its", "just", "maybe", "more", "most", "much", "not", "now", "off", "once", "one", "only",
    "other", "our", "out", "over", "own", "really", "same", "she", "should", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "thing",
    "things", "this", "those", "through", "too", "under", "until", "very", "was", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "yes", "you", "your", "yours",
];

/// Contraction expansions, applied per token.
static CONTRACTIONS: &[(&str, &str)] = &[
    ("can't", "can not"),
    ("won't", "will not"),
    ("shan't", "shall not"),
    ("i'm", "i am"),
    ("i've", "i have"),
    ("i'll", "i will"),
    ("i'd", "i would"),
    ("you're", "you are"),
    ("it's", "it is"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("what's", "what is"),
    ("we're", "we are"),
    ("they're", "they are"),
    ("let's", "let us"),
];

/// Tokens that flip the polarity of the word that follows them.
static NEGATIONS: &[&str] = &["not", "no", "never", "without", "hardly", "barely"];

/// Multi-word expressions scored as a unit, matched on expanded tokens.
static SENTIMENT_PHRASES: &[(&[&str], f64)] = &[
    (&["no", "idea"], -3.0),
    (&["no", "clue"], -3.0),
    (&["do", "not", "know"], -3.0),
    (&["do", "not", "understand"], -3.0),
    (&["do", "not", "get", "it"], -2.5),
    (&["give", "up"], -3.0),
    (&["not", "sure"], -2.0),
    (&["makes", "sense"], 1.5),
    (&["got", "it"], 1.5),
];

/// Single-word polarity lexicon.
static SENTIMENT_LEXICON: &[(&str, f64)] = &[
    ("clear", 1.0),
    ("confident", 2.0),
    ("easy", 1.0),
    ("good", 1.0),
    ("great", 2.0),
    ("know", 1.0),
    ("love", 2.0),
    ("simple", 1.0),
    ("sure", 1.0),
    ("understand", 1.0),
    ("bad", -1.0),
    ("clueless", -3.0),
    ("confused", -3.0),
    ("confusing", -2.0),
    ("difficult", -1.0),
    ("forgot", -2.0),
    ("guess", -1.0),
    ("hard", -1.0),
    ("hate", -2.0),
    ("help", -1.0),
    ("idk", -3.0),
    ("lost", -2.0),
    ("stuck", -2.0),
    ("unclear", -2.0),
    ("unsure", -2.0),
    ("wrong", -1.0),
];

/// Factor applied to a lexicon hit preceded by a negation.
const NEGATION_SCALAR: f64 = -0.75;

/// Smoothing constant for squashing raw sentiment into [-1, 1].
const SENTIMENT_ALPHA: f64 = 15.0;

/// How many preceding tokens are checked for a negation.
const NEGATION_WINDOW: usize = 3;

// ============================================================================
// Normalisation
// ============================================================================

/// Trim surrounding whitespace and lowercase.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Split text into word tokens, expanding contractions.
///
/// Apostrophes inside a word are kept long enough to resolve contractions
/// and are then dropped, so `"don't"` yields `["do", "not"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for raw in text
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|s| !s.is_empty())
    {
        let word = raw
            .replace('\u{2019}', "'")
            .trim_matches('\'')
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        for part in expand_contraction(&word).split_whitespace() {
            let cleaned: String = part.chars().filter(|c| *c != '\'').collect();
            if !cleaned.is_empty() {
                tokens.push(cleaned);
            }
        }
    }
    tokens
}

fn expand_contraction(word: &str) -> String {
    if let Some((_, expanded)) = CONTRACTIONS.iter().find(|(from, _)| *from == word) {
        return (*expanded).to_string();
    }
    if let Some(base) = word.strip_suffix("n't") {
        return format!("{base} not");
    }
    word.to_string()
}

// ============================================================================
// Term extraction
// ============================================================================

/// Candidate key terms pulled out of an answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTerms {
    /// Capitalised names and acronyms, lowercased.
    pub proper_nouns: Vec<String>,
    /// Content words longer than two characters.
    pub content_words: Vec<String>,
    /// Domain vocabulary entries found in the text.
    pub domain_terms: Vec<String>,
}

impl ExtractedTerms {
    /// All extracted terms, deduplicated, in extraction order.
    pub fn all(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.proper_nouns
            .iter()
            .chain(&self.content_words)
            .chain(&self.domain_terms)
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .collect()
    }
}

/// Extract candidate terms from an answer.
///
/// `original` is the trimmed answer with its casing intact (needed to spot
/// names); `normalized` is its lowercased form.
pub fn extract_terms(original: &str, normalized: &str, vocabulary: &[String]) -> ExtractedTerms {
    ExtractedTerms {
        proper_nouns: proper_nouns(original),
        content_words: content_words(normalized),
        domain_terms: domain_terms(normalized, vocabulary),
    }
}

/// Name-like tokens: capitalised words that do not open a sentence, plus
/// all-caps acronyms anywhere.
pub fn proper_nouns(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    for sentence in text.split(['.', '!', '?', '\n']) {
        let words = sentence
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty());

        for (position, word) in words.enumerate() {
            let mut chars = word.chars();
            let Some(first) = chars.next() else { continue };
            let is_acronym = word.chars().count() >= 2
                && word.chars().all(|c| c.is_uppercase() || c.is_ascii_digit())
                && word.chars().any(char::is_alphabetic);
            // Single letters ("I", "A") are never names.
            let is_capitalised =
                first.is_uppercase() && position > 0 && chars.next().is_some();

            if is_acronym || is_capitalised {
                let lower = word.to_lowercase();
                if seen.insert(lower.clone()) {
                    found.push(lower);
                }
            }
        }
    }

    found
}

/// Content words longer than two characters, stop words and bare numbers
/// removed, deduplicated in order of first appearance.
pub fn content_words(normalized: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(normalized)
        .into_iter()
        .filter(|t| t.chars().count() > 2)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Vocabulary entries contained in the text.
pub fn domain_terms(normalized: &str, vocabulary: &[String]) -> Vec<String> {
    vocabulary
        .iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty() && normalized.contains(term.as_str()))
        .collect()
}

/// Bidirectional substring containment: either string contains the other.
///
/// Tolerates plural and compound forms ("loops" vs "loop",
/// "return" vs "return value").
pub fn terms_overlap(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

// ============================================================================
// Sentiment
// ============================================================================

/// Polarity of a text in [-1, 1]. Negative values read as frustration or
/// uncertainty.
pub fn sentiment(text: &str) -> f64 {
    let tokens = tokenize(text);
    let mut raw = 0.0;
    let mut i = 0;

    'scan: while i < tokens.len() {
        for (phrase, weight) in SENTIMENT_PHRASES {
            let end = i + phrase.len();
            if end <= tokens.len()
                && tokens[i..end]
                    .iter()
                    .zip(phrase.iter())
                    .all(|(t, p)| t == p)
            {
                raw += weight;
                i = end;
                continue 'scan;
            }
        }

        let token = tokens[i].as_str();
        if let Some((_, weight)) = SENTIMENT_LEXICON.iter().find(|(w, _)| *w == token) {
            let window_start = i.saturating_sub(NEGATION_WINDOW);
            let negated = tokens[window_start..i]
                .iter()
                .any(|t| NEGATIONS.contains(&t.as_str()));
            raw += if negated { weight * NEGATION_SCALAR } else { *weight };
        }
        i += 1;
    }

    if raw == 0.0 {
        return 0.0;
    }
    (raw / (raw * raw + SENTIMENT_ALPHA).sqrt()).clamp(-1.0, 1.0)
}
