//! Core data model types for knowi.
//!
//! Questions, difficulty tiers and scoring results shared by every quiz
//! screen. Catalog files are parsed into these types by [`crate::catalog`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty of a question or math problem.
///
/// Ordered: `Beginner < Intermediate < Advanced`. Each level maps onto a
/// numeric tier (1..=3) that scales operand ranges and point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// All difficulties in ascending order.
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Numeric tier, 1 for beginner through 3 for advanced.
    pub fn tier(self) -> u8 {
        match self {
            Difficulty::Beginner => 1,
            Difficulty::Intermediate => 2,
            Difficulty::Advanced => 3,
        }
    }

    /// Map a tier back to a difficulty. Out-of-range tiers clamp to 1..=3.
    pub fn from_tier(tier: u8) -> Self {
        match tier {
            0 | 1 => Difficulty::Beginner,
            2 => Difficulty::Intermediate,
            _ => Difficulty::Advanced,
        }
    }

    /// The next difficulty up, saturating at advanced.
    pub fn harder(self) -> Self {
        Self::from_tier(self.tier() + 1)
    }

    /// Default XP awarded for a question of this difficulty.
    pub fn default_xp(self) -> u32 {
        match self {
            Difficulty::Beginner => 50,
            Difficulty::Intermediate => 75,
            Difficulty::Advanced => 100,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "easy" | "1" => Ok(Difficulty::Beginner),
            "intermediate" | "medium" | "2" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" | "3" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// An open-response question from a catalog. Never mutated after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier, also used as the session key.
    pub id: String,
    /// Text shown (or spoken) to the learner.
    pub prompt: String,
    /// Optional code sample the question refers to.
    #[serde(default)]
    pub code: Option<String>,
    pub difficulty: Difficulty,
    pub category: String,
    /// Terms a correct answer is expected to mention. Never empty.
    pub key_terms: Vec<String>,
    pub hint: String,
    /// How long a learner is expected to spend, in seconds.
    #[serde(default)]
    pub expected_secs: Option<u64>,
    /// XP override; falls back to the difficulty default.
    #[serde(default)]
    pub xp: Option<u32>,
}

impl Question {
    /// XP granted for a perfect answer.
    pub fn base_xp(&self) -> u32 {
        self.xp.unwrap_or_else(|| self.difficulty.default_xp())
    }
}

/// How an answer was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Nothing was entered.
    Empty,
    /// Below the minimum answer length.
    TooShort,
    /// Enough key terms were covered.
    Correct,
    /// Some key terms were covered, but not enough.
    Partial,
    /// The answer reads as the learner being unsure or lost.
    Confused,
    /// Too few key terms and no sign of confusion.
    MissingConcepts,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Empty => "empty",
            Verdict::TooShort => "too short",
            Verdict::Correct => "correct",
            Verdict::Partial => "partial",
            Verdict::Confused => "confused",
            Verdict::MissingConcepts => "missing concepts",
        };
        f.write_str(s)
    }
}

/// Result of evaluating one submission. Produced fresh each time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub is_correct: bool,
    /// Feedback text for the learner.
    pub feedback: String,
    pub verdict: Verdict,
    /// Fraction of expected key terms found, 0.0..=1.0.
    pub match_ratio: f64,
    /// Expected key terms that were found, in catalog order.
    #[serde(default)]
    pub matched_terms: Vec<String>,
    /// Expected key terms that were not found, in catalog order.
    #[serde(default)]
    pub missing_terms: Vec<String>,
}

impl ScoringResult {
    /// An incorrect result that never reached term matching.
    pub(crate) fn rejected(verdict: Verdict, feedback: impl Into<String>) -> Self {
        Self {
            is_correct: false,
            feedback: feedback.into(),
            verdict,
            match_ratio: 0.0,
            matched_terms: Vec::new(),
            missing_terms: Vec::new(),
        }
    }
}
