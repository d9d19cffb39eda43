//! Arithmetic problem generation for the motion math game.
//!
//! Each problem carries four unique, shuffled answer options: the correct
//! value plus three nearby distractors whose spread grows with the tier.

use std::fmt;
use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::model::Difficulty;

/// Number of answer options on every problem.
pub const OPTION_COUNT: usize = 4;

/// The arithmetic operation a problem exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    /// `x + b = c`, used in place of division at the lowest tier.
    LinearEquation,
}

impl ProblemKind {
    /// Points before the tier multiplier.
    pub fn base_points(self) -> u32 {
        match self {
            ProblemKind::Addition | ProblemKind::Subtraction => 25,
            ProblemKind::Multiplication => 35,
            ProblemKind::Division => 40,
            ProblemKind::LinearEquation => 30,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemKind::Addition => write!(f, "addition"),
            ProblemKind::Subtraction => write!(f, "subtraction"),
            ProblemKind::Multiplication => write!(f, "multiplication"),
            ProblemKind::Division => write!(f, "division"),
            ProblemKind::LinearEquation => write!(f, "equation"),
        }
    }
}

/// A generated multiple-choice arithmetic problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathProblem {
    pub question: String,
    /// Exactly [`OPTION_COUNT`] distinct option strings.
    pub options: Vec<String>,
    /// Index into `options` of the correct value.
    pub correct_answer: usize,
    pub difficulty: Difficulty,
    pub points: u32,
    pub kind: ProblemKind,
    /// The numeric answer `options[correct_answer]` spells.
    pub answer: i64,
}

impl MathProblem {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer]
    }

    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_answer
    }
}

/// Generates arithmetic problems from an owned random source.
pub struct MathProblemGenerator<R = ChaCha8Rng> {
    rng: R,
}

impl MathProblemGenerator<ChaCha8Rng> {
    /// A generator seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// A reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for MathProblemGenerator<ChaCha8Rng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> MathProblemGenerator<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a problem of a random kind.
    pub fn generate(&mut self, difficulty: Difficulty) -> MathProblem {
        let kind = match self.rng.gen_range(0..4) {
            0 => ProblemKind::Addition,
            1 => ProblemKind::Subtraction,
            2 => ProblemKind::Multiplication,
            _ => ProblemKind::Division,
        };
        self.generate_kind(kind, difficulty)
    }

    /// Generate a problem of a given kind.
    ///
    /// Division at the beginner tier, where whole-number division leaves
    /// too few sensible operands, becomes a linear equation instead.
    pub fn generate_kind(&mut self, kind: ProblemKind, difficulty: Difficulty) -> MathProblem {
        let tier = difficulty.tier();
        let kind = match kind {
            ProblemKind::Division if tier == 1 => ProblemKind::LinearEquation,
            other => other,
        };

        let (question, answer) = match kind {
            ProblemKind::Addition => {
                let range = addition_range(tier);
                let a = self.rng.gen_range(range.clone());
                let b = self.rng.gen_range(range);
                (format!("{a} + {b} = ?"), a + b)
            }
            ProblemKind::Subtraction => {
                let range = addition_range(tier);
                let minuend = self.rng.gen_range((*range.start() + 1)..=*range.end());
                let subtrahend = self.rng.gen_range(*range.start()..minuend);
                (format!("{minuend} - {subtrahend} = ?"), minuend - subtrahend)
            }
            ProblemKind::Multiplication => {
                let (left, right) = multiplication_ranges(tier);
                let a = self.rng.gen_range(left);
                let b = self.rng.gen_range(right);
                (format!("{a} × {b} = ?"), a * b)
            }
            ProblemKind::Division => {
                let (divisors, quotients) = division_ranges(tier);
                let divisor = self.rng.gen_range(divisors);
                let quotient = self.rng.gen_range(quotients);
                let dividend = divisor * quotient;
                (format!("{dividend} ÷ {divisor} = ?"), quotient)
            }
            ProblemKind::LinearEquation => {
                let x = self.rng.gen_range(1..=10);
                let b = self.rng.gen_range(1..=10);
                (format!("x + {b} = {}, x = ?", x + b), x)
            }
        };

        let (options, correct_answer) = self.options_for(answer, tier);

        MathProblem {
            question,
            options,
            correct_answer,
            difficulty,
            points: kind.base_points() * u32::from(tier),
            kind,
            answer,
        }
    }

    /// Build shuffled options around `answer` and return the correct index.
    fn options_for(&mut self, answer: i64, tier: u8) -> (Vec<String>, usize) {
        let mut spread = max_offset(tier);
        let mut distractors = candidate_distractors(answer, spread);
        // Small answers can run out of positive neighbours; widen until
        // three remain.
        while distractors.len() < OPTION_COUNT - 1 {
            spread += 1;
            distractors = candidate_distractors(answer, spread);
        }
        distractors.shuffle(&mut self.rng);
        distractors.truncate(OPTION_COUNT - 1);

        let correct = self.rng.gen_range(0..OPTION_COUNT);
        let mut values = distractors;
        values.insert(correct, answer);

        debug_assert_eq!(values.len(), OPTION_COUNT);
        debug_assert_eq!(values[correct], answer);

        (values.iter().map(i64::to_string).collect(), correct)
    }
}

/// Largest distractor offset per tier: ±2, ±3, ±5.
fn max_offset(tier: u8) -> i64 {
    match tier {
        0 | 1 => 2,
        2 => 3,
        _ => 5,
    }
}

/// Every `answer ± offset` for offsets `1..=spread` that stays positive.
fn candidate_distractors(answer: i64, spread: i64) -> Vec<i64> {
    (1..=spread)
        .flat_map(|offset| [answer - offset, answer + offset])
        .filter(|value| *value > 0)
        .collect()
}

fn addition_range(tier: u8) -> RangeInclusive<i64> {
    match tier {
        0 | 1 => 1..=10,
        2 => 10..=50,
        _ => 50..=200,
    }
}

fn multiplication_ranges(tier: u8) -> (RangeInclusive<i64>, RangeInclusive<i64>) {
    match tier {
        0 | 1 => (2..=5, 2..=5),
        2 => (2..=10, 2..=10),
        _ => (6..=15, 2..=12),
    }
}

fn division_ranges(tier: u8) -> (RangeInclusive<i64>, RangeInclusive<i64>) {
    match tier {
        0 | 1 => (2..=5, 2..=5),
        2 => (2..=10, 2..=10),
        _ => (3..=12, 5..=20),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const KINDS: [ProblemKind; 4] = [
        ProblemKind::Addition,
        ProblemKind::Subtraction,
        ProblemKind::Multiplication,
        ProblemKind::Division,
    ];

    fn assert_well_formed(p: &MathProblem) {
        assert_eq!(p.options.len(), OPTION_COUNT, "{p:?}");
        let unique: HashSet<_> = p.options.iter().collect();
        assert_eq!(unique.len(), OPTION_COUNT, "duplicate options: {p:?}");
        assert!(p.correct_answer < OPTION_COUNT);
        assert_eq!(p.correct_option(), p.answer.to_string());
        let matching = p
            .options
            .iter()
            .filter(|o| **o == p.answer.to_string())
            .count();
        assert_eq!(matching, 1);
        for option in &p.options {
            assert!(option.parse::<i64>().unwrap() > 0, "{p:?}");
        }
    }

    #[test]
    fn generated_problems_are_well_formed_at_every_tier() {
        let mut generator = MathProblemGenerator::with_seed(7);
        for difficulty in Difficulty::ALL {
            for _ in 0..500 {
                let p = generator.generate(difficulty);
                assert_well_formed(&p);
                assert_eq!(p.difficulty, difficulty);
            }
        }
    }

    #[test]
    fn subtraction_is_never_negative() {
        let mut generator = MathProblemGenerator::with_seed(11);
        for difficulty in Difficulty::ALL {
            for _ in 0..300 {
                let p = generator.generate_kind(ProblemKind::Subtraction, difficulty);
                assert!(p.answer >= 0, "{p:?}");
                let (lhs, _) = p.question.split_once(" = ").unwrap();
                let (a, b) = lhs.split_once(" - ").unwrap();
                let (a, b): (i64, i64) = (a.parse().unwrap(), b.parse().unwrap());
                assert!(a >= b);
                assert_eq!(a - b, p.answer);
            }
        }
    }

    #[test]
    fn division_is_exact() {
        let mut generator = MathProblemGenerator::with_seed(13);
        for difficulty in [Difficulty::Intermediate, Difficulty::Advanced] {
            for _ in 0..300 {
                let p = generator.generate_kind(ProblemKind::Division, difficulty);
                assert_eq!(p.kind, ProblemKind::Division);
                let (lhs, _) = p.question.split_once(" = ").unwrap();
                let (dividend, divisor) = lhs.split_once(" ÷ ").unwrap();
                let (dividend, divisor): (i64, i64) =
                    (dividend.parse().unwrap(), divisor.parse().unwrap());
                assert_eq!(dividend % divisor, 0);
                assert_eq!(dividend / divisor, p.answer);
            }
        }
    }

    #[test]
    fn beginner_division_becomes_linear_equation() {
        let mut generator = MathProblemGenerator::with_seed(17);
        let p = generator.generate_kind(ProblemKind::Division, Difficulty::Beginner);
        assert_eq!(p.kind, ProblemKind::LinearEquation);
        assert_eq!(p.points, 30);
        assert!(p.question.starts_with("x + "));

        let rest = p.question.trim_start_matches("x + ");
        let (b, c) = rest.split_once(" = ").unwrap();
        let c = c.trim_end_matches(", x = ?");
        let (b, c): (i64, i64) = (b.parse().unwrap(), c.parse().unwrap());
        assert_eq!(c - b, p.answer);
    }

    #[test]
    fn points_scale_with_tier() {
        let mut generator = MathProblemGenerator::with_seed(19);
        for kind in KINDS {
            let easy = generator.generate_kind(kind, Difficulty::Beginner);
            let hard = generator.generate_kind(kind, Difficulty::Advanced);
            assert!(hard.points >= easy.points, "{kind}");
        }
        let p = generator.generate_kind(ProblemKind::Multiplication, Difficulty::Intermediate);
        assert_eq!(p.points, 70);
        let p = generator.generate_kind(ProblemKind::Division, Difficulty::Advanced);
        assert_eq!(p.points, 120);
    }

    #[test]
    fn distractors_stay_within_tier_spread_when_possible() {
        let mut generator = MathProblemGenerator::with_seed(23);
        for _ in 0..200 {
            let p = generator.generate_kind(ProblemKind::Addition, Difficulty::Intermediate);
            for option in &p.options {
                let value: i64 = option.parse().unwrap();
                assert!((value - p.answer).abs() <= 3, "{p:?}");
            }
        }
    }

    #[test]
    fn small_answers_still_get_four_options() {
        let mut generator = MathProblemGenerator::with_seed(29);
        let (options, correct) = generator.options_for(1, 1);
        assert_eq!(options.len(), OPTION_COUNT);
        assert_eq!(options[correct], "1");
        let unique: HashSet<_> = options.iter().collect();
        assert_eq!(unique.len(), OPTION_COUNT);
    }

    #[test]
    fn same_seed_same_problems() {
        let mut a = MathProblemGenerator::with_seed(42);
        let mut b = MathProblemGenerator::with_seed(42);
        for _ in 0..20 {
            assert_eq!(a.generate(Difficulty::Advanced), b.generate(Difficulty::Advanced));
        }
    }

    #[test]
    fn correct_index_is_spread_across_positions() {
        let mut generator = MathProblemGenerator::with_seed(31);
        let positions: HashSet<usize> = (0..200)
            .map(|_| generator.generate(Difficulty::Beginner).correct_answer)
            .collect();
        assert_eq!(positions.len(), OPTION_COUNT);
    }
}
