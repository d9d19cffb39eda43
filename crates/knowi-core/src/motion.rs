//! Motion-controlled math challenge.
//!
//! The learner answers by tilting the device towards one of four
//! directions, each bound to one answer option. The sensor layer delivers
//! tilt readings; this module turns them into selections and owns the game
//! state (score, streak, difficulty escalation).

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::math::{MathProblem, MathProblemGenerator};
use crate::model::Difficulty;

/// Highest tier any generator supports.
const TIER_CEILING: u8 = 3;

/// A tilt direction, bound to one answer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionTarget {
    Left,
    Right,
    Up,
    Down,
}

impl MotionTarget {
    /// Targets in option order.
    pub const ALL: [MotionTarget; 4] = [
        MotionTarget::Left,
        MotionTarget::Right,
        MotionTarget::Up,
        MotionTarget::Down,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MotionTarget::Left => "Left",
            MotionTarget::Right => "Right",
            MotionTarget::Up => "Up",
            MotionTarget::Down => "Down",
        }
    }

    /// Icon name the UI layer resolves.
    pub fn icon_key(self) -> &'static str {
        match self {
            MotionTarget::Left => "arrow.left.circle.fill",
            MotionTarget::Right => "arrow.right.circle.fill",
            MotionTarget::Up => "arrow.up.circle.fill",
            MotionTarget::Down => "arrow.down.circle.fill",
        }
    }

    /// The answer option this direction selects.
    pub fn option_index(self) -> usize {
        match self {
            MotionTarget::Left => 0,
            MotionTarget::Right => 1,
            MotionTarget::Up => 2,
            MotionTarget::Down => 3,
        }
    }

    pub fn from_option_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Classify a tilt reading. Returns `None` while the device is held
    /// within `threshold` radians of level on both axes.
    ///
    /// Negative roll is left, negative pitch is up; the dominant axis wins.
    pub fn from_tilt(reading: TiltReading, threshold: f64) -> Option<Self> {
        let (pitch, roll) = (reading.pitch, reading.roll);
        if pitch.abs() < threshold && roll.abs() < threshold {
            return None;
        }
        let target = if roll.abs() >= pitch.abs() {
            if roll < 0.0 {
                MotionTarget::Left
            } else {
                MotionTarget::Right
            }
        } else if pitch < 0.0 {
            MotionTarget::Up
        } else {
            MotionTarget::Down
        };
        Some(target)
    }
}

impl fmt::Display for MotionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Device attitude in radians, as delivered by the sensor layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TiltReading {
    pub pitch: f64,
    pub roll: f64,
}

/// What happened when the learner picked a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// Options are not selectable yet.
    NotReady,
    Correct {
        points: u32,
        /// The difficulty went up after this answer.
        tier_raised: bool,
    },
    Incorrect {
        /// Index of the option that was right.
        correct_answer: usize,
    },
}

/// Serializable snapshot of a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSummary {
    pub difficulty: Difficulty,
    pub solved: u32,
    pub attempted: u32,
    pub score: u32,
    pub best_streak: u32,
}

/// Game state for one run of the motion math challenge.
pub struct MotionChallenge<R = ChaCha8Rng> {
    generator: MathProblemGenerator<R>,
    config: GameConfig,
    difficulty: Difficulty,
    current: MathProblem,
    armed: bool,
    solved: u32,
    attempted: u32,
    score: u32,
    streak: u32,
    best_streak: u32,
}

impl<R: Rng> MotionChallenge<R> {
    /// Start a challenge at beginner difficulty with a fresh problem.
    pub fn new(mut generator: MathProblemGenerator<R>, config: GameConfig) -> Self {
        let difficulty = Difficulty::Beginner;
        let current = generator.generate(difficulty);
        Self {
            generator,
            config,
            difficulty,
            current,
            armed: false,
            solved: 0,
            attempted: 0,
            score: 0,
            streak: 0,
            best_streak: 0,
        }
    }

    pub fn current(&self) -> &MathProblem {
        &self.current
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn solved(&self) -> u32 {
        self.solved
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Allow selections for the current problem. Called once the problem
    /// has been presented (read aloud, animated in).
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Answer the current problem with the option bound to `target`.
    pub fn select(&mut self, target: MotionTarget) -> SelectionOutcome {
        if !self.armed {
            return SelectionOutcome::NotReady;
        }
        self.attempted += 1;

        let outcome = if self.current.is_correct(target.option_index()) {
            let points = self.current.points;
            self.solved += 1;
            self.score += points;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
            let tier_raised = self.maybe_escalate();
            SelectionOutcome::Correct {
                points,
                tier_raised,
            }
        } else {
            self.streak = 0;
            SelectionOutcome::Incorrect {
                correct_answer: self.current.correct_answer,
            }
        };

        tracing::debug!(
            direction = %target,
            ?outcome,
            solved = self.solved,
            difficulty = %self.difficulty,
            "motion selection"
        );
        self.advance();
        outcome
    }

    /// Classify a tilt reading and select with it. `None` while the device
    /// is near level.
    pub fn select_tilt(&mut self, reading: TiltReading) -> Option<SelectionOutcome> {
        MotionTarget::from_tilt(reading, self.config.tilt_threshold).map(|t| self.select(t))
    }

    /// Abandon the current problem. Breaks the streak.
    pub fn skip(&mut self) {
        self.streak = 0;
        self.advance();
    }

    pub fn summary(&self) -> ChallengeSummary {
        ChallengeSummary {
            difficulty: self.difficulty,
            solved: self.solved,
            attempted: self.attempted,
            score: self.score,
            best_streak: self.best_streak,
        }
    }

    fn maybe_escalate(&mut self) -> bool {
        let cap = self.config.max_tier.clamp(1, TIER_CEILING);
        let every = self.config.escalate_every.max(1);
        if self.solved % every == 0 && self.difficulty.tier() < cap {
            self.difficulty = self.difficulty.harder();
            tracing::info!(difficulty = %self.difficulty, "difficulty raised");
            return true;
        }
        false
    }

    fn advance(&mut self) {
        self.current = self.generator.generate(self.difficulty);
        self.armed = false;
    }
}
