//! Learner XP and quest completion.
//!
//! A [`ProgressLedger`] is constructed by the host and passed to whatever
//! awards XP; there is no process-wide instance. It serializes with serde so
//! the host can persist it in whatever store it uses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ProgressConfig;
use crate::session::SessionOutcome;

/// XP granted by one award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    pub xp: u32,
    pub total_xp: u32,
    pub level: u32,
    /// The award pushed the learner into a new level.
    pub leveled_up: bool,
    /// First completion of this quest.
    pub first_completion: bool,
}

/// Accumulated XP and completed quests for one learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressLedger {
    total_xp: u32,
    #[serde(deserialize_with = "at_least_one")]
    xp_per_level: u32,
    /// Quest id -> first completion time.
    completed: BTreeMap<String, DateTime<Utc>>,
}

impl ProgressLedger {
    pub fn new(config: &ProgressConfig) -> Self {
        Self {
            total_xp: 0,
            xp_per_level: config.xp_per_level.max(1),
            completed: BTreeMap::new(),
        }
    }

    pub fn total_xp(&self) -> u32 {
        self.total_xp
    }

    /// Current level, starting at 1.
    pub fn level(&self) -> u32 {
        1 + self.total_xp / self.xp_per_level
    }

    /// XP still needed to reach the next level.
    pub fn xp_to_next_level(&self) -> u32 {
        self.xp_per_level - self.total_xp % self.xp_per_level
    }

    pub fn is_completed(&self, quest_id: &str) -> bool {
        self.completed.contains_key(quest_id)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn completed_at(&self, quest_id: &str) -> Option<DateTime<Utc>> {
        self.completed.get(quest_id).copied()
    }

    /// Grant XP for a finished session.
    ///
    /// The award is `base_xp` scaled by `score / 100` and rounded; scores
    /// above 100 (fast ungraded sessions) earn a bonus. Repeat completions
    /// still earn XP but keep the original completion time.
    pub fn award(&mut self, quest_id: &str, outcome: &SessionOutcome, base_xp: u32) -> XpAward {
        let xp = xp_for(outcome.score, base_xp);
        let level_before = self.level();
        self.total_xp = self.total_xp.saturating_add(xp);

        let first_completion = !self.completed.contains_key(quest_id);
        if first_completion {
            self.completed.insert(quest_id.to_string(), Utc::now());
        }

        let level = self.level();
        if level > level_before {
            tracing::info!(level, total_xp = self.total_xp, "level up");
        }

        XpAward {
            xp,
            total_xp: self.total_xp,
            level,
            leveled_up: level > level_before,
            first_completion,
        }
    }
}

impl Default for ProgressLedger {
    fn default() -> Self {
        Self::new(&ProgressConfig::default())
    }
}

/// Clamp a stored level step to at least 1.
fn at_least_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(u32::deserialize(deserializer)?.max(1))
}

/// XP for a score on the 0..=100 scale (higher for bonus scores).
pub fn xp_for(score: f64, base_xp: u32) -> u32 {
    if !score.is_finite() || score <= 0.0 {
        return 0;
    }
    (f64::from(base_xp) * score / 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn outcome(score: f64) -> SessionOutcome {
        SessionOutcome {
            score,
            elapsed: Duration::from_secs(30),
        }
    }

    #[test]
    fn xp_scales_with_score() {
        assert_eq!(xp_for(100.0, 50), 50);
        assert_eq!(xp_for(75.0, 50), 38);
        assert_eq!(xp_for(0.0, 50), 0);
        assert_eq!(xp_for(-5.0, 50), 0);
        assert_eq!(xp_for(120.0, 50), 60);
        assert_eq!(xp_for(f64::NAN, 50), 0);
    }

    #[test]
    fn award_accumulates_and_marks_completion() {
        let mut ledger = ProgressLedger::default();
        let award = ledger.award("variables", &outcome(100.0), 50);
        assert_eq!(award.xp, 50);
        assert_eq!(award.total_xp, 50);
        assert!(award.first_completion);
        assert!(ledger.is_completed("variables"));
        assert!(ledger.completed_at("variables").is_some());

        let again = ledger.award("variables", &outcome(50.0), 50);
        assert_eq!(again.xp, 25);
        assert!(!again.first_completion);
        assert_eq!(ledger.total_xp(), 75);
        assert_eq!(ledger.completed_count(), 1);
    }

    #[test]
    fn level_up_is_reported() {
        let mut ledger = ProgressLedger::new(&ProgressConfig { xp_per_level: 100 });
        assert_eq!(ledger.level(), 1);
        assert_eq!(ledger.xp_to_next_level(), 100);

        let first = ledger.award("a", &outcome(90.0), 100);
        assert!(!first.leveled_up);
        assert_eq!(ledger.xp_to_next_level(), 10);

        let second = ledger.award("b", &outcome(20.0), 100);
        assert!(second.leveled_up);
        assert_eq!(second.level, 2);
    }

    #[test]
    fn ledger_serializes() {
        let mut ledger = ProgressLedger::default();
        ledger.award("loops", &outcome(80.0), 50);
        let json = serde_json::to_string(&ledger).unwrap();
        let restored: ProgressLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.total_xp(), 40);
        assert!(restored.is_completed("loops"));
    }

    #[test]
    fn restored_zero_level_step_is_clamped() {
        let restored: ProgressLedger =
            serde_json::from_str(r#"{"total_xp":10,"xp_per_level":0,"completed":{}}"#).unwrap();
        assert_eq!(restored.level(), 11);
        assert_eq!(restored.xp_to_next_level(), 1);

        let json = serde_json::to_string(&restored).unwrap();
        assert!(json.contains(r#""xp_per_level":1"#));
    }
}
