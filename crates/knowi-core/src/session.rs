//! Per-session interaction tracking and score conversion.
//!
//! A session is one timed attempt at a quest. The host starts it, records
//! interactions as the learner works, and ends it to receive a normalised
//! score plus the elapsed time. Accumulators are keyed by session id and
//! guarded by a mutex, so a tracker can be shared across callers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;

// ---------------------------------------------------------------------------
// Time and quest metadata sources
// ---------------------------------------------------------------------------

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lookup of how long a quest is expected to take.
pub trait QuestMetadata: Send + Sync {
    fn expected_duration(&self, session_id: &str) -> Option<Duration>;
}

/// No quest metadata at all; ungraded sessions use the fallback score.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMetadata;

impl QuestMetadata for NoMetadata {
    fn expected_duration(&self, _: &str) -> Option<Duration> {
        None
    }
}

impl QuestMetadata for HashMap<String, Duration> {
    fn expected_duration(&self, session_id: &str) -> Option<Duration> {
        self.get(session_id).copied()
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// Named counters kept for every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    Interaction,
    Correct,
    Incorrect,
    Hint,
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterKind::Interaction => write!(f, "interaction"),
            CounterKind::Correct => write!(f, "correct"),
            CounterKind::Incorrect => write!(f, "incorrect"),
            CounterKind::Hint => write!(f, "hint"),
        }
    }
}

/// Something the learner did during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    /// Increment a known counter.
    Count { kind: CounterKind, amount: u32 },
    /// Ad hoc signal stored verbatim, latest value wins.
    Custom { key: String, value: String },
}

impl Interaction {
    pub fn interaction() -> Self {
        Self::count(CounterKind::Interaction)
    }

    pub fn correct() -> Self {
        Self::count(CounterKind::Correct)
    }

    pub fn incorrect() -> Self {
        Self::count(CounterKind::Incorrect)
    }

    pub fn hint() -> Self {
        Self::count(CounterKind::Hint)
    }

    fn count(kind: CounterKind) -> Self {
        Interaction::Count { kind, amount: 1 }
    }

    /// Build an interaction from a kind name and a value.
    ///
    /// Known counter names increment by `value` parsed as a count (1 when it
    /// does not parse). Any other name is kept as a custom signal.
    pub fn from_parts(kind: &str, value: &str) -> Self {
        let counter = match kind.trim().to_lowercase().as_str() {
            "interaction" => Some(CounterKind::Interaction),
            "correct" => Some(CounterKind::Correct),
            "incorrect" => Some(CounterKind::Incorrect),
            "hint" => Some(CounterKind::Hint),
            _ => None,
        };
        match counter {
            Some(kind) => Interaction::Count {
                kind,
                amount: value.trim().parse().unwrap_or(1),
            },
            None => Interaction::Custom {
                key: kind.to_string(),
                value: value.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Records and outcomes
// ---------------------------------------------------------------------------

/// Accumulated counters for one active session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// All interactions, graded answers included.
    pub interactions: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub hints: u32,
    pub started_at: Instant,
    /// Custom signals keyed by name.
    pub custom: BTreeMap<String, String>,
}

impl SessionRecord {
    fn new(started_at: Instant) -> Self {
        Self {
            interactions: 0,
            correct: 0,
            incorrect: 0,
            hints: 0,
            started_at,
            custom: BTreeMap::new(),
        }
    }

    /// Answers that were marked right or wrong.
    pub fn graded(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    fn apply(&mut self, interaction: Interaction) {
        match interaction {
            Interaction::Count { kind, amount } => match kind {
                CounterKind::Interaction => {
                    self.interactions = self.interactions.saturating_add(amount)
                }
                CounterKind::Correct => {
                    self.correct = self.correct.saturating_add(amount);
                    self.interactions = self.interactions.saturating_add(amount);
                }
                CounterKind::Incorrect => {
                    self.incorrect = self.incorrect.saturating_add(amount);
                    self.interactions = self.interactions.saturating_add(amount);
                }
                CounterKind::Hint => self.hints = self.hints.saturating_add(amount),
            },
            Interaction::Custom { key, value } => {
                self.custom.insert(key, value);
            }
        }
    }
}

/// Final score and duration of an ended session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub score: f64,
    pub elapsed: Duration,
}

impl SessionOutcome {
    /// Outcome reported for a session that was never started.
    pub const NONE: SessionOutcome = SessionOutcome {
        score: 0.0,
        elapsed: Duration::ZERO,
    };

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Convert a finished record into a score.
///
/// Graded sessions score on accuracy minus a capped hint penalty. Sessions
/// with no graded answers score on speed relative to the expected duration,
/// or get the fallback score when no expectation is known.
pub fn compute_score(
    record: &SessionRecord,
    elapsed: Duration,
    expected: Option<Duration>,
    config: &SessionConfig,
) -> f64 {
    // Summed in f64 so saturated counters keep their ratio.
    let graded = f64::from(record.correct) + f64::from(record.incorrect);
    if graded > 0.0 {
        let accuracy = 100.0 * f64::from(record.correct) / graded;
        let penalty = (record.hints as f64 * config.hint_penalty).min(config.max_hint_penalty);
        return (accuracy - penalty).max(0.0);
    }

    match expected {
        Some(expected) => {
            let elapsed_secs = elapsed.as_secs_f64().max(1.0);
            let efficiency = (expected.as_secs_f64() / elapsed_secs).min(config.max_efficiency);
            efficiency * config.efficiency_multiplier
        }
        None => config.fallback_score,
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Tracks active sessions and converts them into scores when they end.
pub struct SessionScoreTracker {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    clock: Arc<dyn Clock>,
    metadata: Arc<dyn QuestMetadata>,
    config: SessionConfig,
}

impl SessionScoreTracker {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock: Arc::new(SystemClock),
            metadata: Arc::new(NoMetadata),
            config,
        }
    }

    /// Use `clock` for session timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use `metadata` for expected quest durations.
    pub fn with_metadata(mut self, metadata: Arc<dyn QuestMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start (or restart) the session `id` with zeroed counters.
    pub fn start_session(&self, id: &str) {
        let record = SessionRecord::new(self.clock.now());
        if self.sessions().insert(id.to_string(), record).is_some() {
            tracing::debug!(session = id, "restarted active session");
        }
    }

    /// Record an interaction. Unknown sessions are ignored.
    pub fn record_interaction(&self, id: &str, interaction: Interaction) {
        match self.sessions().get_mut(id) {
            Some(record) => record.apply(interaction),
            None => tracing::debug!(session = id, "ignoring interaction for inactive session"),
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.sessions().contains_key(id)
    }

    /// A copy of the current counters for `id`.
    pub fn snapshot(&self, id: &str) -> Option<SessionRecord> {
        self.sessions().get(id).cloned()
    }

    pub fn active_count(&self) -> usize {
        self.sessions().len()
    }

    /// End the session `id` and return its score and elapsed time.
    ///
    /// The accumulator is removed, so ending twice (or ending a session
    /// that never started) yields [`SessionOutcome::NONE`].
    pub fn end_session(&self, id: &str) -> SessionOutcome {
        let Some(record) = self.sessions().remove(id) else {
            return SessionOutcome::NONE;
        };

        let elapsed = self.clock.now().saturating_duration_since(record.started_at);
        let expected = self.metadata.expected_duration(id);
        let score = compute_score(&record, elapsed, expected, &self.config);

        tracing::info!(
            session = id,
            score,
            elapsed_secs = elapsed.as_secs_f64(),
            correct = record.correct,
            incorrect = record.incorrect,
            hints = record.hints,
            "session complete"
        );

        SessionOutcome { score, elapsed }
    }
}

impl Default for SessionScoreTracker {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
