//! Configuration loading.
//!
//! Every field has a default, so an empty or missing `knowi.toml` yields the
//! stock behaviour. Values are validated after parsing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::text::DEFAULT_DOMAIN_VOCABULARY;

/// Answer scoring thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Match ratio at or above which an answer is correct.
    pub correct_threshold: f64,
    /// Match ratio at or above which an answer earns partial feedback.
    pub partial_threshold: f64,
    /// Sentiment below which the learner is treated as confused.
    pub confusion_threshold: f64,
    /// Answers shorter than this many characters are rejected.
    pub min_answer_chars: usize,
    /// Domain terms scanned by substring containment.
    pub domain_vocabulary: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            correct_threshold: 0.7,
            partial_threshold: 0.4,
            confusion_threshold: -0.3,
            min_answer_chars: 5,
            domain_vocabulary: DEFAULT_DOMAIN_VOCABULARY
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Session score conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Points subtracted per hint.
    pub hint_penalty: f64,
    /// Upper bound on the total hint penalty.
    pub max_hint_penalty: f64,
    /// Score for ungraded sessions without quest metadata.
    pub fallback_score: f64,
    /// Upper bound on the expected/elapsed time ratio.
    pub max_efficiency: f64,
    /// Multiplier applied to the efficiency ratio.
    pub efficiency_multiplier: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hint_penalty: 5.0,
            max_hint_penalty: 25.0,
            fallback_score: 70.0,
            max_efficiency: 1.5,
            efficiency_multiplier: 80.0,
        }
    }
}

/// Motion math game tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Solved problems between difficulty increases.
    pub escalate_every: u32,
    /// Highest tier the game escalates to.
    pub max_tier: u8,
    /// Tilt (radians) a reading must exceed to count as a gesture.
    pub tilt_threshold: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            escalate_every: 5,
            max_tier: 3,
            tilt_threshold: 0.35,
        }
    }
}

/// XP and levelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub xp_per_level: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { xp_per_level: 500 }
    }
}

/// Top-level knowi configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowiConfig {
    pub scoring: ScoringConfig,
    pub session: SessionConfig,
    pub game: GameConfig,
    pub progress: ProgressConfig,
}

impl KnowiConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        for (name, value) in [
            ("correct_threshold", s.correct_threshold),
            ("partial_threshold", s.partial_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { name, value });
            }
        }
        if s.partial_threshold > s.correct_threshold {
            return Err(ConfigError::InvertedThresholds {
                partial: s.partial_threshold,
                correct: s.correct_threshold,
            });
        }
        if !(-1.0..=1.0).contains(&s.confusion_threshold) {
            return Err(ConfigError::SentimentOutOfRange(s.confusion_threshold));
        }
        let session = &self.session;
        for (name, value) in [
            ("hint_penalty", session.hint_penalty),
            ("max_hint_penalty", session.max_hint_penalty),
            ("fallback_score", session.fallback_score),
            ("max_efficiency", session.max_efficiency),
            ("efficiency_multiplier", session.efficiency_multiplier),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if self.game.escalate_every == 0 {
            return Err(ConfigError::NotPositive("escalate_every"));
        }
        if self.game.max_tier == 0 {
            return Err(ConfigError::NotPositive("max_tier"));
        }
        if self.progress.xp_per_level == 0 {
            return Err(ConfigError::NotPositive("xp_per_level"));
        }
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `$KNOWI_CONFIG`
/// 2. `knowi.toml` in the current directory
/// 3. `~/.config/knowi/config.toml`
pub fn load_config() -> Result<KnowiConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<KnowiConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else if let Some(env_path) = std::env::var_os("KNOWI_CONFIG").map(PathBuf::from) {
        if env_path.exists() {
            Some(env_path)
        } else {
            anyhow::bail!("KNOWI_CONFIG points to a missing file: {}", env_path.display());
        }
    } else {
        let local = PathBuf::from("knowi.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("invalid config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => KnowiConfig::default(),
    };

    Ok(config)
}

/// Parse and validate a TOML config string.
pub fn parse_config_str(content: &str) -> Result<KnowiConfig> {
    let config: KnowiConfig = toml::from_str(content).context("failed to parse TOML")?;
    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("knowi"))
}
