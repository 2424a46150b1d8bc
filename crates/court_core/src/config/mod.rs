//! # Rules Configuration
//!
//! Every tunable number of the rotation lives here instead of being hard-coded
//! in the resolver or the clock.
//!
//! ## Presets
//! - `casual`: 7 minute games, 1 minute overtime, first to 15 wins instantly
//! - `three_on_three`: 10 minute games, first to 21 wins instantly
//! - `five_on_five`: 20 minute games, 5 minute overtime, no instant win
//!
//! ```rust
//! use court_core::config::RulesConfig;
//!
//! let rules = RulesConfig::default();
//! assert_eq!(rules.regulation_secs, 420);
//! ```

mod env;

pub use env::{rules_from_env, RULES_PATH_ENV};

use crate::error::{CourtError, Result};
use serde::{Deserialize, Serialize};

/// Consecutive wins a former champion needs to take the title back.
pub const DEFENSE_RECLAIM_STREAK: u32 = 2;

/// Injected rule parameters of a court session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Regulation game length in seconds (default: 420)
    #[serde(default = "default_regulation_secs")]
    pub regulation_secs: u32,

    /// Overtime length after a tie at the buzzer (default: 60)
    #[serde(default = "default_overtime_secs")]
    pub overtime_secs: u32,

    /// Score that ends a game immediately (default: 15).
    /// `None` disables the instant win, the clock alone decides.
    #[serde(default = "default_instant_win_score")]
    pub instant_win_score: Option<u32>,

    /// Distinct opponents a team must beat to be crowned (default: 2)
    #[serde(default = "default_champion_qualification")]
    pub champion_qualification: usize,
}

fn default_regulation_secs() -> u32 {
    420
}

fn default_overtime_secs() -> u32 {
    60
}

fn default_instant_win_score() -> Option<u32> {
    Some(15)
}

fn default_champion_qualification() -> usize {
    2
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            regulation_secs: default_regulation_secs(),
            overtime_secs: default_overtime_secs(),
            instant_win_score: default_instant_win_score(),
            champion_qualification: default_champion_qualification(),
        }
    }
}

impl RulesConfig {
    /// Evening pickup games (the default)
    pub fn casual() -> Self {
        Self::default()
    }

    /// Half court 3x3: 10 minutes, first to 21
    pub fn three_on_three() -> Self {
        Self { regulation_secs: 600, instant_win_score: Some(21), ..Self::default() }
    }

    /// Full court 5x5: 20 minutes, 5 minute overtime, clock only
    pub fn five_on_five() -> Self {
        Self {
            regulation_secs: 1200,
            overtime_secs: 300,
            instant_win_score: None,
            ..Self::default()
        }
    }

    /// Look a preset up by the mode name used in rules files and the CLI
    pub fn preset(mode: &str) -> Option<Self> {
        match mode {
            "casual" => Some(Self::casual()),
            "3x3" | "three_on_three" => Some(Self::three_on_three()),
            "5x5" | "five_on_five" => Some(Self::five_on_five()),
            _ => None,
        }
    }

    /// Parse and validate a JSON rules document
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: RulesConfig = serde_json::from_str(json)
            .map_err(|e| CourtError::InvalidConfig(format!("failed to parse rules: {e}")))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> Result<()> {
        if !(60..=3600).contains(&self.regulation_secs) {
            return Err(CourtError::InvalidConfig(format!(
                "regulation_secs must be 60-3600, got {}",
                self.regulation_secs
            )));
        }
        if !(10..=900).contains(&self.overtime_secs) {
            return Err(CourtError::InvalidConfig(format!(
                "overtime_secs must be 10-900, got {}",
                self.overtime_secs
            )));
        }
        if let Some(score) = self.instant_win_score {
            if !(1..=200).contains(&score) {
                return Err(CourtError::InvalidConfig(format!(
                    "instant_win_score must be 1-200, got {}",
                    score
                )));
            }
        }
        if self.champion_qualification == 0 {
            return Err(CourtError::InvalidConfig(
                "champion_qualification must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// True when `score` ends the game on the spot
    pub fn is_instant_win(&self, score: u32) -> bool {
        self.instant_win_score.is_some_and(|target| score >= target)
    }
}
