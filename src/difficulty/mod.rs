//! Difficulty tiers for benchmark tasks.
//!
//! Tiers group tasks for filtering and for the optional tier-weighted suite
//! score. They also supply fallback step budgets for tasks that do not
//! declare one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The difficulty tier of a benchmark task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
        }
    }

    /// Step budget used when a task does not declare its own.
    pub fn default_step_budget(&self) -> u32 {
        match self {
            DifficultyTier::Easy => 100,
            DifficultyTier::Medium => 300,
            DifficultyTier::Hard => 600,
        }
    }

    /// Weight of this tier under the default tier-weighted suite score.
    pub fn default_weight(&self) -> f64 {
        match self {
            DifficultyTier::Easy => 1.0,
            DifficultyTier::Medium => 2.0,
            DifficultyTier::Hard => 3.0,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyTier::Easy),
            "medium" => Ok(DifficultyTier::Medium),
            "hard" => Ok(DifficultyTier::Hard),
            other => Err(format!(
                "Invalid difficulty tier '{}': must be 'easy', 'medium', or 'hard'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse_and_display() {
        for tier in [DifficultyTier::Easy, DifficultyTier::Medium, DifficultyTier::Hard] {
            let parsed: DifficultyTier = tier.to_string().parse().expect("parse should succeed");
            assert_eq!(parsed, tier);
        }
        assert_eq!("HARD".parse::<DifficultyTier>(), Ok(DifficultyTier::Hard));
        assert!("extreme".parse::<DifficultyTier>().is_err());
    }

    #[test]
    fn test_tier_ordering_and_budgets() {
        assert!(DifficultyTier::Easy < DifficultyTier::Hard);
        assert!(DifficultyTier::Easy.default_step_budget() < DifficultyTier::Hard.default_step_budget());
        assert!(DifficultyTier::Hard.default_weight() > DifficultyTier::Medium.default_weight());
    }

    #[test]
    fn test_tier_serde() {
        let json = serde_json::to_string(&DifficultyTier::Medium).expect("serialize should succeed");
        assert_eq!(json, "\"medium\"");
    }
}
