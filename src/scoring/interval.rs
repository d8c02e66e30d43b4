//! Wilson score confidence intervals for success rates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Two-sided confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "90")]
    P90,
    #[default]
    #[serde(rename = "95")]
    P95,
    #[serde(rename = "99")]
    P99,
}

impl ConfidenceLevel {
    /// Standard normal quantile for the level.
    pub fn z(&self) -> f64 {
        match self {
            ConfidenceLevel::P90 => 1.644_853_626_951_472_2,
            ConfidenceLevel::P95 => 1.959_963_984_540_054,
            ConfidenceLevel::P99 => 2.575_829_303_548_900_4,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            ConfidenceLevel::P90 => 0.90,
            ConfidenceLevel::P95 => 0.95,
            ConfidenceLevel::P99 => 0.99,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.as_f64() * 100.0).round() as u32)
    }
}

impl FromStr for ConfidenceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('%') {
            "90" | "0.9" | "0.90" => Ok(ConfidenceLevel::P90),
            "95" | "0.95" => Ok(ConfidenceLevel::P95),
            "99" | "0.99" => Ok(ConfidenceLevel::P99),
            other => Err(format!("unsupported confidence level '{}'", other)),
        }
    }
}

/// Closed interval `[lower, upper]` within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: ConfidenceLevel,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Wilson score interval for `successes` out of `trials`.
///
/// Zero trials give the full `[0, 1]` interval. All-failure and all-success
/// samples still give an interval of positive width.
pub fn wilson_interval(successes: usize, trials: usize, level: ConfidenceLevel) -> ConfidenceInterval {
    if trials == 0 {
        return ConfidenceInterval {
            lower: 0.0,
            upper: 1.0,
            level,
        };
    }

    let n = trials as f64;
    let p = successes.min(trials) as f64 / n;
    let z = level.z();
    let z2 = z * z;

    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;

    ConfidenceInterval {
        lower: (center - half).clamp(0.0, 1.0),
        upper: (center + half).clamp(0.0, 1.0),
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_trials_full_interval() {
        let ci = wilson_interval(0, 0, ConfidenceLevel::P95);
        assert_eq!((ci.lower, ci.upper), (0.0, 1.0));
    }

    #[test]
    fn test_extremes_non_degenerate() {
        let none = wilson_interval(0, 3, ConfidenceLevel::P95);
        assert!(none.lower.abs() < 1e-12);
        assert!(none.upper > 0.0 && none.upper < 1.0);

        let all = wilson_interval(3, 3, ConfidenceLevel::P95);
        assert!((all.upper - 1.0).abs() < 1e-12);
        assert!(all.lower > 0.0 && all.lower < 1.0);
        assert!(all.width() > 0.0);
    }

    #[test]
    fn test_known_value() {
        // 5/10 at 95%: 0.2366 .. 0.7634
        let ci = wilson_interval(5, 10, ConfidenceLevel::P95);
        assert!((ci.lower - 0.2366).abs() < 1e-3);
        assert!((ci.upper - 0.7634).abs() < 1e-3);
        assert!(ci.contains(0.5));
    }

    #[test]
    fn test_higher_level_is_wider() {
        let p90 = wilson_interval(4, 10, ConfidenceLevel::P90);
        let p99 = wilson_interval(4, 10, ConfidenceLevel::P99);
        assert!(p99.width() > p90.width());
    }

    #[test]
    fn test_level_parse_and_serde() {
        assert_eq!("99%".parse::<ConfidenceLevel>(), Ok(ConfidenceLevel::P99));
        assert!("80".parse::<ConfidenceLevel>().is_err());
        let json = serde_json::to_string(&ConfidenceLevel::P90).expect("serialize should succeed");
        assert_eq!(json, "\"90\"");
        assert_eq!(ConfidenceLevel::P95.to_string(), "95%");
    }
}
