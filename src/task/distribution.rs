//! Parameter distributions and sampled parameter values.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// A sampled parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
        }
    }
}

/// Declared distribution of one task parameter.
///
/// Serialized with a `type` tag, e.g. `{type: uniform, low: 0.1, high: 1.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    Uniform {
        low: f64,
        high: f64,
    },
    UniformInt {
        low: i64,
        high: i64,
    },
    /// Normal draw clamped into `[low, high]`.
    Normal {
        mean: f64,
        std_dev: f64,
        low: f64,
        high: f64,
    },
    Categorical {
        choices: Vec<String>,
        /// Empty means uniform over `choices`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        weights: Vec<f64>,
    },
    Fixed {
        value: ParamValue,
    },
}

impl Distribution {
    pub fn uniform(low: f64, high: f64) -> Self {
        Distribution::Uniform { low, high }
    }

    pub fn uniform_int(low: i64, high: i64) -> Self {
        Distribution::UniformInt { low, high }
    }

    pub fn fixed(value: f64) -> Self {
        Distribution::Fixed {
            value: ParamValue::Float(value),
        }
    }

    /// Checks the distribution's own parameters.
    pub fn validate(&self, name: &str) -> Result<(), GeneratorError> {
        let bad = |reason: String| GeneratorError::InvalidDistribution {
            name: name.to_string(),
            reason,
        };
        match self {
            Distribution::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(bad(format!("uniform range [{}, {}] is empty or non-finite", low, high)));
                }
            }
            Distribution::UniformInt { low, high } => {
                if low > high {
                    return Err(bad(format!("integer range [{}, {}] is empty", low, high)));
                }
            }
            Distribution::Normal {
                mean,
                std_dev,
                low,
                high,
            } => {
                if !mean.is_finite() || !std_dev.is_finite() || *std_dev < 0.0 {
                    return Err(bad(format!("normal({}, {}) is not a valid distribution", mean, std_dev)));
                }
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(bad(format!("truncation range [{}, {}] is empty or non-finite", low, high)));
                }
            }
            Distribution::Categorical { choices, weights } => {
                if choices.is_empty() {
                    return Err(bad("categorical choices are empty".to_string()));
                }
                if !weights.is_empty() {
                    if weights.len() != choices.len() {
                        return Err(bad(format!(
                            "{} weights for {} choices",
                            weights.len(),
                            choices.len()
                        )));
                    }
                    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(bad("weights must be finite and non-negative".to_string()));
                    }
                    if weights.iter().sum::<f64>() <= 0.0 {
                        return Err(bad("weights sum to zero".to_string()));
                    }
                }
            }
            Distribution::Fixed { value } => {
                if let ParamValue::Float(v) = value {
                    if !v.is_finite() {
                        return Err(bad(format!("fixed value {} is not finite", v)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Draws one value from a fresh generator seeded with `seed`.
    pub fn sample(&self, seed: u64) -> Result<ParamValue, GeneratorError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.draw(&mut rng)
    }

    /// Draws one value from `rng`. Callers validate first.
    pub(crate) fn draw(&self, rng: &mut ChaCha8Rng) -> Result<ParamValue, GeneratorError> {
        let value = match self {
            Distribution::Uniform { low, high } => ParamValue::Float(rng.random_range(*low..=*high)),
            Distribution::UniformInt { low, high } => ParamValue::Int(rng.random_range(*low..=*high)),
            Distribution::Normal {
                mean,
                std_dev,
                low,
                high,
            } => {
                let normal = rand_distr::Normal::new(*mean, *std_dev)
                    .map_err(|e| GeneratorError::invalid("normal", e.to_string()))?;
                let sampled: f64 = rng.sample(normal);
                ParamValue::Float(sampled.clamp(*low, *high))
            }
            Distribution::Categorical { choices, weights } => {
                let idx = if weights.is_empty() {
                    rng.random_range(0..choices.len())
                } else {
                    weighted_index(rng, weights)
                };
                ParamValue::Text(choices[idx].clone())
            }
            Distribution::Fixed { value } => value.clone(),
        };
        Ok(value)
    }

    /// Whether `value` lies in the distribution's support.
    pub fn contains(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Distribution::Uniform { low, high }, ParamValue::Float(v)) => *low <= *v && *v <= *high,
            (Distribution::UniformInt { low, high }, ParamValue::Int(v)) => *low <= *v && *v <= *high,
            (Distribution::Normal { low, high, .. }, ParamValue::Float(v)) => *low <= *v && *v <= *high,
            (Distribution::Categorical { choices, .. }, ParamValue::Text(v)) => choices.contains(v),
            (Distribution::Fixed { value: fixed }, v) => fixed == v,
            _ => false,
        }
    }
}

fn weighted_index(rng: &mut ChaCha8Rng, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    let mut remaining = rng.random::<f64>() * total;
    for (idx, weight) in weights.iter().enumerate() {
        if remaining < *weight {
            return idx;
        }
        remaining -= weight;
    }
    // Rounding can leave a sliver past the last bucket.
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}

/// Sampled parameters for one instance, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterAssignment {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    /// Numeric accessor; integers widen to `f64`.
    pub fn get_f64(&self, name: &str) -> Result<f64, GeneratorError> {
        let value = self.require(name)?;
        value.as_f64().ok_or_else(|| mismatch(name, "number", value))
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, GeneratorError> {
        let value = self.require(name)?;
        value.as_i64().ok_or_else(|| mismatch(name, "int", value))
    }

    pub fn get_str(&self, name: &str) -> Result<&str, GeneratorError> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| mismatch(name, "text", value))
    }

    fn require(&self, name: &str) -> Result<&ParamValue, GeneratorError> {
        self.values
            .get(name)
            .ok_or_else(|| GeneratorError::MissingParameter(name.to_string()))
    }
}

fn mismatch(name: &str, expected: &str, found: &ParamValue) -> GeneratorError {
    GeneratorError::TypeMismatch {
        name: name.to_string(),
        expected: format!("{} (found {})", expected, found.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_deterministic() {
        let dist = Distribution::uniform(0.1, 1.0);
        assert_eq!(dist.sample(42).expect("sample"), dist.sample(42).expect("sample"));
        assert!(dist.contains(&dist.sample(42).expect("sample")));
    }

    #[test]
    fn test_uniform_int_bounds() {
        let dist = Distribution::uniform_int(3, 5);
        for seed in 0..50 {
            let v = dist.sample(seed).expect("sample");
            let n = v.as_i64().expect("int value");
            assert!((3..=5).contains(&n));
        }
    }

    #[test]
    fn test_normal_is_truncated() {
        let dist = Distribution::Normal {
            mean: 0.0,
            std_dev: 10.0,
            low: -1.0,
            high: 1.0,
        };
        dist.validate("x").expect("valid distribution");
        for seed in 0..50 {
            let v = dist.sample(seed).expect("sample");
            assert!(dist.contains(&v));
        }
    }

    #[test]
    fn test_categorical_weights() {
        let dist = Distribution::Categorical {
            choices: vec!["a".into(), "b".into()],
            weights: vec![0.0, 1.0],
        };
        for seed in 0..20 {
            assert_eq!(dist.sample(seed).expect("sample"), ParamValue::Text("b".into()));
        }
    }

    #[test]
    fn test_validate_rejects_bad_distributions() {
        assert!(Distribution::uniform(1.0, 0.0).validate("x").is_err());
        assert!(Distribution::uniform(0.0, f64::NAN).validate("x").is_err());
        assert!(Distribution::uniform_int(2, 1).validate("x").is_err());
        let cat = Distribution::Categorical {
            choices: vec!["a".into()],
            weights: vec![0.5, 0.5],
        };
        assert!(matches!(
            cat.validate("x"),
            Err(GeneratorError::InvalidDistribution { .. })
        ));
    }

    #[test]
    fn test_contains_checks_type() {
        let dist = Distribution::uniform(0.0, 1.0);
        assert!(!dist.contains(&ParamValue::Int(0)));
        assert!(!dist.contains(&ParamValue::Float(1.5)));
        assert!(Distribution::fixed(0.05).contains(&ParamValue::Float(0.05)));
    }

    #[test]
    fn test_assignment_accessors() {
        let params = ParameterAssignment::new()
            .with("distance", ParamValue::Float(0.5))
            .with("blocks", ParamValue::Int(3))
            .with("mode", ParamValue::Text("left".into()));
        assert_eq!(params.get_f64("distance").expect("float"), 0.5);
        assert_eq!(params.get_f64("blocks").expect("widened"), 3.0);
        assert_eq!(params.get_i64("blocks").expect("int"), 3);
        assert_eq!(params.get_str("mode").expect("text"), "left");
        assert!(matches!(params.get_f64("missing"), Err(GeneratorError::MissingParameter(_))));
        assert!(matches!(params.get_i64("mode"), Err(GeneratorError::TypeMismatch { .. })));
    }

    #[test]
    fn test_distribution_yaml() {
        let dist: Distribution =
            serde_yaml::from_str("type: uniform\nlow: 0.1\nhigh: 1.0\n").expect("parse should succeed");
        assert_eq!(dist, Distribution::uniform(0.1, 1.0));
        let fixed: Distribution =
            serde_yaml::from_str("type: fixed\nvalue: 3\n").expect("parse should succeed");
        assert_eq!(fixed, Distribution::Fixed { value: ParamValue::Int(3) });
    }
}
