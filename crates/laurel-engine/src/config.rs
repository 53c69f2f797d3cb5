//! Engine Configuration - Reward amounts and rule parameters
//!
//! Loaded from RON. Every field has a default, so an empty `()` file is a
//! valid configuration.

use crate::error::{Error, Result};
use laurel_core::{GameRng, NightWindow, RuleEvaluator, SharedRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the evaluation engine
///
/// # Example
///
/// ```
/// use laurel_engine::EngineConfig;
///
/// let config = EngineConfig::from_ron_str("(secret_currency_bonus: 75)").unwrap();
/// assert_eq!(config.secret_currency_bonus, 75);
/// assert_eq!(config.streak_probability, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Currency added when a secret achievement unlocks
    pub secret_currency_bonus: u64,
    /// Probability that a `streak` roll succeeds
    pub streak_probability: f64,
    /// Probability that a `random_chance` roll succeeds
    pub random_chance_probability: f64,
    /// Local hours that produce a night-play fact
    pub night_window: NightWindow,
    /// Seed for probabilistic conditions; clock-seeded when absent
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            secret_currency_bonus: 50,
            streak_probability: 0.5,
            random_chance_probability: 0.3,
            night_window: NightWindow::default(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a RON configuration
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("streak_probability", self.streak_probability),
            ("random_chance_probability", self.random_chance_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::Config(format!("{name} must be within [0, 1], got {p}")));
            }
        }
        let NightWindow {
            start_hour,
            end_hour,
        } = self.night_window;
        if start_hour > 23 || end_hour > 24 {
            return Err(Error::Config(format!(
                "night_window hours out of range: {start_hour}..{end_hour}"
            )));
        }
        Ok(())
    }

    /// Build the default rule evaluator for this configuration
    pub fn rule_evaluator(&self) -> RuleEvaluator<SharedRng> {
        let rng = match self.rng_seed {
            Some(seed) => SharedRng::new(GameRng::new(seed)),
            None => SharedRng::from_entropy(),
        };
        RuleEvaluator::with_chance(rng)
            .with_probabilities(self.streak_probability, self.random_chance_probability)
    }
}
