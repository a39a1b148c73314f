use bagdist_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for online learning from oracle claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearnConfig {
    /// Share of the update budget given to item weights; bags get the rest
    #[serde(default = "default_ratio")]
    pub ratio_item_bag: f64,

    /// Damping in (0, 1]: fraction of the way to the interval aimed for per step
    #[serde(default = "default_learn_speed")]
    pub speed: f64,

    /// Passes over the shuffled claims
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Seed for the claim shuffle; thread RNG when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LearnConfig {
    fn default() -> Self {
        Self {
            ratio_item_bag: default_ratio(),
            speed: default_learn_speed(),
            epochs: default_epochs(),
            seed: None,
        }
    }
}

impl LearnConfig {
    pub fn validate(&self) -> Result<()> {
        validate_ratio(self.ratio_item_bag)?;
        validate_speed(self.speed)
    }
}

/// Configuration for fitting forms to intervals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitConfig {
    #[serde(default = "default_fit_speed")]
    pub speed: f64,

    #[serde(default = "default_ratio")]
    pub ratio_item_bag: f64,

    /// Gradient steps per batch
    #[serde(default = "default_gradient_steps")]
    pub gradient_steps: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            speed: default_fit_speed(),
            ratio_item_bag: default_ratio(),
            gradient_steps: default_gradient_steps(),
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        validate_ratio(self.ratio_item_bag)?;
        validate_speed(self.speed)
    }
}

fn default_ratio() -> f64 {
    0.5
}

fn default_learn_speed() -> f64 {
    0.5
}

fn default_epochs() -> usize {
    5
}

fn default_fit_speed() -> f64 {
    0.3
}

fn default_gradient_steps() -> usize {
    6
}

fn validate_ratio(ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(Error::InvalidConfig(format!(
            "ratio_item_bag must lie in [0, 1], got {}",
            ratio
        )));
    }
    Ok(())
}

fn validate_speed(speed: f64) -> Result<()> {
    if !(speed > 0.0 && speed <= 1.0) {
        return Err(Error::InvalidConfig(format!(
            "speed must lie in (0, 1], got {}",
            speed
        )));
    }
    Ok(())
}
