use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Dry-food fractions each restart begins from.
    pub starting_ratios: Vec<f64>,
    pub initial_step: f64,
    pub min_step: f64,
    pub max_step: f64,
    pub step_growth: f64,
    pub step_shrink: f64,
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    /// Iterations without an improvement of at least `min_improvement` before a restart ends.
    pub max_no_improvement: usize,
    pub min_improvement: f64,
    /// Share of the time limit the search may use.
    pub deadline_fraction: f64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_ratios: vec![0.1, 0.3, 0.5, 0.7, 0.9],
            initial_step: 0.2,
            min_step: 0.05,
            max_step: 0.3,
            step_growth: 1.1,
            step_shrink: 0.9,
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            max_no_improvement: 20,
            min_improvement: 0.01,
            deadline_fraction: 0.95,
            seed: None,
        }
    }
}

impl Config {
    /// Overlays the given hyperparameters on the defaults. Unknown keys are ignored and a
    /// malformed value falls back to the defaults as a whole.
    pub fn initialize(hyperparameters: &Option<Map<String, Value>>) -> Self {
        let defaults = Self::default();
        let Some(map) = hyperparameters else {
            return defaults;
        };

        let mut merged = match serde_json::to_value(&defaults) {
            Ok(value) => value,
            Err(_) => return defaults,
        };
        if let Value::Object(ref mut obj) = merged {
            for (k, v) in map {
                if obj.contains_key(k) {
                    obj.insert(k.clone(), v.clone());
                } else {
                    warn!(key = k.as_str(), "ignoring unknown hyperparameter");
                }
            }
        }

        match serde_json::from_value::<Self>(merged) {
            Ok(config) => match config.check() {
                Ok(()) => config,
                Err(reason) => {
                    warn!("inconsistent hyperparameters, using defaults: {}", reason);
                    defaults
                }
            },
            Err(e) => {
                warn!("invalid hyperparameters, using defaults: {}", e);
                defaults
            }
        }
    }

    fn check(&self) -> Result<(), &'static str> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !self.min_step.is_finite() || !self.max_step.is_finite() || self.min_step > self.max_step {
            return Err("min_step must not exceed max_step");
        }
        if !positive(self.initial_step) {
            return Err("initial_step must be positive");
        }
        if !positive(self.cooling_rate) {
            return Err("cooling_rate must be positive");
        }
        if !positive(self.initial_temperature) {
            return Err("initial_temperature must be positive");
        }
        if !(0.0..=1.0).contains(&self.deadline_fraction) {
            return Err("deadline_fraction must lie in [0, 1]");
        }
        Ok(())
    }
}
