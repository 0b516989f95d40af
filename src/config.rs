//! Training configuration.
//!
//! A `Config` is passed explicitly: its activation is copied into the network
//! at construction, the remaining fields drive [`crate::NeuralNetwork::train`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Activation, Error, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Multiplies every gradient step.
    pub learning_rate: f64,
    /// Number of random draws (one example per draw) in `train`.
    pub iterations: usize,
    pub activation: Activation,
    /// Emit the start, per-percent progress and completion events of `train`.
    ///
    /// Only `train` reads this flag. `test`, `save` and `load` always emit
    /// their events; filter them with the subscriber.
    pub logging_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learning_rate: 0.03,
            iterations: 100,
            activation: Activation::Sigmoid,
            logging_enabled: true,
        }
    }
}

impl Config {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Parse a JSON config; missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(s)
            .map_err(|e| Error::Parse(format!("failed to parse config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
