//! Configuration structures for training
//!
//! This module provides the hyperparameters that drive the epoch/mini-batch
//! training loop and a loader for reading them from JSON files.

use crate::error::{NetworkError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Hyperparameters for the training loop.
///
/// Every field has a default, so a configuration file only needs to list the
/// values it changes.
///
/// # Example
///
/// ```json
/// {
///   "learning_rate": 0.1,
///   "batch_size": 32,
///   "epochs": 20,
///   "train_ratio": 0.8,
///   "seed": 42,
///   "parallel": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Step size for gradient descent
    pub learning_rate: f64,

    /// Maximum number of examples per mini-batch
    pub batch_size: usize,

    /// Number of passes over the training split
    pub epochs: usize,

    /// Fraction of the dataset used for training; the rest is held out
    pub train_ratio: f64,

    /// Seed for the split/shuffle generator; `None` seeds from the clock
    pub seed: Option<u64>,

    /// Accumulate the examples of each mini-batch on the rayon thread pool
    pub parallel: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            batch_size: 100,
            epochs: 10,
            train_ratio: 0.8,
            seed: None,
            parallel: false,
        }
    }
}

impl TrainingConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a non-positive or non-finite learning
    /// rate, a zero batch size, zero epochs, or a train ratio outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NetworkError::config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }

        if self.batch_size == 0 {
            return Err(NetworkError::config("batch_size must be greater than 0"));
        }

        if self.epochs == 0 {
            return Err(NetworkError::config("epochs must be greater than 0"));
        }

        if !(self.train_ratio > 0.0 && self.train_ratio <= 1.0) {
            return Err(NetworkError::config(format!(
                "train_ratio must be in (0, 1], got {}",
                self.train_ratio
            )));
        }

        Ok(())
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into a
/// `TrainingConfig` and validates it.
///
/// # Examples
///
/// ```no_run
/// use neural_classifier::config::load_config;
///
/// let cfg = load_config("config/training.json").unwrap();
/// assert!(cfg.learning_rate > 0.0);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
