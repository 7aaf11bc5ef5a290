//! Architecture configuration structures
//!
//! This module describes a network's shape and strategy choices in a JSON
//! file so architectures can be changed without code changes.

use crate::error::{NetworkError, Result};
use crate::network::Network;
use crate::utils::{Activation, Loss, SimpleRng, WeightInitializer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Shape and strategies of a dense network.
///
/// `layer_sizes` lists node counts from the input features to the output
/// classes; a network has `layer_sizes.len() - 1` dense layers.
///
/// # Example
///
/// ```json
/// {
///   "layer_sizes": [784, 50, 25, 10],
///   "activation": "sigmoid",
///   "initializer": "xavier",
///   "loss": "mean_squared_error"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    /// Node counts, input first
    pub layer_sizes: Vec<usize>,

    /// Activation for every layer: "sigmoid", "relu", "tanh" or "linear"
    #[serde(default)]
    pub activation: Activation,

    /// Weight initializer: "xavier" or "random_uniform"
    #[serde(default)]
    pub initializer: WeightInitializer,

    /// Loss: "mean_squared_error" or "cross_entropy"
    #[serde(default)]
    pub loss: Loss,
}

impl ArchitectureConfig {
    /// Check that there are at least two sizes and none is zero.
    pub fn validate(&self) -> Result<()> {
        if self.layer_sizes.len() < 2 {
            return Err(NetworkError::config(
                "Architecture must have at least 2 layer sizes",
            ));
        }

        for (i, &size) in self.layer_sizes.iter().enumerate() {
            if size == 0 {
                return Err(NetworkError::config(format!(
                    "Layer {}: size must be greater than 0",
                    i
                )));
            }
        }

        Ok(())
    }
}

/// Loads an architecture configuration from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use neural_classifier::architecture::load_architecture;
///
/// let arch = load_architecture("config/digits.json").unwrap();
/// assert!(arch.layer_sizes.len() >= 2);
/// ```
pub fn load_architecture(path: impl AsRef<Path>) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Builds a network from an architecture configuration.
///
/// # Examples
///
/// ```
/// use neural_classifier::architecture::{build_network, ArchitectureConfig};
/// use neural_classifier::utils::{Activation, Loss, SimpleRng, WeightInitializer};
///
/// let config = ArchitectureConfig {
///     layer_sizes: vec![4, 8, 3],
///     activation: Activation::Tanh,
///     initializer: WeightInitializer::Xavier,
///     loss: Loss::MeanSquaredError,
/// };
/// let mut rng = SimpleRng::new(42);
/// let network = build_network(&config, &mut rng).unwrap();
/// assert_eq!(network.num_classes(), 3);
/// ```
pub fn build_network(config: &ArchitectureConfig, rng: &mut SimpleRng) -> Result<Network> {
    config.validate()?;
    let mut network = Network::new(
        &config.layer_sizes,
        config.activation,
        config.initializer,
        rng,
    )?;
    network.set_loss(config.loss);
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config: ArchitectureConfig =
            serde_json::from_str(r#"{"layer_sizes": [2, 3, 2]}"#).unwrap();
        assert_eq!(config.activation, Activation::Sigmoid);
        assert_eq!(config.initializer, WeightInitializer::Xavier);
        assert_eq!(config.loss, Loss::MeanSquaredError);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_activation_is_rejected() {
        let parsed: std::result::Result<ArchitectureConfig, _> =
            serde_json::from_str(r#"{"layer_sizes": [2, 2], "activation": "swish"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = ArchitectureConfig {
            layer_sizes: vec![3],
            activation: Activation::ReLU,
            initializer: WeightInitializer::RandomUniform,
            loss: Loss::CrossEntropy,
        };
        assert!(config.validate().is_err());

        config.layer_sizes = vec![3, 0, 2];
        assert!(config.validate().is_err());

        config.layer_sizes = vec![3, 5, 2];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_network_sets_loss() {
        let config = ArchitectureConfig {
            layer_sizes: vec![2, 2],
            activation: Activation::Sigmoid,
            initializer: WeightInitializer::Xavier,
            loss: Loss::CrossEntropy,
        };
        let mut rng = SimpleRng::new(5);
        let network = build_network(&config, &mut rng).unwrap();
        assert_eq!(network.loss(), Loss::CrossEntropy);
        assert_eq!(network.layers().len(), 1);
    }
}
