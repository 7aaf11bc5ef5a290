//! Serializable snapshot of a network's learned state.
//!
//! A snapshot carries everything needed to rebuild an equivalent network:
//! layer shapes, weights, biases, activations, the loss, the initializer and
//! the training hyperparameters. JSON encoding uses serde_json with
//! round-trip float parsing, so restored values are bit-identical. Where the
//! bytes end up is the caller's business.

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::layers::DenseLayer;
use crate::network::Network;
use crate::utils::{Activation, Loss, WeightInitializer};
use serde::{Deserialize, Serialize};

/// Parameters of one dense layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub num_nodes_in: usize,
    pub num_nodes_out: usize,
    pub activation: Activation,
    /// Row-major (num_nodes_in × num_nodes_out)
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

/// Full learned state of a [`Network`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub layers: Vec<LayerSnapshot>,
    pub loss: Loss,
    pub initializer: WeightInitializer,
    pub config: TrainingConfig,
}

impl NetworkSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Network {
    /// Capture the current parameters. Pending gradients are not included.
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            layers: self
                .layers()
                .iter()
                .map(|layer| LayerSnapshot {
                    num_nodes_in: layer.num_nodes_in(),
                    num_nodes_out: layer.num_nodes_out(),
                    activation: layer.activation(),
                    weights: layer.weights().to_vec(),
                    biases: layer.biases().to_vec(),
                })
                .collect(),
            loss: self.loss(),
            initializer: self.initializer(),
            config: self.config().clone(),
        }
    }

    /// Rebuild a network from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when layer shapes are inconsistent, a
    /// parameter is not finite, or the stored hyperparameters are invalid.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Result<Self> {
        let layers = snapshot
            .layers
            .into_iter()
            .map(|layer| {
                DenseLayer::from_parameters(
                    layer.num_nodes_in,
                    layer.num_nodes_out,
                    layer.weights,
                    layer.biases,
                    layer.activation,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Network::from_layers(layers, snapshot.loss, snapshot.initializer, snapshot.config)
    }
}
