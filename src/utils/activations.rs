//! Activation functions for dense layers.
//!
//! Every derivative is evaluated at the pre-activation (weighted input) value.
//! Sigmoid and Tanh recompute the activation internally instead of asking the
//! caller to keep it around.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pointwise nonlinearity applied after the affine transform of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// 1 / (1 + exp(-x))
    #[default]
    Sigmoid,
    /// max(0, x)
    #[serde(rename = "relu")]
    ReLU,
    Tanh,
    /// Identity.
    Linear,
}

impl Activation {
    /// Apply the activation to a weighted input.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::ReLU => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }

    /// Derivative with respect to the weighted input `x`.
    ///
    /// ReLU uses 0 as the subgradient at exactly 0.
    pub fn derivative(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => {
                let a = sigmoid(x);
                a * (1.0 - a)
            }
            Activation::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Activation::Linear => 1.0,
        }
    }

    /// True when every output lies strictly inside (0, 1).
    pub fn is_probability_like(self) -> bool {
        matches!(self, Activation::Sigmoid)
    }

    /// Identifier used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::ReLU => "relu",
            Activation::Tanh => "tanh",
            Activation::Linear => "linear",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
