//! Weight initialization strategies.

use crate::utils::SimpleRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Produces the initial weights of a layer given its fan-in and fan-out.
///
/// Biases are not covered here; dense layers start them at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInitializer {
    /// Uniform in [-limit, limit] with limit = sqrt(6 / (fan_in + fan_out)).
    #[default]
    Xavier,
    /// Uniform in [-0.5, 0.5].
    RandomUniform,
}

impl WeightInitializer {
    /// Draw `fan_in * fan_out` weights.
    pub fn init(self, fan_in: usize, fan_out: usize, rng: &mut SimpleRng) -> Vec<f64> {
        let limit = self.limit(fan_in, fan_out);
        (0..fan_in * fan_out)
            .map(|_| rng.gen_range_f64(-limit, limit))
            .collect()
    }

    /// Half-width of the sampling interval.
    pub fn limit(self, fan_in: usize, fan_out: usize) -> f64 {
        match self {
            WeightInitializer::Xavier => (6.0 / (fan_in + fan_out) as f64).sqrt(),
            WeightInitializer::RandomUniform => 0.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeightInitializer::Xavier => "xavier",
            WeightInitializer::RandomUniform => "random_uniform",
        }
    }
}

impl fmt::Display for WeightInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
