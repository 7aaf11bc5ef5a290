//! Loss functions comparing the output layer against a target vector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probabilities are clamped to [EPSILON, 1 - EPSILON] before log/division.
pub const CROSS_ENTROPY_EPSILON: f64 = 1e-15;

/// Scalar loss plus its per-output derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// 0.5 * sum((p - e)^2)
    #[default]
    MeanSquaredError,
    /// -sum(e * ln(p)) with clamped p
    CrossEntropy,
}

impl Loss {
    /// Loss over a whole output vector.
    ///
    /// # Panics
    ///
    /// Panics if `predicted` and `expected` have different lengths.
    pub fn calculate_loss(self, predicted: &[f64], expected: &[f64]) -> f64 {
        assert_eq!(
            predicted.len(),
            expected.len(),
            "predicted and expected must have the same length"
        );

        match self {
            Loss::MeanSquaredError => {
                let sum: f64 = predicted
                    .iter()
                    .zip(expected)
                    .map(|(&p, &e)| (p - e) * (p - e))
                    .sum();
                0.5 * sum
            }
            Loss::CrossEntropy => predicted
                .iter()
                .zip(expected)
                .map(|(&p, &e)| -e * clamp_probability(p).ln())
                .sum(),
        }
    }

    /// Partial derivative of the loss with respect to one predicted output.
    pub fn derivative(self, predicted: f64, expected: f64) -> f64 {
        match self {
            Loss::MeanSquaredError => predicted - expected,
            Loss::CrossEntropy => -expected / clamp_probability(predicted),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Loss::MeanSquaredError => "mean_squared_error",
            Loss::CrossEntropy => "cross_entropy",
        }
    }
}

impl fmt::Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn clamp_probability(p: f64) -> f64 {
    p.clamp(CROSS_ENTROPY_EPSILON, 1.0 - CROSS_ENTROPY_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_loss() {
        let loss = Loss::MeanSquaredError.calculate_loss(&[1.0, 0.0], &[0.0, 0.0]);
        assert!((loss - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_mse_derivative() {
        assert_eq!(Loss::MeanSquaredError.derivative(0.75, 1.0), -0.25);
    }

    #[test]
    fn test_cross_entropy_clamps_zero() {
        let loss = Loss::CrossEntropy.calculate_loss(&[0.0, 1.0], &[1.0, 0.0]);
        assert!(loss.is_finite());
        assert!((loss - (-(CROSS_ENTROPY_EPSILON.ln()))).abs() < 1e-9);

        let d = Loss::CrossEntropy.derivative(0.0, 1.0);
        assert!(d.is_finite());
        assert_eq!(d, -1.0 / CROSS_ENTROPY_EPSILON);
    }

    #[test]
    fn test_cross_entropy_perfect_prediction_is_near_zero() {
        let loss = Loss::CrossEntropy.calculate_loss(&[1.0, 0.0], &[1.0, 0.0]);
        assert!(loss >= 0.0 && loss < 1e-12);
    }

    #[test]
    #[should_panic(expected = "predicted and expected must have the same length")]
    fn test_mismatched_lengths() {
        Loss::MeanSquaredError.calculate_loss(&[1.0], &[1.0, 0.0]);
    }
}
