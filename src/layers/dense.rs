//! Dense (fully connected) layer implementation
//!
//! This module provides a DenseLayer that performs the transformation
//! `output = activation(input × weights + biases)` and the matching backward
//! computations used by backpropagation.

use super::{LayerCache, LayerGradients};
use crate::error::{NetworkError, Result};
use crate::utils::{Activation, Loss, SimpleRng, WeightInitializer};

/// Dense (fully connected) layer with weights, biases and an activation.
///
/// Performs `z = xW + b`, `y = f(z)` where x is the input (num_nodes_in),
/// W is the weight matrix (num_nodes_in × num_nodes_out) stored row-major,
/// b is the bias vector (num_nodes_out) and f is the activation.
///
/// The layer holds no per-example state. Forward results live in a
/// [`LayerCache`] owned by the caller; only the gradient accumulator is
/// mutated during training, and only through `&mut self`.
///
/// # Example
///
/// ```
/// use neural_classifier::layers::DenseLayer;
/// use neural_classifier::utils::{Activation, SimpleRng, WeightInitializer};
///
/// let mut rng = SimpleRng::new(42);
/// let layer = DenseLayer::new(784, 50, Activation::Sigmoid, WeightInitializer::Xavier, &mut rng)
///     .unwrap();
/// assert_eq!(layer.num_nodes_in(), 784);
/// assert_eq!(layer.num_nodes_out(), 50);
/// ```
#[derive(Debug, Clone)]
pub struct DenseLayer {
    num_nodes_in: usize,
    num_nodes_out: usize,
    weights: Vec<f64>,
    biases: Vec<f64>,
    activation: Activation,
    gradients: LayerGradients,
}

impl DenseLayer {
    /// Create a new layer with weights drawn by `initializer` and zero biases.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either size is zero.
    pub fn new(
        num_nodes_in: usize,
        num_nodes_out: usize,
        activation: Activation,
        initializer: WeightInitializer,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        check_sizes(num_nodes_in, num_nodes_out)?;
        let weights = initializer.init(num_nodes_in, num_nodes_out, rng);

        Ok(Self {
            num_nodes_in,
            num_nodes_out,
            weights,
            biases: vec![0.0; num_nodes_out],
            activation,
            gradients: LayerGradients::zeros(num_nodes_in, num_nodes_out),
        })
    }

    /// Create a layer from explicit parameters.
    ///
    /// `weights` must be row-major with `num_nodes_in * num_nodes_out` entries
    /// and `biases` must have `num_nodes_out` entries. All values must be finite.
    pub fn from_parameters(
        num_nodes_in: usize,
        num_nodes_out: usize,
        weights: Vec<f64>,
        biases: Vec<f64>,
        activation: Activation,
    ) -> Result<Self> {
        check_sizes(num_nodes_in, num_nodes_out)?;
        if weights.len() != num_nodes_in * num_nodes_out {
            return Err(NetworkError::config(format!(
                "expected {} weights for a {}x{} layer, got {}",
                num_nodes_in * num_nodes_out,
                num_nodes_in,
                num_nodes_out,
                weights.len()
            )));
        }
        if biases.len() != num_nodes_out {
            return Err(NetworkError::config(format!(
                "expected {} biases, got {}",
                num_nodes_out,
                biases.len()
            )));
        }
        if weights.iter().chain(biases.iter()).any(|v| !v.is_finite()) {
            return Err(NetworkError::config("layer parameters must be finite"));
        }

        Ok(Self {
            num_nodes_in,
            num_nodes_out,
            weights,
            biases,
            activation,
            gradients: LayerGradients::zeros(num_nodes_in, num_nodes_out),
        })
    }

    /// Forward pass into a freshly allocated cache.
    pub fn forward(&self, input: &[f64]) -> LayerCache {
        let mut cache = LayerCache::new(self.num_nodes_out);
        self.forward_into(input, &mut cache);
        cache
    }

    /// Forward pass reusing an existing cache.
    ///
    /// `weighted_input[j] = bias[j] + Σ_i input[i]·W[i][j]`,
    /// `activation[j] = f(weighted_input[j])`.
    ///
    /// # Panics
    ///
    /// Panics if `input` does not have `num_nodes_in` values or the cache was
    /// sized for a different layer.
    pub fn forward_into(&self, input: &[f64], cache: &mut LayerCache) {
        assert_eq!(input.len(), self.num_nodes_in, "input length mismatch");
        assert_eq!(cache.len(), self.num_nodes_out, "cache size mismatch");

        cache.weighted_inputs.copy_from_slice(&self.biases);
        for (row, &x) in self.weights.chunks_exact(self.num_nodes_out).zip(input) {
            for (z, &w) in cache.weighted_inputs.iter_mut().zip(row) {
                *z += x * w;
            }
        }
        for (a, &z) in cache
            .activations
            .iter_mut()
            .zip(cache.weighted_inputs.iter())
        {
            *a = self.activation.apply(z);
        }
    }

    /// Node values of the output layer.
    pub fn output_node_values(&self, cache: &LayerCache, expected: &[f64], loss: Loss) -> Vec<f64> {
        let mut node_values = vec![0.0; self.num_nodes_out];
        self.output_node_values_into(cache, expected, loss, &mut node_values);
        node_values
    }

    /// `node_values[j] = loss'(activation[j], expected[j]) · f'(weighted_input[j])`
    ///
    /// Only meaningful for the last layer of a network.
    pub fn output_node_values_into(
        &self,
        cache: &LayerCache,
        expected: &[f64],
        loss: Loss,
        node_values: &mut [f64],
    ) {
        assert_eq!(expected.len(), self.num_nodes_out, "expected length mismatch");
        assert_eq!(node_values.len(), self.num_nodes_out, "node values length mismatch");

        for (j, value) in node_values.iter_mut().enumerate() {
            *value = loss.derivative(cache.activations[j], expected[j])
                * self.activation.derivative(cache.weighted_inputs[j]);
        }
    }

    /// Node values of a hidden layer given the downstream layer's node values.
    pub fn hidden_node_values(
        &self,
        cache: &LayerCache,
        next_layer: &DenseLayer,
        next_node_values: &[f64],
    ) -> Vec<f64> {
        let mut node_values = vec![0.0; self.num_nodes_out];
        self.hidden_node_values_into(cache, next_layer, next_node_values, &mut node_values);
        node_values
    }

    /// `node_values[i] = (Σ_j next.W[i][j]·next_node_values[j]) · f'(weighted_input[i])`
    ///
    /// Row `i` of the downstream weight matrix connects this layer's node `i`
    /// to every downstream node, so iterating rows applies the transpose.
    pub fn hidden_node_values_into(
        &self,
        cache: &LayerCache,
        next_layer: &DenseLayer,
        next_node_values: &[f64],
        node_values: &mut [f64],
    ) {
        assert_eq!(
            next_layer.num_nodes_in, self.num_nodes_out,
            "next layer does not follow this layer"
        );
        assert_eq!(
            next_node_values.len(),
            next_layer.num_nodes_out,
            "next node values length mismatch"
        );
        assert_eq!(node_values.len(), self.num_nodes_out, "node values length mismatch");

        let rows = next_layer.weights.chunks_exact(next_layer.num_nodes_out);
        for (i, (value, row)) in node_values.iter_mut().zip(rows).enumerate() {
            let propagated: f64 = row
                .iter()
                .zip(next_node_values)
                .map(|(&w, &delta)| w * delta)
                .sum();
            *value = propagated * self.activation.derivative(cache.weighted_inputs[i]);
        }
    }

    /// Add one example's gradient into the layer accumulator.
    ///
    /// `input` is the vector this layer received in the forward pass that
    /// produced `node_values`.
    pub fn accumulate_gradients(&mut self, input: &[f64], node_values: &[f64]) {
        self.gradients.accumulate(input, node_values);
    }

    /// Add a worker-local accumulator into the layer accumulator.
    pub fn merge_gradients(&mut self, gradients: &LayerGradients) {
        self.gradients.merge(gradients);
    }

    /// Drop the pending gradient.
    pub fn reset_gradients(&mut self) {
        self.gradients.reset();
    }

    /// Commit the accumulated gradient and reset the accumulator.
    ///
    /// `W -= (learning_rate / batch_size) · gradW`, same for biases.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero; an empty batch has nothing to apply.
    pub fn apply_gradients(&mut self, learning_rate: f64, batch_size: usize) {
        assert!(batch_size > 0, "batch_size must be positive");
        let scale = learning_rate / batch_size as f64;

        for (w, g) in self.weights.iter_mut().zip(self.gradients.weights.iter()) {
            *w -= scale * g;
        }
        for (b, g) in self.biases.iter_mut().zip(self.gradients.biases.iter()) {
            *b -= scale * g;
        }
        self.gradients.reset();
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn num_nodes_in(&self) -> usize {
        self.num_nodes_in
    }

    pub fn num_nodes_out(&self) -> usize {
        self.num_nodes_out
    }

    /// Row-major weights, `W[i][j]` at `i * num_nodes_out + j`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Gradient accumulated since the last `apply_gradients`.
    pub fn gradients(&self) -> &LayerGradients {
        &self.gradients
    }

    /// num_nodes_in × num_nodes_out weights plus num_nodes_out biases.
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}

fn check_sizes(num_nodes_in: usize, num_nodes_out: usize) -> Result<()> {
    if num_nodes_in < 1 || num_nodes_out < 1 {
        return Err(NetworkError::config(format!(
            "layer sizes must be at least 1, got {}x{}",
            num_nodes_in, num_nodes_out
        )));
    }
    Ok(())
}
