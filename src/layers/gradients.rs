//! Gradient accumulator for one dense layer.

/// Sum of weight and bias gradients over the examples of a mini-batch.
///
/// Same shape as the layer parameters: `weights` is row-major
/// (num_nodes_in × num_nodes_out), `biases` has num_nodes_out entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    num_nodes_in: usize,
    num_nodes_out: usize,
    pub(crate) weights: Vec<f64>,
    pub(crate) biases: Vec<f64>,
}

impl LayerGradients {
    pub fn zeros(num_nodes_in: usize, num_nodes_out: usize) -> Self {
        Self {
            num_nodes_in,
            num_nodes_out,
            weights: vec![0.0; num_nodes_in * num_nodes_out],
            biases: vec![0.0; num_nodes_out],
        }
    }

    /// Add one example's contribution.
    ///
    /// `gradW[i][j] += input[i] * node_values[j]` and `gradB[j] += node_values[j]`.
    ///
    /// # Panics
    ///
    /// Panics if `input` or `node_values` do not match the accumulator shape.
    pub fn accumulate(&mut self, input: &[f64], node_values: &[f64]) {
        assert_eq!(input.len(), self.num_nodes_in, "input length mismatch");
        assert_eq!(
            node_values.len(),
            self.num_nodes_out,
            "node values length mismatch"
        );

        for (row, &x) in self
            .weights
            .chunks_exact_mut(self.num_nodes_out)
            .zip(input.iter())
        {
            for (grad, &delta) in row.iter_mut().zip(node_values.iter()) {
                *grad += x * delta;
            }
        }
        for (grad, &delta) in self.biases.iter_mut().zip(node_values.iter()) {
            *grad += delta;
        }
    }

    /// Add another accumulator of the same shape into this one.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn merge(&mut self, other: &LayerGradients) {
        assert_eq!(
            (self.num_nodes_in, self.num_nodes_out),
            (other.num_nodes_in, other.num_nodes_out),
            "gradient shapes must match"
        );
        for (a, b) in self.weights.iter_mut().zip(other.weights.iter()) {
            *a += b;
        }
        for (a, b) in self.biases.iter_mut().zip(other.biases.iter()) {
            *a += b;
        }
    }

    pub fn reset(&mut self) {
        self.weights.fill(0.0);
        self.biases.fill(0.0);
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// True when nothing has been accumulated since the last reset.
    pub fn is_zero(&self) -> bool {
        self.weights.iter().chain(self.biases.iter()).all(|&g| g == 0.0)
    }
}
