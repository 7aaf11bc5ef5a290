//! Per-example forward cache for one dense layer.

/// Weighted inputs and activations produced by one forward pass through a layer.
///
/// The cache belongs to whoever drives the pass, never to the layer, so two
/// examples can go through the same layer at once as long as each has its own
/// cache. Buffers are sized once and overwritten on every pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerCache {
    pub(crate) weighted_inputs: Vec<f64>,
    pub(crate) activations: Vec<f64>,
}

impl LayerCache {
    /// Zeroed cache for a layer with `num_nodes_out` outputs.
    pub fn new(num_nodes_out: usize) -> Self {
        Self {
            weighted_inputs: vec![0.0; num_nodes_out],
            activations: vec![0.0; num_nodes_out],
        }
    }

    /// Pre-activation values, one per output node.
    pub fn weighted_inputs(&self) -> &[f64] {
        &self.weighted_inputs
    }

    /// Layer output, one per output node.
    pub fn activations(&self) -> &[f64] {
        &self.activations
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }
}
