//! Feed-forward network of dense layers
//!
//! The network composes layer forward passes left to right, runs
//! backpropagation right to left and commits accumulated gradients. All
//! per-example values live in a [`ForwardPass`] workspace owned by the caller,
//! so the network itself only changes inside `accumulate`/`apply_gradients`.

use crate::config::TrainingConfig;
use crate::data::{self, argmax, Dataset};
use crate::error::{InputError, NetworkError, Result};
use crate::layers::{DenseLayer, LayerCache, LayerGradients};
use crate::utils::{Activation, Loss, SimpleRng, WeightInitializer};
use log::{debug, warn};

/// Ordered stack of dense layers plus the loss and training hyperparameters.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<DenseLayer>,
    loss: Loss,
    initializer: WeightInitializer,
    config: TrainingConfig,
}

/// Working memory for one example's forward and backward pass.
///
/// Holds the network input, one [`LayerCache`] per layer and one node-value
/// buffer per layer. Allocate once and reuse it across examples; give every
/// concurrently processed example its own.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    input: Vec<f64>,
    caches: Vec<LayerCache>,
    node_values: Vec<Vec<f64>>,
}

impl ForwardPass {
    /// Workspace sized for `network`.
    pub fn new(network: &Network) -> Self {
        Self {
            input: vec![0.0; network.num_features()],
            caches: network
                .layers
                .iter()
                .map(|layer| LayerCache::new(layer.num_nodes_out()))
                .collect(),
            node_values: network
                .layers
                .iter()
                .map(|layer| vec![0.0; layer.num_nodes_out()])
                .collect(),
        }
    }

    /// Output of the last layer.
    pub fn output(&self) -> &[f64] {
        self.caches.last().map_or(&[][..], |cache| cache.activations())
    }

    /// Input vector seen by layer `index` in the last forward pass.
    pub fn layer_input(&self, index: usize) -> &[f64] {
        if index == 0 {
            &self.input
        } else {
            self.caches[index - 1].activations()
        }
    }

    pub fn cache(&self, index: usize) -> &LayerCache {
        &self.caches[index]
    }

    /// Node values of layer `index` from the last backward pass.
    pub fn node_values(&self, index: usize) -> &[f64] {
        &self.node_values[index]
    }

    /// Add this example's gradients into worker-local accumulators.
    pub fn accumulate_into(&self, gradients: &mut [LayerGradients]) {
        for (i, grads) in gradients.iter_mut().enumerate() {
            grads.accumulate(self.layer_input(i), &self.node_values[i]);
        }
    }
}

impl Network {
    /// Build a network from a layer-size sequence.
    ///
    /// `layer_sizes[0]` is the number of features and the last entry is the
    /// number of classes. Every layer uses `activation`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for fewer than two sizes or any size
    /// below one. Nothing is built in that case.
    pub fn new(
        layer_sizes: &[usize],
        activation: Activation,
        initializer: WeightInitializer,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(NetworkError::config(format!(
                "number of layer sizes should be at least 2, got {}",
                layer_sizes.len()
            )));
        }
        if let Some(pos) = layer_sizes.iter().position(|&size| size < 1) {
            return Err(NetworkError::config(format!(
                "layer size at position {} must be at least 1",
                pos
            )));
        }

        let layers = layer_sizes
            .windows(2)
            .map(|pair| DenseLayer::new(pair[0], pair[1], activation, initializer, rng))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Built network {:?} with {} activation and {} initialization",
            layer_sizes, activation, initializer
        );

        let network = Self {
            layers,
            loss: Loss::default(),
            initializer,
            config: TrainingConfig::default(),
        };
        network.check_loss_pairing();
        Ok(network)
    }

    /// Assemble a network from existing layers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `layers` is empty, consecutive layers
    /// don't connect, or `config` is invalid.
    pub fn from_layers(
        layers: Vec<DenseLayer>,
        loss: Loss,
        initializer: WeightInitializer,
        config: TrainingConfig,
    ) -> Result<Self> {
        if layers.is_empty() {
            return Err(NetworkError::config("network must have at least one layer"));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].num_nodes_out() != pair[1].num_nodes_in() {
                return Err(NetworkError::config(format!(
                    "layer {} output size ({}) does not match layer {} input size ({})",
                    i,
                    pair[0].num_nodes_out(),
                    i + 1,
                    pair[1].num_nodes_in()
                )));
            }
        }
        config.validate()?;

        let network = Self {
            layers,
            loss,
            initializer,
            config,
        };
        network.check_loss_pairing();
        Ok(network)
    }

    /// Number of input features.
    pub fn num_features(&self) -> usize {
        self.layers[0].num_nodes_in()
    }

    /// Number of output classes.
    pub fn num_classes(&self) -> usize {
        self.output_layer().num_nodes_out()
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    pub fn set_loss(&mut self, loss: Loss) {
        self.loss = loss;
        self.check_loss_pairing();
    }

    /// Switch every layer to `activation`.
    pub fn set_activation(&mut self, activation: Activation) {
        for layer in &mut self.layers {
            layer.set_activation(activation);
        }
        self.check_loss_pairing();
    }

    /// Initializer the weights were drawn with.
    pub fn initializer(&self) -> WeightInitializer {
        self.initializer
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Replace the hyperparameters after validating them.
    pub fn set_config(&mut self, config: TrainingConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        self.set_config(TrainingConfig {
            learning_rate,
            ..self.config.clone()
        })
    }

    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<()> {
        self.set_config(TrainingConfig {
            batch_size,
            ..self.config.clone()
        })
    }

    pub fn set_epochs(&mut self, epochs: usize) -> Result<()> {
        self.set_config(TrainingConfig {
            epochs,
            ..self.config.clone()
        })
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(DenseLayer::parameter_count).sum()
    }

    /// Validated forward pass returning the output vector.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_features(input, 0)?;
        let mut pass = ForwardPass::new(self);
        self.forward_into(input, &mut pass);
        Ok(pass.output().to_vec())
    }

    /// Forward pass through every layer, writing into `pass`.
    ///
    /// # Panics
    ///
    /// Panics if `input` has the wrong length or `pass` was built for a
    /// different network.
    pub fn forward_into(&self, input: &[f64], pass: &mut ForwardPass) {
        pass.input.copy_from_slice(input);
        for i in 0..self.layers.len() {
            let (done, rest) = pass.caches.split_at_mut(i);
            let layer_input = if i == 0 {
                &pass.input[..]
            } else {
                done[i - 1].activations()
            };
            self.layers[i].forward_into(layer_input, &mut rest[0]);
        }
    }

    /// Backward pass over the values left in `pass` by `forward_into`.
    ///
    /// Fills the node values of every layer, last layer first.
    pub fn backward_into(&self, target: &[f64], pass: &mut ForwardPass) {
        let last = self.layers.len() - 1;
        self.layers[last].output_node_values_into(
            &pass.caches[last],
            target,
            self.loss,
            &mut pass.node_values[last],
        );

        for i in (0..last).rev() {
            let (current, downstream) = pass.node_values.split_at_mut(i + 1);
            self.layers[i].hidden_node_values_into(
                &pass.caches[i],
                &self.layers[i + 1],
                &downstream[0],
                &mut current[i],
            );
        }
    }

    /// Add the gradients of the example in `pass` into every layer.
    pub fn accumulate(&mut self, pass: &ForwardPass) {
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.accumulate_gradients(pass.layer_input(i), pass.node_values(i));
        }
    }

    /// Forward, backward and accumulate for one example.
    ///
    /// `target` is the desired output vector, for instance a one-hot label.
    /// Inputs are validated before anything is accumulated.
    pub fn train_step(&mut self, input: &[f64], target: &[f64], pass: &mut ForwardPass) -> Result<()> {
        self.check_features(input, 0)?;
        if target.len() != self.num_classes() {
            return Err(InputError::TargetLengthMismatch {
                expected: self.num_classes(),
                actual: target.len(),
            }
            .into());
        }
        if let Some((column, &value)) = target.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(InputError::NonFiniteTarget { column, value }.into());
        }

        self.forward_into(input, pass);
        self.backward_into(target, pass);
        self.accumulate(pass);
        Ok(())
    }

    /// Discard pending gradients in every layer without touching parameters.
    pub fn reset_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.reset_gradients();
        }
    }

    /// Commit and reset the accumulated gradients of every layer.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn apply_gradients(&mut self, learning_rate: f64, batch_size: usize) {
        for layer in &mut self.layers {
            layer.apply_gradients(learning_rate, batch_size);
        }
    }

    /// Index of the largest output; the lowest index wins ties.
    pub fn classify(&self, input: &[f64]) -> Result<usize> {
        let output = self.forward(input)?;
        Ok(argmax(&output))
    }

    /// Classify many rows, validating all of them first.
    pub fn classify_all(&self, inputs: &[Vec<f64>]) -> Result<Vec<usize>> {
        data::validate_inputs(inputs)?;
        for (row, values) in inputs.iter().enumerate() {
            self.check_features(values, row)?;
        }

        let mut pass = ForwardPass::new(self);
        Ok(inputs
            .iter()
            .map(|values| {
                self.forward_into(values, &mut pass);
                argmax(pass.output())
            })
            .collect())
    }

    /// Fraction of examples whose predicted class matches the label.
    pub fn evaluate_accuracy(&self, dataset: &Dataset) -> Result<f64> {
        self.validate_dataset(dataset)?;
        let all: Vec<usize> = (0..dataset.len()).collect();
        let (_, correct) = self.evaluate_indices(dataset, &all, &mut ForwardPass::new(self));
        Ok(correct as f64 / dataset.len() as f64)
    }

    /// Mean loss against one-hot targets.
    pub fn mean_loss(&self, dataset: &Dataset) -> Result<f64> {
        self.validate_dataset(dataset)?;
        let all: Vec<usize> = (0..dataset.len()).collect();
        let (loss, _) = self.evaluate_indices(dataset, &all, &mut ForwardPass::new(self));
        Ok(loss / dataset.len() as f64)
    }

    /// Sum of losses and number of correct predictions over `indices`.
    pub(crate) fn evaluate_indices(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        pass: &mut ForwardPass,
    ) -> (f64, usize) {
        let mut target = vec![0.0; self.num_classes()];
        let mut loss = 0.0;
        let mut correct = 0;

        for &idx in indices {
            let label = dataset.labels()[idx];
            self.forward_into(&dataset.features()[idx], pass);
            set_one_hot(&mut target, label);
            loss += self.loss.calculate_loss(pass.output(), &target);
            if argmax(pass.output()) == label {
                correct += 1;
            }
        }
        (loss, correct)
    }

    /// Check feature width and label range of a dataset against this network.
    pub fn validate_dataset(&self, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(InputError::EmptyDataset.into());
        }
        if dataset.num_features() != self.num_features() {
            return Err(InputError::FeatureCountMismatch {
                row: 0,
                expected: self.num_features(),
                actual: dataset.num_features(),
            }
            .into());
        }
        dataset.validate_labels(self.num_classes())
    }

    fn check_features(&self, input: &[f64], row: usize) -> Result<()> {
        if input.len() != self.num_features() {
            return Err(InputError::FeatureCountMismatch {
                row,
                expected: self.num_features(),
                actual: input.len(),
            }
            .into());
        }
        data::validate_row(input, row)
    }

    fn output_layer(&self) -> &DenseLayer {
        &self.layers[self.layers.len() - 1]
    }

    fn check_loss_pairing(&self) {
        let activation = self.output_layer().activation();
        if self.loss == Loss::CrossEntropy && !activation.is_probability_like() {
            warn!(
                "cross_entropy loss paired with {} output activation; outputs are clamped to (0, 1)",
                activation
            );
        }
    }
}

/// Overwrite `target` with the one-hot encoding of `label`.
pub(crate) fn set_one_hot(target: &mut [f64], label: usize) {
    target.fill(0.0);
    target[label] = 1.0;
}
