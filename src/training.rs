//! Epoch / mini-batch training loop
//!
//! Each call to [`Network::train`] validates the whole dataset up front, then
//! splits it into a training and a held-out part. Every epoch reshuffles the
//! training order, walks it in mini-batches, accumulates each example's
//! gradient and applies the batch once. After every epoch the loss and
//! accuracy are measured without touching the parameters.
//!
//! With `TrainingConfig::parallel` the examples of a batch are processed on
//! the rayon pool. Each worker owns its [`ForwardPass`] and a local gradient
//! set; the sets are reduced and merged into the layers on the calling
//! thread before the batch is applied.

use crate::data::{train_size, Dataset};
use crate::error::Result;
use crate::layers::LayerGradients;
use crate::network::{set_one_hot, ForwardPass, Network};
use crate::utils::SimpleRng;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

/// Loss and accuracy measured after one epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch: usize,
    /// Mean loss over the training split
    pub train_loss: f64,
    pub train_accuracy: f64,
    /// `None` when the held-out split is empty
    pub held_out_loss: Option<f64>,
    pub held_out_accuracy: Option<f64>,
}

/// Per-worker state for parallel batch accumulation.
struct BatchWorker {
    pass: ForwardPass,
    target: Vec<f64>,
    gradients: Vec<LayerGradients>,
}

impl BatchWorker {
    fn new(network: &Network) -> Self {
        Self {
            pass: ForwardPass::new(network),
            target: vec![0.0; network.num_classes()],
            gradients: network
                .layers()
                .iter()
                .map(|layer| LayerGradients::zeros(layer.num_nodes_in(), layer.num_nodes_out()))
                .collect(),
        }
    }

    fn process(&mut self, network: &Network, input: &[f64], label: usize) {
        set_one_hot(&mut self.target, label);
        network.forward_into(input, &mut self.pass);
        network.backward_into(&self.target, &mut self.pass);
        self.pass.accumulate_into(&mut self.gradients);
    }
}

fn merge_gradient_sets(mut a: Vec<LayerGradients>, b: Vec<LayerGradients>) -> Vec<LayerGradients> {
    for (into, from) in a.iter_mut().zip(b.iter()) {
        into.merge(from);
    }
    a
}

impl Network {
    /// Train with the stored hyperparameters.
    ///
    /// The split/shuffle generator is seeded from `config.seed`, or from the
    /// clock when no seed is set.
    pub fn train(&mut self, dataset: &Dataset) -> Result<Vec<EpochMetrics>> {
        let mut rng = match self.config().seed {
            Some(seed) => SimpleRng::new(seed),
            None => SimpleRng::from_time(),
        };
        self.train_with(dataset, &mut rng, |_| {})
    }

    /// Train with an explicit generator, reporting each epoch to `on_epoch`.
    ///
    /// # Errors
    ///
    /// Returns an input error if any feature vector has the wrong width or
    /// any label is out of range, and a configuration error for invalid
    /// hyperparameters. Both are raised before any parameter changes.
    pub fn train_with<F>(
        &mut self,
        dataset: &Dataset,
        rng: &mut SimpleRng,
        mut on_epoch: F,
    ) -> Result<Vec<EpochMetrics>>
    where
        F: FnMut(&EpochMetrics),
    {
        self.config().validate()?;
        self.validate_dataset(dataset)?;
        let config = self.config().clone();
        self.reset_gradients();

        let order = dataset.shuffled_indices(rng);
        let (train_indices, held_out_indices) =
            order.split_at(train_size(dataset.len(), config.train_ratio));
        let mut train_order = train_indices.to_vec();

        debug!(
            "Training on {} examples ({} held out), batch size {}, {} epochs, parallel={}",
            train_indices.len(),
            held_out_indices.len(),
            config.batch_size,
            config.epochs,
            config.parallel
        );

        let mut pass = ForwardPass::new(self);
        let mut history = Vec::with_capacity(config.epochs);

        for epoch in 1..=config.epochs {
            rng.shuffle_usize(&mut train_order);

            for batch in train_order.chunks(config.batch_size) {
                if config.parallel {
                    self.accumulate_batch_parallel(dataset, batch);
                } else {
                    self.accumulate_batch(dataset, batch, &mut pass);
                }
                self.apply_gradients(config.learning_rate, batch.len());
            }

            let metrics =
                self.epoch_metrics(epoch, dataset, train_indices, held_out_indices, &mut pass);
            info!(
                "Epoch {} | Loss: {:.6} | Train Acc: {:.4} | Held-out Acc: {}",
                metrics.epoch,
                metrics.train_loss,
                metrics.train_accuracy,
                metrics
                    .held_out_accuracy
                    .map_or_else(|| "n/a".to_string(), |acc| format!("{:.4}", acc))
            );
            on_epoch(&metrics);
            history.push(metrics);
        }

        Ok(history)
    }

    fn accumulate_batch(&mut self, dataset: &Dataset, batch: &[usize], pass: &mut ForwardPass) {
        let mut target = vec![0.0; self.num_classes()];
        for &idx in batch {
            set_one_hot(&mut target, dataset.labels()[idx]);
            self.forward_into(&dataset.features()[idx], pass);
            self.backward_into(&target, pass);
            self.accumulate(pass);
        }
    }

    fn accumulate_batch_parallel(&mut self, dataset: &Dataset, batch: &[usize]) {
        let network = &*self;
        let gradients = batch
            .par_iter()
            .fold(
                || BatchWorker::new(network),
                |mut worker, &idx| {
                    worker.process(network, &dataset.features()[idx], dataset.labels()[idx]);
                    worker
                },
            )
            .map(|worker| worker.gradients)
            .reduce_with(merge_gradient_sets);

        if let Some(gradients) = gradients {
            for (layer, grads) in self.layers_mut().iter_mut().zip(gradients.iter()) {
                layer.merge_gradients(grads);
            }
        }
    }

    fn epoch_metrics(
        &self,
        epoch: usize,
        dataset: &Dataset,
        train_indices: &[usize],
        held_out_indices: &[usize],
        pass: &mut ForwardPass,
    ) -> EpochMetrics {
        let (train_loss, train_correct) = self.evaluate_indices(dataset, train_indices, pass);
        let train_count = train_indices.len() as f64;

        let (held_out_loss, held_out_accuracy) = if held_out_indices.is_empty() {
            (None, None)
        } else {
            let (loss, correct) = self.evaluate_indices(dataset, held_out_indices, pass);
            let count = held_out_indices.len() as f64;
            (Some(loss / count), Some(correct as f64 / count))
        };

        EpochMetrics {
            epoch,
            train_loss: train_loss / train_count,
            train_accuracy: train_correct as f64 / train_count,
            held_out_loss,
            held_out_accuracy,
        }
    }
}
