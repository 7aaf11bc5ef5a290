//! Feed-forward neural network classifier
//!
//! This library builds a stack of dense layers, runs forward inference,
//! computes gradients by backpropagation and trains with mini-batch gradient
//! descent, to classify fixed-size feature vectors into a fixed set of labels.
//!
//! # Modules
//!
//! - `layers`: Dense layer, forward cache and gradient accumulator
//! - `network`: Layer stack with forward/backward passes and inference
//! - `training`: Epoch/mini-batch training loop and per-epoch metrics
//! - `data`: Datasets, validation and preprocessing helpers
//! - `snapshot`: Serializable learned state
//! - `utils`: RNG plus activation, loss and initializer strategies
//! - `config`: Training hyperparameters
//! - `architecture`: Architecture configuration and network building
//!
//! # Example
//!
//! ```
//! use neural_classifier::{Dataset, Network};
//! use neural_classifier::utils::{Activation, SimpleRng, WeightInitializer};
//!
//! let mut rng = SimpleRng::new(42);
//! let mut network =
//!     Network::new(&[2, 4, 2], Activation::Sigmoid, WeightInitializer::Xavier, &mut rng)?;
//! network.set_epochs(5)?;
//!
//! let dataset = Dataset::new(
//!     vec![vec![0.0, 0.1], vec![0.9, 1.0], vec![0.1, 0.0], vec![1.0, 0.9]],
//!     vec![0, 1, 0, 1],
//! )?;
//! let history = network.train_with(&dataset, &mut rng, |_| {})?;
//! assert_eq!(history.len(), 5);
//!
//! let label = network.classify(&[0.95, 0.95])?;
//! assert!(label < 2);
//! # Ok::<(), neural_classifier::NetworkError>(())
//! ```

pub mod architecture;
pub mod config;
pub mod data;
pub mod error;
pub mod layers;
pub mod network;
pub mod snapshot;
pub mod training;
pub mod utils;

pub use config::TrainingConfig;
pub use data::Dataset;
pub use error::{InputError, NetworkError, Result};
pub use network::{ForwardPass, Network};
pub use snapshot::{LayerSnapshot, NetworkSnapshot};
pub use training::EpochMetrics;
