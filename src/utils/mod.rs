//! Shared building blocks for dense networks
//!
//! This module provides the random number generator and the three small
//! strategy families selected at network construction: activation, loss and
//! weight initialization.

pub mod activations;
pub mod initializers;
pub mod loss;
pub mod rng;

pub use activations::Activation;
pub use initializers::WeightInitializer;
pub use loss::Loss;
pub use rng::SimpleRng;
