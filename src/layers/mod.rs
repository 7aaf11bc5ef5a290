//! Dense layer and its per-example working state
//!
//! [`DenseLayer`] owns the parameters and the gradient accumulator,
//! [`LayerCache`] carries one example's forward values and
//! [`LayerGradients`] is the additive accumulator shape shared by layers and
//! parallel workers.

pub mod cache;
pub mod dense;
pub mod gradients;

pub use cache::LayerCache;
pub use dense::DenseLayer;
pub use gradients::LayerGradients;
