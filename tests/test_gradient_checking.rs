// Tests for numerical gradient checking using finite differences.
// These tests verify that the accumulated analytic gradients match central
// difference approximations of the loss.

use neural_classifier::utils::{Activation, Loss, SimpleRng, WeightInitializer};
use neural_classifier::{ForwardPass, Network, NetworkSnapshot};

const EPSILON: f64 = 1e-5;
const TOLERANCE: f64 = 1e-6;

// Loss of `snapshot` on a single example.
fn loss_at(snapshot: &NetworkSnapshot, input: &[f64], target: &[f64]) -> f64 {
    let network = Network::from_snapshot(snapshot.clone()).unwrap();
    let output = network.forward(input).unwrap();
    network.loss().calculate_loss(&output, target)
}

// Compare every weight and bias gradient of `network` against finite differences.
fn check_gradients(mut network: Network, input: &[f64], target: &[f64]) {
    let snapshot = network.snapshot();
    let mut pass = ForwardPass::new(&network);
    network.train_step(input, target, &mut pass).unwrap();

    for (l, layer) in network.layers().iter().enumerate() {
        for (k, &analytic) in layer.gradients().weights().iter().enumerate() {
            let mut plus = snapshot.clone();
            let mut minus = snapshot.clone();
            plus.layers[l].weights[k] += EPSILON;
            minus.layers[l].weights[k] -= EPSILON;

            let numeric =
                (loss_at(&plus, input, target) - loss_at(&minus, input, target)) / (2.0 * EPSILON);
            assert!(
                (analytic - numeric).abs() < TOLERANCE,
                "layer {} weight {}: analytic {} vs numeric {}",
                l,
                k,
                analytic,
                numeric
            );
        }

        for (k, &analytic) in layer.gradients().biases().iter().enumerate() {
            let mut plus = snapshot.clone();
            let mut minus = snapshot.clone();
            plus.layers[l].biases[k] += EPSILON;
            minus.layers[l].biases[k] -= EPSILON;

            let numeric =
                (loss_at(&plus, input, target) - loss_at(&minus, input, target)) / (2.0 * EPSILON);
            assert!(
                (analytic - numeric).abs() < TOLERANCE,
                "layer {} bias {}: analytic {} vs numeric {}",
                l,
                k,
                analytic,
                numeric
            );
        }
    }
}

// ============================================================================
// Single Layer
// ============================================================================

mod single_layer_tests {
    use super::*;

    #[test]
    fn test_linear_mse_gradient() {
        let mut rng = SimpleRng::new(42);
        let network =
            Network::new(&[3, 2], Activation::Linear, WeightInitializer::Xavier, &mut rng)
                .unwrap();
        check_gradients(network, &[0.5, -1.5, 2.0], &[1.0, 0.0]);
    }

    #[test]
    fn test_linear_mse_gradient_closed_form() {
        // One weight, one bias: L = 0.5 * (w*x + b - e)^2, dL/dw = (w*x + b - e) * x
        let mut rng = SimpleRng::new(3);
        let mut network =
            Network::new(&[1, 1], Activation::Linear, WeightInitializer::Xavier, &mut rng)
                .unwrap();
        let w = network.layers()[0].weights()[0];
        let mut pass = ForwardPass::new(&network);
        network.train_step(&[2.0], &[1.0], &mut pass).unwrap();

        let residual = w * 2.0 - 1.0;
        let grads = network.layers()[0].gradients();
        assert!((grads.weights()[0] - residual * 2.0).abs() < 1e-12);
        assert!((grads.biases()[0] - residual).abs() < 1e-12);
    }
}

// ============================================================================
// Multi Layer
// ============================================================================

mod multi_layer_tests {
    use super::*;

    #[test]
    fn test_sigmoid_mse_gradient() {
        let mut rng = SimpleRng::new(7);
        let network =
            Network::new(&[3, 4, 2], Activation::Sigmoid, WeightInitializer::Xavier, &mut rng)
                .unwrap();
        check_gradients(network, &[0.2, 0.9, -0.4], &[0.0, 1.0]);
    }

    #[test]
    fn test_tanh_mse_gradient() {
        let mut rng = SimpleRng::new(8);
        let network =
            Network::new(&[2, 3, 3, 2], Activation::Tanh, WeightInitializer::Xavier, &mut rng)
                .unwrap();
        check_gradients(network, &[1.0, -0.5], &[1.0, 0.0]);
    }

    #[test]
    fn test_sigmoid_cross_entropy_gradient() {
        let mut rng = SimpleRng::new(9);
        let mut network =
            Network::new(&[2, 3, 2], Activation::Sigmoid, WeightInitializer::Xavier, &mut rng)
                .unwrap();
        network.set_loss(Loss::CrossEntropy);
        check_gradients(network, &[0.3, 0.6], &[0.0, 1.0]);
    }
}
