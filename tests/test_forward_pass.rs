// Tests for forward propagation: hand-built fixtures, determinism and
// classification by argmax.

use approx::assert_relative_eq;
use neural_classifier::layers::DenseLayer;
use neural_classifier::utils::{Activation, Loss, SimpleRng, WeightInitializer};
use neural_classifier::{Dataset, ForwardPass, Network, TrainingConfig};

fn fixture_network(activation: Activation) -> Network {
    let layer = DenseLayer::from_parameters(2, 1, vec![1.0, -1.0], vec![0.0], activation).unwrap();
    Network::from_layers(
        vec![layer],
        Loss::MeanSquaredError,
        WeightInitializer::Xavier,
        TrainingConfig::default(),
    )
    .unwrap()
}

// ============================================================================
// Fixture Tests
// ============================================================================

mod fixture_tests {
    use super::*;

    #[test]
    fn test_linear_weighted_input() {
        let network = fixture_network(Activation::Linear);
        let mut pass = ForwardPass::new(&network);
        network.forward_into(&[3.0, 1.0], &mut pass);

        assert_eq!(pass.cache(0).weighted_inputs(), &[2.0]);
        assert_eq!(pass.output(), &[2.0]);
    }

    #[test]
    fn test_sigmoid_output() {
        let mut network = fixture_network(Activation::Linear);
        network.set_activation(Activation::Sigmoid);

        let output = network.forward(&[3.0, 1.0]).unwrap();
        assert_relative_eq!(output[0], 0.8808, epsilon = 1e-4);
        assert_relative_eq!(output[0], 1.0 / (1.0 + (-2.0f64).exp()), epsilon = 1e-15);
    }

    #[test]
    fn test_two_layer_by_hand() {
        // hidden: z = [x0 + x1, x0 - x1], ReLU
        let hidden = DenseLayer::from_parameters(
            2,
            2,
            vec![1.0, 1.0, 1.0, -1.0],
            vec![0.0, 0.0],
            Activation::ReLU,
        )
        .unwrap();
        // output: y = [h0 + 0.5, -h1]
        let output = DenseLayer::from_parameters(
            2,
            2,
            vec![1.0, 0.0, 0.0, -1.0],
            vec![0.5, 0.0],
            Activation::Linear,
        )
        .unwrap();
        let network = Network::from_layers(
            vec![hidden, output],
            Loss::MeanSquaredError,
            WeightInitializer::Xavier,
            TrainingConfig::default(),
        )
        .unwrap();

        // h = relu([1, -3]) = [1, 0]; y = [1.5, 0]
        assert_eq!(network.forward(&[-1.0, 2.0]).unwrap(), vec![1.5, 0.0]);
        assert_eq!(network.classify(&[-1.0, 2.0]).unwrap(), 0);
    }
}

// ============================================================================
// Determinism Tests
// ============================================================================

mod determinism_tests {
    use super::*;

    #[test]
    fn test_forward_is_bit_identical() {
        let mut rng = SimpleRng::new(42);
        let network =
            Network::new(&[5, 7, 3], Activation::Tanh, WeightInitializer::Xavier, &mut rng)
                .unwrap();
        let input = [0.3, -1.2, 0.0, 4.5, 0.01];

        let first = network.forward(&input).unwrap();
        let second = network.forward(&input).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_reused_workspace_matches_fresh_one() {
        let mut rng = SimpleRng::new(7);
        let network =
            Network::new(&[3, 4, 2], Activation::Sigmoid, WeightInitializer::Xavier, &mut rng)
                .unwrap();
        let mut pass = ForwardPass::new(&network);

        network.forward_into(&[9.0, 9.0, 9.0], &mut pass);
        network.forward_into(&[0.1, 0.2, 0.3], &mut pass);
        assert_eq!(pass.output(), network.forward(&[0.1, 0.2, 0.3]).unwrap().as_slice());
    }
}

// ============================================================================
// Classification Tests
// ============================================================================

mod classification_tests {
    use super::*;

    #[test]
    fn test_ties_pick_lowest_index() {
        let layer = DenseLayer::from_parameters(
            1,
            3,
            vec![0.0, 0.0, 0.0],
            vec![0.2, 0.7, 0.7],
            Activation::Linear,
        )
        .unwrap();
        let network = Network::from_layers(
            vec![layer],
            Loss::MeanSquaredError,
            WeightInitializer::Xavier,
            TrainingConfig::default(),
        )
        .unwrap();

        assert_eq!(network.classify(&[1.0]).unwrap(), 1);
    }

    #[test]
    fn test_classify_rejects_wrong_width() {
        let network = fixture_network(Activation::Sigmoid);
        assert!(network.classify(&[1.0]).unwrap_err().is_input_error());
        assert!(network
            .classify(&[1.0, f64::INFINITY])
            .unwrap_err()
            .is_input_error());
    }

    #[test]
    fn test_classify_all_matches_classify() {
        let mut rng = SimpleRng::new(13);
        let network =
            Network::new(&[2, 5, 3], Activation::Sigmoid, WeightInitializer::Xavier, &mut rng)
                .unwrap();
        let inputs = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![-2.0, 0.5]];

        let all = network.classify_all(&inputs).unwrap();
        for (row, &label) in inputs.iter().zip(all.iter()) {
            assert_eq!(network.classify(row).unwrap(), label);
        }
        assert!(network
            .classify_all(&[vec![0.0, 1.0], vec![0.0]])
            .unwrap_err()
            .is_input_error());
    }

    #[test]
    fn test_accuracy_is_a_fraction() {
        let mut rng = SimpleRng::new(21);
        let network =
            Network::new(&[2, 3, 4], Activation::ReLU, WeightInitializer::RandomUniform, &mut rng)
                .unwrap();

        for n in 1..12 {
            let features: Vec<Vec<f64>> = (0..n)
                .map(|i| vec![i as f64 * 0.3, 1.0 - i as f64 * 0.1])
                .collect();
            let labels: Vec<usize> = (0..n).map(|i| i % 4).collect();
            let dataset = Dataset::new(features, labels).unwrap();

            let accuracy = network.evaluate_accuracy(&dataset).unwrap();
            assert!((0.0..=1.0).contains(&accuracy));
        }
    }

    #[test]
    fn test_accuracy_rejects_out_of_range_label() {
        let network = fixture_network(Activation::Sigmoid);
        let dataset = Dataset::new(vec![vec![1.0, 2.0]], vec![1]).unwrap();
        assert!(network.evaluate_accuracy(&dataset).unwrap_err().is_input_error());
    }
}
