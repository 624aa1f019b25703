use std::fmt;

use rand::Rng;

use crate::{Activation, NetworkError};

/// One fully connected layer: the connections from `node_count` nodes (plus a bias node) to
/// the `output_count` nodes of the next layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    node_count: usize,
    output_count: usize,
    /// Row-major `(node_count + 1) × output_count` matrix, last row is the bias.
    weights: Vec<f64>,
    activation: Activation,
}

impl Layer {
    /// Creates a layer with all weights set to zero and the default activation.
    #[must_use]
    pub fn new(node_count: usize, output_count: usize) -> Self {
        Self {
            node_count,
            output_count,
            weights: vec![0.0; (node_count + 1) * output_count],
            activation: Activation::default(),
        }
    }

    /// Number of input nodes, not counting the bias node.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of nodes in the next layer.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Number of weights stored by this layer, `(node_count + 1) * output_count`.
    #[must_use]
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    /// Returns the flat row-major weight matrix.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the weight of the connection from input node `i` to output node `j`.
    ///
    /// `i == node_count()` addresses the bias row.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    #[must_use]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        assert!(i <= self.node_count && j < self.output_count);
        self.weights[i * self.output_count + j]
    }

    /// Replaces all weights of this layer.
    ///
    /// Values are taken in neuron order: for a layer with two inputs and three outputs,
    /// values `[0..3]` connect input 0 to outputs 0-2, values `[3..6]` connect input 1, and
    /// `[6..9]` are the bias weights.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<(), NetworkError> {
        if weights.len() != self.weights.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.weights.len(),
                actual: weights.len(),
            });
        }
        self.weights.copy_from_slice(weights);
        Ok(())
    }

    /// Sets every weight to a random value in `[min, max)`.
    pub fn set_random_weights<R>(&mut self, rng: &mut R, min: f64, max: f64)
    where
        R: Rng + ?Sized,
    {
        let range = (max - min).abs();
        for w in &mut self.weights {
            *w = min + rng.random::<f64>() * range;
        }
    }

    /// Computes this layer's outputs for the given inputs.
    ///
    /// A constant `1.0` bias input is appended before the weighted sums are taken; the
    /// activation function is then applied to every sum.
    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.node_count {
            return Err(NetworkError::DimensionMismatch {
                expected: self.node_count,
                actual: inputs.len(),
            });
        }

        let mut sums = vec![0.0; self.output_count];
        if self.output_count == 0 {
            return Ok(sums);
        }

        let biased_inputs = inputs.iter().copied().chain([1.0]);
        for (input, row) in biased_inputs.zip(self.weights.chunks_exact(self.output_count)) {
            for (sum, w) in sums.iter_mut().zip(row) {
                *sum += input * w;
            }
        }

        for sum in &mut sums {
            *sum = self.activation.apply(*sum);
        }
        Ok(sums)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..=self.node_count {
            for j in 0..self.output_count {
                write!(f, "[{i},{j}]: {}", self.weight(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn test_new_layer_has_bias_row() {
        let layer = Layer::new(3, 2);
        assert_eq!(layer.weight_count(), 8);
        assert!(layer.weights().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_set_weights_row_major() {
        let mut layer = Layer::new(2, 3);
        let values = (0..9_u32).map(f64::from).collect::<Vec<_>>();
        layer.set_weights(&values).unwrap();

        assert_eq!(layer.weight(0, 0), 0.0);
        assert_eq!(layer.weight(0, 2), 2.0);
        assert_eq!(layer.weight(1, 0), 3.0);
        // bias row
        assert_eq!(layer.weight(2, 1), 7.0);
    }

    #[test]
    fn test_set_weights_rejects_wrong_length() {
        let mut layer = Layer::new(2, 3);
        let err = layer.set_weights(&[0.0; 8]).unwrap_err();
        assert_eq!(
            err,
            NetworkError::DimensionMismatch {
                expected: 9,
                actual: 8
            }
        );
        // nothing was copied
        assert!(layer.weights().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_forward_adds_bias() {
        let mut layer = Layer::new(2, 2);
        layer.set_activation(Activation::Identity);
        // rows: input 0, input 1, bias
        layer
            .set_weights(&[1.0, 0.0, 0.0, 1.0, 10.0, -10.0])
            .unwrap();
        assert_eq!(layer.forward(&[2.0, 3.0]).unwrap(), vec![12.0, -7.0]);
    }

    #[test]
    fn test_forward_rejects_wrong_input_count() {
        let layer = Layer::new(2, 2);
        assert!(matches!(
            layer.forward(&[1.0]),
            Err(NetworkError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_random_weights_in_range() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let mut layer = Layer::new(4, 4);
        layer.set_random_weights(&mut rng, -0.5, 0.5);
        assert!(layer.weights().iter().all(|w| (-0.5..0.5).contains(w)));
    }

    #[test]
    fn test_display_lists_every_weight() {
        let mut layer = Layer::new(1, 1);
        layer.set_weights(&[0.5, -1.0]).unwrap();
        assert_eq!(layer.to_string(), "[0,0]: 0.5\n[1,0]: -1\n");
    }
}
