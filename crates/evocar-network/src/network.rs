use std::fmt;

use rand::Rng;

use crate::{Activation, Layer, NetworkError};

/// A fully connected feedforward neural network.
///
/// The network owns its layers outright, so [`Clone`] yields an independent deep copy with
/// the same topology, weights, and activation functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    topology: Vec<usize>,
    layers: Vec<Layer>,
}

impl Network {
    /// Creates a network with the given topology and all weights set to zero.
    ///
    /// `topology` lists the node count of each layer from input to output layer.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidTopology`] if there are fewer than two layers or a
    /// layer has no nodes.
    pub fn new(topology: &[usize]) -> Result<Self, NetworkError> {
        if topology.len() < 2 || topology.contains(&0) {
            return Err(NetworkError::InvalidTopology {
                topology: topology.to_vec(),
            });
        }
        let layers = topology
            .windows(2)
            .map(|pair| Layer::new(pair[0], pair[1]))
            .collect();
        Ok(Self {
            topology: topology.to_vec(),
            layers,
        })
    }

    /// Number of weights a topology needs, `Σ (in + 1) * out` over adjacent layers.
    #[must_use]
    pub fn weight_count_of(topology: &[usize]) -> usize {
        topology
            .windows(2)
            .map(|pair| (pair[0] + 1) * pair[1])
            .sum()
    }

    #[must_use]
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Total number of weights over all layers.
    #[must_use]
    pub fn weight_count(&self) -> usize {
        self.layers.iter().map(Layer::weight_count).sum()
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        self.topology[0]
    }

    #[must_use]
    pub fn output_count(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    /// Sets the activation function of every layer.
    pub fn set_activation(&mut self, activation: Activation) {
        for layer in &mut self.layers {
            layer.set_activation(activation);
        }
    }

    /// Returns all weights concatenated from input to output layer.
    #[must_use]
    pub fn weights(&self) -> Vec<f64> {
        self.layers
            .iter()
            .flat_map(|layer| layer.weights().iter().copied())
            .collect()
    }

    /// Replaces all weights of the network.
    ///
    /// `weights` is split into consecutive per-layer blocks, input layer first, each in the
    /// row-major order of [`Layer::set_weights`].
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DimensionMismatch`] if `weights.len()` differs from
    /// [`weight_count`](Self::weight_count). No layer is modified in that case.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<(), NetworkError> {
        let expected = self.weight_count();
        if weights.len() != expected {
            return Err(NetworkError::DimensionMismatch {
                expected,
                actual: weights.len(),
            });
        }
        let mut rest = weights;
        for layer in &mut self.layers {
            let (head, tail) = rest.split_at(layer.weight_count());
            layer.set_weights(head)?;
            rest = tail;
        }
        Ok(())
    }

    /// Sets every weight of every layer to a random value in `[min, max)`.
    pub fn set_random_weights<R>(&mut self, rng: &mut R, min: f64, max: f64)
    where
        R: Rng + ?Sized,
    {
        for layer in &mut self.layers {
            layer.set_random_weights(rng, min, max);
        }
    }

    /// Returns a network with the same topology and activation functions but zeroed weights.
    #[must_use]
    pub fn topology_copy(&self) -> Self {
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                let mut copy = Layer::new(layer.node_count(), layer.output_count());
                copy.set_activation(layer.activation());
                copy
            })
            .collect();
        Self {
            topology: self.topology.clone(),
            layers,
        }
    }

    /// Propagates the inputs through all layers and returns the output layer's values.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DimensionMismatch`] if `inputs.len()` differs from the input
    /// layer's node count.
    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.input_count() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.input_count(),
                actual: inputs.len(),
            });
        }
        let mut outputs = inputs.to_vec();
        for layer in &self.layers {
            outputs = layer.forward(&outputs)?;
        }
        Ok(outputs)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "Layer {i}:")?;
            write!(f, "{layer}")?;
        }
        Ok(())
    }
}
