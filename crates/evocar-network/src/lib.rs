//! Fully connected feedforward neural networks used as agent controllers.
//!
//! A network is described by its *topology*: the node count of every layer from the input
//! layer to the output layer. Between each pair of adjacent layers sits one [`Layer`], which
//! owns the weights of all connections to the next layer plus one bias row.
//!
//! # Weight Layout
//!
//! A layer with `n` input nodes and `m` output nodes stores an `(n + 1) × m` matrix. Row `i`
//! holds the weights from input node `i` to every output node; the last row belongs to a
//! constant bias input of `1.0`. Weights are stored row-major:
//!
//! ```text
//! [w(0,0), w(0,1), .., w(0,m-1), w(1,0), .., w(n,m-1)]
//!                                             ^^^^^^ bias row
//! ```
//!
//! A whole network is the concatenation of its layers from input to output. This flat order
//! is the contract between a genotype's parameter vector and the network, so it is used
//! for both [`Network::set_weights`] and [`Network::weights`].
//!
//! # Example
//!
//! ```
//! use evocar_network::{Activation, Network};
//!
//! let mut network = Network::new(&[2, 1]).unwrap();
//! assert_eq!(network.weight_count(), 3);
//!
//! network.set_activation(Activation::Identity);
//! network.set_weights(&[0.5, -1.0, 0.25]).unwrap();
//!
//! let outputs = network.forward(&[2.0, 1.0]).unwrap();
//! assert_eq!(outputs, vec![0.25]); // 2.0 * 0.5 + 1.0 * -1.0 + 0.25
//! ```

pub use self::{
    activation::{Activation, ParseActivationError},
    layer::Layer,
    network::Network,
};

pub mod activation;
pub mod layer;
pub mod network;

/// Errors raised when building or driving a network.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("invalid topology {topology:?}: at least two layers of non-zero size are required")]
    InvalidTopology { topology: Vec<usize> },
    #[display("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
