use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Activation function applied to every output neuron of a layer.
///
/// Variants parse case-insensitively from their names, with or without underscores, so
/// both the serialized form (`"soft_sign"`) and `"softsign"` select [`Activation::SoftSign`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Logistic function `1 / (1 + e^-x)`, range `(0, 1)`.
    #[default]
    Sigmoid,
    /// Soft sign `x / (1 + |x|)`, range `(-1, 1)`.
    SoftSign,
    /// No activation: the weighted sum is passed through unchanged.
    Identity,
}

impl Activation {
    /// Applies the activation function to a weighted sum.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => sigmoid(x),
            Self::SoftSign => soft_sign(x),
            Self::Identity => x,
        }
    }

    /// Returns the open interval the function maps into, if it is bounded.
    #[must_use]
    pub fn range(self) -> Option<(f64, f64)> {
        match self {
            Self::Sigmoid => Some((0.0, 1.0)),
            Self::SoftSign => Some((-1.0, 1.0)),
            Self::Identity => None,
        }
    }
}

/// Error returned when parsing an unknown activation function name.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown activation function {name:?} (expected sigmoid, soft_sign or identity)")]
pub struct ParseActivationError {
    name: String,
}

impl FromStr for Activation {
    type Err = ParseActivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().replace('_', "").to_ascii_lowercase();
        match key.as_str() {
            "sigmoid" => Ok(Self::Sigmoid),
            "softsign" => Ok(Self::SoftSign),
            "identity" => Ok(Self::Identity),
            _ => Err(ParseActivationError { name: s.to_owned() }),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn soft_sign(x: f64) -> f64 {
    x / (1.0 + x.abs())
}
