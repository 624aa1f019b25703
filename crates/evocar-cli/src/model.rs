use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use evocar_network::{Activation, Network};
use evocar_training::{Agent, Genotype};
use serde::{Deserialize, Serialize};

use crate::util;

/// A trained controller: the best genotype of a training session and how to decode it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainedModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub topology: Vec<usize>,
    pub activation: Activation,
    /// Generation in which the genotype was evaluated.
    pub generation: u32,
    pub evaluation: f64,
    pub parameters: Vec<f64>,
}

impl TrainedModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("model", path)
    }

    pub fn genotype(&self) -> Genotype {
        let mut genotype = Genotype::new(self.parameters.clone());
        genotype.set_evaluation(self.evaluation);
        genotype
    }

    pub fn to_agent(&self) -> anyhow::Result<Agent> {
        Agent::new(self.genotype(), &self.topology, self.activation).with_context(|| {
            format!(
                "Model {} does not fit topology {:?} ({} weights)",
                self.name,
                self.topology,
                Network::weight_count_of(&self.topology)
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(parameters: Vec<f64>) -> TrainedModel {
        TrainedModel {
            name: "test".to_owned(),
            trained_at: Utc::now(),
            topology: vec![2, 1],
            activation: Activation::Identity,
            generation: 12,
            evaluation: 0.5,
            parameters,
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let model = model(vec![0.5, -1.0, 0.25]);
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains(r#""activation":"identity""#));
        let parsed: TrainedModel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, model);
    }

    #[test]
    fn test_to_agent() {
        let agent = model(vec![0.5, -1.0, 0.25]).to_agent().unwrap();
        assert_eq!(agent.think(&[2.0, 1.0]).unwrap(), vec![0.25]);
        assert_eq!(agent.genotype().evaluation(), 0.5);

        assert!(model(vec![0.5]).to_agent().is_err());
    }
}
