use std::cmp::Ordering;

use evocar_network::{Activation, Network};

use crate::{Genotype, TrainingError};

/// A genotype bound to the feedforward network decoded from it.
///
/// The network's weights are copied from the genotype once, at construction. Later changes
/// to the genotype's parameters are not reflected in the network.
#[derive(Debug, Clone)]
pub struct Agent {
    genotype: Genotype,
    network: Network,
    alive: bool,
}

impl Agent {
    /// Builds the network for `topology` and decodes the genotype's parameters into it.
    ///
    /// Every layer uses `activation`. The agent starts out dead; call [`reset`](Self::reset)
    /// before letting it act.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::Network`] if the topology is invalid
    /// - [`TrainingError::ParameterCountMismatch`] if the genotype's parameter count differs
    ///   from the network's weight count
    pub fn new(
        genotype: Genotype,
        topology: &[usize],
        activation: Activation,
    ) -> Result<Self, TrainingError> {
        let mut network = Network::new(topology)?;
        network.set_activation(activation);

        if network.weight_count() != genotype.parameter_count() {
            return Err(TrainingError::ParameterCountMismatch {
                expected: network.weight_count(),
                actual: genotype.parameter_count(),
            });
        }
        network.set_weights(genotype.parameters())?;

        Ok(Self {
            genotype,
            network,
            alive: false,
        })
    }

    #[must_use]
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    /// Gives the evaluator write access to the genotype's scores.
    #[must_use]
    pub fn genotype_mut(&mut self) -> &mut Genotype {
        &mut self.genotype
    }

    /// Hands the genotype back, e.g. to return it to the population after evaluation.
    #[must_use]
    pub fn into_genotype(self) -> Genotype {
        self.genotype
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Revives the agent and clears its genotype's evaluation and fitness.
    pub fn reset(&mut self) {
        self.genotype.set_evaluation(0.0);
        self.genotype.set_fitness(0.0);
        self.alive = true;
    }

    /// Kills the agent.
    ///
    /// Returns `true` only if this call took the agent from alive to dead, so an evaluator
    /// counting live agents can decrement exactly once per death.
    pub fn kill(&mut self) -> bool {
        let died = self.alive;
        self.alive = false;
        died
    }

    /// Runs the agent's network on the given inputs.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::Network`] if the input count does not match the network.
    pub fn think(&self, inputs: &[f64]) -> Result<Vec<f64>, TrainingError> {
        Ok(self.network.forward(inputs)?)
    }

    /// Orders agents by their genotypes' descending fitness.
    #[must_use]
    pub fn cmp_by_fitness(&self, other: &Self) -> Ordering {
        self.genotype.cmp_by_fitness(&other.genotype)
    }
}
