use rand::{Rng as _, RngCore};

use crate::{Genotype, TrainingError, parameters};

use super::{Mutation, check_probability};

/// Uniform mutation of all but the leading genotypes.
///
/// The first `skip_elites` genotypes are left untouched. Every other genotype is mutated
/// with probability `genotype_probability`; a mutated genotype has each gene shifted, with
/// probability `gene_probability`, by a uniform delta in `[-amount, amount)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformMutation {
    pub skip_elites: usize,
    pub genotype_probability: f64,
    pub gene_probability: f64,
    pub amount: f64,
}

impl UniformMutation {
    /// Mutates every genotype except the first two, which recombination carries over.
    #[must_use]
    pub fn all_but_best_two() -> Self {
        Self {
            skip_elites: 2,
            genotype_probability: 1.0,
            gene_probability: 0.3,
            amount: 2.0,
        }
    }

    /// Mutates every genotype.
    #[must_use]
    pub fn all() -> Self {
        Self {
            skip_elites: 0,
            ..Self::all_but_best_two()
        }
    }
}

impl Default for UniformMutation {
    fn default() -> Self {
        Self::all_but_best_two()
    }
}

impl Mutation for UniformMutation {
    fn name(&self) -> &'static str {
        "uniform_mutation"
    }

    fn mutate(
        &self,
        population: &mut [Genotype],
        rng: &mut dyn RngCore,
    ) -> Result<(), TrainingError> {
        check_probability(self.name(), "genotype probability", self.genotype_probability)?;
        check_probability(self.name(), "gene probability", self.gene_probability)?;

        for genotype in population.iter_mut().skip(self.skip_elites) {
            if rng.random_bool(self.genotype_probability) {
                parameters::mutate(
                    genotype.parameters_mut(),
                    self.gene_probability,
                    self.amount,
                    rng,
                );
            }
        }
        Ok(())
    }
}
