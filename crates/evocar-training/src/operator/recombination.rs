use rand::{RngCore, seq::index};

use crate::{Genotype, TrainingError, parameters};

use super::{Recombination, check_probability};

/// Uniform crossover between randomly paired parents.
///
/// The first two genotypes of the intermediate population are moved into the new
/// population unchanged. The remaining slots are filled with offspring of two distinct,
/// randomly chosen intermediate genotypes: each gene is swapped between the two offspring
/// with probability `swap_probability`. If only one slot remains, the second offspring is
/// dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformCrossover {
    pub swap_probability: f64,
}

impl Default for UniformCrossover {
    fn default() -> Self {
        Self {
            swap_probability: 0.6,
        }
    }
}

impl Recombination for UniformCrossover {
    fn name(&self) -> &'static str {
        "uniform_crossover"
    }

    fn recombine(
        &self,
        intermediate: Vec<Genotype>,
        target_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Genotype>, TrainingError> {
        if intermediate.len() < 2 {
            return Err(TrainingError::InvalidOperatorInput {
                operator: self.name(),
                reason: format!(
                    "intermediate population needs at least 2 genotypes, got {}",
                    intermediate.len()
                ),
            });
        }
        check_probability(self.name(), "swap probability", self.swap_probability)?;

        let carried = target_size.min(2);
        let offspring_count = target_size - carried;

        let mut offspring = Vec::with_capacity(offspring_count);
        while offspring.len() < offspring_count {
            let pair = index::sample(rng, intermediate.len(), 2);
            let (p1, p2) = (&intermediate[pair.index(0)], &intermediate[pair.index(1)]);
            let (o1, o2) = parameters::complete_crossover(
                p1.parameters(),
                p2.parameters(),
                self.swap_probability,
                rng,
            );
            offspring.push(Genotype::new(o1));
            if offspring.len() < offspring_count {
                offspring.push(Genotype::new(o2));
            }
        }

        let mut next = intermediate.into_iter().take(carried).collect::<Vec<_>>();
        next.append(&mut offspring);
        Ok(next)
    }
}
