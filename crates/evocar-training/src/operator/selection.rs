use rand::{Rng as _, RngCore};

use crate::Genotype;

use super::Selection;

/// Selects `copies` copies of the best genotype.
#[derive(Debug, Clone, PartialEq)]
pub struct EliteSelection {
    pub copies: usize,
}

impl Default for EliteSelection {
    fn default() -> Self {
        Self { copies: 3 }
    }
}

impl Selection for EliteSelection {
    fn name(&self) -> &'static str {
        "elite_selection"
    }

    fn select(&self, sorted: &[Genotype], _rng: &mut dyn RngCore) -> Vec<Genotype> {
        let Some(best) = sorted.first() else {
            return vec![];
        };
        (0..self.copies)
            .map(|_| Genotype::new(best.copy_parameters()))
            .collect()
    }
}

/// Remainder stochastic sampling.
///
/// Every genotype receives `floor(fitness)` copies deterministically; then each genotype
/// receives one more copy with probability equal to the fractional part of its fitness.
/// Since fitness is normalized by the population average, the expected size of the result
/// equals the population size.
///
/// The input must be sorted by descending fitness: the deterministic pass stops at the
/// first genotype with fitness below 1. Genotypes with fitness of 0 or less are never
/// selected.
///
/// Negative evaluations can push the population average towards 0 and the fitness of the
/// remaining genotypes far beyond the population size. The deterministic pass therefore
/// grants a genotype at most `sorted.len()` copies, a bound that non-negative evaluations
/// never reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemainderStochasticSampling;

impl Selection for RemainderStochasticSampling {
    fn name(&self) -> &'static str {
        "remainder_stochastic_sampling"
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn select(&self, sorted: &[Genotype], rng: &mut dyn RngCore) -> Vec<Genotype> {
        let mut intermediate = vec![];

        for genotype in sorted {
            let fitness = genotype.fitness();
            if fitness.is_nan() || fitness < 1.0 {
                break;
            }
            let copies = (fitness.trunc() as usize).min(sorted.len());
            intermediate
                .extend((0..copies).map(|_| Genotype::new(genotype.copy_parameters())));
        }

        for genotype in sorted {
            let fitness = genotype.fitness();
            if fitness.is_nan() || fitness <= 0.0 {
                continue;
            }
            let remainder = fitness - fitness.trunc();
            if rng.random::<f64>() < remainder {
                intermediate.push(Genotype::new(genotype.copy_parameters()));
            }
        }

        intermediate
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn population(fitnesses: &[f64]) -> Vec<Genotype> {
        fitnesses
            .iter()
            .enumerate()
            .map(|(i, &fitness)| {
                let mut genotype = Genotype::new(vec![f64::from(u32::try_from(i).unwrap())]);
                genotype.set_evaluation(fitness);
                genotype.set_fitness(fitness);
                genotype
            })
            .collect()
    }

    fn count_of(intermediate: &[Genotype], id: f64) -> usize {
        intermediate.iter().filter(|g| g[0] == id).count()
    }

    #[test]
    fn test_elite_copies_best() {
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let sorted = population(&[2.0, 1.0, 0.0]);
        let selected = EliteSelection::default().select(&sorted, &mut rng);

        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|g| g.parameters() == sorted[0].parameters()));
        assert!(selected.iter().all(|g| g.fitness() == 0.0 && g.evaluation() == 0.0));
        assert_ne!(selected[0].parameters().as_ptr(), sorted[0].parameters().as_ptr());
    }

    #[test]
    fn test_elite_of_empty_population() {
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        assert!(EliteSelection::default().select(&[], &mut rng).is_empty());
    }

    #[test]
    fn test_remainder_sampling_distribution() {
        const TRIALS: u32 = 4000;

        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let sorted = population(&[2.5, 1.0, 0.4]);

        let mut first_extra = 0;
        let mut third = 0;
        for _ in 0..TRIALS {
            let selected = RemainderStochasticSampling.select(&sorted, &mut rng);

            let first = count_of(&selected, 0.0);
            assert!(first == 2 || first == 3, "first selected {first} times");
            assert_eq!(count_of(&selected, 1.0), 1);
            let third_count = count_of(&selected, 2.0);
            assert!(third_count <= 1);

            first_extra += u32::from(first == 3);
            third += u32::try_from(third_count).unwrap();
        }

        let first_rate = f64::from(first_extra) / f64::from(TRIALS);
        let third_rate = f64::from(third) / f64::from(TRIALS);
        assert!((first_rate - 0.5).abs() < 0.05, "rate {first_rate}");
        assert!((third_rate - 0.4).abs() < 0.05, "rate {third_rate}");
    }

    #[test]
    fn test_remainder_sampling_skips_non_positive_fitness() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let sorted = population(&[0.0, -0.5, 0.0]);
        for _ in 0..100 {
            assert!(RemainderStochasticSampling.select(&sorted, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_remainder_sampling_integer_fitness_is_deterministic() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let sorted = population(&[2.0, 1.0, 0.0]);
        let selected = RemainderStochasticSampling.select(&sorted, &mut rng);
        let ids = selected.iter().map(|g| g[0]).collect::<Vec<_>>();
        assert_eq!(ids, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_remainder_sampling_bounds_copies_of_huge_fitness() {
        // evaluations [1.0, -0.99999999] average to 5e-9
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let sorted = population(&[2e8, -1.999_999_98e8]);
        let selected = RemainderStochasticSampling.select(&sorted, &mut rng);
        assert_eq!(count_of(&selected, 0.0), 2);
        assert_eq!(count_of(&selected, 1.0), 0);
    }
}
