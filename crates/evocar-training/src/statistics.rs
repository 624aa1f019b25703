//! Per-generation statistics of a population.
//!
//! The engine computes a [`PopulationStats`] after every fitness calculation and returns it
//! with the [`GenerationOutcome`](crate::GenerationOutcome), so callers can track training
//! progress without inspecting the population themselves.

use crate::Genotype;

/// Descriptive statistics summarizing a dataset of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// `std_dev / (max - min)`, or 0 when all values are equal.
    pub normalized_std_dev: f64,
}

impl DescriptiveStats {
    /// Computes statistics from unsorted values.
    ///
    /// Returns `None` if there are no values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use evocar_training::DescriptiveStats;
    /// let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let median = values[values.len() / 2];
        let std_dev = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        let range = max - min;
        let normalized_std_dev = if range > 0.0 { std_dev / range } else { 0.0 };

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev,
            normalized_std_dev,
        })
    }
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationStats {
    pub generation: u32,
    /// Statistics of the raw evaluations.
    pub evaluation: DescriptiveStats,
    /// Fitness of the best genotype.
    pub best_fitness: f64,
    /// Mean over all parameter positions of the normalized standard deviation across the
    /// population. Drops towards 0 as the population converges.
    pub diversity: f64,
}

impl PopulationStats {
    /// Computes statistics of a population sorted by descending fitness.
    ///
    /// Returns `None` for an empty population.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(generation: u32, population: &[Genotype]) -> Option<Self> {
        let evaluation = DescriptiveStats::new(population.iter().map(Genotype::evaluation))?;
        let best_fitness = population.first()?.fitness();

        let parameter_count = population[0].parameter_count();
        let diversity = if parameter_count == 0 {
            0.0
        } else {
            (0..parameter_count)
                .filter_map(|i| DescriptiveStats::new(population.iter().map(|g| g[i])))
                .map(|s| s.normalized_std_dev)
                .sum::<f64>()
                / parameter_count as f64
        };

        Some(Self {
            generation,
            evaluation,
            best_fitness,
            diversity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(std::iter::empty()).is_none());
        assert!(PopulationStats::from_sorted(1, &[]).is_none());
    }

    #[test]
    fn test_constant_values() {
        let stats = DescriptiveStats::new([2.0; 4]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.normalized_std_dev, 0.0);
    }

    #[test]
    fn test_std_dev() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std_dev, 2.0);
        assert_eq!(stats.normalized_std_dev, 2.0 / 7.0);
    }

    #[test]
    fn test_population_stats() {
        let mut population = vec![
            Genotype::new(vec![1.0, 0.0]),
            Genotype::new(vec![1.0, 1.0]),
            Genotype::new(vec![1.0, 0.5]),
        ];
        for (genotype, evaluation) in population.iter_mut().zip([0.9, 0.6, 0.3]) {
            genotype.set_evaluation(evaluation);
            genotype.set_fitness(evaluation / 0.6);
        }

        let stats = PopulationStats::from_sorted(7, &population).unwrap();
        assert_eq!(stats.generation, 7);
        assert_eq!(stats.evaluation.max, 0.9);
        assert_eq!(stats.evaluation.min, 0.3);
        assert_eq!(stats.best_fitness, 0.9 / 0.6);
        // first parameter is constant, second spans [0, 1]
        let second = DescriptiveStats::new([0.0, 1.0, 0.5]).unwrap();
        assert_eq!(stats.diversity, second.normalized_std_dev / 2.0);
    }
}
