//! Genotypes: the evolvable parameter vectors of the genetic algorithm.
//!
//! A [`Genotype`] holds a fixed-length vector of `f64` parameters together with two scores:
//!
//! - **evaluation** - the raw score written by the external evaluator (e.g. track completion)
//! - **fitness** - the engine-assigned relative score, `evaluation / average evaluation`
//!
//! # Text Record Format
//!
//! Genotypes are persisted as a single text record with the parameters joined by `;`:
//!
//! ```text
//! 0.25;-1.5;0.0078125
//! ```
//!
//! Values use Rust's shortest round-trip float formatting, which is locale invariant, so
//! [`Genotype::from_record`] restores every parameter bit for bit. An empty record is the
//! genotype with no parameters.

use std::{
    cmp::Ordering,
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{TrainingError, parameters};

/// Delimiter between parameters in the text record format.
pub const RECORD_DELIMITER: char = ';';

/// One member of a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genotype {
    parameters: Vec<f64>,
    evaluation: f64,
    fitness: f64,
}

impl Genotype {
    /// Creates a genotype from a parameter vector, with evaluation and fitness of zero.
    #[must_use]
    pub fn new(parameters: Vec<f64>) -> Self {
        Self {
            parameters,
            evaluation: 0.0,
            fitness: 0.0,
        }
    }

    /// Creates a genotype whose parameters are drawn uniformly from `[min, max)`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn random<R>(parameter_count: usize, min: f64, max: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(parameters::random(rng, min, max, parameter_count))
    }

    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Returns the parameters for in-place modification.
    ///
    /// The slice cannot change the parameter count.
    #[must_use]
    pub fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.parameters
    }

    /// Returns an independent copy of the parameter vector.
    #[must_use]
    pub fn copy_parameters(&self) -> Vec<f64> {
        self.parameters.clone()
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn evaluation(&self) -> f64 {
        self.evaluation
    }

    pub fn set_evaluation(&mut self, evaluation: f64) {
        self.evaluation = evaluation;
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Orders genotypes by descending fitness: `Less` means `self` comes first.
    ///
    /// Incomparable values (NaN) are treated as equal.
    #[must_use]
    pub fn cmp_by_fitness(&self, other: &Self) -> Ordering {
        other
            .fitness
            .partial_cmp(&self.fitness)
            .unwrap_or(Ordering::Equal)
    }

    /// Serializes the parameters into a `;`-separated text record.
    #[must_use]
    pub fn to_record(&self) -> String {
        self.to_string()
    }

    /// Parses a genotype from a `;`-separated text record.
    ///
    /// Surrounding whitespace of the record and of each field is ignored. An empty record
    /// yields a genotype without parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::MalformedData`] naming the first field that is not a number.
    pub fn from_record(record: &str) -> Result<Self, TrainingError> {
        let record = record.trim();
        if record.is_empty() {
            return Ok(Self::new(vec![]));
        }
        let parameters = record
            .split(RECORD_DELIMITER)
            .enumerate()
            .map(|(index, field)| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| TrainingError::MalformedData {
                        index,
                        field: field.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(parameters))
    }
}

/// Sorts a population by descending fitness.
///
/// The sort is stable: genotypes of equal fitness keep their relative order.
pub fn sort_by_fitness(population: &mut [Genotype]) {
    population.sort_by(Genotype::cmp_by_fitness);
}

impl Index<usize> for Genotype {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.parameters[index]
    }
}

impl IndexMut<usize> for Genotype {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.parameters[index]
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, "{RECORD_DELIMITER}")?;
            }
            write!(f, "{param}")?;
        }
        Ok(())
    }
}

impl FromStr for Genotype {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_record(s)
    }
}
