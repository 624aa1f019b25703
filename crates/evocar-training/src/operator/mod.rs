//! Strategy traits for the genetic operators and their reference implementations.
//!
//! The [`GeneticAlgorithm`](crate::GeneticAlgorithm) delegates every breeding step to a
//! trait object configured in [`Operators`](crate::Operators):
//!
//! | Step          | Trait             | Implementations                                          |
//! |---------------|-------------------|----------------------------------------------------------|
//! | Selection     | [`Selection`]     | [`EliteSelection`], [`RemainderStochasticSampling`]      |
//! | Recombination | [`Recombination`] | [`UniformCrossover`]                                     |
//! | Mutation      | [`Mutation`]      | [`UniformMutation`]                                      |
//! | Termination   | [`Termination`]   | [`GenerationLimit`], [`TargetEvaluation`]                |
//!
//! Operators are stateless: they take `&self` and borrow the engine's random number
//! generator as `&mut dyn RngCore`, so one seeded generator drives a whole run.
//!
//! Every operator has a [`name`](Selection::name), which training logs record to identify
//! the configuration of a run.

use std::fmt;

use rand::RngCore;

use crate::{Genotype, TrainingError};

pub use self::{
    mutation::UniformMutation,
    recombination::UniformCrossover,
    selection::{EliteSelection, RemainderStochasticSampling},
    termination::{GenerationLimit, TargetEvaluation},
};

mod mutation;
mod recombination;
mod selection;
mod termination;

/// Draws the intermediate population from an evaluated population.
pub trait Selection: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Selects genotypes from `sorted`, which is ordered by descending fitness.
    ///
    /// The returned genotypes are fresh copies with evaluation and fitness of zero.
    fn select(&self, sorted: &[Genotype], rng: &mut dyn RngCore) -> Vec<Genotype>;
}

/// Breeds the next population from the intermediate population.
pub trait Recombination: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Produces exactly `target_size` genotypes from `intermediate`.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidOperatorInput`] if `intermediate` cannot be recombined.
    fn recombine(
        &self,
        intermediate: Vec<Genotype>,
        target_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Genotype>, TrainingError>;
}

/// Perturbs a freshly bred population in place.
pub trait Mutation: fmt::Debug {
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidOperatorInput`] if the operator is misconfigured.
    fn mutate(&self, population: &mut [Genotype], rng: &mut dyn RngCore)
    -> Result<(), TrainingError>;
}

/// Decides whether the run ends after a generation has been evaluated.
pub trait Termination: fmt::Debug {
    fn name(&self) -> &'static str;

    /// `sorted` is the evaluated population of `generation`, ordered by descending fitness.
    fn should_terminate(&self, generation: u32, sorted: &[Genotype]) -> bool;
}

fn check_probability(
    operator: &'static str,
    what: &str,
    probability: f64,
) -> Result<(), TrainingError> {
    if (0.0..=1.0).contains(&probability) {
        Ok(())
    } else {
        Err(TrainingError::InvalidOperatorInput {
            operator,
            reason: format!("{what} must be within [0, 1], got {probability}"),
        })
    }
}
