//! Neuroevolution of feedforward network controllers with a generational genetic algorithm.
//!
//! This crate evolves flat parameter vectors ([`Genotype`]s) that decode into the weights of
//! an [`evocar_network::Network`]. An external evaluator (for example a driving simulation)
//! scores every genotype of a generation; the [`GeneticAlgorithm`] turns those scores into
//! relative fitness and breeds the next generation.
//!
//! # How Training Works
//!
//! 1. **Population** - `population_size` random genotypes are created
//! 2. **Evaluation** - The population is handed to an [`Evaluation`] implementation, which
//!    builds an [`Agent`] per genotype, lets it act, and writes each genotype's evaluation
//! 3. **Fitness** - `fitness = evaluation / average evaluation`, population sorted best first
//! 4. **Selection** - An intermediate population is drawn from the sorted population
//! 5. **Recombination** - Offspring are bred from the intermediate population
//! 6. **Mutation** - Offspring parameters are perturbed in place
//! 7. **Repeat** - The new population is evaluated, until the termination predicate holds
//!
//! # Architecture
//!
//! ```text
//! GeneticAlgorithm ──owns──> Population (Vec<Genotype>)
//!     │  begin_evaluation(population)           ▲
//!     ▼                                         │ evaluation_finished(population)
//! Evaluation (external) ──builds──> Agent = Genotype + Network
//! ```
//!
//! The population moves *by value* between the engine and the evaluator, so a genotype
//! always has exactly one owner and the engine cannot touch it while it is being evaluated.
//!
//! # Operators
//!
//! Selection, recombination, mutation, and termination are strategy traits (see
//! [`operator`]) injected through [`Operators`]. Every operator receives the engine's random
//! number generator, so a seeded engine reproduces a run exactly.
//!
//! # Example
//!
//! ```
//! use evocar_training::{
//!     Evaluation, GeneticAlgorithm, GeneticAlgorithmParams, Genotype, Operators, TrainingError,
//!     operator::GenerationLimit,
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64Mcg;
//!
//! // Scores a genotype by the sum of its parameters.
//! #[derive(Debug, Default)]
//! struct SumEvaluation {
//!     pending: Option<Vec<Genotype>>,
//! }
//!
//! impl Evaluation for SumEvaluation {
//!     fn begin_evaluation(
//!         &mut self,
//!         _generation: u32,
//!         mut population: Vec<Genotype>,
//!     ) -> Result<(), TrainingError> {
//!         for genotype in &mut population {
//!             let sum: f64 = genotype.parameters().iter().sum();
//!             genotype.set_evaluation(sum.max(0.0));
//!         }
//!         self.pending = Some(population);
//!         Ok(())
//!     }
//! }
//!
//! let params = GeneticAlgorithmParams {
//!     population_size: 10,
//!     parameter_count: 4,
//!     ..GeneticAlgorithmParams::default()
//! };
//! let operators = Operators {
//!     termination: Some(Box::new(GenerationLimit::new(5))),
//!     ..Operators::default()
//! };
//! let mut ga = GeneticAlgorithm::new(
//!     params,
//!     operators,
//!     SumEvaluation::default(),
//!     Pcg64Mcg::seed_from_u64(0),
//! )
//! .unwrap();
//!
//! ga.start().unwrap();
//! while let Some(population) = ga.evaluator_mut().pending.take() {
//!     ga.evaluation_finished(population).unwrap();
//! }
//! assert!(ga.state().is_terminated());
//! assert_eq!(ga.generation(), 5);
//! ```

use evocar_network::NetworkError;

pub use self::{
    agent::Agent,
    genetic::{
        Evaluation, GaState, GenerationObserver, GenerationOutcome, GeneticAlgorithm,
        GeneticAlgorithmParams, Operators,
    },
    genotype::Genotype,
    statistics::{DescriptiveStats, PopulationStats},
};

pub mod agent;
pub mod genetic;
pub mod genotype;
pub mod operator;
pub mod parameters;
pub mod statistics;

/// Errors raised by genotypes, agents, operators, and the genetic algorithm engine.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("network error: {_0}")]
    Network(NetworkError),
    #[display("parameter count mismatch: network needs {expected} weights, genotype has {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },
    #[display("invalid input for operator '{operator}': {reason}")]
    InvalidOperatorInput {
        operator: &'static str,
        reason: String,
    },
    #[display("malformed genotype data: field {index} ({field:?}) is not a number")]
    MalformedData { index: usize, field: String },
    #[display("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
    #[display("population size mismatch: expected {expected} genotypes, got {actual}")]
    PopulationSizeMismatch { expected: usize, actual: usize },
    #[display("no evaluation is pending (engine state: {state:?})")]
    EvaluationNotPending { state: GaState },
    #[display("a generation is already being evaluated")]
    AlreadyRunning,
}

impl From<NetworkError> for TrainingError {
    fn from(err: NetworkError) -> Self {
        Self::Network(err)
    }
}
