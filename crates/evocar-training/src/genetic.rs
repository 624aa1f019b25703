//! The generational genetic algorithm engine.
//!
//! [`GeneticAlgorithm`] is a state machine driven from the outside. It never evaluates
//! genotypes itself: it hands the population to an [`Evaluation`] and waits until the caller
//! returns the evaluated population through [`GeneticAlgorithm::evaluation_finished`].
//!
//! # State Machine
//!
//! ```text
//!          start()
//!   Idle ──────────> Evaluating ──evaluation_finished()──> Selecting ──> Recombining
//!    ▲                   ▲                   │                               │
//!    │ operator error    │                   │ termination                   ▼
//!    └───────────────────┼───────────────────┼──────────────────────────  Mutating
//!                        │                   ▼                               │
//!                        │              Terminated ──restart()──> Evaluating │
//!                        └───────────────────────────────────────────────────┘
//! ```
//!
//! `Selecting`, `Recombining`, and `Mutating` are transient: they only exist within a
//! single call to `evaluation_finished`.
//!
//! # Fitness
//!
//! Fitness is the evaluation relative to the population average,
//! `fitness_i = evaluation_i / mean(evaluation)`. The average fitness is therefore 1, which
//! is what [`RemainderStochasticSampling`](crate::operator::RemainderStochasticSampling)
//! relies on. A population whose evaluations average to 0 gets a fitness of 0 throughout.
//!
//! # Observers
//!
//! [`GenerationObserver`]s registered with [`GeneticAlgorithm::add_observer`] see each
//! fitness-sorted population before it is bred, and the termination of the run. They are
//! the hook for logging and persistence.

use std::fmt;

use rand::RngCore;
use rand_pcg::Pcg64Mcg;
use tracing::{debug, info, warn};

use crate::{
    Genotype, PopulationStats, TrainingError, genotype,
    operator::{
        EliteSelection, Mutation, Recombination, Selection, Termination, UniformCrossover,
        UniformMutation,
    },
};

/// Name of the fitness calculation applied by the engine.
pub const FITNESS_CALCULATION: &str = "average_normalized";

/// State of a [`GeneticAlgorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GaState {
    /// No run in progress.
    Idle,
    /// A population is out for evaluation.
    Evaluating,
    Selecting,
    Recombining,
    Mutating,
    /// The termination predicate held; the final population is kept.
    Terminated,
}

/// Population parameters of a [`GeneticAlgorithm`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticAlgorithmParams {
    pub population_size: usize,
    /// Number of parameters per genotype.
    pub parameter_count: usize,
    /// Lower bound of randomly initialized parameters.
    pub init_param_min: f64,
    /// Upper bound (exclusive) of randomly initialized parameters.
    pub init_param_max: f64,
}

impl Default for GeneticAlgorithmParams {
    fn default() -> Self {
        Self {
            population_size: 30,
            parameter_count: 0,
            init_param_min: -1.0,
            init_param_max: 1.0,
        }
    }
}

impl GeneticAlgorithmParams {
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfiguration`] if the population is empty or the
    /// initialization range is not a finite, non-inverted interval.
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.population_size == 0 {
            return Err(TrainingError::InvalidConfiguration {
                reason: "population size must be positive".to_owned(),
            });
        }
        if !self.init_param_min.is_finite()
            || !self.init_param_max.is_finite()
            || self.init_param_min > self.init_param_max
        {
            return Err(TrainingError::InvalidConfiguration {
                reason: format!(
                    "invalid parameter initialization range [{}, {})",
                    self.init_param_min, self.init_param_max
                ),
            });
        }
        Ok(())
    }
}

/// The genetic operators used by a [`GeneticAlgorithm`].
#[derive(Debug)]
pub struct Operators {
    pub selection: Box<dyn Selection>,
    pub recombination: Box<dyn Recombination>,
    pub mutation: Box<dyn Mutation>,
    /// Without a termination predicate the run continues until the caller stops driving it.
    pub termination: Option<Box<dyn Termination>>,
}

impl Default for Operators {
    fn default() -> Self {
        Self {
            selection: Box::new(EliteSelection::default()),
            recombination: Box::new(UniformCrossover::default()),
            mutation: Box::new(UniformMutation::all_but_best_two()),
            termination: None,
        }
    }
}

/// Evaluates a generation of genotypes.
///
/// `begin_evaluation` receives ownership of the population. The implementation must write
/// each genotype's evaluation and eventually return the whole population, exactly once,
/// through [`GeneticAlgorithm::evaluation_finished`].
pub trait Evaluation {
    /// # Errors
    ///
    /// An error aborts the run.
    fn begin_evaluation(
        &mut self,
        generation: u32,
        population: Vec<Genotype>,
    ) -> Result<(), TrainingError>;
}

/// Receives notifications about the progress of a run.
pub trait GenerationObserver {
    /// Called once per generation with the population sorted by descending fitness.
    fn fitness_calculation_finished(&mut self, _generation: u32, _sorted: &[Genotype]) {}

    /// Called when the termination predicate held after `generation`.
    fn algorithm_terminated(&mut self, _generation: u32) {}
}

/// Result of returning an evaluated population to the engine.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum GenerationOutcome {
    /// The next population was bred and is being evaluated as `generation`.
    Evolved {
        generation: u32,
        stats: PopulationStats,
    },
    /// The run ended after `generation`.
    Terminated {
        generation: u32,
        stats: PopulationStats,
    },
}

impl GenerationOutcome {
    /// Statistics of the generation that was just evaluated.
    #[must_use]
    pub fn stats(&self) -> &PopulationStats {
        match self {
            Self::Evolved { stats, .. } | Self::Terminated { stats, .. } => stats,
        }
    }
}

/// A generational genetic algorithm over fixed-length real-valued genotypes.
pub struct GeneticAlgorithm<E, R = Pcg64Mcg> {
    params: GeneticAlgorithmParams,
    operators: Operators,
    evaluator: E,
    rng: R,
    state: GaState,
    generation: u32,
    population: Option<Vec<Genotype>>,
    observers: Vec<Box<dyn GenerationObserver>>,
}

impl<E, R> fmt::Debug for GeneticAlgorithm<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneticAlgorithm")
            .field("params", &self.params)
            .field("operators", &self.operators)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<E, R> GeneticAlgorithm<E, R>
where
    E: Evaluation,
    R: RngCore,
{
    /// Creates an idle engine. The first population is generated by [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfiguration`] if `params` is invalid.
    pub fn new(
        params: GeneticAlgorithmParams,
        operators: Operators,
        evaluator: E,
        rng: R,
    ) -> Result<Self, TrainingError> {
        params.validate()?;
        Ok(Self {
            params,
            operators,
            evaluator,
            rng,
            state: GaState::Idle,
            generation: 1,
            population: None,
            observers: vec![],
        })
    }

    /// Seeds the first generation with the given genotypes instead of random ones.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::PopulationSizeMismatch`] if the population has the wrong size
    /// - [`TrainingError::ParameterCountMismatch`] if a genotype has the wrong length
    pub fn with_population(mut self, population: Vec<Genotype>) -> Result<Self, TrainingError> {
        self.check_population(&population)?;
        self.population = Some(population);
        Ok(self)
    }

    /// Registers an observer, notified in registration order.
    pub fn add_observer(&mut self, observer: Box<dyn GenerationObserver>) {
        self.observers.push(observer);
    }

    #[must_use]
    pub fn state(&self) -> GaState {
        self.state
    }

    /// The generation currently being evaluated, or the last one evaluated. Starts at 1.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The current population, unless it is out for evaluation.
    ///
    /// After termination this is the final population, sorted by descending fitness.
    #[must_use]
    pub fn population(&self) -> Option<&[Genotype]> {
        self.population.as_deref()
    }

    #[must_use]
    pub fn params(&self) -> &GeneticAlgorithmParams {
        &self.params
    }

    #[must_use]
    pub fn operators(&self) -> &Operators {
        &self.operators
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Hands the current population to the evaluator, generating a random one if there is
    /// none.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::AlreadyRunning`] while a generation is being evaluated
    /// - any error of [`Evaluation::begin_evaluation`], which aborts the run
    pub fn start(&mut self) -> Result<(), TrainingError> {
        if self.state.is_evaluating() {
            return Err(TrainingError::AlreadyRunning);
        }
        let population = match self.population.take() {
            Some(population) => population,
            None => self.random_population(),
        };
        info!(
            population_size = population.len(),
            generation = self.generation,
            "starting genetic algorithm"
        );
        self.begin_evaluation(population)
    }

    /// Discards the population and starts over from generation 1 with random genotypes.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub fn restart(&mut self) -> Result<(), TrainingError> {
        if self.state.is_evaluating() {
            return Err(TrainingError::AlreadyRunning);
        }
        info!(after_generation = self.generation, "restarting genetic algorithm");
        self.population = None;
        self.generation = 1;
        self.state = GaState::Idle;
        self.start()
    }

    /// Accepts the evaluated population and breeds the next generation.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::EvaluationNotPending`] if no evaluation is in progress
    /// - [`TrainingError::PopulationSizeMismatch`] or [`TrainingError::ParameterCountMismatch`]
    ///   if the population does not match the parameters; the engine keeps waiting for the
    ///   evaluation
    /// - operator or evaluator errors while breeding; these abort the run and leave the
    ///   engine idle without a population
    pub fn evaluation_finished(
        &mut self,
        mut population: Vec<Genotype>,
    ) -> Result<GenerationOutcome, TrainingError> {
        if !self.state.is_evaluating() {
            return Err(TrainingError::EvaluationNotPending { state: self.state });
        }
        self.check_population(&population)?;

        let generation = self.generation;
        calculate_fitness(&mut population);
        genotype::sort_by_fitness(&mut population);

        let stats = PopulationStats::from_sorted(generation, &population)
            .expect("population size is validated to be positive");
        debug!(
            generation,
            best = stats.evaluation.max,
            mean = stats.evaluation.mean,
            worst = stats.evaluation.min,
            diversity = stats.diversity,
            "fitness calculation finished"
        );
        for observer in &mut self.observers {
            observer.fitness_calculation_finished(generation, &population);
        }

        let terminate = self
            .operators
            .termination
            .as_ref()
            .is_some_and(|t| t.should_terminate(generation, &population));
        if terminate {
            info!(generation, best = stats.evaluation.max, "genetic algorithm terminated");
            self.state = GaState::Terminated;
            self.population = Some(population);
            for observer in &mut self.observers {
                observer.algorithm_terminated(generation);
            }
            return Ok(GenerationOutcome::Terminated { generation, stats });
        }

        let next = match self.breed(population) {
            Ok(next) => next,
            Err(err) => {
                self.abort(&err);
                return Err(err);
            }
        };
        self.generation += 1;
        self.begin_evaluation(next)?;

        Ok(GenerationOutcome::Evolved {
            generation: self.generation,
            stats,
        })
    }

    fn check_population(&self, population: &[Genotype]) -> Result<(), TrainingError> {
        if population.len() != self.params.population_size {
            return Err(TrainingError::PopulationSizeMismatch {
                expected: self.params.population_size,
                actual: population.len(),
            });
        }
        if let Some(genotype) = population
            .iter()
            .find(|g| g.parameter_count() != self.params.parameter_count)
        {
            return Err(TrainingError::ParameterCountMismatch {
                expected: self.params.parameter_count,
                actual: genotype.parameter_count(),
            });
        }
        Ok(())
    }

    fn random_population(&mut self) -> Vec<Genotype> {
        let GeneticAlgorithmParams {
            population_size,
            parameter_count,
            init_param_min,
            init_param_max,
        } = self.params;
        (0..population_size)
            .map(|_| {
                Genotype::random(
                    parameter_count,
                    init_param_min,
                    init_param_max,
                    &mut self.rng,
                )
            })
            .collect()
    }

    fn begin_evaluation(&mut self, population: Vec<Genotype>) -> Result<(), TrainingError> {
        self.state = GaState::Evaluating;
        debug!(generation = self.generation, "evaluating");
        if let Err(err) = self.evaluator.begin_evaluation(self.generation, population) {
            self.abort(&err);
            return Err(err);
        }
        Ok(())
    }

    fn breed(&mut self, sorted: Vec<Genotype>) -> Result<Vec<Genotype>, TrainingError> {
        let target_size = self.params.population_size;

        self.state = GaState::Selecting;
        let intermediate = self.operators.selection.select(&sorted, &mut self.rng);
        drop(sorted);
        debug!(
            operator = self.operators.selection.name(),
            selected = intermediate.len(),
            "selection finished"
        );

        self.state = GaState::Recombining;
        let mut next = self
            .operators
            .recombination
            .recombine(intermediate, target_size, &mut self.rng)?;
        if next.len() != target_size {
            return Err(TrainingError::InvalidOperatorInput {
                operator: self.operators.recombination.name(),
                reason: format!(
                    "produced {} genotypes, population size is {target_size}",
                    next.len()
                ),
            });
        }

        self.state = GaState::Mutating;
        self.operators.mutation.mutate(&mut next, &mut self.rng)?;
        Ok(next)
    }

    fn abort(&mut self, err: &TrainingError) {
        warn!(generation = self.generation, %err, "genetic algorithm aborted");
        self.state = GaState::Idle;
        self.population = None;
    }
}

/// Sets `fitness = evaluation / average evaluation` for every genotype.
#[expect(clippy::cast_precision_loss)]
fn calculate_fitness(population: &mut [Genotype]) {
    let average =
        population.iter().map(Genotype::evaluation).sum::<f64>() / population.len() as f64;
    if average == 0.0 {
        warn!("average evaluation is 0, every genotype gets a fitness of 0");
        for genotype in population {
            genotype.set_fitness(0.0);
        }
        return;
    }
    for genotype in population {
        genotype.set_fitness(genotype.evaluation() / average);
    }
}
