//! Training configuration loaded from JSON.
//!
//! Every field has a default, so an empty object `{}` (or no file at all) is a valid
//! configuration. Unknown fields are rejected to catch typos.

use std::path::Path;

use anyhow::{Context as _, bail, ensure};
use evocar_network::{Activation, Network};
use evocar_training::{
    GeneticAlgorithmParams, Operators,
    operator::{
        EliteSelection, GenerationLimit, RemainderStochasticSampling, Selection, TargetEvaluation,
        Termination, UniformCrossover, UniformMutation,
    },
};
use serde::{Deserialize, Serialize};

use crate::{simulation::SENSOR_COUNT, util};

/// Number of network outputs a car consumes: engine and turn.
pub const CONTROL_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    #[default]
    RemainderStochasticSampling,
    Elitist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecombinationKind {
    #[default]
    UniformCrossover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    #[default]
    AllButBestTwo,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub population_size: usize,
    pub topology: Vec<usize>,
    pub activation: Activation,
    pub selection: SelectionKind,
    /// Copies of the best genotype made by elitist selection.
    pub elitist_copies: usize,
    pub recombination: RecombinationKind,
    pub crossover_swap_probability: f64,
    pub mutation: MutationKind,
    /// Probability that a genotype is mutated at all.
    pub mutation_probability: f64,
    /// Probability that a single gene of a mutated genotype changes.
    pub mutation_gene_probability: f64,
    /// Maximum absolute change of a mutated gene.
    pub mutation_amount: f64,
    pub init_param_min: f64,
    pub init_param_max: f64,
    /// Generations after which the population is discarded and training starts over.
    /// 0 never restarts.
    pub restart_after: u32,
    /// Stops a run early once a genotype reaches this evaluation.
    pub target_evaluation: Option<f64>,
    pub save_statistics: bool,
    /// Number of track-finishing genotypes to save over the whole session, across restarts.
    pub save_first_n_genotypes: usize,
    pub seed: Option<u64>,
    pub track: TrackConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            topology: vec![SENSOR_COUNT, 4, CONTROL_COUNT],
            activation: Activation::SoftSign,
            selection: SelectionKind::default(),
            elitist_copies: 3,
            recombination: RecombinationKind::default(),
            crossover_swap_probability: 0.6,
            mutation: MutationKind::default(),
            mutation_probability: 1.0,
            mutation_gene_probability: 0.3,
            mutation_amount: 2.0,
            init_param_min: -1.0,
            init_param_max: 1.0,
            restart_after: 100,
            target_evaluation: None,
            save_statistics: true,
            save_first_n_genotypes: 0,
            seed: None,
            track: TrackConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfig {
    /// Used in statistics file names.
    pub name: String,
    /// Distance along x from start to finish line.
    pub length: f64,
    /// Lateral amplitude of the sine-shaped lane centre.
    pub amplitude: f64,
    pub wavelength: f64,
    /// Distance from the lane centre to either edge.
    pub half_width: f64,
    pub checkpoint_spacing: f64,
    /// Seconds a car may go without reaching a new checkpoint.
    pub max_checkpoint_delay: f64,
    /// Simulated seconds per step.
    pub time_step: f64,
    /// Steps after which all remaining cars are stopped.
    pub max_steps: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            name: "sine".to_owned(),
            length: 200.0,
            amplitude: 10.0,
            wavelength: 80.0,
            half_width: 4.0,
            checkpoint_spacing: 10.0,
            max_checkpoint_delay: 7.0,
            time_step: 0.1,
            max_steps: 3000,
        }
    }
}

impl TrainingConfig {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let config: Self = util::read_json_file("training config", path)?;
        config
            .validate()
            .with_context(|| format!("Invalid training config: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.population_size > 0, "population_size must be positive");
        Network::new(&self.topology).context("Invalid topology")?;
        ensure!(
            self.topology.first() == Some(&SENSOR_COUNT),
            "topology must start with {SENSOR_COUNT} inputs (one per sensor), got {:?}",
            self.topology
        );
        ensure!(
            self.topology.last() == Some(&CONTROL_COUNT),
            "topology must end with {CONTROL_COUNT} outputs (engine and turn), got {:?}",
            self.topology
        );

        for (name, value) in [
            ("crossover_swap_probability", self.crossover_swap_probability),
            ("mutation_probability", self.mutation_probability),
            ("mutation_gene_probability", self.mutation_gene_probability),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "{name} must be within [0, 1], got {value}"
            );
        }
        ensure!(
            self.mutation_amount.is_finite() && self.mutation_amount >= 0.0,
            "mutation_amount must be a non-negative number"
        );
        if self.selection == SelectionKind::Elitist && self.elitist_copies < 2 {
            bail!("elitist_copies must be at least 2 to allow recombination");
        }
        self.ga_params().validate()?;
        self.track.validate()
    }

    pub fn ga_params(&self) -> GeneticAlgorithmParams {
        GeneticAlgorithmParams {
            population_size: self.population_size,
            parameter_count: Network::weight_count_of(&self.topology),
            init_param_min: self.init_param_min,
            init_param_max: self.init_param_max,
        }
    }

    /// Builds the operators for one run of at most `max_generations` generations.
    pub fn operators(&self, max_generations: Option<u32>) -> Operators {
        let selection: Box<dyn Selection> = match self.selection {
            SelectionKind::RemainderStochasticSampling => Box::new(RemainderStochasticSampling),
            SelectionKind::Elitist => Box::new(EliteSelection {
                copies: self.elitist_copies,
            }),
        };
        let recombination = match self.recombination {
            RecombinationKind::UniformCrossover => Box::new(UniformCrossover {
                swap_probability: self.crossover_swap_probability,
            }),
        };
        let base_mutation = match self.mutation {
            MutationKind::AllButBestTwo => UniformMutation::all_but_best_two(),
            MutationKind::All => UniformMutation::all(),
        };
        let mutation = UniformMutation {
            genotype_probability: self.mutation_probability,
            gene_probability: self.mutation_gene_probability,
            amount: self.mutation_amount,
            ..base_mutation
        };
        let termination: Option<Box<dyn Termination>> =
            match (self.target_evaluation, max_generations) {
                (Some(target), _) => Some(Box::new(AnyOf(
                    Box::new(TargetEvaluation { target }),
                    max_generations
                        .map(|max| Box::new(GenerationLimit::new(max)) as Box<dyn Termination>),
                ))),
                (None, Some(max)) => Some(Box::new(GenerationLimit::new(max))),
                (None, None) => None,
            };

        Operators {
            selection,
            recombination,
            mutation: Box::new(mutation),
            termination,
        }
    }
}

impl TrackConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("length", self.length),
            ("wavelength", self.wavelength),
            ("half_width", self.half_width),
            ("checkpoint_spacing", self.checkpoint_spacing),
            ("max_checkpoint_delay", self.max_checkpoint_delay),
            ("time_step", self.time_step),
        ] {
            ensure!(
                value.is_finite() && value > 0.0,
                "track {name} must be positive, got {value}"
            );
        }
        ensure!(self.amplitude.is_finite(), "track amplitude must be finite");
        ensure!(self.max_steps > 0, "track max_steps must be positive");
        Ok(())
    }
}

/// Terminates when either of two predicates holds.
#[derive(Debug)]
struct AnyOf(Box<dyn Termination>, Option<Box<dyn Termination>>);

impl Termination for AnyOf {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn should_terminate(&self, generation: u32, sorted: &[evocar_training::Genotype]) -> bool {
        self.0.should_terminate(generation, sorted)
            || self
                .1
                .as_ref()
                .is_some_and(|t| t.should_terminate(generation, sorted))
    }
}
