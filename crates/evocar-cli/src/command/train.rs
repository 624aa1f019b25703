use std::path::PathBuf;

use anyhow::{Context as _, ensure};
use chrono::{Local, Utc};
use evocar_training::{
    GenerationOutcome, GeneticAlgorithm, Genotype, PopulationStats, TrainingError,
    genetic::FITNESS_CALCULATION,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use tracing::{info, warn};

use crate::{
    config::TrainingConfig,
    model::TrainedModel,
    persistence::{self, FinishedGenotypeSaver, RunDescription, StatisticsLog},
    simulation::{Track, TrackEvaluator},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration file (JSON); defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Total number of generations to evaluate, across restarts
    #[arg(long, default_value_t = 200)]
    generations: u32,
    /// Random seed, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,
    /// Population size, overriding the configuration
    #[arg(long)]
    population_size: Option<usize>,
    /// Generations per run before restarting from a random population (0 disables)
    #[arg(long)]
    restart_after: Option<u32>,
    /// Output model file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Directory for statistics and finished genotypes
    #[arg(long, default_value = "training")]
    output_dir: PathBuf,
}

/// Best genotype seen during a training session.
#[derive(Debug)]
struct Champion {
    generation: u32,
    genotype: Genotype,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = load_config(arg)?;
    ensure!(arg.generations > 0, "--generations must be positive");

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Seed: {seed}");

    let max_generations_per_run = (config.restart_after > 0).then_some(config.restart_after);
    let operators = config.operators(max_generations_per_run);
    let run_description = RunDescription {
        population_size: config.population_size,
        track: config.track.name.clone(),
        selection: operators.selection.name().to_owned(),
        recombination: operators.recombination.name().to_owned(),
        mutation: operators.mutation.name().to_owned(),
        fitness_calculation: FITNESS_CALCULATION.to_owned(),
    };
    let evaluator = TrackEvaluator::new(
        Track::new(config.track.clone()),
        config.topology.clone(),
        config.activation,
    );
    let mut ga = GeneticAlgorithm::new(
        config.ga_params(),
        operators,
        evaluator,
        Pcg64Mcg::seed_from_u64(seed),
    )?;

    let statistics_name = persistence::statistics_name(&config.track.name, Local::now());
    if config.save_statistics {
        let log = StatisticsLog::create(&arg.output_dir, &statistics_name, &run_description)?;
        eprintln!("Statistics: {}", log.path().display());
        ga.add_observer(Box::new(log));
    }
    if config.save_first_n_genotypes > 0 {
        ga.add_observer(Box::new(FinishedGenotypeSaver::new(
            arg.output_dir.join(&statistics_name),
            config.save_first_n_genotypes,
        )));
    }

    let mut champion: Option<Champion> = None;
    let mut run = 1;
    ga.start()?;
    for total in 1..=arg.generations {
        let population = ga
            .evaluator_mut()
            .finish()?
            .context("No generation is being evaluated")?;
        let generation = ga.generation();
        update_champion(&mut champion, generation, &population);

        let outcome = match ga.evaluation_finished(population) {
            Ok(outcome) => outcome,
            Err(err @ TrainingError::InvalidOperatorInput { .. }) => {
                warn!(%err, "population cannot be bred, restarting");
                run += 1;
                ga.restart()?;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        report(total, run, outcome.stats());

        if let GenerationOutcome::Terminated { stats, .. } = &outcome {
            if config
                .target_evaluation
                .is_some_and(|target| stats.evaluation.max >= target)
            {
                info!(generation = total, "target evaluation reached");
                break;
            }
            if total < arg.generations {
                run += 1;
                ga.restart()?;
            }
        }
    }

    let champion = champion.context("No generation was evaluated")?;
    eprintln!("Training completed after {run} run(s).");

    let model = TrainedModel {
        name: format!("{}-{seed}", config.track.name),
        trained_at: Utc::now(),
        topology: config.topology.clone(),
        activation: config.activation,
        generation: champion.generation,
        evaluation: champion.genotype.evaluation(),
        parameters: champion.genotype.copy_parameters(),
    };
    Output::save_json(&model, arg.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generation: {}", model.generation);
    eprintln!("  Evaluation: {:.3}", model.evaluation);
    eprintln!("  Parameters: {}", model.parameters.len());

    Ok(())
}

fn load_config(arg: &TrainArg) -> anyhow::Result<TrainingConfig> {
    let mut config = match &arg.config {
        Some(path) => TrainingConfig::open(path)?,
        None => TrainingConfig::default(),
    };
    if let Some(seed) = arg.seed {
        config.seed = Some(seed);
    }
    if let Some(population_size) = arg.population_size {
        config.population_size = population_size;
    }
    if let Some(restart_after) = arg.restart_after {
        config.restart_after = restart_after;
    }
    config.validate()?;
    Ok(config)
}

fn update_champion(champion: &mut Option<Champion>, generation: u32, population: &[Genotype]) {
    let Some(best) = population
        .iter()
        .max_by(|a, b| a.evaluation().total_cmp(&b.evaluation()))
    else {
        return;
    };
    if champion
        .as_ref()
        .is_none_or(|c| best.evaluation() > c.genotype.evaluation())
    {
        *champion = Some(Champion {
            generation,
            genotype: best.clone(),
        });
    }
}

fn report(total: u32, run: u32, stats: &PopulationStats) {
    eprintln!(
        "Generation #{total} (run {run}, generation {}):",
        stats.generation
    );
    eprintln!("  Evaluation Stats:");
    eprintln!("    Best:   {:.3}", stats.evaluation.max);
    eprintln!("    Mean:   {:.3}", stats.evaluation.mean);
    eprintln!("    Median: {:.3}", stats.evaluation.median);
    eprintln!("    Worst:  {:.3}", stats.evaluation.min);
    eprintln!("  Diversity: {:.3}", stats.diversity);
}
