use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use evocar_network::Activation;
use evocar_training::Agent;

use crate::{model::TrainedModel, util};

use self::{infer::InferArg, replay::ReplayArg, train::TrainArg};

mod infer;
mod replay;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve car controllers with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Drive the track with a trained controller
    Replay(#[clap(flatten)] ReplayArg),
    /// Print a controller's network outputs for one input vector
    Infer(#[clap(flatten)] InferArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Infer(arg) => infer::run(&arg)?,
    }
    Ok(())
}

/// Selects a controller either from a trained model or from a raw genotype file.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ControllerArg {
    /// Trained model file (JSON)
    #[arg(long, conflicts_with = "genotype", required_unless_present = "genotype")]
    model: Option<PathBuf>,
    /// Genotype record file (`;`-separated parameters)
    #[arg(long, requires = "topology")]
    genotype: Option<PathBuf>,
    /// Network topology of the genotype, e.g. 5,4,2
    #[arg(long, value_delimiter = ',')]
    topology: Option<Vec<usize>>,
    /// Activation function of the genotype's network
    #[arg(long, default_value = "soft_sign")]
    activation: Activation,
}

impl ControllerArg {
    pub(crate) fn load_agent(&self) -> anyhow::Result<Agent> {
        if let Some(path) = &self.model {
            let model = TrainedModel::open(path)?;
            eprintln!(
                "Loaded model {} (trained at {}, evaluation {:.3})",
                model.name, model.trained_at, model.evaluation
            );
            return model.to_agent();
        }

        let path = self
            .genotype
            .as_ref()
            .context("Either --model or --genotype is required")?;
        let topology = self
            .topology
            .as_ref()
            .context("--topology is required with --genotype")?;
        let genotype = util::read_genotype_file(path)?;
        Agent::new(genotype, topology, self.activation).with_context(|| {
            format!(
                "Genotype {} does not fit topology {topology:?}",
                path.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Parser)]
    struct ControllerOnly {
        #[command(flatten)]
        controller: ControllerArg,
    }

    fn parse(args: &[&str]) -> Result<ControllerArg, clap::Error> {
        ControllerOnly::try_parse_from(std::iter::once("evocar").chain(args.iter().copied()))
            .map(|parsed| parsed.controller)
    }

    #[test]
    fn test_activation_accepts_serialized_name() {
        let base = ["--genotype", "g.txt", "--topology", "5,4,2"];
        assert_eq!(parse(&base).unwrap().activation, Activation::SoftSign);

        for (name, expected) in [
            ("soft_sign", Activation::SoftSign),
            ("softsign", Activation::SoftSign),
            ("identity", Activation::Identity),
        ] {
            let mut args = base.to_vec();
            args.extend(["--activation", name]);
            assert_eq!(parse(&args).unwrap().activation, expected);
        }
    }

    #[test]
    fn test_controller_source_is_required_once() {
        let parsed = parse(&["--genotype", "g.txt", "--topology", "5,4,2"]).unwrap();
        assert_eq!(parsed.topology, Some(vec![5, 4, 2]));
        assert!(parse(&[]).is_err());
        assert!(parse(&["--genotype", "g.txt"]).is_err());
        assert!(parse(&["--model", "m.json", "--genotype", "g.txt", "--topology", "5,2"]).is_err());
    }
}
