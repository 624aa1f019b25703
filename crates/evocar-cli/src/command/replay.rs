use std::path::PathBuf;

use crate::{
    config::TrainingConfig,
    simulation::{Car, Track},
};

use super::ControllerArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    #[command(flatten)]
    controller: ControllerArg,
    /// Training configuration file whose track is driven
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the car's position every N steps (0 disables)
    #[arg(long, default_value_t = 0)]
    trace_every: u32,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        controller,
        config,
        trace_every,
    } = arg;
    let config = match config {
        Some(path) => TrainingConfig::open(path)?,
        None => TrainingConfig::default(),
    };
    let track = Track::new(config.track);
    let mut car = Car::new(controller.load_agent()?, &track)?;

    eprintln!("Driving track {} ({:.0} long)", track.name(), track.length());
    let max_steps = track.config().max_steps;
    let mut steps = 0;
    while car.is_alive() && steps < max_steps {
        car.step(&track)?;
        steps += 1;
        if *trace_every > 0 && steps % trace_every == 0 {
            let (x, y) = car.position();
            eprintln!("  step {steps:5}: x = {x:8.2}, y = {y:6.2}");
        }
    }
    car.kill();

    let (x, y) = car.position();
    eprintln!("Stopped after {steps} steps at x = {x:.2}, y = {y:.2}");
    eprintln!("  Completion: {:.1}%", car.evaluation() * 100.0);
    if car.evaluation() >= 1.0 {
        eprintln!("  Finished the track");
    }
    Ok(())
}
