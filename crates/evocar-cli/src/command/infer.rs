use anyhow::Context as _;

use super::ControllerArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InferArg {
    #[command(flatten)]
    controller: ControllerArg,
    /// Comma-separated network inputs, e.g. 0.5,1,1,1,0.5
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    inputs: Vec<f64>,
}

pub(crate) fn run(arg: &InferArg) -> anyhow::Result<()> {
    let InferArg { controller, inputs } = arg;
    let agent = controller.load_agent()?;
    let outputs = agent
        .think(inputs)
        .context("Failed to run the network on the given inputs")?;

    eprintln!("Network: {:?}", agent.network().topology());
    let outputs = outputs
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    println!("{outputs}");
    Ok(())
}
