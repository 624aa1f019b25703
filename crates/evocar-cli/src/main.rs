use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod model;
mod persistence;
mod simulation;
mod util;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    command::run()
}
