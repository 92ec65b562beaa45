use anyhow::Result;
use clap::Parser;
use lgo::{CLIArguments, Cli, inspect_main, simulate_main};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        CLIArguments::Simulate(args) => simulate_main(args),
        CLIArguments::Inspect(args) => inspect_main(args),
    }
}
