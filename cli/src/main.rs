mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{inspect, link, render, table};
use tracing_subscriber::EnvFilter;

/// Map the `-v` count to a default filter; `RUST_LOG` overrides it.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "sdgmap=warn",
        1 => "sdgmap=info",
        _ => "sdgmap=debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Render(args) => render::run(&cli, args).await,
        Commands::Inspect(args) => inspect::run(&cli, args).await,
        Commands::Table(args) => table::run(&cli, args).await,
        Commands::Link(args) => link::run(&cli, args),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> { run().await }
