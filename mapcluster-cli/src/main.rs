//! MapCluster CLI - Command-line interface
//!
//! Drives the clustering pipeline against synthetic item sets from the
//! command line: generate items, sweep the camera across zoom levels, and
//! report how the displayed marker set evolves.

mod commands;
mod surface;

use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser)]
#[command(name = "mapcluster", version, about = "Viewport clustering for interactive maps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic items and run the pipeline across a zoom sweep
    Simulate(commands::simulate::SimulateArgs),
}

#[tokio::main]
async fn main() {
    mapcluster::log::init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args).await,
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1);
    }
}
