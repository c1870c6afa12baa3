use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    compare::{self, CompareArgs},
    distance::{self, DistanceArgs},
    parse::{self, ParseArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(
    name = "qdist",
    version,
    about = "Exact circuit distance of detector error models via integer programming"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a DEM file and emit its per-mechanism incidence lists.
    Parse(ParseArgs),
    /// Compute the exact distance of a DEM file.
    Distance(DistanceArgs),
    /// Solve the same DEM with several engines and compare the results.
    Compare(CompareArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Parse(args) => parse::run(&args),
        Command::Distance(args) => distance::run(&args),
        Command::Compare(args) => compare::run(&args),
    }
}
