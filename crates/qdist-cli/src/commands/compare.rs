use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use qdist_core::{DistanceResult, SolverName};
use qdist_dem::canonical_dem_hash;
use qdist_ilp::{available_engines, distance_from_parsed};
use serde::Serialize;

use super::{emit_json, InputArgs};
use crate::config::SolverArgs;

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Comma separated engines to run (all compiled-in engines by default).
    #[arg(long, value_delimiter = ',')]
    pub solvers: Vec<SolverName>,
    /// Output file for the JSON report (stdout when omitted).
    #[arg(long)]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub solver: SolverArgs,
}

#[derive(Debug, Serialize)]
struct EngineRun {
    solver: SolverName,
    elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<DistanceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompareReport {
    source: String,
    dem_hash: String,
    runs: Vec<EngineRun>,
    /// `None` unless at least two engines certified an optimum.
    optimal_distances_agree: Option<bool>,
}

pub fn run(args: &CompareArgs) -> Result<(), Box<dyn Error>> {
    let base = args.solver.resolve()?;
    let (parsed, source) = args.input.load()?;
    let solvers = if args.solvers.is_empty() {
        available_engines()
    } else {
        args.solvers.clone()
    };

    let mut runs = Vec::with_capacity(solvers.len());
    for solver in solvers {
        let options = base.clone().with_solver(solver);
        let started = Instant::now();
        let outcome = distance_from_parsed(&parsed, &options);
        let elapsed_seconds = started.elapsed().as_secs_f64();
        tracing::info!(%solver, elapsed_seconds, "engine finished");
        runs.push(match outcome {
            Ok(result) => EngineRun {
                solver,
                elapsed_seconds,
                result: Some(result),
                error: None,
            },
            Err(err) => EngineRun {
                solver,
                elapsed_seconds,
                result: None,
                error: Some(err.to_string()),
            },
        });
    }

    let optimal: Vec<usize> = runs
        .iter()
        .filter_map(|run| run.result.as_ref())
        .filter(|result| result.is_optimal())
        .filter_map(|result| result.distance)
        .collect();
    let optimal_distances_agree =
        (optimal.len() >= 2).then(|| optimal.windows(2).all(|pair| pair[0] == pair[1]));
    if optimal_distances_agree == Some(false) {
        tracing::warn!(?optimal, "engines disagree on the optimal distance");
    }

    let report = CompareReport {
        source: source.display().to_string(),
        dem_hash: canonical_dem_hash(&parsed),
        runs,
        optimal_distances_agree,
    };
    emit_json(&report, args.out.as_deref())
}
