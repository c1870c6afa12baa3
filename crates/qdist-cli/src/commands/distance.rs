use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use qdist_core::{DistanceResult, SolverName};
use qdist_dem::canonical_dem_hash;
use qdist_ilp::{distance_from_parsed, replay_parity, ParityReplay};
use serde::Serialize;

use super::{emit_json, InputArgs};
use crate::config::SolverArgs;

#[derive(Args, Debug)]
pub struct DistanceArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output file for the JSON report (stdout when omitted).
    #[arg(long)]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub solver: SolverArgs,
}

#[derive(Debug, Serialize)]
struct DistanceReport {
    source: String,
    dem_hash: String,
    num_errors: usize,
    num_detectors: usize,
    num_observables: usize,
    solver: SolverName,
    time_limit: Option<f64>,
    elapsed_seconds: f64,
    result: DistanceResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay: Option<ParityReplay>,
}

pub fn run(args: &DistanceArgs) -> Result<(), Box<dyn Error>> {
    let options = args.solver.resolve()?;
    let (parsed, source) = args.input.load()?;

    let started = Instant::now();
    let result = distance_from_parsed(&parsed, &options)?;
    let elapsed_seconds = started.elapsed().as_secs_f64();

    let replay = match &result.error_indices {
        Some(indices) => Some(replay_parity(&parsed, indices)?),
        None => None,
    };
    if let Some(replay) = &replay {
        if !replay.is_undetected_logical_error() {
            tracing::warn!(?replay, "selected mechanisms do not form an undetected logical error");
        }
    }

    let report = DistanceReport {
        source: source.display().to_string(),
        dem_hash: canonical_dem_hash(&parsed),
        num_errors: parsed.num_errors(),
        num_detectors: parsed.num_detectors,
        num_observables: parsed.num_observables,
        solver: options.solver,
        time_limit: options.time_limit,
        elapsed_seconds,
        result,
        replay,
    };
    emit_json(&report, args.out.as_deref())
}
