use std::time::{Duration, Instant};

use good_lp::{ResolutionError, Solution, SolverModel};
use qdist_core::{
    EngineOutcome, IpModel, MipEngine, QdistError, SolveOptions, SolveStatus, SolverName,
};

use super::engine_failure;
use super::lp;
use super::search::{self, Relaxed, SearchEnd};

/// Pure Rust engine: branch and bound over microlp linear relaxations.
///
/// The time budget is checked between relaxations, so a solve that runs out
/// of time returns its incumbent (or nothing) together with the smallest
/// bound among the open nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpEngine;

fn relax(model: &IpModel, bounds: &[(f64, f64)]) -> Result<Relaxed, QdistError> {
    let translated = lp::relaxation(model, bounds);
    let mut problem = translated
        .variables
        .minimise(translated.objective)
        .using(good_lp::microlp);
    for row in translated.constraints {
        problem = problem.with(row);
    }

    match problem.solve() {
        Ok(solution) => {
            let values: Vec<f64> = translated
                .handles
                .iter()
                .map(|&handle| solution.value(handle))
                .collect();
            Ok(Relaxed::Solved {
                objective: model.objective_value(&values),
                values,
            })
        }
        Err(ResolutionError::Infeasible) => Ok(Relaxed::Infeasible),
        Err(ResolutionError::Unbounded) => Ok(Relaxed::Unbounded),
        Err(other) => Err(engine_failure(SolverName::Microlp, other.to_string())),
    }
}

fn deadline(started: Instant, time_limit: Option<f64>) -> Option<Instant> {
    let budget = Duration::try_from_secs_f64(time_limit?).ok()?;
    started.checked_add(budget)
}

impl MipEngine for MicrolpEngine {
    fn name(&self) -> SolverName {
        SolverName::Microlp
    }

    fn solve(&self, model: &IpModel, options: &SolveOptions) -> Result<EngineOutcome, QdistError> {
        options.validate()?;
        let deadline = deadline(Instant::now(), options.time_limit);
        let root: Vec<(f64, f64)> = model
            .variables()
            .iter()
            .map(|var| {
                let (lower, upper) = var.kind.bounds();
                (f64::from(lower), f64::from(upper))
            })
            .collect();
        // Every variable is integral, so integral coefficients give an
        // integral objective.
        let integral_objective = model
            .objective()
            .iter()
            .all(|(_, coeff)| coeff.fract() == 0.0);

        let report = search::branch_and_bound(
            root,
            integral_objective,
            deadline,
            options.verbose,
            |bounds| relax(model, bounds),
        )?;
        tracing::debug!(nodes = report.nodes, end = ?report.end, "microlp search finished");

        let outcome = match (report.end, report.incumbent) {
            (SearchEnd::Unbounded, _) => EngineOutcome::without_solution(SolveStatus::Unbounded),
            (SearchEnd::Exhausted, None) => {
                EngineOutcome::without_solution(SolveStatus::Infeasible)
            }
            (SearchEnd::TimedOut, None) => {
                tracing::warn!(
                    time_limit = ?options.time_limit,
                    "microlp exceeded the time budget without a solution"
                );
                EngineOutcome::without_solution(SolveStatus::NoSolutionFound)
            }
            (end, Some(values)) => {
                let objective = model.objective_value(&values);
                let (status, bound) = if end == SearchEnd::Exhausted {
                    (SolveStatus::Optimal, Some(objective))
                } else {
                    tracing::warn!(
                        time_limit = ?options.time_limit,
                        bound = ?report.bound,
                        "microlp exceeded the time budget, returning incumbent"
                    );
                    (SolveStatus::Feasible, report.bound)
                };
                EngineOutcome {
                    status,
                    values,
                    objective: Some(objective),
                    bound,
                }
            }
        };
        Ok(outcome)
    }
}
