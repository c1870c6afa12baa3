use good_lp::{ResolutionError, Solution, SolverModel};
use highs::HighsModelStatus;
use qdist_core::{
    EngineOutcome, IpModel, MipEngine, QdistError, SolveOptions, SolveStatus, SolverName,
};

use super::engine_failure;
use super::lp;

/// Tolerance used to decide whether the returned columns are an incumbent.
const FEASIBILITY_TOL: f64 = 1e-6;

/// HiGHS mixed-integer engine with a native time limit and zero MIP gap.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsEngine;

/// Dual bound recovered from the relative gap `(primal - dual) / |primal|`.
fn bound_from_gap(objective: f64, gap: f64) -> Option<f64> {
    (gap.is_finite() && gap >= 0.0).then(|| objective - gap * objective.abs())
}

/// Maps a HiGHS model status and the returned columns to an outcome.
fn classify(
    model: &IpModel,
    status: HighsModelStatus,
    values: Vec<f64>,
    mip_gap: f64,
) -> EngineOutcome {
    let has_incumbent = model.is_feasible(&values, FEASIBILITY_TOL);
    match status {
        HighsModelStatus::Optimal if has_incumbent => {
            let objective = model.objective_value(&values);
            EngineOutcome {
                status: SolveStatus::Optimal,
                values,
                objective: Some(objective),
                bound: Some(objective),
            }
        }
        // Time or iteration limits: the columns are only meaningful when
        // HiGHS found an incumbent before stopping.
        _ if has_incumbent => {
            let objective = model.objective_value(&values);
            tracing::warn!(?status, mip_gap, "highs stopped before proving optimality");
            EngineOutcome {
                status: SolveStatus::Feasible,
                values,
                objective: Some(objective),
                bound: bound_from_gap(objective, mip_gap),
            }
        }
        _ => {
            tracing::warn!(?status, "highs stopped without a feasible solution");
            EngineOutcome::without_solution(SolveStatus::NoSolutionFound)
        }
    }
}

impl MipEngine for HighsEngine {
    fn name(&self) -> SolverName {
        SolverName::Highs
    }

    fn solve(&self, model: &IpModel, options: &SolveOptions) -> Result<EngineOutcome, QdistError> {
        options.validate()?;
        let translated = lp::translate(model);
        let mut problem = translated
            .variables
            .minimise(translated.objective)
            .using(good_lp::highs)
            .set_verbose(options.verbose)
            .set_option("mip_rel_gap", 0.0);
        if let Some(limit) = options.time_limit {
            problem = problem.set_time_limit(limit);
        }
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
                let solved = solution.into_inner();
                Ok(classify(model, solved.status(), values, solved.mip_gap()))
            }
            Err(ResolutionError::Infeasible) => {
                Ok(EngineOutcome::without_solution(SolveStatus::Infeasible))
            }
            Err(ResolutionError::Unbounded) => {
                Ok(EngineOutcome::without_solution(SolveStatus::Unbounded))
            }
            Err(other) => Err(engine_failure(SolverName::Highs, other.to_string())),
        }
    }
}
