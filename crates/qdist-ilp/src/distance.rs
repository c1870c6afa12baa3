use qdist_core::{
    DetectorErrorModel, DistanceResult, EngineOutcome, ErrorInfo, MipEngine, QdistError,
    SolveOptions, SolveStatus,
};
use qdist_dem::{parse_dem_errors, IncidenceIndex, ParsedDem};

use crate::engine::engine_for;
use crate::formulation::DistanceFormulation;
use crate::verify::replay_parity;

/// Values at or above this threshold count as a fired mechanism.
const SELECTION_THRESHOLD: f64 = 0.5;

/// Computes the minimum number of mechanisms that flip no detector and at
/// least one logical observable.
///
/// Returns an `Unsupported` error for shifted models. Models without error
/// mechanisms or without observables yield [`DistanceResult::vacuous`].
pub fn mip_circuit_distance(
    dem: &DetectorErrorModel,
    options: &SolveOptions,
) -> Result<DistanceResult, QdistError> {
    options.validate()?;
    let parsed = parse_dem_errors(dem)?;
    distance_from_parsed(&parsed, options)
}

/// Runs the distance computation on already parsed incidence data with the
/// engine named in `options`.
pub fn distance_from_parsed(
    parsed: &ParsedDem,
    options: &SolveOptions,
) -> Result<DistanceResult, QdistError> {
    if is_vacuous(parsed) {
        return Ok(vacuous(parsed));
    }
    let engine = engine_for(options.solver)?;
    distance_with_engine(parsed, engine.as_ref(), options)
}

/// Runs the distance computation against a caller supplied engine.
pub fn distance_with_engine(
    parsed: &ParsedDem,
    engine: &dyn MipEngine,
    options: &SolveOptions,
) -> Result<DistanceResult, QdistError> {
    if is_vacuous(parsed) {
        return Ok(vacuous(parsed));
    }
    let index = IncidenceIndex::build(parsed)?;
    let formulation = DistanceFormulation::build(parsed, &index)?;
    tracing::debug!(
        solver = %engine.name(),
        variables = formulation.model().num_variables(),
        constraints = formulation.model().num_constraints(),
        time_limit = ?options.time_limit,
        "solving distance program"
    );

    let outcome = engine.solve(formulation.model(), options)?;
    let result = extract(parsed, &formulation, outcome)?;
    match result.status {
        Some(status) if status.has_solution() => tracing::info!(
            solver = %engine.name(),
            status = ?status,
            distance = ?result.distance,
            lower_bound = ?result.lower_bound,
            "distance program solved"
        ),
        status => tracing::warn!(
            solver = %engine.name(),
            status = ?status,
            "distance program produced no solution"
        ),
    }
    Ok(result)
}

fn is_vacuous(parsed: &ParsedDem) -> bool {
    parsed.num_errors() == 0 || parsed.num_observables == 0
}

fn vacuous(parsed: &ParsedDem) -> DistanceResult {
    tracing::debug!(
        errors = parsed.num_errors(),
        observables = parsed.num_observables,
        "no logical error can exist; skipping solve"
    );
    DistanceResult::vacuous()
}

fn extract(
    parsed: &ParsedDem,
    formulation: &DistanceFormulation,
    outcome: EngineOutcome,
) -> Result<DistanceResult, QdistError> {
    if !outcome.status.has_solution() {
        return Ok(DistanceResult::unsolved(outcome.status));
    }
    if outcome.values.len() < formulation.model().num_variables() {
        let info = ErrorInfo::new("missing-values", "engine returned an incomplete assignment")
            .with_context("values", outcome.values.len().to_string())
            .with_context("variables", formulation.model().num_variables().to_string());
        return Err(QdistError::Solver(info));
    }

    let chosen: Vec<usize> = formulation
        .mechanisms()
        .iter()
        .enumerate()
        .filter(|(_, var)| outcome.values[var.index()] >= SELECTION_THRESHOLD)
        .map(|(j, _)| j)
        .collect();
    let replay = replay_parity(parsed, &chosen)?;
    if !replay.is_undetected_logical_error() {
        tracing::warn!(
            status = ?outcome.status,
            selected = chosen.len(),
            ?replay,
            "engine assignment is not an undetected logical error; discarding it"
        );
        return Ok(DistanceResult::unsolved(SolveStatus::NoSolutionFound));
    }
    let distance = chosen.len();

    Ok(DistanceResult {
        status: Some(outcome.status),
        distance: Some(distance),
        error_indices: Some(chosen),
        lower_bound: Some(lower_bound(outcome.status, outcome.bound, distance)),
    })
}

/// Proven bound rounded up to the integral objective, capped at the distance.
/// Without an engine bound only the trivial bound of one mechanism holds.
fn lower_bound(status: SolveStatus, bound: Option<f64>, distance: usize) -> f64 {
    let distance = distance as f64;
    let proven = match bound {
        Some(value) if value.is_finite() => (value - 1e-6).ceil().max(1.0),
        _ if status.is_optimal() => distance,
        _ => 1.0,
    };
    proven.min(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_bound_rounds_up_and_caps() {
        assert_eq!(lower_bound(SolveStatus::Feasible, Some(2.3), 5), 3.0);
        assert_eq!(lower_bound(SolveStatus::Feasible, Some(3.0000001), 5), 3.0);
        assert_eq!(lower_bound(SolveStatus::Optimal, Some(7.0), 5), 5.0);
    }

    #[test]
    fn lower_bound_falls_back_without_engine_bound() {
        assert_eq!(lower_bound(SolveStatus::Optimal, None, 4), 4.0);
        assert_eq!(lower_bound(SolveStatus::Feasible, None, 4), 1.0);
        assert_eq!(lower_bound(SolveStatus::Feasible, Some(f64::NEG_INFINITY), 4), 1.0);
        assert_eq!(lower_bound(SolveStatus::Feasible, Some(-3.0), 4), 1.0);
    }
}
