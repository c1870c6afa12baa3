mod common;

use common::{d, dem, l, options, repetition_chain};
use qdist_core::{
    DemInstruction, DetectorErrorModel, DistanceResult, QdistError, SolveStatus, SolverName,
};
use qdist_dem::parse_dem_errors;
use qdist_ilp::{mip_circuit_distance, replay_parity};

fn assert_replays_to_logical_error(model: &DetectorErrorModel, result: &DistanceResult) {
    let parsed = parse_dem_errors(model).unwrap();
    let indices = result.error_indices.as_ref().unwrap();
    assert_eq!(result.distance, Some(indices.len()));
    let replay = replay_parity(&parsed, indices).unwrap();
    assert!(replay.is_undetected_logical_error(), "replay: {replay:?}");
}

#[test]
fn three_mechanism_chain_needs_all_three() {
    // A: D0 L0, B: D0 D1, C: D1. Any pair leaves a detector lit.
    let model = dem(vec![vec![d(0), l(0)], vec![d(0), d(1)], vec![d(1)]]);
    let result = mip_circuit_distance(&model, &options()).unwrap();
    assert_eq!(result.status, Some(SolveStatus::Optimal));
    assert_eq!(result.distance, Some(3));
    assert_eq!(result.error_indices, Some(vec![0, 1, 2]));
    assert_eq!(result.lower_bound, Some(3.0));
    assert_replays_to_logical_error(&model, &result);
}

#[test]
fn observable_flipped_twice_has_no_logical_error() {
    // A: D0 L0, B: D0 D1, C: D1 L0. Detector parity forces A, B and C to
    // fire together, which flips L0 an even number of times.
    let model = dem(vec![vec![d(0), l(0)], vec![d(0), d(1)], vec![d(1), l(0)]]);
    let result = mip_circuit_distance(&model, &options()).unwrap();
    assert_eq!(result.status, Some(SolveStatus::Infeasible));
    assert_eq!(result.distance, None);
    assert_eq!(result.error_indices, None);
    assert_eq!(result.lower_bound, None);
}

#[test]
fn bare_observable_flip_has_distance_one() {
    let model = dem(vec![vec![d(0), d(1)], vec![l(0)], vec![d(1), l(0)]]);
    let result = mip_circuit_distance(&model, &options()).unwrap();
    assert_eq!(result.status, Some(SolveStatus::Optimal));
    assert_eq!(result.distance, Some(1));
    assert_eq!(result.error_indices, Some(vec![1]));
    assert_replays_to_logical_error(&model, &result);
}

#[test]
fn repetition_chain_distance_matches_length() {
    for distance in [3u64, 5, 7] {
        let model = repetition_chain(distance);
        let result = mip_circuit_distance(&model, &options()).unwrap();
        assert!(result.is_optimal());
        assert_eq!(result.distance, Some(distance as usize));
        assert_replays_to_logical_error(&model, &result);
    }
}

#[test]
fn second_observable_can_be_the_cheaper_one() {
    let model = dem(vec![
        vec![d(0), l(0)],
        vec![d(0), d(1)],
        vec![d(1)],
        vec![d(2), l(1)],
        vec![d(2)],
    ]);
    let result = mip_circuit_distance(&model, &options()).unwrap();
    assert_eq!(result.distance, Some(2));
    assert_eq!(result.error_indices, Some(vec![3, 4]));
    assert_replays_to_logical_error(&model, &result);
}

#[test]
fn untouched_declared_observable_cannot_count_as_flipped() {
    let model = DetectorErrorModel::with_declared_totals(
        vec![
            common::error(vec![d(0), l(0)]),
            common::error(vec![d(0), d(1)]),
            common::error(vec![d(1)]),
        ],
        2,
        3,
    );
    let result = mip_circuit_distance(&model, &options()).unwrap();
    assert_eq!(result.distance, Some(3));
}

#[test]
fn no_mechanisms_is_vacuous() {
    let model = DetectorErrorModel::with_declared_totals(Vec::new(), 4, 1);
    let result = mip_circuit_distance(&model, &options()).unwrap();
    assert_eq!(result, DistanceResult::vacuous());
    assert_eq!(result.status, None);
    assert_eq!(result.distance, None);
    assert_eq!(result.error_indices, None);
}

#[test]
fn no_observables_is_vacuous() {
    let model = dem(vec![vec![d(0)], vec![d(0), d(1)]]);
    let result = mip_circuit_distance(&model, &options()).unwrap();
    assert_eq!(result, DistanceResult::vacuous());
}

#[test]
fn vacuous_inputs_never_touch_the_engine() {
    let model = dem(vec![vec![d(0)]]);
    let options = options().with_solver(SolverName::Highs);
    assert_eq!(
        mip_circuit_distance(&model, &options).unwrap(),
        DistanceResult::vacuous()
    );
}

#[test]
fn shifted_models_fail_without_partial_result() {
    let model = DetectorErrorModel::new(vec![
        common::error(vec![d(0), l(0)]),
        DemInstruction::ShiftDetectors {
            detector_shift: 1,
            coordinate_shift: vec![0.0, 0.0, 1.0],
        },
        common::error(vec![d(0), l(0)]),
    ]);
    let err = mip_circuit_distance(&model, &options()).unwrap_err();
    assert!(matches!(err, QdistError::Unsupported(_)));
    assert_eq!(err.code(), "shift-detectors-unsupported");
}

#[test]
fn invalid_budget_is_rejected_before_parsing() {
    let model = repetition_chain(3);
    let err = mip_circuit_distance(&model, &options().with_time_limit(-5.0)).unwrap_err();
    assert_eq!(err.code(), "invalid-time-limit");
}

#[test]
fn unbounded_budget_runs_to_completion() {
    let model = repetition_chain(3);
    let result = mip_circuit_distance(&model, &options().without_time_limit()).unwrap();
    assert_eq!(result.distance, Some(3));
}

#[test]
fn exhausted_budget_reports_no_solution() {
    let model = repetition_chain(41);
    let result = mip_circuit_distance(&model, &options().with_time_limit(1e-9)).unwrap();
    assert_eq!(result.status, Some(SolveStatus::NoSolutionFound));
    assert_eq!(result.distance, None);
    assert_eq!(result.error_indices, None);
    assert_eq!(result.lower_bound, None);
}

#[test]
fn budgeted_solve_returns_within_budget() {
    let model = repetition_chain(201);
    let started = std::time::Instant::now();
    let result = mip_circuit_distance(&model, &options().with_time_limit(0.05)).unwrap();
    // One relaxation of slack past the deadline at most.
    assert!(started.elapsed() < std::time::Duration::from_secs(30));
    if let Some(distance) = result.distance {
        assert!(result.status.is_some_and(|status| status.has_solution()));
        assert!(result.lower_bound.is_some_and(|bound| bound <= distance as f64));
        assert_replays_to_logical_error(&model, &result);
    } else {
        assert_eq!(result.status, Some(SolveStatus::NoSolutionFound));
    }
}

#[cfg(not(feature = "highs"))]
#[test]
fn missing_engine_is_reported() {
    let model = repetition_chain(3);
    let err = mip_circuit_distance(&model, &options().with_solver(SolverName::Highs)).unwrap_err();
    assert_eq!(err.code(), "engine-unavailable");
    assert_eq!(qdist_ilp::available_engines(), vec![SolverName::Microlp]);
}

#[cfg(feature = "highs")]
#[test]
fn engines_agree_on_optimal_distance() {
    let models = [
        repetition_chain(5),
        dem(vec![
            vec![d(0), l(0)],
            vec![d(0), d(1)],
            vec![d(1)],
            vec![d(2), l(1)],
            vec![d(2)],
        ]),
    ];
    for model in &models {
        let micro = mip_circuit_distance(model, &options()).unwrap();
        let highs = mip_circuit_distance(model, &options().with_solver(SolverName::Highs)).unwrap();
        assert!(micro.is_optimal() && highs.is_optimal());
        assert_eq!(micro.distance, highs.distance);
        assert_replays_to_logical_error(model, &highs);
    }
}
