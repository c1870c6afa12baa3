use qdist_core::{DemInstruction, DemTarget, DetectorErrorModel, QdistError};
use qdist_dem::parse_dem_errors;

fn error(targets: Vec<DemTarget>) -> DemInstruction {
    DemInstruction::Error {
        probability: 0.001,
        targets,
    }
}

fn d(id: u64) -> DemTarget {
    DemTarget::RelativeDetector(id)
}

fn l(id: u64) -> DemTarget {
    DemTarget::LogicalObservable(id)
}

#[test]
fn mechanisms_follow_error_instruction_order() {
    let dem = DetectorErrorModel::new(vec![
        error(vec![d(2), d(0)]),
        DemInstruction::Detector {
            coordinates: vec![0.0, 1.0],
            targets: vec![d(1)],
        },
        error(vec![d(1), l(0)]),
        DemInstruction::LogicalObservable {
            targets: vec![l(0)],
        },
        error(vec![l(0)]),
    ]);
    let parsed = parse_dem_errors(&dem).unwrap();
    assert_eq!(parsed.num_errors(), 3);
    assert_eq!(parsed.err_detectors, vec![vec![0, 2], vec![1], vec![]]);
    assert_eq!(parsed.err_observables, vec![vec![], vec![0], vec![0]]);
    assert_eq!(parsed.num_detectors, 3);
    assert_eq!(parsed.num_observables, 1);
}

#[test]
fn repeated_targets_are_counted_once() {
    let dem = DetectorErrorModel::new(vec![error(vec![
        d(3),
        d(1),
        DemTarget::Separator,
        d(3),
        l(0),
        l(0),
    ])]);
    let parsed = parse_dem_errors(&dem).unwrap();
    assert_eq!(parsed.err_detectors, vec![vec![1, 3]]);
    assert_eq!(parsed.err_observables, vec![vec![0]]);
}

#[test]
fn totals_come_from_the_model_not_the_errors() {
    let dem = DetectorErrorModel::with_declared_totals(vec![error(vec![d(0), l(0)])], 8, 3);
    let parsed = parse_dem_errors(&dem).unwrap();
    assert_eq!(parsed.num_detectors, 8);
    assert_eq!(parsed.num_observables, 3);
}

#[test]
fn shift_detectors_is_refused() {
    let dem = DetectorErrorModel::new(vec![
        error(vec![d(0)]),
        DemInstruction::ShiftDetectors {
            detector_shift: 2,
            coordinate_shift: vec![0.0, 0.0, 1.0],
        },
        error(vec![d(0)]),
    ]);
    let err = parse_dem_errors(&dem).unwrap_err();
    match err {
        QdistError::Unsupported(info) => {
            assert_eq!(info.code, "shift-detectors-unsupported");
            assert_eq!(info.context["detector_shift"], "2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn zero_shift_is_still_refused() {
    let dem = DetectorErrorModel::new(vec![DemInstruction::ShiftDetectors {
        detector_shift: 0,
        coordinate_shift: Vec::new(),
    }]);
    assert_eq!(
        parse_dem_errors(&dem).unwrap_err().code(),
        "shift-detectors-unsupported"
    );
}

#[test]
fn shift_inside_repeat_block_is_refused() {
    let dem = DetectorErrorModel::new(vec![DemInstruction::Repeat {
        count: 4,
        body: vec![
            error(vec![d(0), d(1)]),
            DemInstruction::ShiftDetectors {
                detector_shift: 1,
                coordinate_shift: Vec::new(),
            },
        ],
    }]);
    let err = parse_dem_errors(&dem).unwrap_err();
    assert!(matches!(err, QdistError::Unsupported(_)));
}

#[test]
fn shift_inside_never_executed_block_is_refused() {
    let dem = DetectorErrorModel::new(vec![
        error(vec![d(0), l(0)]),
        DemInstruction::Repeat {
            count: 0,
            body: vec![DemInstruction::Repeat {
                count: 3,
                body: vec![DemInstruction::ShiftDetectors {
                    detector_shift: 1,
                    coordinate_shift: Vec::new(),
                }],
            }],
        },
    ]);
    let err = parse_dem_errors(&dem).unwrap_err();
    assert_eq!(err.code(), "shift-detectors-unsupported");
    assert_eq!(err.info().context["errors_seen"], "1");
}

#[test]
fn oversized_unrolling_is_refused_up_front() {
    let dem = DetectorErrorModel::new(vec![DemInstruction::Repeat {
        count: 4_000_000_000,
        body: vec![error(vec![d(0), l(0)])],
    }]);
    let err = parse_dem_errors(&dem).unwrap_err();
    assert!(matches!(err, QdistError::Dem(_)));
    assert_eq!(err.code(), "too-many-mechanisms");
    assert_eq!(err.info().context["mechanisms"], "4000000000");

    let nested = DetectorErrorModel::new(vec![DemInstruction::Repeat {
        count: u64::MAX,
        body: vec![DemInstruction::Repeat {
            count: u64::MAX,
            body: vec![error(vec![l(0)])],
        }],
    }]);
    assert_eq!(
        parse_dem_errors(&nested).unwrap_err().code(),
        "too-many-mechanisms"
    );
}

#[test]
fn moderate_unrolling_is_accepted() {
    let dem = DetectorErrorModel::new(vec![DemInstruction::Repeat {
        count: 1 << 10,
        body: vec![error(vec![d(0), l(0)])],
    }]);
    assert_eq!(parse_dem_errors(&dem).unwrap().num_errors(), 1 << 10);
    assert!(qdist_dem::parse::MAX_MECHANISMS >= 1 << 10);
}

#[test]
fn shift_free_repeat_blocks_are_unrolled() {
    let dem = DetectorErrorModel::new(vec![
        error(vec![l(0)]),
        DemInstruction::Repeat {
            count: 2,
            body: vec![error(vec![d(0)]), error(vec![d(1), l(0)])],
        },
        DemInstruction::Repeat {
            count: 0,
            body: vec![error(vec![d(5)])],
        },
    ]);
    let parsed = parse_dem_errors(&dem).unwrap();
    assert_eq!(
        parsed.err_detectors,
        vec![vec![], vec![0], vec![1], vec![0], vec![1]]
    );
    assert_eq!(
        parsed.err_observables,
        vec![vec![0], vec![], vec![0], vec![], vec![0]]
    );
}

#[test]
fn empty_model_parses_to_nothing() {
    let parsed = parse_dem_errors(&DetectorErrorModel::new(Vec::new())).unwrap();
    assert_eq!(parsed.num_errors(), 0);
    assert_eq!(parsed.num_detectors, 0);
    assert_eq!(parsed.num_observables, 0);
}
