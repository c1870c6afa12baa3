#![allow(dead_code)]

use qdist_core::{DemInstruction, DemTarget, DetectorErrorModel, SolveOptions};

pub fn d(id: u64) -> DemTarget {
    DemTarget::RelativeDetector(id)
}

pub fn l(id: u64) -> DemTarget {
    DemTarget::LogicalObservable(id)
}

pub fn error(targets: Vec<DemTarget>) -> DemInstruction {
    DemInstruction::Error {
        probability: 0.001,
        targets,
    }
}

pub fn dem(errors: Vec<Vec<DemTarget>>) -> DetectorErrorModel {
    DetectorErrorModel::new(errors.into_iter().map(error).collect())
}

/// Distance-`distance` repetition code: a chain of detectors closed by a
/// logical boundary on the left and a plain boundary on the right.
pub fn repetition_chain(distance: u64) -> DetectorErrorModel {
    let mut errors = vec![vec![d(0), l(0)]];
    for i in 0..distance.saturating_sub(2) {
        errors.push(vec![d(i), d(i + 1)]);
    }
    errors.push(vec![d(distance.saturating_sub(2))]);
    dem(errors)
}

pub fn options() -> SolveOptions {
    SolveOptions::default().with_time_limit(60.0)
}
