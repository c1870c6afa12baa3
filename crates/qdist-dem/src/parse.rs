use qdist_core::{DemInstruction, DemTarget, DetectorErrorModel, ErrorInfo, QdistError};
use serde::{Deserialize, Serialize};

/// Per-mechanism incidence lists extracted from a detector error model.
///
/// Mechanism `j` is the `j`-th error instruction in emission order. Each list
/// is sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedDem {
    /// Absolute detector indices flipped by each mechanism.
    pub err_detectors: Vec<Vec<usize>>,
    /// Logical observable indices flipped by each mechanism.
    pub err_observables: Vec<Vec<usize>>,
    /// Declared number of detectors.
    pub num_detectors: usize,
    /// Declared number of logical observables.
    pub num_observables: usize,
}

impl ParsedDem {
    /// Builds parsed data directly from incidence lists.
    ///
    /// Lists are normalized (sorted, deduplicated) and checked against the
    /// declared totals.
    pub fn from_incidence(
        err_detectors: Vec<Vec<usize>>,
        err_observables: Vec<Vec<usize>>,
        num_detectors: usize,
        num_observables: usize,
    ) -> Result<Self, QdistError> {
        if err_detectors.len() != err_observables.len() {
            let info = ErrorInfo::new(
                "mechanism-count-mismatch",
                "detector and observable lists describe different numbers of mechanisms",
            )
            .with_context("detector_lists", err_detectors.len().to_string())
            .with_context("observable_lists", err_observables.len().to_string());
            return Err(QdistError::Dem(info));
        }
        let parsed = Self {
            err_detectors: err_detectors.into_iter().map(normalize).collect(),
            err_observables: err_observables.into_iter().map(normalize).collect(),
            num_detectors,
            num_observables,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Number of error mechanisms.
    pub fn num_errors(&self) -> usize {
        self.err_detectors.len()
    }

    /// Checks that every index lies within the declared totals.
    pub fn validate(&self) -> Result<(), QdistError> {
        check_range(&self.err_detectors, self.num_detectors, "detector")?;
        check_range(&self.err_observables, self.num_observables, "observable")
    }
}

fn check_range(lists: &[Vec<usize>], limit: usize, kind: &str) -> Result<(), QdistError> {
    for (mechanism, list) in lists.iter().enumerate() {
        if let Some(&index) = list.iter().find(|&&index| index >= limit) {
            let info = ErrorInfo::new(
                "index-out-of-range",
                "mechanism references an index beyond the declared total",
            )
            .with_context("kind", kind)
            .with_context("mechanism", mechanism.to_string())
            .with_context("index", index.to_string())
            .with_context("declared", limit.to_string());
            return Err(QdistError::Dem(info));
        }
    }
    Ok(())
}

fn normalize(mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_unstable();
    indices.dedup();
    indices
}

fn to_index(value: u64, what: &str) -> Result<usize, QdistError> {
    usize::try_from(value).map_err(|_| {
        QdistError::Dem(
            ErrorInfo::new("index-out-of-range", "index does not fit the platform word size")
                .with_context("kind", what)
                .with_context("value", value.to_string()),
        )
    })
}

/// Upper limit on the number of mechanisms produced by unrolling repeats.
pub const MAX_MECHANISMS: u64 = 1 << 24;

/// Number of error mechanisms the instructions unroll to, saturating.
fn mechanism_count(instructions: &[DemInstruction]) -> u64 {
    instructions.iter().fold(0u64, |total, instruction| {
        let here = match instruction {
            DemInstruction::Error { .. } => 1,
            DemInstruction::Repeat { count, body } => count.saturating_mul(mechanism_count(body)),
            _ => 0,
        };
        total.saturating_add(here)
    })
}

/// First detector shift at any nesting depth, including never-executed
/// repeat bodies.
fn find_shift(instructions: &[DemInstruction]) -> Option<u64> {
    instructions.iter().find_map(|instruction| match instruction {
        DemInstruction::ShiftDetectors { detector_shift, .. } => Some(*detector_shift),
        DemInstruction::Repeat { body, .. } => find_shift(body),
        _ => None,
    })
}

fn shift_unsupported(detector_shift: u64, errors_seen: usize) -> QdistError {
    let info = ErrorInfo::new(
        "shift-detectors-unsupported",
        "DEM parsing for shift_detectors is not implemented",
    )
    .with_context("detector_shift", detector_shift.to_string())
    .with_context("errors_seen", errors_seen.to_string())
    .with_hint("flatten the detector error model before computing the distance");
    QdistError::Unsupported(info)
}

/// Extracts, for each error mechanism, the detectors and observables it flips.
///
/// Detector-shift instructions are refused with an `Unsupported` error: a
/// shifted model would otherwise resolve every later detector reference
/// against the wrong offset. Repeat bodies are checked for shifts before
/// they are unrolled, whatever their count. Models unrolling to more than
/// [`MAX_MECHANISMS`] mechanisms are refused before any allocation.
pub fn parse_dem_errors(dem: &DetectorErrorModel) -> Result<ParsedDem, QdistError> {
    let total = mechanism_count(dem.instructions());
    if total > MAX_MECHANISMS {
        let info = ErrorInfo::new(
            "too-many-mechanisms",
            "repeat blocks unroll to more error mechanisms than supported",
        )
        .with_context("mechanisms", total.to_string())
        .with_context("limit", MAX_MECHANISMS.to_string());
        return Err(QdistError::Dem(info));
    }
    let mut parsed = ParsedDem {
        num_detectors: to_index(dem.num_detectors(), "num_detectors")?,
        num_observables: to_index(dem.num_observables(), "num_observables")?,
        ..ParsedDem::default()
    };
    let running_detector_offset = 0u64;
    walk(dem.instructions(), running_detector_offset, &mut parsed)?;
    tracing::debug!(
        errors = parsed.num_errors(),
        detectors = parsed.num_detectors,
        observables = parsed.num_observables,
        "parsed detector error model"
    );
    Ok(parsed)
}

fn walk(
    instructions: &[DemInstruction],
    running_detector_offset: u64,
    parsed: &mut ParsedDem,
) -> Result<(), QdistError> {
    for instruction in instructions {
        match instruction {
            DemInstruction::ShiftDetectors { detector_shift, .. } => {
                return Err(shift_unsupported(*detector_shift, parsed.num_errors()));
            }
            DemInstruction::Error { targets, .. } => {
                let mut detectors = Vec::new();
                let mut observables = Vec::new();
                for target in targets {
                    match *target {
                        DemTarget::RelativeDetector(id) => {
                            let absolute = running_detector_offset.checked_add(id).ok_or_else(|| {
                                QdistError::Dem(
                                    ErrorInfo::new("index-out-of-range", "detector index overflow")
                                        .with_context("relative_id", id.to_string()),
                                )
                            })?;
                            detectors.push(to_index(absolute, "detector")?);
                        }
                        DemTarget::LogicalObservable(id) => {
                            observables.push(to_index(id, "observable")?);
                        }
                        DemTarget::Separator => {}
                    }
                }
                parsed.err_detectors.push(normalize(detectors));
                parsed.err_observables.push(normalize(observables));
            }
            DemInstruction::Repeat { count, body } => {
                if let Some(detector_shift) = find_shift(body) {
                    return Err(shift_unsupported(detector_shift, parsed.num_errors()));
                }
                for _ in 0..*count {
                    walk(body, running_detector_offset, parsed)?;
                }
            }
            DemInstruction::Detector { .. } | DemInstruction::LogicalObservable { .. } => {}
        }
    }
    Ok(())
}
