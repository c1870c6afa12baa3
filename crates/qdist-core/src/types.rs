use serde::{Deserialize, Serialize};

/// Target of a detector error model instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum DemTarget {
    /// Detector reference relative to the running detector offset (`D<id>`).
    RelativeDetector(u64),
    /// Logical observable reference (`L<id>`).
    LogicalObservable(u64),
    /// Component separator (`^`) between decomposed error parts.
    Separator,
}

impl DemTarget {
    /// Returns `true` when the target references a detector.
    pub fn is_relative_detector_id(&self) -> bool {
        matches!(self, DemTarget::RelativeDetector(_))
    }

    /// Returns `true` when the target references a logical observable.
    pub fn is_logical_observable_id(&self) -> bool {
        matches!(self, DemTarget::LogicalObservable(_))
    }
}

/// One instruction of a detector error model, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DemInstruction {
    /// Independent fault mechanism flipping the listed targets.
    Error {
        /// Probability of the mechanism firing. Irrelevant to the distance.
        probability: f64,
        /// Detectors and observables flipped by the mechanism.
        targets: Vec<DemTarget>,
    },
    /// Advances the offset used to resolve subsequent relative detector ids.
    ShiftDetectors {
        /// Amount added to the running detector offset.
        detector_shift: u64,
        /// Coordinate shift applied to subsequent detector declarations.
        coordinate_shift: Vec<f64>,
    },
    /// Detector declaration, optionally annotated with coordinates.
    Detector {
        /// Coordinates attached to the declared detectors.
        coordinates: Vec<f64>,
        /// Declared detectors.
        targets: Vec<DemTarget>,
    },
    /// Logical observable declaration.
    LogicalObservable {
        /// Declared observables.
        targets: Vec<DemTarget>,
    },
    /// Block of instructions executed `count` times in sequence.
    Repeat {
        /// Number of repetitions.
        count: u64,
        /// Instructions making up one repetition.
        body: Vec<DemInstruction>,
    },
}

impl DemInstruction {
    /// Returns the instruction name as written in the DEM text format.
    pub fn type_name(&self) -> &'static str {
        match self {
            DemInstruction::Error { .. } => "error",
            DemInstruction::ShiftDetectors { .. } => "shift_detectors",
            DemInstruction::Detector { .. } => "detector",
            DemInstruction::LogicalObservable { .. } => "logical_observable",
            DemInstruction::Repeat { .. } => "repeat",
        }
    }
}

/// Detector error model with its declared detector and observable totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorErrorModel {
    instructions: Vec<DemInstruction>,
    num_detectors: u64,
    num_observables: u64,
}

#[derive(Default)]
struct Extent {
    shift: u64,
    max_detector: Option<u64>,
    max_observable: Option<u64>,
}

fn merge_max(current: Option<u64>, candidate: Option<u64>) -> Option<u64> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

// Extents are computed relative to the offset at block entry so repeat blocks
// never have to be unrolled.
fn extent_of(instructions: &[DemInstruction]) -> Extent {
    let mut extent = Extent::default();
    for instruction in instructions {
        match instruction {
            DemInstruction::Error { targets, .. }
            | DemInstruction::Detector { targets, .. }
            | DemInstruction::LogicalObservable { targets } => {
                for target in targets {
                    match *target {
                        DemTarget::RelativeDetector(id) => {
                            let absolute = extent.shift.saturating_add(id);
                            extent.max_detector = merge_max(extent.max_detector, Some(absolute));
                        }
                        DemTarget::LogicalObservable(id) => {
                            extent.max_observable = merge_max(extent.max_observable, Some(id));
                        }
                        DemTarget::Separator => {}
                    }
                }
            }
            DemInstruction::ShiftDetectors { detector_shift, .. } => {
                extent.shift = extent.shift.saturating_add(*detector_shift);
            }
            DemInstruction::Repeat { count, body } => {
                if *count == 0 {
                    continue;
                }
                let inner = extent_of(body);
                let last_entry = extent
                    .shift
                    .saturating_add(inner.shift.saturating_mul(count - 1));
                let detector = inner.max_detector.map(|d| last_entry.saturating_add(d));
                extent.max_detector = merge_max(extent.max_detector, detector);
                extent.max_observable = merge_max(extent.max_observable, inner.max_observable);
                extent.shift = extent
                    .shift
                    .saturating_add(inner.shift.saturating_mul(*count));
            }
        }
    }
    extent
}

impl DetectorErrorModel {
    /// Builds a model whose totals are one past the largest referenced indices.
    pub fn new(instructions: Vec<DemInstruction>) -> Self {
        let extent = extent_of(&instructions);
        Self {
            num_detectors: extent.max_detector.map_or(0, |d| d + 1),
            num_observables: extent.max_observable.map_or(0, |o| o + 1),
            instructions,
        }
    }

    /// Builds a model declaring at least the given totals.
    ///
    /// Totals smaller than what the instructions reference are raised to the
    /// referenced extent, so the result is always internally consistent.
    pub fn with_declared_totals(
        instructions: Vec<DemInstruction>,
        num_detectors: u64,
        num_observables: u64,
    ) -> Self {
        let mut model = Self::new(instructions);
        model.num_detectors = model.num_detectors.max(num_detectors);
        model.num_observables = model.num_observables.max(num_observables);
        model
    }

    /// Returns the top-level instructions in emission order.
    pub fn instructions(&self) -> &[DemInstruction] {
        &self.instructions
    }

    /// Iterates over the top-level instructions.
    pub fn iter(&self) -> std::slice::Iter<'_, DemInstruction> {
        self.instructions.iter()
    }

    /// Declared number of detectors.
    pub fn num_detectors(&self) -> u64 {
        self.num_detectors
    }

    /// Declared number of logical observables.
    pub fn num_observables(&self) -> u64 {
        self.num_observables
    }
}

impl<'a> IntoIterator for &'a DetectorErrorModel {
    type Item = &'a DemInstruction;
    type IntoIter = std::slice::Iter<'a, DemInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Outcome category of an optimisation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveStatus {
    /// Optimal solution certified with zero gap.
    Optimal,
    /// Feasible solution found but optimality not proven within the budget.
    Feasible,
    /// The program was proven infeasible.
    Infeasible,
    /// The program was reported unbounded.
    Unbounded,
    /// No solution was found before the budget expired.
    NoSolutionFound,
}

impl SolveStatus {
    /// Returns true if a feasible assignment is available.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

/// Result of an exact distance computation.
///
/// `status` is `None` only for vacuous inputs (no error mechanisms or no
/// logical observables), which distinguishes "nothing to search" from
/// "searched and found nothing".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Engine status, or `None` when the search was vacuous.
    pub status: Option<SolveStatus>,
    /// Number of selected error mechanisms, present when a solution exists.
    pub distance: Option<usize>,
    /// Indices of the selected mechanisms in parser order.
    pub error_indices: Option<Vec<usize>>,
    /// Best proven lower bound on the minimum, present when a solution exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
}

impl DistanceResult {
    /// Result for inputs where no logical error can exist.
    pub fn vacuous() -> Self {
        Self::default()
    }

    /// Result for a solve that produced no usable assignment.
    pub fn unsolved(status: SolveStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns true when the distance is certified exact.
    pub fn is_optimal(&self) -> bool {
        self.status.is_some_and(|status| status.is_optimal())
    }
}
