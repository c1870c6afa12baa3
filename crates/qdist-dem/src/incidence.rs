use qdist_core::QdistError;

use crate::parse::ParsedDem;

/// Sparse transpose of the mechanism → target relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceIndex {
    detector_errors: Vec<Vec<usize>>,
    observable_errors: Vec<Vec<usize>>,
}

impl IncidenceIndex {
    /// Builds, for every detector and observable, the mechanisms touching it.
    pub fn build(parsed: &ParsedDem) -> Result<Self, QdistError> {
        parsed.validate()?;
        Ok(Self {
            detector_errors: transpose(parsed.num_detectors, &parsed.err_detectors),
            observable_errors: transpose(parsed.num_observables, &parsed.err_observables),
        })
    }

    /// Mechanisms flipping detector `detector`, in increasing order.
    pub fn detector_errors(&self, detector: usize) -> &[usize] {
        self.detector_errors
            .get(detector)
            .map_or(&[][..], |entries| entries.as_slice())
    }

    /// Mechanisms flipping observable `observable`, in increasing order.
    pub fn observable_errors(&self, observable: usize) -> &[usize] {
        self.observable_errors
            .get(observable)
            .map_or(&[][..], |entries| entries.as_slice())
    }

    /// Number of detectors covered by the index.
    pub fn num_detectors(&self) -> usize {
        self.detector_errors.len()
    }

    /// Number of observables covered by the index.
    pub fn num_observables(&self) -> usize {
        self.observable_errors.len()
    }

    /// Detectors no mechanism touches.
    pub fn untouched_detectors(&self) -> impl Iterator<Item = usize> + '_ {
        self.detector_errors
            .iter()
            .enumerate()
            .filter(|(_, entries)| entries.is_empty())
            .map(|(idx, _)| idx)
    }
}

fn transpose(width: usize, lists: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); width];
    for (mechanism, targets) in lists.iter().enumerate() {
        for &target in targets {
            adjacency[target].push(mechanism);
        }
    }
    for entries in &mut adjacency {
        entries.shrink_to_fit();
    }
    adjacency
}
