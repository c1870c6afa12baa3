use qdist_core::{ErrorInfo, QdistError};
use qdist_dem::ParsedDem;
use serde::{Deserialize, Serialize};

/// Detectors and observables left flipped after firing a set of mechanisms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParityReplay {
    /// Detectors flipped an odd number of times.
    pub flipped_detectors: Vec<usize>,
    /// Observables flipped an odd number of times.
    pub flipped_observables: Vec<usize>,
}

impl ParityReplay {
    /// True when no detector fires but some observable flips.
    pub fn is_undetected_logical_error(&self) -> bool {
        self.flipped_detectors.is_empty() && !self.flipped_observables.is_empty()
    }
}

/// Fires the given mechanisms and reports which targets end up flipped.
pub fn replay_parity(parsed: &ParsedDem, indices: &[usize]) -> Result<ParityReplay, QdistError> {
    let mut detectors = vec![false; parsed.num_detectors];
    let mut observables = vec![false; parsed.num_observables];
    for &j in indices {
        let (dets, obs) = match (parsed.err_detectors.get(j), parsed.err_observables.get(j)) {
            (Some(dets), Some(obs)) => (dets, obs),
            _ => {
                let info = ErrorInfo::new("unknown-mechanism", "mechanism index out of range")
                    .with_context("index", j.to_string())
                    .with_context("num_errors", parsed.num_errors().to_string());
                return Err(QdistError::Dem(info));
            }
        };
        toggle(&mut detectors, dets, "detector")?;
        toggle(&mut observables, obs, "observable")?;
    }
    Ok(ParityReplay {
        flipped_detectors: odd_positions(&detectors),
        flipped_observables: odd_positions(&observables),
    })
}

fn toggle(bits: &mut [bool], targets: &[usize], kind: &str) -> Result<(), QdistError> {
    for &target in targets {
        let Some(bit) = bits.get_mut(target) else {
            let info = ErrorInfo::new(
                "index-out-of-range",
                "mechanism references an index beyond the declared total",
            )
            .with_context("kind", kind)
            .with_context("index", target.to_string());
            return Err(QdistError::Dem(info));
        };
        *bit = !*bit;
    }
    Ok(())
}

fn odd_positions(bits: &[bool]) -> Vec<usize> {
    bits.iter()
        .enumerate()
        .filter(|(_, &bit)| bit)
        .map(|(idx, _)| idx)
        .collect()
}
