use sha2::{Digest, Sha256};

use crate::parse::ParsedDem;

fn update_list(hasher: &mut Sha256, indices: &[usize]) {
    hasher.update((indices.len() as u64).to_le_bytes());
    for &index in indices {
        hasher.update((index as u64).to_le_bytes());
    }
}

/// Computes the canonical structural hash of parsed DEM incidence data.
///
/// Probabilities and coordinates never reach [`ParsedDem`], so two models
/// differing only in those hash identically.
pub fn canonical_dem_hash(parsed: &ParsedDem) -> String {
    let mut hasher = Sha256::new();
    hasher.update((parsed.num_detectors as u64).to_le_bytes());
    hasher.update((parsed.num_observables as u64).to_le_bytes());
    hasher.update((parsed.num_errors() as u64).to_le_bytes());
    for (detectors, observables) in parsed.err_detectors.iter().zip(&parsed.err_observables) {
        update_list(&mut hasher, detectors);
        update_list(&mut hasher, observables);
    }

    let digest = hasher.finalize();
    digest
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<String>()
}
