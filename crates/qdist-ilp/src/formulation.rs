use qdist_core::{Comparison, IpModel, QdistError, VarId};
use qdist_dem::{IncidenceIndex, ParsedDem};

/// Parity formulation of the shortest undetected logical error.
///
/// ```text
/// x_j ∈ {0,1}                  mechanism j fires
/// y_i ∈ [0, ⌊n/2⌋]             detector slack
/// s_r ∈ [0, ⌊n/2⌋], w_r ∈ {0,1} observable slack and parity bit
///
/// Σ_{j∋i} x_j = 2·y_i          every touched detector stays even
/// Σ_{j∋r} x_j = 2·s_r + w_r    w_r is the parity of observable r
/// w_r = 0                      observable r is touched by nothing
/// Σ_r w_r ≥ 1                  some observable flips
/// minimise Σ_j x_j
/// ```
#[derive(Debug, Clone)]
pub struct DistanceFormulation {
    model: IpModel,
    mechanisms: Vec<VarId>,
    parity_bits: Vec<VarId>,
}

impl DistanceFormulation {
    /// Builds the integer program for non-vacuous incidence data.
    ///
    /// Callers are expected to short-circuit inputs without mechanisms or
    /// observables; for those the logical-error row would be empty.
    pub fn build(parsed: &ParsedDem, index: &IncidenceIndex) -> Result<Self, QdistError> {
        let num_errors = parsed.num_errors();
        let max_pairs = u32::try_from(num_errors / 2).unwrap_or(u32::MAX);
        let mut model = IpModel::new("shortest_undetected_logical_error");

        let mechanisms: Vec<VarId> = (0..num_errors)
            .map(|j| model.add_binary(format!("x_{j}")))
            .collect();
        let detector_slack: Vec<VarId> = (0..parsed.num_detectors)
            .map(|i| model.add_integer(format!("y_det_{i}"), 0, max_pairs))
            .collect();
        let observable_slack: Vec<VarId> = (0..parsed.num_observables)
            .map(|r| model.add_integer(format!("s_log_{r}"), 0, max_pairs))
            .collect();
        let parity_bits: Vec<VarId> = (0..parsed.num_observables)
            .map(|r| model.add_binary(format!("w_log_{r}")))
            .collect();

        for (i, &slack) in detector_slack.iter().enumerate() {
            let touching = index.detector_errors(i);
            if touching.is_empty() {
                continue;
            }
            let mut terms: Vec<(VarId, f64)> =
                touching.iter().map(|&j| (mechanisms[j], 1.0)).collect();
            terms.push((slack, -2.0));
            model.add_constraint(format!("detector_{i}_parity"), terms, Comparison::Eq, 0.0)?;
        }

        for (r, (&slack, &bit)) in observable_slack.iter().zip(&parity_bits).enumerate() {
            let touching = index.observable_errors(r);
            if touching.is_empty() {
                model.add_constraint(
                    format!("logical_{r}_always_even"),
                    vec![(bit, 1.0)],
                    Comparison::Eq,
                    0.0,
                )?;
                continue;
            }
            let mut terms: Vec<(VarId, f64)> =
                touching.iter().map(|&j| (mechanisms[j], 1.0)).collect();
            terms.push((slack, -2.0));
            terms.push((bit, -1.0));
            model.add_constraint(format!("logical_{r}_parity"), terms, Comparison::Eq, 0.0)?;
        }

        model.add_constraint(
            "some_logical_flipped",
            parity_bits.iter().map(|&bit| (bit, 1.0)).collect(),
            Comparison::Geq,
            1.0,
        )?;
        model.set_objective(mechanisms.iter().map(|&x| (x, 1.0)).collect())?;

        Ok(Self {
            model,
            mechanisms,
            parity_bits,
        })
    }

    /// The engine-neutral integer program.
    pub fn model(&self) -> &IpModel {
        &self.model
    }

    /// Decision variable of each mechanism, in parser order.
    pub fn mechanisms(&self) -> &[VarId] {
        &self.mechanisms
    }

    /// Parity bit of each observable.
    pub fn parity_bits(&self) -> &[VarId] {
        &self.parity_bits
    }

    /// Upper bound shared by all slack variables.
    pub fn slack_bound(&self) -> u32 {
        u32::try_from(self.mechanisms.len() / 2).unwrap_or(u32::MAX)
    }
}
