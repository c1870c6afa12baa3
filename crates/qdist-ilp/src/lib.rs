#![deny(missing_docs)]
#![doc = "Exact circuit distance: reduces parsed detector error models to a parity-constrained integer program and delegates it to a pluggable MIP engine."]

/// Distance orchestration and result extraction.
pub mod distance;
/// Engine backends implementing [`qdist_core::MipEngine`].
pub mod engine;
/// Integer program construction from incidence data.
pub mod formulation;
/// Parity replay of selected mechanisms.
pub mod verify;

pub use distance::{distance_from_parsed, distance_with_engine, mip_circuit_distance};
pub use engine::{available_engines, engine_for};
pub use formulation::DistanceFormulation;
pub use verify::{replay_parity, ParityReplay};
