#![deny(missing_docs)]
#![doc = "Core types for exact circuit-distance computation: the detector error model instruction set, distance results, solver configuration and the integer-program engine seam."]

pub mod config;
pub mod errors;
pub mod program;
mod types;

pub use config::{SolveOptions, SolverName};
pub use errors::{ErrorInfo, QdistError};
pub use program::{
    Comparison, EngineOutcome, IpModel, LinearConstraint, MipEngine, VarId, VarKind, Variable,
};
pub use types::{DemInstruction, DemTarget, DetectorErrorModel, DistanceResult, SolveStatus};
