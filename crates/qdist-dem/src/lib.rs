#![deny(missing_docs)]
#![doc = "Detector error model parsing: instruction walking into per-mechanism incidence lists, the sparse incidence index, and the DEM text format reader."]

/// Canonical hashing helpers for parsed DEMs.
pub mod hash;
/// Detector/observable to mechanism incidence index.
pub mod incidence;
/// Reduction of DEM instructions into per-mechanism incidence lists.
pub mod parse;
/// JSON persistence of parsed DEMs, as written by `qdist parse`.
pub mod serde;
/// Line-oriented DEM text format reader.
pub mod text;

pub use hash::canonical_dem_hash;
pub use incidence::IncidenceIndex;
pub use parse::{parse_dem_errors, ParsedDem};
pub use serde::{from_json, to_json};
pub use text::parse_dem_text;
