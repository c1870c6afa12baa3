use qdist_core::{ErrorInfo, QdistError};
use serde::{Deserialize, Serialize};

use crate::hash;
use crate::parse::ParsedDem;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SerializableParsedDem {
    schema_version: u32,
    dem_hash: String,
    num_detectors: usize,
    num_observables: usize,
    err_detectors: Vec<Vec<usize>>,
    err_observables: Vec<Vec<usize>>,
}

fn envelope(parsed: &ParsedDem) -> SerializableParsedDem {
    SerializableParsedDem {
        schema_version: SCHEMA_VERSION,
        dem_hash: hash::canonical_dem_hash(parsed),
        num_detectors: parsed.num_detectors,
        num_observables: parsed.num_observables,
        err_detectors: parsed.err_detectors.clone(),
        err_observables: parsed.err_observables.clone(),
    }
}

fn open(payload: SerializableParsedDem) -> Result<ParsedDem, QdistError> {
    if payload.schema_version != SCHEMA_VERSION {
        let info = ErrorInfo::new("schema-mismatch", "unsupported parsed DEM schema version")
            .with_context("found", payload.schema_version.to_string())
            .with_context("expected", SCHEMA_VERSION.to_string());
        return Err(QdistError::Serde(info));
    }
    let parsed = ParsedDem::from_incidence(
        payload.err_detectors,
        payload.err_observables,
        payload.num_detectors,
        payload.num_observables,
    )?;
    let recomputed = hash::canonical_dem_hash(&parsed);
    if recomputed != payload.dem_hash {
        let info = ErrorInfo::new("hash-mismatch", "stored DEM hash does not match contents")
            .with_context("stored", payload.dem_hash)
            .with_context("recomputed", recomputed);
        return Err(QdistError::Serde(info));
    }
    Ok(parsed)
}

/// Serializes parsed DEM data to a JSON string.
pub fn to_json(parsed: &ParsedDem) -> Result<String, QdistError> {
    serde_json::to_string_pretty(&envelope(parsed))
        .map_err(|err| QdistError::Serde(ErrorInfo::new("json-serialize", err.to_string())))
}

/// Restores parsed DEM data from a JSON string, verifying its hash.
pub fn from_json(data: &str) -> Result<ParsedDem, QdistError> {
    let payload: SerializableParsedDem = serde_json::from_str(data)
        .map_err(|err| QdistError::Serde(ErrorInfo::new("json-deserialize", err.to_string())))?;
    open(payload)
}
