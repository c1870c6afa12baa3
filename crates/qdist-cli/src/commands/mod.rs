pub mod compare;
pub mod distance;
pub mod parse;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use qdist_core::DetectorErrorModel;
use qdist_dem::{parse_dem_errors, parse_dem_text, serde as dem_serde, ParsedDem};
use serde::Serialize;

/// Model input of the solving subcommands: DEM text or a parsed DEM.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// DEM text file to read.
    #[arg(long)]
    pub dem: Option<PathBuf>,
    /// Parsed DEM JSON written by `qdist parse --out`.
    #[arg(long)]
    pub parsed: Option<PathBuf>,
}

impl InputArgs {
    /// Loads the incidence lists and returns them with the source path.
    pub fn load(&self) -> Result<(ParsedDem, &Path), Box<dyn Error>> {
        match (&self.dem, &self.parsed) {
            (Some(path), _) => Ok((parse_dem_errors(&read_dem(path)?)?, path.as_path())),
            (None, Some(path)) => Ok((dem_serde::from_json(&read_text(path)?)?, path.as_path())),
            (None, None) => Err("either --dem or --parsed is required".into()),
        }
    }
}

fn read_text(path: &Path) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?)
}

/// Reads and parses a DEM text file.
pub fn read_dem(path: &Path) -> Result<DetectorErrorModel, Box<dyn Error>> {
    Ok(parse_dem_text(&read_text(path)?)?)
}

/// Writes pretty JSON to `out`, or to stdout when no path is given.
pub fn emit_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    emit_text(&serde_json::to_string_pretty(value)?, out)
}

/// Writes `text` to `out`, creating parent directories, or to stdout.
pub fn emit_text(text: &str, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, text)?;
        }
        None => println!("{text}"),
    }
    Ok(())
}
