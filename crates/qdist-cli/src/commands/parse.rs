use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use qdist_dem::{canonical_dem_hash, parse_dem_errors, serde as dem_serde};

use super::{emit_text, read_dem};

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// DEM text file to read.
    #[arg(long)]
    pub dem: PathBuf,
    /// Output file for the parsed incidence lists (stdout when omitted).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &ParseArgs) -> Result<(), Box<dyn Error>> {
    let dem = read_dem(&args.dem)?;
    let parsed = parse_dem_errors(&dem)?;
    tracing::info!(
        dem = %args.dem.display(),
        errors = parsed.num_errors(),
        hash = %canonical_dem_hash(&parsed),
        "parsed detector error model"
    );

    emit_text(&dem_serde::to_json(&parsed)?, args.out.as_deref())
}
