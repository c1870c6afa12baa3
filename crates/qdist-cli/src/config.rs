use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use qdist_core::{ErrorInfo, QdistError, SolveOptions, SolverName};

/// Solver flags shared by the solving subcommands.
#[derive(Args, Debug, Clone)]
pub struct SolverArgs {
    /// YAML file with `time_limit`, `verbose` and `solver` keys.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Wall-clock budget in seconds.
    #[arg(long, conflicts_with = "no_time_limit")]
    pub time_limit: Option<f64>,
    /// Run the engine to completion without a budget.
    #[arg(long)]
    pub no_time_limit: bool,
    /// Engine to delegate the integer program to.
    #[arg(long)]
    pub solver: Option<SolverName>,
    /// Show the engine's own log output.
    #[arg(long)]
    pub verbose: bool,
}

impl SolverArgs {
    /// Resolves options from the optional YAML file, then command-line flags.
    pub fn resolve(&self) -> Result<SolveOptions, Box<dyn Error>> {
        let mut options = match &self.config {
            Some(path) => load_options(&fs::read_to_string(path)?)?,
            None => SolveOptions::default(),
        };
        if let Some(limit) = self.time_limit {
            options.time_limit = Some(limit);
        }
        if self.no_time_limit {
            options.time_limit = None;
        }
        if let Some(solver) = self.solver {
            options.solver = solver;
        }
        if self.verbose {
            options.verbose = true;
        }
        options.validate()?;
        Ok(options)
    }
}

/// Parses solver options from YAML text.
pub fn load_options(yaml: &str) -> Result<SolveOptions, QdistError> {
    serde_yaml::from_str(yaml).map_err(|err| {
        QdistError::Config(ErrorInfo::new("yaml-deserialize", err.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_defaults() {
        let options = load_options("time_limit: 12.5\nsolver: highs\n").unwrap();
        assert_eq!(options.time_limit, Some(12.5));
        assert_eq!(options.solver, SolverName::Highs);
        assert!(!options.verbose);
    }

    #[test]
    fn yaml_null_disables_budget() {
        let options = load_options("time_limit: ~\n").unwrap();
        assert_eq!(options.time_limit, None);
    }

    #[test]
    fn unknown_solver_in_yaml_is_rejected() {
        let err = load_options("solver: cplex\n").unwrap_err();
        assert_eq!(err.code(), "yaml-deserialize");
    }

    #[test]
    fn flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solver.yaml");
        fs::write(&path, "time_limit: 5\nsolver: highs\n").unwrap();
        let args = SolverArgs {
            config: Some(path),
            time_limit: None,
            no_time_limit: true,
            solver: Some(SolverName::Microlp),
            verbose: true,
        };
        let options = args.resolve().unwrap();
        assert_eq!(options.time_limit, None);
        assert_eq!(options.solver, SolverName::Microlp);
        assert!(options.verbose);
    }
}
