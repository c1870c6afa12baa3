//! Solver configuration shared by the library and the command line.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, QdistError};

/// Optimisation engine the formulation is delegated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SolverName {
    /// Pure Rust branch-and-bound over a simplex relaxation.
    #[default]
    Microlp,
    /// HiGHS mixed-integer solver.
    Highs,
}

impl SolverName {
    /// All engines known to the crate, whether or not they are compiled in.
    pub const ALL: [SolverName; 2] = [SolverName::Microlp, SolverName::Highs];

    /// Returns the kebab-case name of the engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverName::Microlp => "microlp",
            SolverName::Highs => "highs",
        }
    }
}

impl fmt::Display for SolverName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverName {
    type Err = QdistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "microlp" => Ok(SolverName::Microlp),
            "highs" => Ok(SolverName::Highs),
            other => Err(QdistError::Config(
                ErrorInfo::new("unknown-solver", "unknown solver engine name")
                    .with_context("solver", other)
                    .with_hint("expected one of: microlp, highs"),
            )),
        }
    }
}

fn default_time_limit() -> Option<f64> {
    Some(300.0)
}

/// Options controlling a single distance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Wall-clock budget in seconds; `None` runs the engine to completion.
    #[serde(default = "default_time_limit")]
    pub time_limit: Option<f64>,
    /// Forward engine logging to the terminal.
    ///
    /// HiGHS prints its own solver log. microlp has no engine log; with this
    /// flag the branch and bound instead emits `tracing` info events for
    /// each new incumbent and for the end of the search.
    #[serde(default)]
    pub verbose: bool,
    /// Engine the formulation is handed to.
    #[serde(default)]
    pub solver: SolverName,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: default_time_limit(),
            verbose: false,
            solver: SolverName::default(),
        }
    }
}

impl SolveOptions {
    /// Sets the wall-clock budget in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Removes the wall-clock budget.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit = None;
        self
    }

    /// Selects the engine.
    pub fn with_solver(mut self, solver: SolverName) -> Self {
        self.solver = solver;
        self
    }

    /// Enables or disables engine output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Checks that the configured values are usable.
    pub fn validate(&self) -> Result<(), QdistError> {
        if let Some(limit) = self.time_limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(QdistError::Config(
                    ErrorInfo::new("invalid-time-limit", "time limit must be finite and positive")
                        .with_context("time_limit", limit.to_string())
                        .with_hint("use no time limit to run to completion"),
                ));
            }
        }
        Ok(())
    }
}
