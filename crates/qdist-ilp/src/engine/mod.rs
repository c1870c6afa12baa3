use qdist_core::{ErrorInfo, MipEngine, QdistError, SolverName};

#[cfg(feature = "highs")]
mod highs;
mod lp;
mod microlp;
mod search;

#[cfg(feature = "highs")]
pub use self::highs::HighsEngine;
pub use self::microlp::MicrolpEngine;

/// Returns a fresh engine for the requested backend.
pub fn engine_for(name: SolverName) -> Result<Box<dyn MipEngine>, QdistError> {
    match name {
        SolverName::Microlp => Ok(Box::new(MicrolpEngine)),
        #[cfg(feature = "highs")]
        SolverName::Highs => Ok(Box::new(HighsEngine)),
        #[cfg(not(feature = "highs"))]
        SolverName::Highs => Err(QdistError::Solver(
            ErrorInfo::new("engine-unavailable", "solver engine is not compiled in")
                .with_context("solver", name.as_str())
                .with_hint("rebuild with the `highs` cargo feature"),
        )),
    }
}

/// Engines compiled into this build.
pub fn available_engines() -> Vec<SolverName> {
    SolverName::ALL
        .into_iter()
        .filter(|name| engine_for(*name).is_ok())
        .collect()
}

pub(crate) fn engine_failure(engine: SolverName, message: impl Into<String>) -> QdistError {
    QdistError::Solver(
        ErrorInfo::new("engine-failure", message).with_context("solver", engine.as_str()),
    )
}
