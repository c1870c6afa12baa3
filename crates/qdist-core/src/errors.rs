//! Error type shared by the DEM reader, the reduction and the engines.
//!
//! Every failure carries a stable kebab-case `code` (for example
//! `shift-detectors-unsupported` or `engine-unavailable`) plus key/value
//! context such as the DEM line, the mechanism index or the engine name.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and context of a [`QdistError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable kebab-case code, e.g. `invalid-target`.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Where the failure happened: `line`, `mechanism`, `solver`, ...
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested remedy, e.g. flattening a shifted model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a payload without context or hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds one context entry, replacing an earlier value for `key`.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records the 1-based DEM text line the failure refers to.
    pub fn with_line(self, line: usize) -> Self {
        self.with_context("line", line.to_string())
    }

    /// Sets the remedy hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// DEM text line recorded with [`ErrorInfo::with_line`], if any.
    pub fn line(&self) -> Option<usize> {
        self.context.get("line").and_then(|line| line.parse().ok())
    }
}

/// Failure of a distance computation or of one of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum QdistError {
    /// Malformed DEM text, out-of-range indices or oversized models.
    #[error("invalid detector error model: {0}")]
    Dem(ErrorInfo),
    /// Well-formed input the reduction refuses, such as detector shifts.
    #[error("unsupported detector error model: {0}")]
    Unsupported(ErrorInfo),
    /// Engine missing from the build, or failing while solving.
    #[error("solver failure: {0}")]
    Solver(ErrorInfo),
    /// Invalid solve options or configuration files.
    #[error("invalid configuration: {0}")]
    Config(ErrorInfo),
    /// Parsed DEM files that cannot be read back.
    #[error("serialization failure: {0}")]
    Serde(ErrorInfo),
}

// Renders as `[code] message {key=value, ...}; hint: ...`.
impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            write!(f, " {{{}}}", pairs.join(", "))?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "; hint: {hint}")?;
        }
        Ok(())
    }
}

impl QdistError {
    /// Payload of the error, whatever its family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            QdistError::Dem(info)
            | QdistError::Unsupported(info)
            | QdistError::Solver(info)
            | QdistError::Config(info)
            | QdistError::Serde(info) => info,
        }
    }

    /// Stable code of the error.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
