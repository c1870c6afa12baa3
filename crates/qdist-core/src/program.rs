//! Engine-neutral integer program description and the engine seam.

use serde::{Deserialize, Serialize};

use crate::config::{SolveOptions, SolverName};
use crate::errors::{ErrorInfo, QdistError};
use crate::types::SolveStatus;

/// Index of a variable inside an [`IpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(usize);

impl VarId {
    /// Returns the position of the variable in the model.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VarKind {
    /// Variable restricted to `{0, 1}`.
    Binary,
    /// Integer variable restricted to `[lower, upper]`.
    Integer {
        /// Inclusive lower bound.
        lower: u32,
        /// Inclusive upper bound.
        upper: u32,
    },
}

impl VarKind {
    /// Returns the inclusive bounds of the domain.
    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            VarKind::Binary => (0, 1),
            VarKind::Integer { lower, upper } => (lower, upper),
        }
    }
}

/// Named decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Diagnostic name of the variable.
    pub name: String,
    /// Domain of the variable.
    pub kind: VarKind,
}

/// Relation between the left-hand side and the right-hand side of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `lhs == rhs`
    Eq,
    /// `lhs >= rhs`
    Geq,
    /// `lhs <= rhs`
    Leq,
}

/// Sparse linear constraint `Σ coeff·var (cmp) rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Diagnostic name of the row.
    pub name: String,
    /// Non-zero terms of the row.
    pub terms: Vec<(VarId, f64)>,
    /// Relation of the row.
    pub comparison: Comparison,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Evaluates the row against a full assignment.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs: f64 = self
            .terms
            .iter()
            .map(|(var, coeff)| coeff * values.get(var.index()).copied().unwrap_or(0.0))
            .sum();
        match self.comparison {
            Comparison::Eq => (lhs - self.rhs).abs() <= tolerance,
            Comparison::Geq => lhs >= self.rhs - tolerance,
            Comparison::Leq => lhs <= self.rhs + tolerance,
        }
    }
}

/// Minimisation problem over bounded integer variables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IpModel {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(VarId, f64)>,
}

impl IpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a `{0, 1}` variable.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.push_variable(name.into(), VarKind::Binary)
    }

    /// Adds an integer variable bounded to `[lower, upper]`.
    pub fn add_integer(&mut self, name: impl Into<String>, lower: u32, upper: u32) -> VarId {
        self.push_variable(name.into(), VarKind::Integer { lower, upper })
    }

    fn push_variable(&mut self, name: String, kind: VarKind) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable { name, kind });
        id
    }

    /// Adds a constraint, rejecting terms that reference unknown variables.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(VarId, f64)>,
        comparison: Comparison,
        rhs: f64,
    ) -> Result<(), QdistError> {
        let name = name.into();
        self.check_terms(&name, &terms)?;
        self.constraints.push(LinearConstraint {
            name,
            terms,
            comparison,
            rhs,
        });
        Ok(())
    }

    /// Replaces the minimised objective.
    pub fn set_objective(&mut self, terms: Vec<(VarId, f64)>) -> Result<(), QdistError> {
        self.check_terms("objective", &terms)?;
        self.objective = terms;
        Ok(())
    }

    fn check_terms(&self, row: &str, terms: &[(VarId, f64)]) -> Result<(), QdistError> {
        if let Some((var, _)) = terms.iter().find(|(var, _)| var.0 >= self.variables.len()) {
            return Err(QdistError::Solver(
                ErrorInfo::new("unknown-variable", "row references a variable not in the model")
                    .with_context("row", row)
                    .with_context("variable", var.0.to_string())
                    .with_context("num_variables", self.variables.len().to_string()),
            ));
        }
        Ok(())
    }

    /// Name of the model.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variables in insertion order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective terms.
    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Returns true if `values` assigns every variable an integer inside its
    /// domain and satisfies every row, up to `tolerance`.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let in_domain = self.variables.iter().zip(values).all(|(var, &value)| {
            let (lower, upper) = var.kind.bounds();
            value.is_finite()
                && (value - value.round()).abs() <= tolerance
                && value >= f64::from(lower) - tolerance
                && value <= f64::from(upper) + tolerance
        });
        in_domain
            && self
                .constraints
                .iter()
                .all(|row| row.is_satisfied(values, tolerance))
    }

    /// Evaluates the objective at an assignment.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .map(|(var, coeff)| coeff * values.get(var.0).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Raw outcome reported by an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    /// Engine status.
    pub status: SolveStatus,
    /// One value per model variable; empty when no solution is available.
    pub values: Vec<f64>,
    /// Objective of the returned assignment.
    pub objective: Option<f64>,
    /// Proven lower bound on the optimum, when the engine reports one.
    pub bound: Option<f64>,
}

impl EngineOutcome {
    /// Outcome without any assignment.
    pub fn without_solution(status: SolveStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
            bound: None,
        }
    }
}

/// Optimisation engine able to solve an [`IpModel`].
///
/// Implementations build a fresh engine instance on every call; no state is
/// shared between solves.
pub trait MipEngine: Send + Sync {
    /// Engine identifier.
    fn name(&self) -> SolverName;

    /// Solves the model within the configured budget.
    fn solve(&self, model: &IpModel, options: &SolveOptions) -> Result<EngineOutcome, QdistError>;
}
