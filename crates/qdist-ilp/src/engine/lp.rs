//! Translation of [`IpModel`] into a `good_lp` problem.

use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use qdist_core::{Comparison, IpModel, VarId, VarKind};

pub(crate) struct Translated {
    pub variables: ProblemVariables,
    pub handles: Vec<Variable>,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
}

fn linear(terms: &[(VarId, f64)], handles: &[Variable]) -> Expression {
    let mut expr = Expression::with_capacity(terms.len());
    for &(var, coeff) in terms {
        expr.add_mul(coeff, handles[var.index()]);
    }
    expr
}

fn assemble(model: &IpModel, bounds: Option<&[(f64, f64)]>) -> Translated {
    let mut variables = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .variables()
        .iter()
        .enumerate()
        .map(|(idx, var)| {
            let definition = match (bounds, var.kind) {
                (Some(bounds), _) => variable().min(bounds[idx].0).max(bounds[idx].1),
                (None, VarKind::Binary) => variable().binary(),
                (None, VarKind::Integer { lower, upper }) => {
                    variable().integer().min(lower).max(upper)
                }
            };
            variables.add(definition.name(var.name.clone()))
        })
        .collect();

    let constraints = model
        .constraints()
        .iter()
        .map(|row| {
            let lhs = linear(&row.terms, &handles);
            match row.comparison {
                Comparison::Eq => constraint::eq(lhs, row.rhs),
                Comparison::Geq => constraint::geq(lhs, row.rhs),
                Comparison::Leq => constraint::leq(lhs, row.rhs),
            }
        })
        .collect();

    let objective = linear(model.objective(), &handles);
    Translated {
        variables,
        handles,
        objective,
        constraints,
    }
}

/// Integer program with the declared variable domains.
#[cfg_attr(not(feature = "highs"), allow(dead_code))]
pub(crate) fn translate(model: &IpModel) -> Translated {
    assemble(model, None)
}

/// Continuous relaxation with per-variable bounds `bounds[idx] = (lower, upper)`.
pub(crate) fn relaxation(model: &IpModel, bounds: &[(f64, f64)]) -> Translated {
    assemble(model, Some(bounds))
}
