//! Best-first branch and bound over continuous relaxations.
//!
//! Each node carries per-variable bounds. The search stops at the deadline
//! between two relaxations, so a budget is never overrun by more than one
//! relaxation solve.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use qdist_core::QdistError;

/// Values closer than this to an integer count as integral.
const INTEGRALITY_TOL: f64 = 1e-6;

/// Result of solving one relaxation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Relaxed {
    Solved { objective: f64, values: Vec<f64> },
    Infeasible,
    Unbounded,
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchEnd {
    /// Every node was solved or pruned.
    Exhausted,
    /// The deadline passed with open nodes left.
    TimedOut,
    /// A relaxation had no finite optimum.
    Unbounded,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchReport {
    pub end: SearchEnd,
    /// Best integral assignment found, rounded to integers.
    pub incumbent: Option<Vec<f64>>,
    pub incumbent_objective: Option<f64>,
    /// Smallest bound over open nodes and the incumbent; `None` when no
    /// relaxation was ever solved.
    pub bound: Option<f64>,
    pub nodes: u64,
}

struct Node {
    bounds: Vec<(f64, f64)>,
    /// Relaxation objective of the parent, valid for the whole subtree.
    bound: f64,
    depth: u32,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    // Max-heap: lowest bound first, deeper node first among equal bounds.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| self.depth.cmp(&other.depth))
    }
}

fn cannot_improve(bound: f64, incumbent: Option<f64>, integral_objective: bool) -> bool {
    let Some(best) = incumbent else {
        return false;
    };
    if integral_objective {
        (bound - INTEGRALITY_TOL).ceil() >= best - INTEGRALITY_TOL
    } else {
        bound >= best - INTEGRALITY_TOL
    }
}

/// Index and value of the variable furthest from an integer, if any.
fn most_fractional(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(idx, &value)| {
            let frac = value - value.floor();
            (idx, value, frac.min(1.0 - frac))
        })
        .filter(|&(_, _, distance)| distance > INTEGRALITY_TOL)
        .max_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(idx, value, _)| (idx, value))
}

/// Minimises over the integer points of `root` using `relax` on each node.
///
/// With `integral_objective` set, nodes whose rounded-up bound cannot beat
/// the incumbent are pruned.
pub(crate) fn branch_and_bound<F>(
    root: Vec<(f64, f64)>,
    integral_objective: bool,
    deadline: Option<Instant>,
    verbose: bool,
    mut relax: F,
) -> Result<SearchReport, QdistError>
where
    F: FnMut(&[(f64, f64)]) -> Result<Relaxed, QdistError>,
{
    let mut queue = BinaryHeap::new();
    queue.push(Node {
        bounds: root,
        bound: f64::NEG_INFINITY,
        depth: 0,
    });
    let mut incumbent: Option<Vec<f64>> = None;
    let mut incumbent_objective: Option<f64> = None;
    let mut nodes = 0u64;

    let end = loop {
        let Some(node) = queue.pop() else {
            break SearchEnd::Exhausted;
        };
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            queue.push(node);
            break SearchEnd::TimedOut;
        }
        if cannot_improve(node.bound, incumbent_objective, integral_objective) {
            continue;
        }
        nodes += 1;
        let (objective, values) = match relax(&node.bounds)? {
            Relaxed::Infeasible => continue,
            Relaxed::Unbounded => break SearchEnd::Unbounded,
            Relaxed::Solved { objective, values } => (objective, values),
        };
        if cannot_improve(objective, incumbent_objective, integral_objective) {
            continue;
        }
        match most_fractional(&values) {
            None => {
                if verbose {
                    tracing::info!(objective, nodes, open = queue.len(), "new incumbent");
                }
                incumbent = Some(values.iter().map(|value| value.round()).collect());
                incumbent_objective = Some(objective);
            }
            Some((idx, value)) => {
                let (lower, upper) = node.bounds[idx];
                let mut down = node.bounds.clone();
                down[idx] = (lower, value.floor());
                let mut up = node.bounds;
                up[idx] = (value.ceil(), upper);
                for bounds in [down, up] {
                    queue.push(Node {
                        bounds,
                        bound: objective,
                        depth: node.depth + 1,
                    });
                }
            }
        }
    };

    let open_bound = queue
        .iter()
        .map(|node| node.bound)
        .min_by(|a, b| a.total_cmp(b));
    let bound = match (end, open_bound, incumbent_objective) {
        (SearchEnd::Unbounded, _, _) => None,
        (_, Some(open), Some(best)) => Some(open.min(best)),
        (_, Some(open), None) => Some(open),
        (_, None, best) => best,
    }
    .filter(|value| value.is_finite());
    if verbose {
        tracing::info!(?end, nodes, open = queue.len(), ?bound, "branch and bound finished");
    }

    Ok(SearchReport {
        end,
        incumbent,
        incumbent_objective,
        bound,
        nodes,
    })
}
