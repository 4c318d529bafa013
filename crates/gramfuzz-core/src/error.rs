//! Errors raised by the grammar graph and placeholder table.

use thiserror::Error;

use crate::graph::NodeId;

/// A structural problem detected in the grammar graph itself.
///
/// These are the only errors the graph/solver can raise; parse and I/O
/// failures belong to the compiler crate that drives this one.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GraphError {
    /// An edge referenced a vertex id that was never allocated.
    #[error("internal error: edge references unknown vertex {0:?}")]
    UnknownVertex(NodeId),

    /// An Alternation vertex has zero Alternative children.
    #[error("internal error: alternation {0:?} has no alternatives")]
    EmptyAlternation(NodeId),

    /// The depth solver converged with a Rule vertex still at infinite depth:
    /// the rule is unreachable or recurses with no finite base case.
    #[error("rule `{rule}` has no finite derivation (unreachable or infinitely recursive)")]
    IllFormedGrammar { rule: String },
}

/// A placeholder referenced in buffered text has no value at substitution time.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("internal error: unresolved placeholder `{{{name}}}`")]
pub struct SubstitutionError {
    pub name: String,
}
