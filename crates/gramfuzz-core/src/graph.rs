//! The grammar graph and its minimum-derivation-depth solver.
//!
//! Vertices live in a flat arena indexed by [`NodeId`]; edges are adjacency
//! lists of ids. Nothing ever holds a back-reference, which is what makes a
//! graph with genuine cycles (rule `a` calls rule `b` calls rule `a`) trivial
//! to own: the arena owns every vertex for the lifetime of the compilation,
//! full stop.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::error::GraphError;

/// Stable id of a vertex in a [`GrammarGraph`]. Never reused, never implies
/// an ordering beyond "was allocated before/after".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn new(raw: u32) -> Self {
        Self(raw)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The four vertex kinds a grammar graph can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    /// A named parser or lexer rule, or a labeled alternative promoted to one.
    Rule,
    /// A choice point between two or more alternatives.
    Alternation,
    /// An optional/starred subtree (`?`, `*`). `+` is never modeled here —
    /// it always expands at least once, so it carries no depth discount.
    Quantifier,
    /// One arm of an Alternation. Contained in exactly one Alternation.
    Alternative,
}

/// A vertex's depth once the solver has converged. `u32::MAX` is reserved
/// as the "not yet reachable" sentinel during solving and must never
/// appear in a [`SolveResult`].
pub type Depth = u32;

/// Sentinel meaning "no finite derivation found yet".
pub const INFINITY: Depth = u32::MAX;

/// The solved value attached to one named vertex.
///
/// Alternation vertices are expanded into the full per-alternative vector
/// (order-preserving); every other named vertex (Rule, Quantifier) keeps a
/// single scalar. Alternative vertices never appear in the result — they're
/// an implementation detail of Alternation and are dropped once their depth
/// has been folded into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepthValue {
    Scalar(Depth),
    Vector(Vec<Depth>),
}

/// Output of [`GrammarGraph::solve`]: one entry per named, non-Alternative
/// vertex, keyed by the same name the emitter used to create it — so it can
/// be merged directly into a placeholder table.
#[derive(Debug, Clone, Default)]
pub struct SolveResult {
    pub values: IndexMap<String, DepthValue>,
}

/// A directed graph of grammar constructs, built once during the emitter
/// walk and read-only from that point on (the solver never mutates it).
#[derive(Debug, Default)]
pub struct GrammarGraph {
    kinds: Vec<VertexKind>,
    edges: Vec<Vec<NodeId>>,
    names: IndexMap<String, NodeId>,
    /// Reverse of `names`, aligned by `NodeId` index, for O(1) `name_of`.
    vertex_names: Vec<String>,
}

impl GrammarGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: VertexKind, name: &str) -> NodeId {
        let id = NodeId::new(self.kinds.len() as u32);
        self.kinds.push(kind);
        self.edges.push(Vec::new());
        self.vertex_names.push(name.to_string());
        self.names.insert(name.to_string(), id);
        id
    }

    /// Returns the vertex for rule `name`, allocating a fresh (edge-less)
    /// Rule vertex on first mention. Grammars reference rules before their
    /// own definition is walked, so every rule name must resolve to a
    /// stable id regardless of declaration order — callers that know a rule
    /// is a *definition* still go through this method; the loader registers
    /// every rule name up front for exactly this reason.
    pub fn rule(&mut self, name: &str) -> NodeId {
        self.rule_id(name).unwrap_or_else(|| self.push(VertexKind::Rule, name))
    }

    /// Looks up an already-registered rule by name without creating one.
    pub fn rule_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn alternation(&mut self, name: &str) -> NodeId {
        self.push(VertexKind::Alternation, name)
    }

    pub fn alternative(&mut self, name: &str) -> NodeId {
        self.push(VertexKind::Alternative, name)
    }

    pub fn quantifier(&mut self, name: &str) -> NodeId {
        self.push(VertexKind::Quantifier, name)
    }

    /// Adds a "contains / may invoke" edge. Both endpoints must already
    /// have been allocated by one of the constructors above.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.check(from)?;
        self.check(to)?;
        self.edges[from.index()].push(to);
        Ok(())
    }

    fn check(&self, id: NodeId) -> Result<(), GraphError> {
        if id.index() < self.kinds.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownVertex(id))
        }
    }

    pub fn kind(&self, id: NodeId) -> VertexKind {
        self.kinds[id.index()]
    }

    pub fn name_of(&self, id: NodeId) -> &str {
        &self.vertex_names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Runs the fixed-point minimum-derivation-depth computation described
    /// in the component design: leaf depth 0; a non-Alternation vertex's
    /// depth is the max over its non-Quantifier children of (child depth,
    /// +1 if the child is a Rule); an Alternation's depth is the min over
    /// its Alternative children. Returns `IllFormedGrammar` naming the first
    /// Rule vertex (in declaration order) that never reaches finite depth.
    pub fn solve(&self) -> Result<SolveResult, GraphError> {
        for (i, kind) in self.kinds.iter().enumerate() {
            if *kind == VertexKind::Alternation && self.edges[i].is_empty() {
                return Err(GraphError::EmptyAlternation(NodeId::new(i as u32)));
            }
        }

        let n = self.kinds.len();
        let mut depth = vec![INFINITY; n];

        let mut incoming: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        for (from, outs) in self.edges.iter().enumerate() {
            for &to in outs {
                incoming[to.index()].push(NodeId::new(from as u32));
            }
        }

        let mut queued = vec![true; n];
        let mut queue: VecDeque<NodeId> = (0..n as u32).map(NodeId::new).collect();

        while let Some(id) = queue.pop_front() {
            queued[id.index()] = false;
            let next = self.recompute(id, &depth);
            if next != depth[id.index()] {
                depth[id.index()] = next;
                for &pred in &incoming[id.index()] {
                    if !queued[pred.index()] {
                        queued[pred.index()] = true;
                        queue.push_back(pred);
                    }
                }
            }
        }

        for (i, kind) in self.kinds.iter().enumerate() {
            if *kind == VertexKind::Rule && depth[i] == INFINITY {
                return Err(GraphError::IllFormedGrammar {
                    rule: self.name_of(NodeId::new(i as u32)).to_string(),
                });
            }
        }

        Ok(self.extract(&depth))
    }

    fn recompute(&self, id: NodeId, depth: &[Depth]) -> Depth {
        let children = &self.edges[id.index()];
        match self.kinds[id.index()] {
            VertexKind::Alternation => children
                .iter()
                .map(|c| depth[c.index()])
                .min()
                .unwrap_or(INFINITY),
            _ => children
                .iter()
                .filter(|c| self.kinds[c.index()] != VertexKind::Quantifier)
                .map(|c| match depth[c.index()] {
                    INFINITY => INFINITY,
                    d if self.kinds[c.index()] == VertexKind::Rule => d + 1,
                    d => d,
                })
                .max()
                .unwrap_or(0),
        }
    }

    fn extract(&self, depth: &[Depth]) -> SolveResult {
        let mut values = IndexMap::new();
        for (i, kind) in self.kinds.iter().enumerate() {
            let id = NodeId::new(i as u32);
            let value = match kind {
                VertexKind::Alternative => continue,
                VertexKind::Alternation => {
                    DepthValue::Vector(self.edges[i].iter().map(|c| depth[c.index()]).collect())
                }
                VertexKind::Rule | VertexKind::Quantifier => DepthValue::Scalar(depth[i]),
            };
            values.insert(self.name_of(id).to_string(), value);
        }
        SolveResult { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_rule_has_zero_depth() {
        let mut g = GrammarGraph::new();
        g.rule("r");
        let result = g.solve().unwrap();
        assert_eq!(result.values["r"], DepthValue::Scalar(0));
    }

    #[test]
    fn rule_reference_adds_one() {
        let mut g = GrammarGraph::new();
        let a = g.rule("a");
        let b = g.rule("b");
        g.add_edge(a, b).unwrap();
        let result = g.solve().unwrap();
        assert_eq!(result.values["b"], DepthValue::Scalar(0));
        assert_eq!(result.values["a"], DepthValue::Scalar(1));
    }

    #[test]
    fn alternation_takes_the_min_arm() {
        // r : 'a' | 'b' 'c' ;  -- second arm calls a rule, first doesn't.
        let mut g = GrammarGraph::new();
        let r = g.rule("r");
        let alt = g.alternation("alt_0");
        g.add_edge(r, alt).unwrap();
        let arm0 = g.alternative("alt_0_0");
        let arm1 = g.alternative("alt_0_1");
        g.add_edge(alt, arm0).unwrap();
        g.add_edge(alt, arm1).unwrap();
        let other = g.rule("other");
        g.add_edge(arm1, other).unwrap();

        let result = g.solve().unwrap();
        assert_eq!(result.values["alt_0"], DepthValue::Vector(vec![0, 1]));
        assert_eq!(result.values["r"], DepthValue::Scalar(0));
        assert!(!result.values.contains_key("alt_0_0"));
    }

    #[test]
    fn quantifier_children_excluded_from_parent_max() {
        // r : 'a' 'b'? ;  -- depth of r is 1, not 2: the `?` child contributes 0.
        let mut g = GrammarGraph::new();
        let r = g.rule("r");
        let quant = g.quantifier("quant_0");
        g.add_edge(r, quant).unwrap();
        let inner_rule = g.rule("b_tok");
        g.add_edge(quant, inner_rule).unwrap();
        // r also directly references a plain rule to give it nonzero depth
        let a_tok = g.rule("a_tok");
        g.add_edge(r, a_tok).unwrap();

        let result = g.solve().unwrap();
        assert_eq!(result.values["r"], DepthValue::Scalar(1));
        assert_eq!(result.values["quant_0"], DepthValue::Scalar(1));
    }

    #[test]
    fn left_recursive_alternation_converges() {
        // r : r 'a' | 'b' ;  -- the recursive arm's only Rule edge loops
        // back to `r` itself, so the fixed point bottoms out at 0: reaching
        // a terminal derivation costs zero rule expansions either way, the
        // recursive arm just costs one more than the base arm.
        let mut g = GrammarGraph::new();
        let r = g.rule("r");
        let alt = g.alternation("alt_0");
        g.add_edge(r, alt).unwrap();
        let rec_arm = g.alternative("alt_0_0");
        let base_arm = g.alternative("alt_0_1");
        g.add_edge(alt, rec_arm).unwrap();
        g.add_edge(alt, base_arm).unwrap();
        g.add_edge(rec_arm, r).unwrap(); // self-reference through the recursive arm

        let result = g.solve().unwrap();
        assert_eq!(result.values["r"], DepthValue::Scalar(0));
        assert_eq!(result.values["alt_0"], DepthValue::Vector(vec![1, 0]));
    }

    #[test]
    fn unreachable_rule_is_ill_formed() {
        // r : r ;  -- no base case, never converges to a finite depth.
        let mut g = GrammarGraph::new();
        let r = g.rule("r");
        g.add_edge(r, r).unwrap();
        let err = g.solve().unwrap_err();
        assert_eq!(
            err,
            GraphError::IllFormedGrammar {
                rule: "r".to_string()
            }
        );
    }

    #[test]
    fn edge_to_unknown_vertex_is_rejected() {
        let mut g = GrammarGraph::new();
        let r = g.rule("r");
        let phantom = NodeId::new(999);
        assert_eq!(
            g.add_edge(r, phantom).unwrap_err(),
            GraphError::UnknownVertex(phantom)
        );
    }
}
