//! Finalizer: runs the depth solver over the emitter's grammar graph, folds
//! the solved depths and per-alternation condition texts into the weight
//! expressions the emitter deferred, and performs the one substitution pass
//! that turns `{name}` markers into real text.

use gramfuzz_core::graph::DepthValue;

use crate::diagnostics::Diagnostics;
use crate::emit::EmitOutput;
use crate::{Error, Result};

/// A finished compilation: substituted source text plus the generator class
/// name the CLI needs to tell the user which class to instantiate.
#[derive(Debug, Clone)]
pub struct FinalizeOutput {
    pub source: String,
    pub generator_name: String,
    pub diagnostics: Diagnostics,
}

/// Maps a solver failure to the error category it actually represents.
/// `UnknownVertex` can only come from an edge the emitter itself added
/// during the walk, never from `solve()` — it never returns that variant —
/// but the match stays exhaustive so a future solver change that starts
/// returning it is caught here rather than silently misreported.
fn solver_error(err: gramfuzz_core::GraphError) -> Error {
    use gramfuzz_core::GraphError;
    match err {
        GraphError::IllFormedGrammar { .. } | GraphError::EmptyAlternation(_) => {
            Error::IllFormedGrammar(err)
        }
        GraphError::UnknownVertex(_) => Error::InternalAssertion {
            message: err.to_string(),
        },
    }
}

/// Builds the `[0 if <depth> > self.max_depth else <condition>, ...]` text
/// for one alternation, combining its solved per-arm depth vector with the
/// condition texts the emitter collected while walking its arms.
fn weight_list_text(depths: &[u32], conditions: &[String]) -> String {
    let arms: Vec<String> = depths
        .iter()
        .zip(conditions)
        .map(|(depth, cond)| format!("0 if {depth} > self.max_depth else {cond}"))
        .collect();
    format!("[{}]", arms.join(", "))
}

pub fn finalize(emitted: EmitOutput) -> Result<FinalizeOutput> {
    let EmitOutput {
        graph,
        mut placeholders,
        header_prefix,
        header,
        body_prefix,
        body,
        alt_conditions,
        generator_name,
    } = emitted;

    let solved = graph.solve().map_err(solver_error)?;

    for (name, value) in &solved.values {
        match value {
            DepthValue::Scalar(depth) => {
                placeholders.set(name.clone(), depth.to_string());
            }
            DepthValue::Vector(depths) => {
                let conditions = alt_conditions.get(name).ok_or_else(|| Error::InternalAssertion {
                    message: format!("solved alternation `{name}` has no recorded conditions"),
                })?;
                if conditions.len() != depths.len() {
                    return Err(Error::InternalAssertion {
                        message: format!(
                            "alternation `{name}` has {} conditions but {} solved arms",
                            conditions.len(),
                            depths.len()
                        ),
                    });
                }
                placeholders.set(name.clone(), weight_list_text(depths, conditions));
            }
        }
    }

    let combined = format!("{header_prefix}{header}\n{body_prefix}{body}");
    let source = placeholders.substitute(&combined)?;

    Ok(FinalizeOutput {
        source,
        generator_name,
        diagnostics: Diagnostics::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramfuzz_core::graph::GrammarGraph;
    use gramfuzz_core::PlaceholderTable;
    use indexmap::IndexMap;

    fn base_emit_output(graph: GrammarGraph, placeholders: PlaceholderTable, body: String) -> EmitOutput {
        EmitOutput {
            graph,
            placeholders,
            header_prefix: String::new(),
            header: String::new(),
            body_prefix: String::new(),
            body,
            alt_conditions: IndexMap::new(),
            generator_name: "ExampleGenerator".to_string(),
        }
    }

    #[test]
    fn substitutes_a_plain_rule_depth() {
        let mut graph = GrammarGraph::new();
        graph.rule("r");
        let placeholders = PlaceholderTable::new();
        let emitted = base_emit_output(graph, placeholders, "min_depth = {r}\n".to_string());
        let out = finalize(emitted).unwrap();
        assert_eq!(out.source, "min_depth = 0\n");
        assert_eq!(out.generator_name, "ExampleGenerator");
    }

    #[test]
    fn builds_weight_list_from_depths_and_conditions() {
        let mut graph = GrammarGraph::new();
        let alt = graph.alternation("alt_0");
        let a = graph.alternative("alt_0_0");
        let b = graph.alternative("alt_0_1");
        graph.add_edge(alt, a).unwrap();
        graph.add_edge(alt, b).unwrap();
        let r = graph.rule("r");
        graph.add_edge(r, alt).unwrap();

        let placeholders = PlaceholderTable::new();
        let mut alt_conditions = IndexMap::new();
        alt_conditions.insert("alt_0".to_string(), vec!["1".to_string(), "1".to_string()]);

        let mut emitted = base_emit_output(graph, placeholders, "weights = {alt_0}\n".to_string());
        emitted.alt_conditions = alt_conditions;

        let out = finalize(emitted).unwrap();
        assert_eq!(
            out.source,
            "weights = [0 if 0 > self.max_depth else 1, 0 if 0 > self.max_depth else 1]\n"
        );
    }

    #[test]
    fn mutually_recursive_rules_with_no_base_case_are_ill_formed() {
        let mut graph = GrammarGraph::new();
        let a = graph.rule("a");
        let b = graph.rule("b");
        graph.add_edge(a, b).unwrap();
        graph.add_edge(b, a).unwrap();

        let placeholders = PlaceholderTable::new();
        let emitted = base_emit_output(graph, placeholders, String::new());
        let err = finalize(emitted).unwrap_err();
        assert!(matches!(err, Error::IllFormedGrammar(_)));
    }
}
