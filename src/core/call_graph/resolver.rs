// src/core/call_graph/resolver.rs
use std::collections::{BTreeSet, HashMap};
use tracing::debug;
use tree_sitter::Node;

use super::super::languages::{classify, node_text, string_value, Syntax};
use super::collector::GraphBuilder;

/// Declared name -> every declaration sharing it.
///
/// Only lives for the duration of call resolution.
#[derive(Debug, Default)]
pub struct NameIndex {
    by_name: HashMap<String, BTreeSet<usize>>,
}

impl NameIndex {
    pub(crate) fn from_builder(builder: &GraphBuilder<'_>) -> Self {
        let mut by_name: HashMap<String, BTreeSet<usize>> = HashMap::new();
        for (slot, node) in builder.pending.iter().enumerate() {
            by_name.entry(node.name.clone()).or_default().insert(slot);
        }
        Self { by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<&BTreeSet<usize>> {
        self.by_name.get(name)
    }
}

/// Links call sites to declarations by callee name.
///
/// Resolution is deliberately name based: a call to `run()` links to every
/// declaration named `run` anywhere in the file, and calls through renamed
/// references or dynamic dispatch are not linked at all.
pub struct CallResolver;

impl CallResolver {
    /// Single pass over all call expressions; returns the number of new edges
    pub fn resolve(builder: &mut GraphBuilder<'_>) -> usize {
        let names = NameIndex::from_builder(builder);
        let text = builder.text();
        let mut added = 0;
        let mut unresolved = 0;
        let mut module_level = 0;

        for node in builder.preorder() {
            let Syntax::Call { callee, .. } = classify(node) else {
                continue;
            };

            let Some(key) = callee_key(callee, text) else {
                unresolved += 1;
                continue;
            };
            let Some(caller) = builder.enclosing_declaration(node) else {
                module_level += 1;
                continue;
            };
            let Some(targets) = names.lookup(&key) else {
                continue;
            };

            for target in targets {
                if builder.add_edge(caller, *target) {
                    added += 1;
                }
            }
        }

        debug!(
            "Resolved {} call edges ({} dynamic callees skipped, {} module-level calls ignored)",
            added, unresolved, module_level
        );
        added
    }
}

/// Name a call site refers to, if it has a resolvable shape
pub(crate) fn callee_key(callee: Node<'_>, text: &str) -> Option<String> {
    match classify(callee) {
        Syntax::Identifier(ident) => Some(node_text(ident, text).to_string()),
        Syntax::Member { property, .. } => Some(node_text(property, text).to_string()),
        Syntax::Subscript { index, .. } => match classify(index) {
            Syntax::StringLiteral(_) => string_value(index, text),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::printer::ReindentPrinter;
    use super::super::super::{Dialect, ParsedSource, SourceParser};
    use super::super::CallGraph;
    use super::*;
    use crate::config::ParsingConfig;
    use std::path::Path;

    fn build(source: &str) -> CallGraph {
        let parsed: ParsedSource = SourceParser::new(&ParsingConfig::default())
            .parse_source(source.to_string(), Dialect::Javascript, Path::new("fixture.js"))
            .unwrap();
        let mut builder = GraphBuilder::new(&parsed);
        builder.collect_classes();
        builder.collect_functions();
        builder.link_ownership();
        CallResolver::resolve(&mut builder);
        builder.finish(&ReindentPrinter)
    }

    fn index(graph: &CallGraph, name: &str) -> usize {
        graph.nodes().iter().position(|n| n.name == name).unwrap()
    }

    fn callee_names(graph: &CallGraph, name: &str) -> Vec<String> {
        graph
            .callees(index(graph, name))
            .map(|n| n.name.clone())
            .collect()
    }

    #[test]
    fn test_name_collision_links_every_candidate() {
        let graph = build(
            r#"
const jobs = { run() { return 1; } };
class Runner { run() { return 2; } }
function main() { run(); }
"#,
        );

        let runs: Vec<_> = graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.name == "run")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(runs.len(), 2);

        let main = index(&graph, "main");
        let callees: Vec<_> = graph.node(main).calls.iter().copied().collect();
        assert_eq!(callees, runs);
        for run in runs {
            assert!(graph.node(run).called_by.contains(&main));
        }
    }

    #[test]
    fn test_callee_shapes() {
        let graph = build(
            r#"
function target() {}
function member() {}
function keyed() {}
function caller() {
  target();
  api.member();
  api["keyed"]();
  api[dynamic]();
  factory()();
  (0, target2)();
}
"#,
        );
        assert_eq!(callee_names(&graph, "caller"), vec!["target", "member", "keyed"]);
    }

    #[test]
    fn test_duplicate_calls_collapse_and_recursion_is_kept() {
        let graph = build(
            r#"
function ping(n) { if (n) { pong(n - 1); pong(n - 2); } }
function pong(n) { ping(n); pong(0); }
"#,
        );
        let ping = index(&graph, "ping");
        let pong = index(&graph, "pong");

        assert_eq!(graph.node(ping).calls.len(), 1);
        assert!(graph.node(pong).calls.contains(&ping));
        assert!(graph.node(pong).calls.contains(&pong));
        assert!(graph.node(pong).called_by.contains(&pong));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_caller_attribution() {
        let graph = build(
            r#"
helper();
function helper() {}
function outer() {
  items.forEach((x) => helper(x));
}
class Box {
  size = helper();
}
"#,
        );
        let helper = index(&graph, "helper");
        let callers: Vec<_> = graph.callers(helper).map(|n| n.name.clone()).collect();
        // module-level call is dropped, the excluded callback's call belongs to `outer`
        assert_eq!(callers, vec!["outer", "Box"]);
    }

    #[test]
    fn test_calls_in_class_nested_in_function() {
        let graph = build(
            r#"
function helper() {}
function outer() {
  class Local {
    method() { helper(); }
    field = helper();
  }
}
"#,
        );
        let helper = index(&graph, "helper");
        let callers: Vec<_> = graph.callers(helper).map(|n| n.name.clone()).collect();
        // field initializers run in the enclosing function, not the class
        assert_eq!(callers, vec!["outer", "method"]);
        assert_eq!(
            graph.node(index(&graph, "method")).parent,
            Some(index(&graph, "outer"))
        );
    }
}
