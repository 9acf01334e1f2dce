// src/core/call_graph/mod.rs
//! Call graph construction and slicing
//!
//! Declarations are collected from the syntax tree, linked by name-based
//! call resolution, and frozen into an immutable [`CallGraph`]. The
//! [`SliceSelector`] then cuts a two-radius neighbourhood out of it.

mod call_graph;
mod collector;
mod resolver;
mod selector;

pub use call_graph::{
    Ancestors, CallGraph, CallGraphStats, DeclKind, DeclarationNode, NodeIndex,
    SourceSpan, TreeNode,
};
pub use collector::GraphBuilder;
pub use resolver::{CallResolver, NameIndex};
pub use selector::{filter_forest, SelectionState, SliceRequest, SliceSelector};

pub(crate) use collector::ANONYMOUS;

use tracing::info;

use super::printer::SourcePrinter;
use super::ParsedSource;

impl CallGraph {
    /// Build the call graph for one parsed file: classes, then functions,
    /// then ownership links, then call edges.
    pub fn build(source: &ParsedSource, printer: &dyn SourcePrinter) -> CallGraph {
        let mut builder = GraphBuilder::new(source);
        builder.collect_classes();
        builder.collect_functions();
        builder.link_ownership();
        CallResolver::resolve(&mut builder);

        let graph = builder.finish(printer);
        let stats = graph.get_statistics();
        info!(
            "🕸️ Built call graph: {} declarations, {} call edges, {} roots",
            stats.declarations, stats.calls, stats.roots
        );
        graph
    }
}
