// src/core/mod.rs
mod engine;
mod parser;
mod printer;

// Call graph construction and slicing
pub mod call_graph;

// Grammar selection and syntax classification
mod languages;

// Output documents
pub mod projection;

pub use parser::{ParsedSource, SourceParser};
pub use printer::{ReindentPrinter, SourcePrinter};
pub use languages::Dialect;

pub use call_graph::{
    filter_forest, CallGraph, CallGraphStats, DeclKind, DeclarationNode, NodeIndex,
    SelectionState, SliceRequest, SliceSelector, TreeNode,
};
pub use projection::{
    render, Detail, Encoding, ProjectedNode, ProjectionOptions, Projector, RefMode, SliceDocument,
    StructuralField,
};

// Export the main engine
pub use engine::{Analysis, Engine};
