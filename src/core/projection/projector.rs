use serde::Serialize;

use super::super::call_graph::{
    filter_forest, CallGraph, DeclKind, NodeIndex, SelectionState, TreeNode, ANONYMOUS,
};
use super::super::ParsedSource;
use super::{ProjectionOptions, RefMode, StructuralField};

/// How much of a node is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    /// Within the full-detail radius: source and references
    Full,
    /// Within the context radius: identity stub
    Context,
    /// Only present as the owner of an included node
    Ancestor,
}

/// A rendered node of the sliced ownership tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeclKind>,
    pub detail: Detail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called_by: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ProjectedNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceStats {
    pub declarations: usize,
    pub edges: usize,
    pub included: usize,
    pub full_detail: usize,
}

/// The complete output document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceDocument {
    pub file: String,
    pub language: String,
    pub source_sha256: String,
    /// Resolved seed ids
    pub seeds: Vec<String>,
    pub full_radius: usize,
    pub context_radius: usize,
    pub stats: SliceStats,
    pub nodes: Vec<ProjectedNode>,
}

/// Renders a selection of a call graph as a filtered ownership tree
pub struct Projector<'a> {
    graph: &'a CallGraph,
    selection: &'a SelectionState,
    options: &'a ProjectionOptions,
}

impl<'a> Projector<'a> {
    pub fn new(graph: &'a CallGraph, selection: &'a SelectionState, options: &'a ProjectionOptions) -> Self {
        Self {
            graph,
            selection,
            options,
        }
    }

    /// Project the included part of the ownership forest
    pub fn project(&self) -> Vec<ProjectedNode> {
        let forest = filter_forest(&self.graph.ownership_forest(), &self.selection.included);
        forest.iter().map(|tree| self.project_node(tree)).collect()
    }

    /// Project and wrap in the document envelope
    pub fn document(&self, source: &ParsedSource) -> SliceDocument {
        SliceDocument {
            file: source.path.display().to_string(),
            language: source.dialect.name().to_string(),
            source_sha256: source.content_hash.clone(),
            seeds: self
                .selection
                .seeds
                .iter()
                .map(|seed| self.graph.node(*seed).id.clone())
                .collect(),
            full_radius: self.selection.full_radius,
            context_radius: self.selection.context_radius,
            stats: SliceStats {
                declarations: self.graph.len(),
                edges: self.graph.edge_count(),
                included: self.selection.included.len(),
                full_detail: self.selection.full_detail.len(),
            },
            nodes: self.project(),
        }
    }

    fn project_node(&self, tree: &TreeNode) -> ProjectedNode {
        let node = self.graph.node(tree.index);
        let detail = if self.selection.is_full_detail(tree.index) {
            Detail::Full
        } else if self.selection.context.contains(&tree.index) {
            Detail::Context
        } else {
            Detail::Ancestor
        };

        let mut projected = ProjectedNode {
            id: None,
            name: None,
            kind: None,
            detail,
            params: None,
            start_line: None,
            end_line: None,
            source: None,
            calls: None,
            called_by: None,
            children: None,
            child_count: None,
        };

        if detail == Detail::Full {
            projected.id = Some(node.id.clone());
            projected.name = Some(node.name.clone());
            projected.kind = Some(node.kind);
            projected.params = Some(node.params.clone());
            projected.start_line = Some(node.span.start_line);
            projected.end_line = Some(node.span.end_line);
            projected.source = Some(node.display_source().to_string());
            projected.calls = Some(self.render_refs(node.calls.iter()));
            projected.called_by = Some(self.render_refs(node.called_by.iter()));
        } else {
            for field in &self.options.structural_fields {
                match field {
                    StructuralField::Id => projected.id = Some(node.id.clone()),
                    StructuralField::Name => projected.name = Some(node.name.clone()),
                    StructuralField::Kind => projected.kind = Some(node.kind),
                    StructuralField::Params => projected.params = Some(node.params.clone()),
                    StructuralField::StartLine => projected.start_line = Some(node.span.start_line),
                    StructuralField::EndLine => projected.end_line = Some(node.span.end_line),
                }
            }
        }

        if self.options.include_children {
            projected.children = Some(
                tree.children
                    .iter()
                    .map(|child| self.project_node(child))
                    .collect(),
            );
        } else if self.options.include_child_count {
            projected.child_count = Some(tree.children.len());
        }

        projected
    }

    /// References restricted to included nodes, in source order
    fn render_refs<'i>(&self, targets: impl Iterator<Item = &'i NodeIndex>) -> Vec<String> {
        targets
            .filter(|target| self.selection.is_included(**target))
            .map(|target| self.render_ref(*target))
            .collect()
    }

    fn render_ref(&self, index: NodeIndex) -> String {
        let node = self.graph.node(index);
        let name = if node.name.is_empty() {
            ANONYMOUS
        } else {
            node.name.as_str()
        };

        match self.options.ref_mode {
            RefMode::Id => node.id.clone(),
            RefMode::Name => name.to_string(),
            RefMode::Both => format!("{} ({})", name, node.id),
        }
    }
}
