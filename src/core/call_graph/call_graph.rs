// src/core/call_graph/call_graph.rs
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use serde::{Deserialize, Serialize};

/// Position of a declaration in the registry. Registry order is source order.
pub type NodeIndex = usize;

/// Kind of declaration recorded in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    /// Function declaration or function expression
    Function,
    Arrow,
    /// Class method, object-literal method or accessor
    Method,
    Class,
}

impl DeclKind {
    /// Tag used as the prefix of node ids
    pub fn tag(self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::Arrow => "arrow",
            DeclKind::Method => "method",
            DeclKind::Class => "class",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Source span of a declaration. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

/// A function, method or class declaration
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationNode {
    /// Stable id: kind tag plus source span
    pub id: String,
    /// Inferred display name
    pub name: String,
    pub kind: DeclKind,
    /// Parameter list without the surrounding parentheses
    pub params: String,
    pub span: SourceSpan,
    /// Verbatim source slice
    pub source: String,
    /// Regenerated source, when the printer could produce it
    pub printed: Option<String>,
    /// Lexically enclosing declaration
    pub parent: Option<NodeIndex>,
    /// Lexically nested declarations, in source order
    pub children: Vec<NodeIndex>,
    /// Outgoing call edges
    pub calls: BTreeSet<NodeIndex>,
    /// Incoming call edges
    pub called_by: BTreeSet<NodeIndex>,
}

impl DeclarationNode {
    /// Source text for display: regenerated form, else the verbatim slice
    pub fn display_source(&self) -> &str {
        self.printed.as_deref().unwrap_or(&self.source)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A node of the ownership forest, or of a filtered copy of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub index: NodeIndex,
    pub children: Vec<TreeNode>,
}

/// Immutable call graph over the declarations of one file
#[derive(Debug, Clone)]
pub struct CallGraph {
    nodes: Vec<DeclarationNode>,
    by_id: HashMap<String, NodeIndex>,
    roots: Vec<NodeIndex>,
}

impl CallGraph {
    /// Assemble a graph from finished node records.
    ///
    /// `nodes` must be in source order with parent/child/edge indexes
    /// pointing into the same vector.
    pub(crate) fn from_nodes(nodes: Vec<DeclarationNode>) -> Self {
        let by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();
        let roots = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_root())
            .map(|(index, _)| index)
            .collect();

        Self { nodes, by_id, roots }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[DeclarationNode] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> &DeclarationNode {
        &self.nodes[index]
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    /// Declarations without an owner, in source order
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Get declarations this one calls (outgoing edges)
    pub fn callees(&self, index: NodeIndex) -> impl Iterator<Item = &DeclarationNode> + '_ {
        self.nodes[index].calls.iter().map(move |i| &self.nodes[*i])
    }

    /// Get declarations that call this one (incoming edges)
    pub fn callers(&self, index: NodeIndex) -> impl Iterator<Item = &DeclarationNode> + '_ {
        self.nodes[index].called_by.iter().map(move |i| &self.nodes[*i])
    }

    /// Call-graph neighbours in either direction
    pub fn neighbors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        let node = &self.nodes[index];
        node.calls.union(&node.called_by).copied()
    }

    /// Ownership ancestors, nearest first
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.nodes[index].parent,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.calls.len()).sum()
    }

    /// The complete ownership forest
    pub fn ownership_forest(&self) -> Vec<TreeNode> {
        self.roots.iter().map(|root| self.subtree(*root)).collect()
    }

    fn subtree(&self, index: NodeIndex) -> TreeNode {
        TreeNode {
            index,
            children: self.nodes[index]
                .children
                .iter()
                .map(|child| self.subtree(*child))
                .collect(),
        }
    }

    /// Get statistics about the call graph
    pub fn get_statistics(&self) -> CallGraphStats {
        CallGraphStats {
            declarations: self.nodes.len(),
            calls: self.edge_count(),
            roots: self.roots.len(),
            max_in_degree: self.nodes.iter().map(|n| n.called_by.len()).max().unwrap_or(0),
            max_out_degree: self.nodes.iter().map(|n| n.calls.len()).max().unwrap_or(0),
        }
    }
}

/// Iterator over ownership ancestors
pub struct Ancestors<'g> {
    graph: &'g CallGraph,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.next?;
        self.next = self.graph.nodes[current].parent;
        Some(current)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallGraphStats {
    pub declarations: usize,
    pub calls: usize,
    pub roots: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
}
