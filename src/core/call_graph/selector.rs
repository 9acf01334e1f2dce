// src/core/call_graph/selector.rs
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SlicerError};
use super::{CallGraph, NodeIndex, TreeNode};

/// What to slice and how far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceRequest {
    /// Seed tokens: node ids, exact names, or name fragments
    pub seeds: Vec<String>,
    /// Hops that still receive full detail
    pub full_radius: usize,
    /// Hops that receive a structural stub; raised to `full_radius` if smaller
    pub context_radius: usize,
}

impl SliceRequest {
    pub fn new(seeds: Vec<String>, full_radius: usize, context_radius: usize) -> Self {
        Self {
            seeds,
            full_radius,
            context_radius,
        }
    }

    /// Split a comma-separated seed answer into tokens
    pub fn parse_seed_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(|token| token.trim())
            .filter(|token| !token.is_empty())
            .map(|token| token.to_string())
            .collect()
    }

    pub fn effective_context_radius(&self) -> usize {
        self.context_radius.max(self.full_radius)
    }
}

/// Per-invocation result of slicing.
///
/// `seeds ⊆ full_detail ⊆ context ⊆ included` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub seeds: BTreeSet<NodeIndex>,
    pub full_detail: BTreeSet<NodeIndex>,
    pub context: BTreeSet<NodeIndex>,
    /// `context` closed over ownership ancestors
    pub included: BTreeSet<NodeIndex>,
    /// BFS distance of every reached node
    pub distances: BTreeMap<NodeIndex, usize>,
    pub full_radius: usize,
    pub context_radius: usize,
}

impl SelectionState {
    pub fn is_full_detail(&self, index: NodeIndex) -> bool {
        self.full_detail.contains(&index)
    }

    pub fn is_included(&self, index: NodeIndex) -> bool {
        self.included.contains(&index)
    }
}

/// Computes graph slices around seed declarations
pub struct SliceSelector<'g> {
    graph: &'g CallGraph,
}

impl<'g> SliceSelector<'g> {
    pub fn new(graph: &'g CallGraph) -> Self {
        Self { graph }
    }

    /// Resolve seed tokens; each token uses the first tier that matches anything
    pub fn resolve_seeds(&self, tokens: &[String]) -> Result<BTreeSet<NodeIndex>> {
        let mut seeds = BTreeSet::new();

        for token in tokens {
            let matched = self.resolve_token(token);
            if matched.is_empty() {
                warn!("Seed '{}' did not match any declaration", token);
            } else {
                debug!("Seed '{}' resolved to {} declaration(s)", token, matched.len());
            }
            seeds.extend(matched);
        }

        if seeds.is_empty() {
            return Err(SlicerError::SeedResolution {
                tokens: tokens.to_vec(),
            });
        }
        Ok(seeds)
    }

    fn resolve_token(&self, token: &str) -> BTreeSet<NodeIndex> {
        if let Some(index) = self.graph.index_of(token) {
            return BTreeSet::from([index]);
        }

        let nodes = self.graph.nodes();
        let exact: BTreeSet<_> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.name == token)
            .map(|(index, _)| index)
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        let needle = token.to_lowercase();
        nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.name.to_lowercase().contains(&needle))
            .map(|(index, _)| index)
            .collect()
    }

    /// Full slice: seeds, two-radius BFS, ancestor closure
    pub fn select(&self, request: &SliceRequest) -> Result<SelectionState> {
        let seeds = self.resolve_seeds(&request.seeds)?;
        let full_radius = request.full_radius;
        let context_radius = request.effective_context_radius();

        let distances = self.bounded_bfs(&seeds, context_radius);
        let full_detail: BTreeSet<_> = distances
            .iter()
            .filter(|(_, distance)| **distance <= full_radius)
            .map(|(index, _)| *index)
            .collect();
        let context: BTreeSet<_> = distances.keys().copied().collect();
        let included = self.ancestor_closure(&context);

        info!(
            "Selected {} seed(s): {} full-detail, {} context, {} included",
            seeds.len(),
            full_detail.len(),
            context.len(),
            included.len()
        );

        Ok(SelectionState {
            seeds,
            full_detail,
            context,
            included,
            distances,
            full_radius,
            context_radius,
        })
    }

    /// Multi-source BFS over the undirected call graph, up to `radius` hops
    pub fn bounded_bfs(&self, seeds: &BTreeSet<NodeIndex>, radius: usize) -> BTreeMap<NodeIndex, usize> {
        let mut distances = BTreeMap::new();
        let mut queue = VecDeque::new();

        for seed in seeds {
            distances.insert(*seed, 0);
            queue.push_back(*seed);
        }

        while let Some(current) = queue.pop_front() {
            let distance = distances[&current];
            if distance == radius {
                continue;
            }
            for neighbor in self.graph.neighbors(current) {
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, distance + 1);
                    queue.push_back(neighbor);
                }
            }
        }

        distances
    }

    /// Add every ownership ancestor of the given nodes
    pub fn ancestor_closure(&self, nodes: &BTreeSet<NodeIndex>) -> BTreeSet<NodeIndex> {
        let mut included = nodes.clone();
        for node in nodes {
            for ancestor in self.graph.ancestors(*node) {
                if !included.insert(ancestor) {
                    break;
                }
            }
        }
        included
    }
}

/// Keep only included nodes; an excluded node drops its whole subtree
pub fn filter_forest(forest: &[TreeNode], included: &BTreeSet<NodeIndex>) -> Vec<TreeNode> {
    forest
        .iter()
        .filter(|node| included.contains(&node.index))
        .map(|node| TreeNode {
            index: node.index,
            children: filter_forest(&node.children, included),
        })
        .collect()
}
