// SPDX-License-Identifier: MIT OR Apache-2.0

use petgraph::graph::DiGraph;

/// A selected parent: source variable index and time lag (in samples).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentRef {
    pub var: usize,
    pub lag: usize,
}

/// Finalized ordered parent list for one target variable, in selection order.
#[derive(Debug, Clone)]
pub struct SelectedParents {
    pub target: usize,
    pub parents: Vec<ParentRef>,
}

/// Read-only directed-dependency view assembled from per-target parent sets:
/// an edge `j -> i` for every selected parent of `i` with `j != i`.
#[derive(Debug, Clone)]
pub struct CausalGraph {
    n_vars: usize,
    parent_sets: Vec<SelectedParents>,
}

impl CausalGraph {
    pub(crate) fn from_parent_sets(n_vars: usize, parent_sets: Vec<SelectedParents>) -> Self {
        Self {
            n_vars,
            parent_sets,
        }
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Ordered parent list of one target (self-history parents included).
    pub fn parents(&self, target: usize) -> &[ParentRef] {
        &self.parent_sets[target].parents
    }

    /// Directed edges `(from, to)`, self-edges dropped, duplicates from
    /// multiple lags of the same source collapsed.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for set in self.parent_sets.iter() {
            for parent in set.parents.iter() {
                if parent.var == set.target {
                    continue;
                }
                let edge = (parent.var, set.target);
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        from != to
            && self.parent_sets[to]
                .parents
                .iter()
                .any(|p| p.var == from)
    }

    /// Convert to a petgraph digraph: node weights are variable indices,
    /// edge weights the selected lags (one edge per selected non-self parent).
    pub fn to_petgraph(&self) -> DiGraph<usize, usize> {
        let mut graph = DiGraph::new();
        let nodes: Vec<_> = (0..self.n_vars).map(|v| graph.add_node(v)).collect();
        for set in self.parent_sets.iter() {
            for parent in set.parents.iter() {
                if parent.var == set.target {
                    continue;
                }
                graph.add_edge(nodes[parent.var], nodes[set.target], parent.lag);
            }
        }
        graph
    }
}
