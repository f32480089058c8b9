//! # Relationship Query Engine
//!
//! Read-only queries over one built graph. Lookups go through the
//! [`RelationshipIndex`], so `outgoing` and `incoming` cost one hash lookup
//! for the name plus one slice access.
//!
//! There are no mutation operations here; a new schema means a new graph.

use hashbrown::HashSet;

use crate::graph::GraphData;
use crate::index::RelationshipIndex;
use crate::model::*;
use crate::{Error, Result};

/// A reachable node found by [`QueryEngine::expand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reached<'g> {
    pub node: &'g Node,
    /// Number of hops from the start node.
    pub depth: usize,
    /// The edge that first reached this node.
    pub via: &'g Edge,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'g> {
    graph: &'g GraphData,
    index: &'g RelationshipIndex,
}

impl<'g> QueryEngine<'g> {
    pub fn new(graph: &'g GraphData, index: &'g RelationshipIndex) -> Self {
        Self { graph, index }
    }

    /// Resolve a name to its node, or `NotFound`.
    pub fn node(&self, id: &str) -> Result<NodeIx> {
        self.graph
            .node_ix(id)
            .ok_or_else(|| Error::NotFound { name: id.to_string(), kind: None })
    }

    /// Edges with `id` as source.
    pub fn outgoing(&self, id: &str) -> Result<Vec<&'g Edge>> {
        let node = self.node(id)?;
        Ok(self.collect(self.index.outgoing(node)))
    }

    /// Edges with `id` as target, served from the reverse index.
    pub fn incoming(&self, id: &str) -> Result<Vec<&'g Edge>> {
        let node = self.node(id)?;
        Ok(self.collect(self.index.incoming(node)))
    }

    /// Edges touching `id`, optionally restricted to one kind.
    pub fn edges(&self, id: &str, dir: Direction, kind: Option<EdgeKind>) -> Result<Vec<&'g Edge>> {
        let node = self.node(id)?;
        Ok(self
            .index
            .edges(node, dir)
            .iter()
            .map(|&e| self.graph.edge(e))
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .collect())
    }

    /// Property edges only, in build order.
    pub fn all_property_edges(self) -> impl Iterator<Item = &'g Edge> {
        self.graph.edges().iter().filter(|e| e.kind == EdgeKind::Property)
    }

    pub fn degree(&self, id: &str) -> Result<(usize, usize)> {
        Ok(self.index.degree(self.node(id)?))
    }

    /// Breadth-first walk from `id`, following only `kinds` (all kinds when
    /// empty), up to `max_depth` hops. Each node is reported once, at its
    /// shortest distance. The start node is not included.
    pub fn expand(
        &self,
        id: &str,
        dir: Direction,
        kinds: &[EdgeKind],
        max_depth: usize,
    ) -> Result<Vec<Reached<'g>>> {
        let start = self.node(id)?;
        let mut visited: HashSet<NodeIx> = HashSet::new();
        visited.insert(start);

        let mut results = Vec::new();
        let mut frontier = vec![start];

        for depth in 1..=max_depth {
            let mut next = Vec::new();
            for &tip in &frontier {
                for e in self.index.edges(tip, dir) {
                    let edge = self.graph.edge(e);
                    if !kinds.is_empty() && !kinds.contains(&edge.kind) {
                        continue;
                    }
                    let Some(other) = edge.other_node(tip) else { continue };
                    if visited.insert(other) {
                        results.push(Reached { node: self.graph.node(other), depth, via: edge });
                        next.push(other);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(results)
    }

    fn collect(&self, ids: &[EdgeIx]) -> Vec<&'g Edge> {
        ids.iter().map(|&e| self.graph.edge(e)).collect()
    }
}
