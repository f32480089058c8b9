//! # Schema Graph
//!
//! Arena of nodes plus a flat edge list. Nodes carry only a name and a kind
//! tag; everything else stays in the [`RecordStore`](crate::storage::RecordStore).
//! Edges refer to nodes by [`NodeIx`], never by reference, so the whole
//! structure is plain owned data and can be shared behind an `Arc`.

pub mod builder;

use hashbrown::HashMap;

use crate::model::*;

pub use builder::{build, BuildOutput, GraphBuilder};

/// The built node/edge set of one snapshot.
#[derive(Debug, Clone, Default)]
pub struct GraphData {
    nodes: Vec<Node>,
    /// name → node
    by_name: HashMap<String, NodeIx>,
    edges: Vec<Edge>,
}

impl GraphData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Names are unique: adding a known name returns the
    /// existing index.
    pub(crate) fn add_node(&mut self, name: &str, kind: EntityKind) -> NodeIx {
        if let Some(&ix) = self.by_name.get(name) {
            return ix;
        }
        let ix = NodeIx(self.nodes.len() as u32);
        self.nodes.push(Node::new(ix, name, kind));
        self.by_name.insert(name.to_string(), ix);
        ix
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) -> EdgeIx {
        let ix = EdgeIx(self.edges.len() as u32);
        self.edges.push(edge);
        ix
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn node_ix(&self, name: &str) -> Option<NodeIx> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, ix: NodeIx) -> &Node {
        &self.nodes[ix.index()]
    }

    pub fn name(&self, ix: NodeIx) -> &str {
        &self.nodes[ix.index()].name
    }

    pub fn edge(&self, ix: EdgeIx) -> &Edge {
        &self.edges[ix.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count_of(&self, kind: EdgeKind) -> usize {
        self.edges.iter().filter(|e| e.kind == kind).count()
    }

    /// Flatten an edge into its string-only record.
    pub fn record(&self, edge: &Edge) -> EdgeRecord {
        EdgeRecord {
            kind: edge.kind,
            source: self.name(edge.src).to_string(),
            target: self.name(edge.dst).to_string(),
            label: edge.label.clone(),
            inherited_from: edge.inherited_from.map(|ix| self.name(ix).to_string()),
            is_self_ref: edge.is_self_ref,
        }
    }
}
