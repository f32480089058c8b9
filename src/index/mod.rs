//! Adjacency and reverse indexes.
//!
//! Both directions are dense vectors indexed by [`NodeIx`], so outgoing and
//! incoming lookups are a single slice access. The index is built once after
//! the edge list is final and never updated.

use smallvec::SmallVec;

use crate::graph::GraphData;
use crate::model::*;

/// Per-node edge lists. Most schema nodes have only a handful of edges.
type EdgeList = SmallVec<[EdgeIx; 4]>;

#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    /// node → edges with that node as source
    outgoing: Vec<EdgeList>,
    /// node → edges with that node as target
    incoming: Vec<EdgeList>,
}

impl RelationshipIndex {
    pub fn build(graph: &GraphData) -> Self {
        let n = graph.node_count();
        let mut outgoing = vec![EdgeList::new(); n];
        let mut incoming = vec![EdgeList::new(); n];

        for (i, edge) in graph.edges().iter().enumerate() {
            let ix = EdgeIx(i as u32);
            outgoing[edge.src.index()].push(ix);
            incoming[edge.dst.index()].push(ix);
        }

        Self { outgoing, incoming }
    }

    pub fn outgoing(&self, node: NodeIx) -> &[EdgeIx] {
        self.outgoing.get(node.index()).map(|l| l.as_slice()).unwrap_or_default()
    }

    pub fn incoming(&self, node: NodeIx) -> &[EdgeIx] {
        self.incoming.get(node.index()).map(|l| l.as_slice()).unwrap_or_default()
    }

    /// Edge ids touching `node` in the given direction. A self-referencing
    /// edge is listed once for `Both`.
    pub fn edges(&self, node: NodeIx, dir: Direction) -> EdgeList {
        match dir {
            Direction::Outgoing => self.outgoing(node).iter().copied().collect(),
            Direction::Incoming => self.incoming(node).iter().copied().collect(),
            Direction::Both => {
                let mut all: EdgeList = self.outgoing(node).iter().copied().collect();
                for &e in self.incoming(node) {
                    if !all.contains(&e) {
                        all.push(e);
                    }
                }
                all
            }
        }
    }

    pub fn degree(&self, node: NodeIx) -> (usize, usize) {
        (self.outgoing(node).len(), self.incoming(node).len())
    }
}
