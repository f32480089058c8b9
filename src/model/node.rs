//! Node in the schema graph.

use serde::{Deserialize, Serialize};
use super::EntityKind;

/// Arena index of a node within one built graph.
///
/// Only meaningful inside the snapshot that produced it; never handed out
/// through the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIx(pub u32);

impl NodeIx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeIx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node: the entity name plus its kind tag. Business data stays in the
/// record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub ix: NodeIx,
    pub name: String,
    pub kind: EntityKind,
}

impl Node {
    pub fn new(ix: NodeIx, name: impl Into<String>, kind: EntityKind) -> Self {
        Self { ix, name: name.into(), kind }
    }
}
