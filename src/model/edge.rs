//! Edges of the schema graph.

use std::fmt;

use serde::{Deserialize, Serialize};
use super::NodeIx;

/// Arena index of an edge within one built graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeIx(pub u32);

impl EdgeIx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeIx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Relationship type of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// class → parent class
    Inheritance,
    /// class → class/enum, labeled with the slot name
    Property,
    /// variable → mapped class
    VariableMapping,
}

impl EdgeKind {
    pub fn label(self) -> &'static str {
        match self {
            EdgeKind::Inheritance => "inheritance",
            EdgeKind::Property => "property",
            EdgeKind::VariableMapping => "variable-mapping",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A directed, typed edge between two arena nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub kind: EdgeKind,
    pub src: NodeIx,
    pub dst: NodeIx,
    /// Slot name for property edges.
    pub label: Option<String>,
    /// Ancestor the slot behind a property edge was inherited from.
    pub inherited_from: Option<NodeIx>,
    pub is_self_ref: bool,
}

impl Edge {
    pub fn new(kind: EdgeKind, src: NodeIx, dst: NodeIx) -> Self {
        Self { kind, src, dst, label: None, inherited_from: None, is_self_ref: src == dst }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_inherited_from(mut self, ancestor: Option<NodeIx>) -> Self {
        self.inherited_from = ancestor;
        self
    }

    /// The "other" end of the edge from the given node.
    pub fn other_node(&self, from: NodeIx) -> Option<NodeIx> {
        if from == self.src { Some(self.dst) }
        else if from == self.dst { Some(self.src) }
        else { None }
    }
}

/// Flat, string-only view of an edge, the form that leaves the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
    pub is_self_ref: bool,
}

impl fmt::Display for EdgeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} -[{}:{}]-> {}", self.source, self.kind, label, self.target),
            None => write!(f, "{} -[{}]-> {}", self.source, self.kind, self.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_ref_flag() {
        let e = Edge::new(EdgeKind::Property, NodeIx(3), NodeIx(3)).with_label("parent_specimen");
        assert!(e.is_self_ref);
        assert_eq!(e.other_node(NodeIx(3)), Some(NodeIx(3)));

        let e = Edge::new(EdgeKind::Inheritance, NodeIx(1), NodeIx(0));
        assert!(!e.is_self_ref);
        assert_eq!(e.other_node(NodeIx(0)), Some(NodeIx(1)));
        assert_eq!(e.other_node(NodeIx(7)), None);
    }

    #[test]
    fn test_record_display() {
        let r = EdgeRecord {
            kind: EdgeKind::Property,
            source: "Car".into(),
            target: "ColorEnum".into(),
            label: Some("color".into()),
            inherited_from: None,
            is_self_ref: false,
        };
        assert_eq!(r.to_string(), "Car -[property:color]-> ColorEnum");
    }
}
