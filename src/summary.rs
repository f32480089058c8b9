//! Flat display records for the facade.

use serde::{Deserialize, Serialize};

use crate::graph::GraphData;
use crate::model::*;
use crate::resolver::{type_root, TypeRoot};
use crate::storage::RecordStore;

/// What the facade tells presentation code about one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: String,
    pub kind: EntityKind,
    /// "Class", "Enum", ...
    pub kind_label: String,
    /// Opaque presentation category, e.g. `abstract-class` or `type:string`.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Node and edge counts of one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub classes: usize,
    pub slots: usize,
    pub enums: usize,
    pub types: usize,
    pub variables: usize,
    pub inheritance_edges: usize,
    pub property_edges: usize,
    pub variable_mapping_edges: usize,
}

pub fn summarize(store: &RecordStore, entity: &Entity) -> EntitySummary {
    EntitySummary {
        id: entity.name().to_string(),
        kind: entity.kind(),
        kind_label: entity.kind().label().to_string(),
        category: category(store, entity),
        description: entity.description().map(String::from),
    }
}

/// Presentation category, dispatched on the entity tag.
pub fn category(store: &RecordStore, entity: &Entity) -> String {
    match entity {
        Entity::Class(c) if c.is_abstract => "abstract-class".into(),
        Entity::Class(_) => "class".into(),
        Entity::Slot(_) => "slot".into(),
        Entity::Enum(_) => "enum".into(),
        Entity::Variable(_) => "variable".into(),
        Entity::Type(t) => match type_root(store, &t.name) {
            Ok(TypeRoot::Primitive(p)) => format!("type:{p}"),
            Ok(TypeRoot::Dangling(_)) | Err(_) => "type:unresolved".into(),
        },
    }
}

pub fn stats(store: &RecordStore, graph: &GraphData) -> GraphStats {
    GraphStats {
        classes: store.count(EntityKind::Class),
        slots: store.count(EntityKind::Slot),
        enums: store.count(EntityKind::Enum),
        types: store.count(EntityKind::Type),
        variables: store.count(EntityKind::Variable),
        inheritance_edges: graph.edge_count_of(EdgeKind::Inheritance),
        property_edges: graph.edge_count_of(EdgeKind::Property),
        variable_mapping_edges: graph.edge_count_of(EdgeKind::VariableMapping),
    }
}
