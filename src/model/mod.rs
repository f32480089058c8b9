//! # Schema Model
//!
//! Plain DTOs shared by every layer: raw entities, effective slots, graph
//! nodes and edges.
//!
//! Design rule: this module is pure data. No I/O, no state, no lookups
//! across entities.

pub mod entity;
pub mod slot;
pub mod node;
pub mod edge;

pub use entity::{
    Entity, EntityKind, ClassEntity, SlotDefinition, SlotOverride,
    EnumEntity, PermissibleValue, TypeEntity, TypeBase, Primitive,
    VariableEntity,
};
pub use slot::{EffectiveSlot, SlotRange, SlotSource};
pub use node::{Node, NodeIx};
pub use edge::{Edge, EdgeIx, EdgeKind, EdgeRecord, Direction};
