//! # schema-graph — Schema Relationship Model
//!
//! An in-memory model of a hierarchical data schema: classes with single
//! inheritance, inline and reusable attributes ("slots") with per-class
//! overrides, enumerations, value types, and variables mapped onto classes.
//!
//! ## Design Principles
//!
//! 1. **Build once, read many**: a schema is turned into an immutable
//!    [`Snapshot`]; reloading builds a new one
//! 2. **Arena + ids**: graph nodes live in one vector, edges are index pairs
//! 3. **Closed entity variant**: the kind of every record is fixed at load time
//! 4. **Ids in, ids out**: [`SchemaGraph`] returns names and flat records only
//!
//! ## Quick Start
//!
//! ```rust
//! use schema_graph::{SchemaGraph, SchemaRecords, EdgeKind};
//! use schema_graph::model::{ClassEntity, EnumEntity, SlotDefinition};
//!
//! # fn example() -> schema_graph::Result<()> {
//! let records = SchemaRecords::new()
//!     .enumeration(EnumEntity::new("ColorEnum").with_value("RED").with_value("GREEN"))
//!     .class(ClassEntity::new("Car")
//!         .with_attribute(SlotDefinition::new("color").with_range("ColorEnum")));
//!
//! let graph = SchemaGraph::build(records)?;
//!
//! let out = graph.outgoing("Car")?;
//! assert_eq!(out.len(), 1);
//! assert_eq!(out[0].kind, EdgeKind::Property);
//! assert_eq!(out[0].label.as_deref(), Some("color"));
//!
//! let used_by = graph.incoming("ColorEnum")?;
//! assert_eq!(used_by[0].source, "Car");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Record store | `storage` | name-keyed entities |
//! | Slot resolver | `resolver` | effective slots per class |
//! | Graph builder | `graph` | nodes, typed edges, build report |
//! | Query engine | `query` + `index` | outgoing / incoming lookups |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod resolver;
pub mod graph;
pub mod index;
pub mod query;
pub mod report;
pub mod config;
pub mod snapshot;
pub mod summary;

use std::sync::Arc;

use chrono::{DateTime, Utc};

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Entity, EntityKind, EffectiveSlot, SlotRange, SlotSource,
    EdgeKind, EdgeRecord, Direction,
};

// ============================================================================
// Re-exports: Build
// ============================================================================

pub use storage::{RecordStore, SchemaRecords};
pub use config::BuildConfig;
pub use report::{BuildReport, Diagnostic, DiagnosticKind};
pub use snapshot::{Snapshot, SharedSchemaGraph};
pub use summary::{EntitySummary, GraphStats};

use query::QueryEngine;

// ============================================================================
// Query Facade
// ============================================================================

/// The public face of one model snapshot.
///
/// Cheap to clone; every clone shares the same immutable snapshot. Only
/// names and flat records leave through this type.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    snapshot: Arc<Snapshot>,
}

impl SchemaGraph {
    /// Build with the default configuration.
    pub fn build(records: SchemaRecords) -> Result<Self> {
        Self::build_with(records, BuildConfig::default())
    }

    pub fn build_with(records: SchemaRecords, config: BuildConfig) -> Result<Self> {
        Ok(Self::from_snapshot(Arc::new(Snapshot::build(records, config)?)))
    }

    pub fn from_store(store: RecordStore, config: BuildConfig) -> Result<Self> {
        Ok(Self::from_snapshot(Arc::new(Snapshot::from_store(store, config)?)))
    }

    pub(crate) fn from_snapshot(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    fn engine(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.snapshot.graph, &self.snapshot.index)
    }

    fn records(&self, edges: Vec<&model::Edge>) -> Vec<EdgeRecord> {
        edges.into_iter().map(|e| self.snapshot.graph.record(e)).collect()
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    /// Edges with `id` as source. `NotFound` for an unknown id.
    pub fn outgoing(&self, id: &str) -> Result<Vec<EdgeRecord>> {
        Ok(self.records(self.engine().outgoing(id)?))
    }

    /// Edges with `id` as target. `NotFound` for an unknown id.
    pub fn incoming(&self, id: &str) -> Result<Vec<EdgeRecord>> {
        Ok(self.records(self.engine().incoming(id)?))
    }

    /// Every property edge. Unresolved ranges never appear here.
    pub fn all_property_edges(&self) -> Vec<EdgeRecord> {
        self.engine().all_property_edges().map(|e| self.snapshot.graph.record(e)).collect()
    }

    /// (outgoing, incoming) edge counts of `id`.
    pub fn degree(&self, id: &str) -> Result<(usize, usize)> {
        self.engine().degree(id)
    }

    /// Incoming property edges: the classes whose attributes point at `id`.
    pub fn used_by(&self, id: &str) -> Result<Vec<EdgeRecord>> {
        Ok(self.records(self.engine().edges(id, Direction::Incoming, Some(EdgeKind::Property))?))
    }

    /// Direct subclasses of `class`.
    pub fn subclasses(&self, class: &str) -> Result<Vec<String>> {
        self.require_class(class)?;
        Ok(self
            .engine()
            .edges(class, Direction::Incoming, Some(EdgeKind::Inheritance))?
            .into_iter()
            .map(|e| self.snapshot.graph.name(e.src).to_string())
            .collect())
    }

    /// All transitive subclasses of `class`, nearest first.
    pub fn descendants(&self, class: &str) -> Result<Vec<String>> {
        self.require_class(class)?;
        let limit = self.snapshot.store.class_count();
        Ok(self
            .engine()
            .expand(class, Direction::Incoming, &[EdgeKind::Inheritance], limit)?
            .into_iter()
            .map(|r| r.node.name.clone())
            .collect())
    }

    /// Variables mapped onto `class`.
    pub fn variables_of(&self, class: &str) -> Result<Vec<String>> {
        self.require_class(class)?;
        Ok(self
            .engine()
            .edges(class, Direction::Incoming, Some(EdgeKind::VariableMapping))?
            .into_iter()
            .map(|e| self.snapshot.graph.name(e.src).to_string())
            .collect())
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Resolved attributes of `class`: own slots first, then inherited ones.
    pub fn effective_slots(&self, class: &str) -> Result<Vec<EffectiveSlot>> {
        self.require_class(class)?;
        Ok(self.snapshot.slots.get(class).map(|r| r.slots.clone()).unwrap_or_default())
    }

    /// One resolved attribute, if `class` has it.
    pub fn effective_slot(&self, class: &str, slot: &str) -> Result<Option<EffectiveSlot>> {
        self.require_class(class)?;
        Ok(self.snapshot.slots.get(class).and_then(|r| r.slot(slot)).cloned())
    }

    /// Ancestor chain of `class`, nearest first.
    pub fn ancestors(&self, class: &str) -> Result<Vec<String>> {
        self.require_class(class)?;
        Ok(self.snapshot.slots.get(class).map(|r| r.ancestors.clone()).unwrap_or_default())
    }

    /// Permissible values of an enum, with descriptions.
    pub fn enum_values(&self, id: &str) -> Result<Vec<(String, Option<String>)>> {
        let e = self.snapshot.store.enumeration(id)?;
        Ok(e.permissible_values.iter().map(|v| (v.value.clone(), v.description.clone())).collect())
    }

    // ========================================================================
    // Entities
    // ========================================================================

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot.store.contains(id)
    }

    /// Kind label, presentation category and description of `id`.
    pub fn entity(&self, id: &str) -> Result<EntitySummary> {
        let entity = self
            .snapshot
            .store
            .lookup(id)
            .ok_or_else(|| Error::NotFound { name: id.to_string(), kind: None })?;
        Ok(summary::summarize(&self.snapshot.store, entity))
    }

    /// Names of every entity of one kind, in load order.
    pub fn ids_of_kind(&self, kind: EntityKind) -> Vec<String> {
        self.snapshot.store.all_of_kind(kind).map(|e| e.name().to_string()).collect()
    }

    // ========================================================================
    // Snapshot metadata
    // ========================================================================

    pub fn report(&self) -> &BuildReport {
        self.snapshot.report()
    }

    pub fn stats(&self) -> GraphStats {
        summary::stats(&self.snapshot.store, &self.snapshot.graph)
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.snapshot.built_at()
    }

    fn require_class(&self, class: &str) -> Result<()> {
        self.snapshot.store.get(class, EntityKind::Class).map(|_| ())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Duplicate name '{name}': already registered as {existing}, cannot register as {incoming}")]
    DuplicateName { name: String, existing: EntityKind, incoming: EntityKind },

    #[error("{kind} cycle through '{name}': {}", .chain.join(" -> "))]
    Cycle { kind: EntityKind, name: String, chain: Vec<String> },

    #[error("Not found: {name}")]
    NotFound { name: String, kind: Option<EntityKind> },

    #[error("'{name}' is a {actual}, expected a {expected}")]
    WrongKind { name: String, expected: EntityKind, actual: EntityKind },

    #[error("Schema rejected: {count} defect(s), first: {first}")]
    Invalid { count: usize, first: String },
}

pub type Result<T> = std::result::Result<T, Error>;
