//! Graph builder: one whole-schema pass over a complete record store.
//!
//! ```text
//! RecordStore ──► nodes (one per entity)
//!             ──► SlotResolver::resolve_all ──► inheritance + property edges
//!             ──► variable-mapping edges
//!             ──► RelationshipIndex (outgoing + reverse)
//! ```
//!
//! Dangling references are reported in the [`BuildReport`], never
//! materialized as placeholder nodes.

use std::sync::Arc;

use hashbrown::HashSet;

use crate::config::BuildConfig;
use crate::index::RelationshipIndex;
use crate::model::*;
use crate::report::{BuildReport, Diagnostic, DiagnosticKind};
use crate::resolver::{type_root, ResolvedClass, SlotResolver, SlotTable, TypeRoot};
use crate::storage::RecordStore;
use crate::{Error, Result};

/// Everything one build produces.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub graph: super::GraphData,
    pub index: RelationshipIndex,
    pub slots: SlotTable,
    pub report: BuildReport,
}

/// Build the graph for `store`.
pub fn build(store: &RecordStore, config: &BuildConfig) -> Result<BuildOutput> {
    GraphBuilder::new(store, config).build()
}

/// Logical identity of an edge, used to refuse duplicates.
type EdgeKey = (EdgeKind, NodeIx, NodeIx, Option<String>);

pub struct GraphBuilder<'s> {
    store: &'s RecordStore,
    config: &'s BuildConfig,
    graph: super::GraphData,
    seen: HashSet<EdgeKey>,
    report: BuildReport,
}

impl<'s> GraphBuilder<'s> {
    pub fn new(store: &'s RecordStore, config: &'s BuildConfig) -> Self {
        Self {
            store,
            config,
            graph: super::GraphData::new(),
            seen: HashSet::new(),
            report: BuildReport::new(),
        }
    }

    pub fn build(mut self) -> Result<BuildOutput> {
        self.add_nodes();
        self.check_types()?;

        let resolver = SlotResolver::new(self.store, self.config);
        let resolved = resolver.resolve_all()?;
        tracing::debug!(classes = resolved.len(), "slots resolved");

        self.add_inheritance_edges();
        self.add_property_edges(&resolved);
        self.add_variable_edges();

        let slots = resolver.into_table();
        let index = RelationshipIndex::build(&self.graph);

        tracing::info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            property_edges = self.graph.edge_count_of(EdgeKind::Property),
            diagnostics = self.report.len(),
            "schema graph built"
        );

        if self.config.strict && !self.report.is_clean() {
            return Err(Error::Invalid {
                count: self.report.len(),
                first: self.report.diagnostics[0].to_string(),
            });
        }

        Ok(BuildOutput { graph: self.graph, index, slots, report: self.report })
    }

    // ========================================================================
    // Phases
    // ========================================================================

    /// One node per entity, grouped by kind, insertion order within a kind.
    fn add_nodes(&mut self) {
        for kind in EntityKind::ALL {
            for entity in self.store.all_of_kind(kind) {
                self.graph.add_node(entity.name(), kind);
            }
        }
    }

    /// Walk every type's refinement chain. Loops are fatal; a dangling base
    /// is reported.
    fn check_types(&mut self) -> Result<()> {
        for t in self.store.types() {
            if let TypeRoot::Dangling(base) = type_root(self.store, &t.name)? {
                self.report.push(Diagnostic::new(DiagnosticKind::MissingTypeBase, &t.name, base));
            }
        }
        Ok(())
    }

    /// class → parent, for every class whose parent resolves. A dangling
    /// parent was already reported by the resolver.
    fn add_inheritance_edges(&mut self) {
        let store = self.store;
        for class in store.classes() {
            let Some(parent) = class.parent.as_deref() else { continue };
            if store.find_class(parent).is_none() {
                continue;
            }
            let (Some(src), Some(dst)) = (self.graph.node_ix(&class.name), self.graph.node_ix(parent)) else {
                continue;
            };
            self.add_edge(Edge::new(EdgeKind::Inheritance, src, dst));
        }
    }

    /// class → range for every effective slot whose range is a class or enum.
    fn add_property_edges(&mut self, resolved: &[Arc<ResolvedClass>]) {
        for rc in resolved {
            self.report.extend(rc.diagnostics.iter().cloned());

            let Some(src) = self.graph.node_ix(&rc.class) else { continue };
            for slot in &rc.slots {
                if !slot.range.is_structural() {
                    continue;
                }
                let Some(dst) = slot.range.name().and_then(|r| self.graph.node_ix(r)) else {
                    continue;
                };
                let ancestor = slot.inherited_from.as_deref().and_then(|a| self.graph.node_ix(a));
                self.add_edge(
                    Edge::new(EdgeKind::Property, src, dst)
                        .with_label(&slot.name)
                        .with_inherited_from(ancestor),
                );
            }
        }
    }

    /// variable → class for every variable whose class resolves.
    fn add_variable_edges(&mut self) {
        let store = self.store;
        for var in store.variables() {
            if store.find_class(&var.class_name).is_none() {
                self.report.push(Diagnostic::new(
                    DiagnosticKind::MissingMappedClass,
                    &var.name,
                    &var.class_name,
                ));
                continue;
            }
            let (Some(src), Some(dst)) = (self.graph.node_ix(&var.name), self.graph.node_ix(&var.class_name)) else {
                continue;
            };
            self.add_edge(Edge::new(EdgeKind::VariableMapping, src, dst));
        }
    }

    /// Add an edge unless the same logical relationship already exists.
    fn add_edge(&mut self, edge: Edge) -> Option<EdgeIx> {
        let key = (edge.kind, edge.src, edge.dst, edge.label.clone());
        if !self.seen.insert(key) {
            tracing::trace!(kind = %edge.kind, "duplicate edge skipped");
            return None;
        }
        Some(self.graph.push_edge(edge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car_store() -> RecordStore {
        let mut s = RecordStore::new();
        s.register(EnumEntity::new("ColorEnum").with_value("RED").with_value("GREEN")).unwrap();
        s.register(ClassEntity::new("Vehicle").with_attribute(SlotDefinition::new("color").with_range("ColorEnum")))
            .unwrap();
        s.register(
            ClassEntity::new("Car")
                .with_parent("Vehicle")
                .with_attribute(SlotDefinition::new("tow").with_range("Car"))
                .with_attribute(SlotDefinition::new("plate").with_range("string")),
        )
        .unwrap();
        s.register(VariableEntity::new("v1", "Car")).unwrap();
        s
    }

    #[test]
    fn test_edge_counts() {
        let store = car_store();
        let out = build(&store, &BuildConfig::default()).unwrap();

        assert_eq!(out.graph.node_count(), 4);
        assert_eq!(out.graph.edge_count_of(EdgeKind::Inheritance), 1);
        // Vehicle.color, Car.color (inherited), Car.tow
        assert_eq!(out.graph.edge_count_of(EdgeKind::Property), 3);
        assert_eq!(out.graph.edge_count_of(EdgeKind::VariableMapping), 1);
        assert!(out.report.is_clean());
        assert_eq!(out.slots.len(), 2);
    }

    #[test]
    fn test_inherited_property_edge_carries_ancestor() {
        let store = car_store();
        let out = build(&store, &BuildConfig::default()).unwrap();
        let car = out.graph.node_ix("Car").unwrap();
        let vehicle = out.graph.node_ix("Vehicle").unwrap();

        let color = out
            .graph
            .edges()
            .iter()
            .find(|e| e.src == car && e.label.as_deref() == Some("color"))
            .unwrap();
        assert_eq!(color.inherited_from, Some(vehicle));

        let tow = out
            .graph
            .edges()
            .iter()
            .find(|e| e.src == car && e.label.as_deref() == Some("tow"))
            .unwrap();
        assert!(tow.is_self_ref);
        assert_eq!(tow.inherited_from, None);
    }

    #[test]
    fn test_dangling_references_are_reported_not_materialized() {
        let mut s = RecordStore::new();
        s.register(ClassEntity::new("Car").with_attribute(SlotDefinition::new("engine").with_range("Engine")))
            .unwrap();
        s.register(VariableEntity::new("v9", "Boat")).unwrap();

        let out = build(&s, &BuildConfig::default()).unwrap();
        assert_eq!(out.graph.node_count(), 2);
        assert_eq!(out.graph.edge_count(), 0);
        assert_eq!(out.report.count(DiagnosticKind::MissingRange), 1);
        assert_eq!(out.report.count(DiagnosticKind::MissingMappedClass), 1);
    }

    #[test]
    fn test_strict_mode_rejects_defects() {
        let mut s = RecordStore::new();
        s.register(ClassEntity::new("Car").with_parent("Vehicle")).unwrap();

        let err = build(&s, &BuildConfig::strict()).unwrap_err();
        assert!(matches!(err, Error::Invalid { count: 1, .. }));
    }

    #[test]
    fn test_dangling_type_base_reported() {
        let mut s = RecordStore::new();
        s.register(TypeEntity::refining("code", "code_base")).unwrap();
        let out = build(&s, &BuildConfig::default()).unwrap();
        assert_eq!(out.report.count(DiagnosticKind::MissingTypeBase), 1);
    }
}
