//! # Slot Resolver
//!
//! Computes, per class, the deduplicated set of effective slots under
//! inheritance and override precedence.
//!
//! ## Precedence
//!
//! Within one class: override > inline attribute > plain reference.
//! Across the ancestor chain: the occurrence nearest to the resolved class
//! fixes a slot's position, source and `inherited_from`. A plain reference
//! carries the values of the slot definition it names, at the point in the
//! chain where the reference appears. Fields still unset fall back through
//! the remaining occurrences (nearest first), then to defaults.
//!
//! Results are memoized per class behind a `RwLock` so that classes can be
//! resolved from several threads at once; each class writes only its own
//! entry. Once a build is done the memo is frozen into a [`SlotTable`].

pub mod chain;

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Serialize;
use smallvec::SmallVec;

use crate::config::BuildConfig;
use crate::model::*;
use crate::report::{Diagnostic, DiagnosticKind};
use crate::storage::RecordStore;
use crate::Result;

pub use chain::{ancestor_chain, type_root, AncestorChain, TypeRoot};

// ============================================================================
// ResolvedClass
// ============================================================================

/// The resolver's output for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClass {
    pub class: String,
    /// Ancestors, nearest first.
    pub ancestors: Vec<String>,
    /// Effective slots: own slots first, then each ancestor's new ones.
    pub slots: Vec<EffectiveSlot>,
    /// Non-fatal defects found on this class's own declarations.
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedClass {
    pub fn slot(&self, name: &str) -> Option<&EffectiveSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|s| s.name.as_str())
    }
}

// ============================================================================
// SlotTable: the frozen memo
// ============================================================================

/// Resolved slots for every class of one snapshot.
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    by_class: HashMap<String, Arc<ResolvedClass>>,
}

impl SlotTable {
    pub fn get(&self, class: &str) -> Option<&ResolvedClass> {
        self.by_class.get(class).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.by_class.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }
}

// ============================================================================
// SlotResolver
// ============================================================================

/// Memoizing resolver over one record store.
pub struct SlotResolver<'s> {
    store: &'s RecordStore,
    config: &'s BuildConfig,
    memo: RwLock<HashMap<String, Arc<ResolvedClass>>>,
}

impl<'s> SlotResolver<'s> {
    pub fn new(store: &'s RecordStore, config: &'s BuildConfig) -> Self {
        Self { store, config, memo: RwLock::new(HashMap::new()) }
    }

    /// Resolve one class, reusing a memoized result if there is one.
    pub fn resolve(&self, class: &str) -> Result<Arc<ResolvedClass>> {
        if let Some(hit) = self.memo.read().get(class) {
            return Ok(Arc::clone(hit));
        }

        let resolved = Arc::new(self.compute(class)?);
        let mut memo = self.memo.write();
        let entry = memo.entry(class.to_string()).or_insert(resolved);
        Ok(Arc::clone(entry))
    }

    /// Resolve every class in the store, in insertion order.
    ///
    /// The first fatal error (a hierarchy cycle) aborts the whole pass.
    pub fn resolve_all(&self) -> Result<Vec<Arc<ResolvedClass>>> {
        let names: Vec<&str> = self.store.classes().map(|c| c.name.as_str()).collect();
        self.resolve_many(&names)
    }

    #[cfg(feature = "parallel")]
    fn resolve_many(&self, names: &[&str]) -> Result<Vec<Arc<ResolvedClass>>> {
        if self.config.parallel {
            use rayon::prelude::*;
            return names.par_iter().map(|n| self.resolve(n)).collect();
        }
        names.iter().map(|n| self.resolve(n)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn resolve_many(&self, names: &[&str]) -> Result<Vec<Arc<ResolvedClass>>> {
        names.iter().map(|n| self.resolve(n)).collect()
    }

    /// Freeze the memo into a read-only table.
    pub fn into_table(self) -> SlotTable {
        SlotTable { by_class: self.memo.into_inner() }
    }

    // ========================================================================
    // One class
    // ========================================================================

    fn compute(&self, class: &str) -> Result<ResolvedClass> {
        let chain = ancestor_chain(self.store, class)?;
        let mut diagnostics = Vec::new();

        if let (Some(parent), 1) = (chain.missing_parent, chain.classes.len()) {
            diagnostics.push(Diagnostic::new(DiagnosticKind::MissingParent, class, parent));
        }

        // Walk self → root. `order` records first-seen names; `acc` merges
        // every occurrence of a name.
        let mut order: Vec<&'s str> = Vec::new();
        let mut acc: HashMap<&'s str, Accum<'s>> = HashMap::new();

        for (depth, owner) in chain.classes.iter().copied().enumerate() {
            for local in local_slots(self.store, owner) {
                if depth == 0 && local.occurrences.len() > 1 && self.config.report_source_conflicts {
                    diagnostics.push(conflict(class, &local));
                }

                match acc.get_mut(local.name) {
                    Some(a) => {
                        if a.refines.is_none() {
                            a.refines = Some(owner.name.as_str());
                        }
                        a.absorb(&local);
                    }
                    None => {
                        let mut a = Accum::new(depth, owner, local.occurrences[0].source);
                        a.absorb(&local);
                        order.push(local.name);
                        acc.insert(local.name, a);
                    }
                }
            }
        }

        let mut slots = Vec::with_capacity(order.len());
        for name in order {
            let Some(a) = acc.remove(name) else { continue };
            let slot = self.finish(name, a);

            if !slot.is_inherited() {
                match &slot.range {
                    SlotRange::Unresolved(range) => diagnostics.push(
                        Diagnostic::new(DiagnosticKind::MissingRange, class, range.clone()).on_slot(name),
                    ),
                    SlotRange::Unspecified => diagnostics.push(
                        Diagnostic::new(DiagnosticKind::UnspecifiedRange, class, "no range stated")
                            .on_slot(name),
                    ),
                    _ => {}
                }
            }
            slots.push(slot);
        }

        tracing::trace!(class, slots = slots.len(), depth = chain.classes.len(), "resolved class");

        Ok(ResolvedClass {
            class: class.to_string(),
            ancestors: chain.ancestors().map(|c| c.name.clone()).collect(),
            slots,
            diagnostics,
        })
    }

    /// Apply the default fallbacks.
    fn finish(&self, name: &str, a: Accum<'s>) -> EffectiveSlot {
        let range_name = a.range.or(self.config.default_range.as_deref());

        EffectiveSlot {
            name: name.to_string(),
            range: range_name.map_or(SlotRange::Unspecified, |r| resolve_range(self.store, r)),
            required: a.required.unwrap_or(false),
            multivalued: a.multivalued.unwrap_or(false),
            description: a.description.map(String::from),
            source: a.source,
            inherited_from: (a.depth > 0).then(|| a.owner.to_string()),
            refines: a.refines.map(String::from),
        }
    }
}

// ============================================================================
// Range classification
// ============================================================================

/// Classify a range name against the store.
///
/// Order: class, enum, registered type, built-in primitive. Anything else,
/// including a name that belongs to a slot or variable, is unresolved.
pub fn resolve_range(store: &RecordStore, range: &str) -> SlotRange {
    match store.kind_of(range) {
        Some(EntityKind::Class) => SlotRange::Class(range.to_string()),
        Some(EntityKind::Enum) => SlotRange::Enum(range.to_string()),
        Some(EntityKind::Type) => SlotRange::Type(range.to_string()),
        Some(EntityKind::Slot | EntityKind::Variable) => SlotRange::Unresolved(range.to_string()),
        None => match Primitive::from_name(range) {
            Some(p) => SlotRange::Primitive(p),
            None => SlotRange::Unresolved(range.to_string()),
        },
    }
}

// ============================================================================
// Local occurrences
// ============================================================================

/// One appearance of a slot name in one class.
#[derive(Debug, Clone, Copy)]
struct Occurrence<'s> {
    source: SlotSource,
    range: Option<&'s str>,
    required: Option<bool>,
    multivalued: Option<bool>,
    description: Option<&'s str>,
}

/// All appearances of one name in one class, highest-ranked first.
#[derive(Debug)]
struct LocalSlot<'s> {
    name: &'s str,
    occurrences: SmallVec<[Occurrence<'s>; 2]>,
}

/// Collect a class's own declarations, grouped by name.
///
/// Names keep their first declaration position: inline attributes, then
/// referenced slots, then override-only names. A reference takes its values
/// from the registered slot definition; inline attributes and overrides never
/// look at it.
fn local_slots<'s>(store: &'s RecordStore, class: &'s ClassEntity) -> Vec<LocalSlot<'s>> {
    let mut out: Vec<LocalSlot<'s>> = Vec::new();
    let mut push = |name: &'s str, occ: Occurrence<'s>| {
        match out.iter_mut().find(|l| l.name == name) {
            Some(l) => l.occurrences.push(occ),
            None => {
                let mut occurrences = SmallVec::new();
                occurrences.push(occ);
                out.push(LocalSlot { name, occurrences });
            }
        }
    };

    for attr in &class.attributes {
        push(attr.name.as_str(), Occurrence {
            source: SlotSource::Inline,
            range: attr.range.as_deref(),
            required: attr.required,
            multivalued: attr.multivalued,
            description: attr.description.as_deref(),
        });
    }
    for slot in &class.slots {
        let def = store.slot(slot);
        push(slot.as_str(), Occurrence {
            source: SlotSource::Reference,
            range: def.and_then(|d| d.range.as_deref()),
            required: def.and_then(|d| d.required),
            multivalued: def.and_then(|d| d.multivalued),
            description: def.and_then(|d| d.description.as_deref()),
        });
    }
    for (name, usage) in &class.slot_usage {
        push(name.as_str(), Occurrence {
            source: SlotSource::Override,
            range: usage.range.as_deref(),
            required: usage.required,
            multivalued: usage.multivalued,
            description: usage.description.as_deref(),
        });
    }

    for local in &mut out {
        // Stable: equal sources keep declaration order.
        local.occurrences.sort_by(|a, b| b.source.cmp(&a.source));
    }
    out
}

fn conflict(class: &str, local: &LocalSlot<'_>) -> Diagnostic {
    let sources: Vec<&str> = local
        .occurrences
        .iter()
        .map(|o| o.source.label())
        .collect();
    Diagnostic::new(
        DiagnosticKind::SourceConflict,
        class,
        format!("declared as {}; {} wins", sources.join(" + "), sources[0]),
    )
    .on_slot(local.name)
}

// ============================================================================
// Accumulator
// ============================================================================

/// Field-wise merge of every occurrence of one name along the chain.
#[derive(Debug)]
struct Accum<'s> {
    depth: usize,
    owner: &'s str,
    source: SlotSource,
    refines: Option<&'s str>,
    range: Option<&'s str>,
    required: Option<bool>,
    multivalued: Option<bool>,
    description: Option<&'s str>,
}

impl<'s> Accum<'s> {
    fn new(depth: usize, owner: &'s ClassEntity, source: SlotSource) -> Self {
        Self {
            depth,
            owner: &owner.name,
            source,
            refines: None,
            range: None,
            required: None,
            multivalued: None,
            description: None,
        }
    }

    /// Fill still-missing fields from `local`; earlier values are never replaced.
    fn absorb(&mut self, local: &LocalSlot<'s>) {
        for o in &local.occurrences {
            self.range = self.range.or(o.range);
            self.required = self.required.or(o.required);
            self.multivalued = self.multivalued.or(o.multivalued);
            self.description = self.description.or(o.description);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn scenario_a() -> RecordStore {
        let mut s = RecordStore::new();
        s.register(EnumEntity::new("SpecimenTypeEnum").with_value("blood")).unwrap();
        s.register(
            ClassEntity::new("Entity")
                .abstract_class()
                .with_attribute(SlotDefinition::new("id").with_range("string").required(true)),
        )
        .unwrap();
        s.register(
            ClassEntity::new("Specimen")
                .with_parent("Entity")
                .with_attribute(SlotDefinition::new("specimen_type").with_range("SpecimenTypeEnum")),
        )
        .unwrap();
        s.register(
            ClassEntity::new("Material")
                .with_parent("Specimen")
                .with_override("specimen_type", SlotOverride::new().required(true)),
        )
        .unwrap();
        s
    }

    #[test]
    fn test_root_class_has_only_local_slots() {
        let s = scenario_a();
        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);
        let entity = r.resolve("Entity").unwrap();

        assert_eq!(entity.slot_names().collect::<Vec<_>>(), vec!["id"]);
        assert!(entity.ancestors.is_empty());
        assert!(entity.diagnostics.is_empty());
    }

    #[test]
    fn test_override_keeps_inherited_range() {
        let s = scenario_a();
        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);
        let material = r.resolve("Material").unwrap();

        assert_eq!(material.slot_names().collect::<Vec<_>>(), vec!["specimen_type", "id"]);

        let st = material.slot("specimen_type").unwrap();
        assert_eq!(st.range, SlotRange::Enum("SpecimenTypeEnum".into()));
        assert!(st.required);
        assert_eq!(st.source, SlotSource::Override);
        assert_eq!(st.inherited_from, None);
        assert_eq!(st.refines.as_deref(), Some("Specimen"));

        let id = material.slot("id").unwrap();
        assert_eq!(id.range, SlotRange::Primitive(Primitive::String));
        assert!(id.required);
        assert_eq!(id.inherited_from.as_deref(), Some("Entity"));
        assert_eq!(id.source, SlotSource::Inline);
    }

    #[test]
    fn test_memoized_result_is_shared() {
        let s = scenario_a();
        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);
        let first = r.resolve("Specimen").unwrap();
        let second = r.resolve("Specimen").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_source_precedence_within_class() {
        let mut s = RecordStore::new();
        s.register(SlotDefinition::new("name").with_range("string").with_description("global")).unwrap();
        s.register(
            ClassEntity::new("Person")
                .with_slot("name")
                .with_attribute(SlotDefinition::new("name").with_range("string").multivalued(true))
                .with_override("name", SlotOverride::new().required(true)),
        )
        .unwrap();

        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);
        let person = r.resolve("Person").unwrap();

        assert_eq!(person.slots.len(), 1);
        let name = &person.slots[0];
        assert_eq!(name.source, SlotSource::Override);
        assert!(name.required);
        assert!(name.multivalued);
        assert_eq!(name.description.as_deref(), Some("global"));

        assert_eq!(person.diagnostics.len(), 1);
        assert_eq!(person.diagnostics[0].kind, DiagnosticKind::SourceConflict);
        assert_eq!(person.diagnostics[0].slot.as_deref(), Some("name"));
    }

    #[test]
    fn test_conflict_reporting_can_be_disabled() {
        let mut s = RecordStore::new();
        s.register(SlotDefinition::new("name").with_range("string")).unwrap();
        s.register(
            ClassEntity::new("Person")
                .with_slot("name")
                .with_override("name", SlotOverride::new().required(true)),
        )
        .unwrap();

        let cfg = BuildConfig { report_source_conflicts: false, ..BuildConfig::default() };
        let r = SlotResolver::new(&s, &cfg);
        assert!(r.resolve("Person").unwrap().diagnostics.is_empty());
    }

    #[test]
    fn test_reference_falls_back_to_global_definition() {
        let mut s = RecordStore::new();
        s.register(ClassEntity::new("Study")).unwrap();
        s.register(
            SlotDefinition::new("associated_study").with_range("Study").multivalued(true),
        )
        .unwrap();
        s.register(ClassEntity::new("Participant").with_slot("associated_study")).unwrap();

        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);
        let p = r.resolve("Participant").unwrap();
        let slot = p.slot("associated_study").unwrap();
        assert_eq!(slot.range, SlotRange::Class("Study".into()));
        assert!(slot.multivalued);
        assert!(!slot.required);
        assert_eq!(slot.source, SlotSource::Reference);
    }

    #[test]
    fn test_reference_beats_ancestor_inline_attribute() {
        let mut s = RecordStore::new();
        s.register(ClassEntity::new("Foo")).unwrap();
        s.register(ClassEntity::new("Bar")).unwrap();
        s.register(SlotDefinition::new("x").with_range("Foo")).unwrap();
        s.register(
            ClassEntity::new("Parent")
                .with_attribute(SlotDefinition::new("x").with_range("Bar").required(true)),
        )
        .unwrap();
        s.register(ClassEntity::new("Child").with_parent("Parent").with_slot("x")).unwrap();

        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);
        let child = r.resolve("Child").unwrap();
        let x = child.slot("x").unwrap();
        assert_eq!(x.range, SlotRange::Class("Foo".into()));
        assert_eq!(x.source, SlotSource::Reference);
        assert_eq!(x.inherited_from, None);
        assert_eq!(x.refines.as_deref(), Some("Parent"));
        // The referenced definition leaves `required` unset.
        assert!(x.required);

        let parent = r.resolve("Parent").unwrap();
        assert_eq!(parent.slot("x").unwrap().range, SlotRange::Class("Bar".into()));
    }

    #[test]
    fn test_inline_attribute_ignores_same_named_slot_definition() {
        let mut s = RecordStore::new();
        s.register(
            SlotDefinition::new("id")
                .with_range("integer")
                .required(true)
                .multivalued(true)
                .with_description("global id"),
        )
        .unwrap();
        s.register(ClassEntity::new("Note").with_attribute(SlotDefinition::new("id").with_range("string")))
            .unwrap();

        let cfg = BuildConfig::default();
        let note = SlotResolver::new(&s, &cfg).resolve("Note").unwrap();
        let id = note.slot("id").unwrap();
        assert_eq!(id.source, SlotSource::Inline);
        assert_eq!(id.range, SlotRange::Primitive(Primitive::String));
        assert!(!id.required);
        assert!(!id.multivalued);
        assert_eq!(id.description, None);
    }

    #[test]
    fn test_missing_range_is_kept_and_reported_once() {
        let mut s = RecordStore::new();
        s.register(
            ClassEntity::new("Car").with_attribute(SlotDefinition::new("wheel").with_range("Wheel")),
        )
        .unwrap();
        s.register(ClassEntity::new("Truck").with_parent("Car")).unwrap();

        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);

        let car = r.resolve("Car").unwrap();
        assert_eq!(car.slot("wheel").unwrap().range, SlotRange::Unresolved("Wheel".into()));
        assert_eq!(car.diagnostics.len(), 1);
        assert_eq!(car.diagnostics[0].kind, DiagnosticKind::MissingRange);

        let truck = r.resolve("Truck").unwrap();
        assert_eq!(truck.slot("wheel").unwrap().range, SlotRange::Unresolved("Wheel".into()));
        assert!(truck.diagnostics.is_empty());
    }

    #[test]
    fn test_default_range() {
        let mut s = RecordStore::new();
        s.register(ClassEntity::new("Note").with_attribute(SlotDefinition::new("text"))).unwrap();

        let cfg = BuildConfig::default();
        let note = SlotResolver::new(&s, &cfg).resolve("Note").unwrap();
        assert_eq!(note.slots[0].range, SlotRange::Unspecified);
        assert_eq!(note.diagnostics[0].kind, DiagnosticKind::UnspecifiedRange);

        let cfg = BuildConfig::default().with_default_range("string");
        let note = SlotResolver::new(&s, &cfg).resolve("Note").unwrap();
        assert_eq!(note.slots[0].range, SlotRange::Primitive(Primitive::String));
        assert!(note.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_parent_reported_on_child_only() {
        let mut s = RecordStore::new();
        s.register(ClassEntity::new("Car").with_parent("Vehicle")).unwrap();
        s.register(ClassEntity::new("Truck").with_parent("Car")).unwrap();

        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);
        let car = r.resolve("Car").unwrap();
        assert_eq!(car.diagnostics[0].kind, DiagnosticKind::MissingParent);
        assert_eq!(car.diagnostics[0].detail, "Vehicle");
        assert!(r.resolve("Truck").unwrap().diagnostics.is_empty());
    }

    #[test]
    fn test_cycle_is_fatal() {
        let mut s = RecordStore::new();
        s.register(ClassEntity::new("A").with_parent("B")).unwrap();
        s.register(ClassEntity::new("B").with_parent("A")).unwrap();

        let cfg = BuildConfig::default();
        let r = SlotResolver::new(&s, &cfg);
        assert!(matches!(r.resolve_all(), Err(Error::Cycle { .. })));
    }

    #[test]
    fn test_resolve_range_kinds() {
        let mut s = RecordStore::new();
        s.register(ClassEntity::new("Car")).unwrap();
        s.register(EnumEntity::new("ColorEnum")).unwrap();
        s.register(TypeEntity::primitive("identifier", Primitive::String)).unwrap();
        s.register(SlotDefinition::new("color")).unwrap();

        assert_eq!(resolve_range(&s, "Car"), SlotRange::Class("Car".into()));
        assert_eq!(resolve_range(&s, "ColorEnum"), SlotRange::Enum("ColorEnum".into()));
        assert_eq!(resolve_range(&s, "identifier"), SlotRange::Type("identifier".into()));
        assert_eq!(resolve_range(&s, "integer"), SlotRange::Primitive(Primitive::Integer));
        assert_eq!(resolve_range(&s, "color"), SlotRange::Unresolved("color".into()));
        assert_eq!(resolve_range(&s, "Nope"), SlotRange::Unresolved("Nope".into()));
        assert_eq!(resolve_range(&s, "String"), SlotRange::Unresolved("String".into()));
    }
}
