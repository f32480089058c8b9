//! # Schema Record Store
//!
//! Typed, immutable storage of raw schema entities keyed by name.
//!
//! Entities live in one insertion-ordered arena. A name index gives O(1)
//! lookup and a per-kind index keeps `all_of_kind` in registration order.
//! All five kinds share one namespace: registering a slot named like an
//! existing class is a [`DuplicateName`](crate::Error::DuplicateName) error.
//!
//! The store is only mutable while it is being filled. Once handed to the
//! resolver and graph builder it is read-only for the rest of the snapshot's
//! life.

pub mod records;

use hashbrown::HashMap;

use crate::model::*;
use crate::{Error, Result};

pub use records::SchemaRecords;

// ============================================================================
// RecordStore
// ============================================================================

/// Name-keyed storage for every entity of one schema.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    entities: Vec<Entity>,
    /// name → arena position
    by_name: HashMap<String, usize>,
    /// kind → arena positions, in insertion order
    by_kind: HashMap<EntityKind, Vec<usize>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a whole input bundle.
    ///
    /// Kinds are registered in a fixed order (types, enums, slots, classes,
    /// variables) so the first collision reported is deterministic.
    pub fn from_records(records: SchemaRecords) -> Result<Self> {
        let mut store = Self::new();
        let SchemaRecords { classes, slots, enums, types, variables } = records;

        for t in types { store.register(t)?; }
        for e in enums { store.register(e)?; }
        for s in slots { store.register(s)?; }
        for c in classes { store.register(c)?; }
        for v in variables { store.register(v)?; }

        tracing::debug!(
            classes = store.count(EntityKind::Class),
            slots = store.count(EntityKind::Slot),
            enums = store.count(EntityKind::Enum),
            types = store.count(EntityKind::Type),
            variables = store.count(EntityKind::Variable),
            "record store loaded"
        );
        Ok(store)
    }

    /// Add one entity. Fails if any entity of any kind already has its name.
    pub fn register(&mut self, entity: impl Into<Entity>) -> Result<()> {
        let entity = entity.into();
        let name = entity.name();

        if let Some(&pos) = self.by_name.get(name) {
            return Err(Error::DuplicateName {
                name: name.to_string(),
                existing: self.entities[pos].kind(),
                incoming: entity.kind(),
            });
        }

        let pos = self.entities.len();
        self.by_name.insert(name.to_string(), pos);
        self.by_kind.entry(entity.kind()).or_default().push(pos);
        self.entities.push(entity);
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Look up an entity of a specific kind.
    pub fn get(&self, name: &str, kind: EntityKind) -> Result<&Entity> {
        match self.lookup(name) {
            Some(e) if e.kind() == kind => Ok(e),
            Some(e) => Err(wrong_kind(name, kind, e)),
            None => Err(Error::NotFound { name: name.to_string(), kind: Some(kind) }),
        }
    }

    /// Look up an entity of any kind.
    pub fn lookup(&self, name: &str) -> Option<&Entity> {
        self.by_name.get(name).map(|&pos| &self.entities[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<EntityKind> {
        self.lookup(name).map(Entity::kind)
    }

    pub fn class(&self, name: &str) -> Result<&ClassEntity> {
        match self.get(name, EntityKind::Class)? {
            Entity::Class(c) => Ok(c),
            other => Err(wrong_kind(name, EntityKind::Class, other)),
        }
    }

    /// Class lookup that treats "absent" and "not a class" alike.
    pub fn find_class(&self, name: &str) -> Option<&ClassEntity> {
        match self.lookup(name)? {
            Entity::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn slot(&self, name: &str) -> Option<&SlotDefinition> {
        match self.lookup(name)? {
            Entity::Slot(s) => Some(s),
            _ => None,
        }
    }

    pub fn enumeration(&self, name: &str) -> Result<&EnumEntity> {
        match self.get(name, EntityKind::Enum)? {
            Entity::Enum(e) => Ok(e),
            other => Err(wrong_kind(name, EntityKind::Enum, other)),
        }
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeEntity> {
        match self.lookup(name)? {
            Entity::Type(t) => Some(t),
            _ => None,
        }
    }

    // ========================================================================
    // Scan
    // ========================================================================

    /// All entities of one kind, in insertion order. Call again to restart.
    pub fn all_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> + '_ {
        self.by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&pos| &self.entities[pos])
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntity> + '_ {
        self.all_of_kind(EntityKind::Class).filter_map(|e| match e {
            Entity::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableEntity> + '_ {
        self.all_of_kind(EntityKind::Variable).filter_map(|e| match e {
            Entity::Variable(v) => Some(v),
            _ => None,
        })
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeEntity> + '_ {
        self.all_of_kind(EntityKind::Type).filter_map(|e| match e {
            Entity::Type(t) => Some(t),
            _ => None,
        })
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    pub fn class_count(&self) -> usize {
        self.count(EntityKind::Class)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn wrong_kind(name: &str, expected: EntityKind, actual: &Entity) -> Error {
    Error::WrongKind { name: name.to_string(), expected, actual: actual.kind() }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut store = RecordStore::new();
        store.register(ClassEntity::new("Entity")).unwrap();
        store.register(EnumEntity::new("ColorEnum").with_value("RED")).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.class("Entity").unwrap().name, "Entity");
        assert_eq!(store.kind_of("ColorEnum"), Some(EntityKind::Enum));
    }

    #[test]
    fn test_duplicate_name_within_kind() {
        let mut store = RecordStore::new();
        store.register(ClassEntity::new("Car")).unwrap();
        let err = store.register(ClassEntity::new("Car")).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref name, .. } if name == "Car"));
    }

    #[test]
    fn test_duplicate_name_across_kinds() {
        let mut store = RecordStore::new();
        store.register(SlotDefinition::new("color")).unwrap();
        let err = store.register(VariableEntity::new("color", "Car")).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateName {
                name: "color".into(),
                existing: EntityKind::Slot,
                incoming: EntityKind::Variable,
            }
        );
    }

    #[test]
    fn test_get_not_found_and_wrong_kind() {
        let mut store = RecordStore::new();
        store.register(EnumEntity::new("ColorEnum")).unwrap();

        assert!(matches!(store.get("Nope", EntityKind::Class), Err(Error::NotFound { .. })));
        assert!(matches!(
            store.get("ColorEnum", EntityKind::Class),
            Err(Error::WrongKind { actual: EntityKind::Enum, .. })
        ));
    }

    #[test]
    fn test_all_of_kind_is_ordered_and_restartable() {
        let mut store = RecordStore::new();
        store.register(ClassEntity::new("B")).unwrap();
        store.register(EnumEntity::new("E")).unwrap();
        store.register(ClassEntity::new("A")).unwrap();
        store.register(ClassEntity::new("C")).unwrap();

        let first: Vec<&str> = store.all_of_kind(EntityKind::Class).map(Entity::name).collect();
        let second: Vec<&str> = store.all_of_kind(EntityKind::Class).map(Entity::name).collect();
        assert_eq!(first, vec!["B", "A", "C"]);
        assert_eq!(first, second);
        assert_eq!(store.all_of_kind(EntityKind::Variable).count(), 0);
    }
}
