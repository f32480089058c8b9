//! Ancestor chains and type refinement chains.
//!
//! Both walks are bounded by the number of entities of their kind. Walking
//! further than that can only mean the chain loops back on itself.

use smallvec::SmallVec;

use crate::model::*;
use crate::storage::RecordStore;
use crate::{Error, Result};

/// The path from a class up through its parents.
#[derive(Debug, Clone)]
pub struct AncestorChain<'s> {
    /// `classes[0]` is the starting class; the last entry is the root (or
    /// the last class before a dangling parent name).
    pub classes: SmallVec<[&'s ClassEntity; 8]>,
    /// Parent name that did not resolve to a class, if the walk stopped on one.
    pub missing_parent: Option<&'s str>,
}

impl<'s> AncestorChain<'s> {
    /// Ancestors only, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'s ClassEntity> + '_ {
        self.classes.iter().skip(1).copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.name.clone()).collect()
    }
}

/// Walk from `class` to its root.
///
/// Fails with `Error::Cycle` when the chain grows past the number of
/// registered classes, and with `NotFound`/`WrongKind` when `class` itself is
/// not a class.
pub fn ancestor_chain<'s>(store: &'s RecordStore, class: &str) -> Result<AncestorChain<'s>> {
    let start = store.class(class)?;
    let limit = store.class_count();

    let mut chain = AncestorChain { classes: SmallVec::new(), missing_parent: None };
    chain.classes.push(start);

    let mut current = start;
    while let Some(parent) = current.parent.as_deref() {
        let Some(next) = store.find_class(parent) else {
            chain.missing_parent = Some(parent);
            break;
        };
        chain.classes.push(next);
        if chain.classes.len() > limit {
            return Err(Error::Cycle {
                kind: EntityKind::Class,
                name: class.to_string(),
                chain: chain.names(),
            });
        }
        current = next;
    }

    Ok(chain)
}

/// Where a custom type's refinement chain ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRoot {
    Primitive(Primitive),
    /// The chain reached a base name that is not a registered type.
    Dangling(String),
}

/// Follow a type's `Refines` links down to its primitive.
pub fn type_root(store: &RecordStore, name: &str) -> Result<TypeRoot> {
    let mut current = store
        .type_def(name)
        .ok_or_else(|| Error::NotFound { name: name.to_string(), kind: Some(EntityKind::Type) })?;
    let limit = store.count(EntityKind::Type);
    let mut seen: SmallVec<[String; 4]> = SmallVec::new();
    seen.push(current.name.clone());

    loop {
        match &current.base {
            TypeBase::Primitive(p) => return Ok(TypeRoot::Primitive(*p)),
            TypeBase::Refines(base) => {
                let Some(next) = store.type_def(base) else {
                    // An unregistered base may still be a built-in primitive name.
                    return Ok(match Primitive::from_name(base) {
                        Some(p) => TypeRoot::Primitive(p),
                        None => TypeRoot::Dangling(base.clone()),
                    });
                };
                seen.push(next.name.clone());
                if seen.len() > limit {
                    return Err(Error::Cycle {
                        kind: EntityKind::Type,
                        name: name.to_string(),
                        chain: seen.into_vec(),
                    });
                }
                current = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(classes: &[(&str, Option<&str>)]) -> RecordStore {
        let mut store = RecordStore::new();
        for (name, parent) in classes {
            let mut c = ClassEntity::new(*name);
            c.parent = parent.map(String::from);
            store.register(c).unwrap();
        }
        store
    }

    #[test]
    fn test_chain_to_root() {
        let s = store(&[("Entity", None), ("Specimen", Some("Entity")), ("Material", Some("Specimen"))]);
        let chain = ancestor_chain(&s, "Material").unwrap();
        assert_eq!(chain.names(), vec!["Material", "Specimen", "Entity"]);
        assert_eq!(chain.ancestors().count(), 2);
        assert!(chain.missing_parent.is_none());
    }

    #[test]
    fn test_chain_cycle() {
        let s = store(&[("A", Some("B")), ("B", Some("A"))]);
        let err = ancestor_chain(&s, "A").unwrap_err();
        assert!(matches!(err, Error::Cycle { kind: EntityKind::Class, .. }));
        assert!(err.to_string().starts_with("Class cycle through 'A'"));
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let s = store(&[("A", Some("A"))]);
        assert!(matches!(ancestor_chain(&s, "A"), Err(Error::Cycle { .. })));
    }

    #[test]
    fn test_chain_stops_on_missing_parent() {
        let s = store(&[("Car", Some("Vehicle"))]);
        let chain = ancestor_chain(&s, "Car").unwrap();
        assert_eq!(chain.names(), vec!["Car"]);
        assert_eq!(chain.missing_parent, Some("Vehicle"));
    }

    #[test]
    fn test_type_root() {
        let mut s = RecordStore::new();
        s.register(TypeEntity::primitive("str_type", Primitive::String)).unwrap();
        s.register(TypeEntity::refining("identifier", "str_type")).unwrap();
        s.register(TypeEntity::refining("loose", "integer")).unwrap();
        s.register(TypeEntity::refining("broken", "nothing_here")).unwrap();

        assert_eq!(type_root(&s, "identifier").unwrap(), TypeRoot::Primitive(Primitive::String));
        assert_eq!(type_root(&s, "loose").unwrap(), TypeRoot::Primitive(Primitive::Integer));
        assert_eq!(type_root(&s, "broken").unwrap(), TypeRoot::Dangling("nothing_here".into()));
    }

    #[test]
    fn test_type_cycle() {
        let mut s = RecordStore::new();
        s.register(TypeEntity::refining("a", "b")).unwrap();
        s.register(TypeEntity::refining("b", "a")).unwrap();
        let err = type_root(&s, "a").unwrap_err();
        assert!(matches!(err, Error::Cycle { kind: EntityKind::Type, .. }));
        assert_eq!(err.to_string(), "Type cycle through 'a': a -> b -> a");
    }
}
