//! Effective slots: the resolved view of one attribute on one class.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Primitive;

/// Where the winning occurrence of a slot came from.
///
/// Ordered by specificity: within one class an override beats an inline
/// attribute, which beats a plain reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotSource {
    Reference,
    Inline,
    Override,
}

impl SlotSource {
    pub fn label(self) -> &'static str {
        match self {
            SlotSource::Reference => "reference",
            SlotSource::Inline => "inline",
            SlotSource::Override => "override",
        }
    }
}

/// Resolved target of a slot's range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum SlotRange {
    Class(String),
    Enum(String),
    /// A registered custom type.
    Type(String),
    /// A built-in primitive that is not registered as a type.
    Primitive(Primitive),
    /// A range name that names nothing in the schema.
    Unresolved(String),
    /// No occurrence, slot definition or default supplied a range.
    Unspecified,
}

impl SlotRange {
    /// Name of the range target, as written in the schema.
    pub fn name(&self) -> Option<&str> {
        match self {
            SlotRange::Class(n)
            | SlotRange::Enum(n)
            | SlotRange::Type(n)
            | SlotRange::Unresolved(n) => Some(n),
            SlotRange::Primitive(p) => Some(p.name()),
            SlotRange::Unspecified => None,
        }
    }

    /// Class and enum ranges produce property edges; nothing else does.
    pub fn is_structural(&self) -> bool {
        matches!(self, SlotRange::Class(_) | SlotRange::Enum(_))
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRange::Unresolved(n) => write!(f, "{n} (unresolved)"),
            SlotRange::Unspecified => f.write_str("(unspecified)"),
            other => f.write_str(other.name().unwrap_or_default()),
        }
    }
}

/// A class's fully resolved attribute after inheritance and overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSlot {
    pub name: String,
    pub range: SlotRange,
    pub required: bool,
    pub multivalued: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: SlotSource,
    /// Ancestor that declared the winning occurrence; `None` when the
    /// resolved class declares it itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
    /// Nearest ancestor above the winning occurrence that also declares the
    /// name, i.e. the declaration this slot refines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refines: Option<String>,
}

impl EffectiveSlot {
    pub fn is_inherited(&self) -> bool {
        self.inherited_from.is_some()
    }

    /// Stable slot id. Overrides get a per-class instance id
    /// `"{slot}-{Class}"`; everything else uses the slot name.
    pub fn slot_id(&self, class: &str) -> String {
        match self.source {
            SlotSource::Override => {
                let owner = self.inherited_from.as_deref().unwrap_or(class);
                format!("{}-{}", self.name, owner)
            }
            _ => self.name.clone(),
        }
    }
}
