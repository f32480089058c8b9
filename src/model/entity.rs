//! Raw schema entities as delivered by a loader.
//!
//! Every entity is wrapped in the closed [`Entity`] variant at registration
//! time. The [`EntityKind`] tag is fixed then and never re-derived from the
//! shape of the payload.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Entity kind
// ============================================================================

/// Coarse entity-kind tag carried by records, nodes and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Slot,
    Enum,
    Type,
    Variable,
}

impl EntityKind {
    /// All kinds, in node-registration order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Class,
        EntityKind::Enum,
        EntityKind::Type,
        EntityKind::Slot,
        EntityKind::Variable,
    ];

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Class => "Class",
            EntityKind::Slot => "Slot",
            EntityKind::Enum => "Enum",
            EntityKind::Type => "Type",
            EntityKind::Variable => "Variable",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Slots
// ============================================================================

/// A reusable attribute definition, or an inline attribute declared on a class.
///
/// Absent fields mean "not stated here"; the resolver falls back to other
/// occurrences of the same name and finally to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multivalued: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SlotDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn multivalued(mut self, multivalued: bool) -> Self {
        self.multivalued = Some(multivalued);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Per-class refinement of an inherited or referenced slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multivalued: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SlotOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn multivalued(mut self, multivalued: bool) -> Self {
        self.multivalued = Some(multivalued);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// Classes
// ============================================================================

/// A class with single inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    #[serde(default, alias = "is_a", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Inline attributes, in declaration order.
    #[serde(default)]
    pub attributes: Vec<SlotDefinition>,
    /// Overrides keyed by attribute name.
    #[serde(default, alias = "slotUsage")]
    pub slot_usage: BTreeMap<String, SlotOverride>,
    /// Referenced reusable slot names, in declaration order.
    #[serde(default)]
    pub slots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ClassEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_attribute(mut self, attribute: SlotDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_override(mut self, name: impl Into<String>, usage: SlotOverride) -> Self {
        self.slot_usage.insert(name.into(), usage);
        self
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slots.push(slot.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// Enums
// ============================================================================

/// One permissible value of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissibleValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntity {
    pub name: String,
    #[serde(default, alias = "permissibleValues")]
    pub permissible_values: Vec<PermissibleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EnumEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.permissible_values.push(PermissibleValue { value: value.into(), description: None });
        self
    }

    pub fn with_described_value(
        mut self,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.permissible_values.push(PermissibleValue {
            value: value.into(),
            description: Some(description.into()),
        });
        self
    }
}

// ============================================================================
// Types
// ============================================================================

/// Built-in primitive value categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Integer,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    Uri,
    UriOrCurie,
    Curie,
    NcName,
}

impl Primitive {
    /// Map a range name onto a built-in primitive, if it is one. Range names
    /// are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let p = match name {
            "string" => Primitive::String,
            "integer" => Primitive::Integer,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "decimal" => Primitive::Decimal,
            "boolean" => Primitive::Boolean,
            "date" => Primitive::Date,
            "datetime" => Primitive::DateTime,
            "time" => Primitive::Time,
            "uri" => Primitive::Uri,
            "uriorcurie" => Primitive::UriOrCurie,
            "curie" => Primitive::Curie,
            "ncname" => Primitive::NcName,
            _ => return None,
        };
        Some(p)
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Decimal => "decimal",
            Primitive::Boolean => "boolean",
            Primitive::Date => "date",
            Primitive::DateTime => "datetime",
            Primitive::Time => "time",
            Primitive::Uri => "uri",
            Primitive::UriOrCurie => "uriorcurie",
            Primitive::Curie => "curie",
            Primitive::NcName => "ncname",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a custom type is built on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeBase {
    Primitive(Primitive),
    /// Refinement of another registered type.
    Refines(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntity {
    pub name: String,
    pub base: TypeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TypeEntity {
    pub fn primitive(name: impl Into<String>, primitive: Primitive) -> Self {
        Self { name: name.into(), base: TypeBase::Primitive(primitive), uri: None, description: None }
    }

    pub fn refining(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self { name: name.into(), base: TypeBase::Refines(base.into()), uri: None, description: None }
    }
}

// ============================================================================
// Variables
// ============================================================================

/// A measured variable mapped onto a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntity {
    pub name: String,
    #[serde(alias = "bdchmElement", alias = "class")]
    pub class_name: String,
    #[serde(default, alias = "variableLabel", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, alias = "dataType", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, alias = "ucumUnit", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curie: Option<String>,
    #[serde(default, alias = "variableDescription", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariableEntity {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self { name: name.into(), class_name: class_name.into(), ..Self::default() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

// ============================================================================
// Entity: the closed variant
// ============================================================================

/// Any schema record, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Class(ClassEntity),
    Slot(SlotDefinition),
    Enum(EnumEntity),
    Type(TypeEntity),
    Variable(VariableEntity),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Class(_) => EntityKind::Class,
            Entity::Slot(_) => EntityKind::Slot,
            Entity::Enum(_) => EntityKind::Enum,
            Entity::Type(_) => EntityKind::Type,
            Entity::Variable(_) => EntityKind::Variable,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Class(c) => &c.name,
            Entity::Slot(s) => &s.name,
            Entity::Enum(e) => &e.name,
            Entity::Type(t) => &t.name,
            Entity::Variable(v) => &v.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Entity::Class(c) => c.description.as_deref(),
            Entity::Slot(s) => s.description.as_deref(),
            Entity::Enum(e) => e.description.as_deref(),
            Entity::Type(t) => t.description.as_deref(),
            Entity::Variable(v) => v.description.as_deref().or(v.label.as_deref()),
        }
    }
}

impl From<ClassEntity> for Entity {
    fn from(c: ClassEntity) -> Self { Entity::Class(c) }
}

impl From<SlotDefinition> for Entity {
    fn from(s: SlotDefinition) -> Self { Entity::Slot(s) }
}

impl From<EnumEntity> for Entity {
    fn from(e: EnumEntity) -> Self { Entity::Enum(e) }
}

impl From<TypeEntity> for Entity {
    fn from(t: TypeEntity) -> Self { Entity::Type(t) }
}

impl From<VariableEntity> for Entity {
    fn from(v: VariableEntity) -> Self { Entity::Variable(v) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        assert_eq!(Primitive::from_name("string"), Some(Primitive::String));
        assert_eq!(Primitive::from_name("integer"), Some(Primitive::Integer));
        assert_eq!(Primitive::from_name("Integer"), None);
        assert_eq!(Primitive::from_name("BOOL"), None);
        assert_eq!(Primitive::from_name("str"), None);
        assert_eq!(Primitive::from_name("uriorcurie"), Some(Primitive::UriOrCurie));
        assert_eq!(Primitive::from_name("SpecimenTypeEnum"), None);
    }

    #[test]
    fn test_entity_kind_tag() {
        let e: Entity = EnumEntity::new("ColorEnum").with_value("RED").into();
        assert_eq!(e.kind(), EntityKind::Enum);
        assert_eq!(e.name(), "ColorEnum");
    }

    #[test]
    fn test_class_deserializes_linkml_field_names() {
        let json = r#"{
            "name": "Material",
            "is_a": "Specimen",
            "abstract": false,
            "slotUsage": { "specimen_type": { "required": true } }
        }"#;
        let class: ClassEntity = serde_json::from_str(json).unwrap();
        assert_eq!(class.parent.as_deref(), Some("Specimen"));
        assert_eq!(class.slot_usage["specimen_type"].required, Some(true));
        assert!(class.attributes.is_empty());
    }
}
