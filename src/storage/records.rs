//! Input bundle handed over by a loader.

use serde::{Deserialize, Serialize};

use crate::model::*;

/// A complete, already-parsed schema.
///
/// This is the input contract: a loader (out of scope here) reads schema
/// files and produces one of these, field names normalized. `serde`
/// deserialization accepts both snake_case and the camelCase names the
/// processed schema JSON uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaRecords {
    pub classes: Vec<ClassEntity>,
    pub slots: Vec<SlotDefinition>,
    pub enums: Vec<EnumEntity>,
    pub types: Vec<TypeEntity>,
    pub variables: Vec<VariableEntity>,
}

impl SchemaRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: ClassEntity) -> Self {
        self.classes.push(class);
        self
    }

    pub fn slot(mut self, slot: SlotDefinition) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn enumeration(mut self, e: EnumEntity) -> Self {
        self.enums.push(e);
        self
    }

    pub fn type_def(mut self, t: TypeEntity) -> Self {
        self.types.push(t);
        self
    }

    pub fn variable(mut self, v: VariableEntity) -> Self {
        self.variables.push(v);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.slots.len() + self.enums.len() + self.types.len() + self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
