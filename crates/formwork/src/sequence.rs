// File: src/sequence.rs
// Purpose: Stable-id entry storage for dynamic sequence fields

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::schema::SequenceSchema;
use crate::value::FieldValue;

/// One structured record in a sequence field. The id is generated once and
/// survives removal of neighbours; positions do not.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEntry {
    id: Uuid,
    values: BTreeMap<String, FieldValue>,
}

impl SequenceEntry {
    pub(crate) fn with_defaults(schema: &SequenceSchema) -> Self {
        let mut values = BTreeMap::new();
        for field in schema.entry_fields() {
            values.insert(field.name().to_string(), field.default().clone());
        }
        Self {
            id: Uuid::new_v4(),
            values,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn value(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&FieldValue::Unset)
    }

    pub(crate) fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }

    pub(crate) fn to_payload(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (name, value) in &self.values {
            object.insert(name.clone(), value.to_json());
        }
        serde_json::Value::Object(object)
    }
}

/// The ordered entries of one sequence field, addressed by stable id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntryList {
    entries: Vec<SequenceEntry>,
}

impl EntryList {
    /// Seed the minimum number of default entries, as on form mount
    pub(crate) fn seeded(schema: &SequenceSchema) -> Self {
        let entries = (0..schema.min())
            .map(|_| SequenceEntry::with_defaults(schema))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    pub fn entry(&self, id: Uuid) -> Option<&SequenceEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub(crate) fn entry_mut(&mut self, id: Uuid) -> Option<&mut SequenceEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Append a fresh default entry and return its id
    pub(crate) fn push_default(&mut self, schema: &SequenceSchema) -> Uuid {
        let entry = SequenceEntry::with_defaults(schema);
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Remove by id, preserving the relative order of the rest
    pub(crate) fn remove(&mut self, id: Uuid) -> Option<SequenceEntry> {
        let position = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(position))
    }
}
