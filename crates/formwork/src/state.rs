// File: src/state.rs
// Purpose: Mutable form state: field values, touched flags, sequence entries

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::schema::Schema;
use crate::sequence::EntryList;
use crate::value::FieldValue;

/// The current value of every field in one form instance. Touched flags are
/// a display concern and never feed into validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: BTreeMap<String, FieldValue>,
    sequences: BTreeMap<String, EntryList>,
    touched: BTreeSet<String>,
}

impl FormState {
    /// Build the state a fresh mount starts from: schema defaults for every
    /// field, seeded entries for every sequence, nothing touched.
    pub fn with_defaults(schema: &Schema) -> Self {
        let mut values = BTreeMap::new();
        for field in schema.fields() {
            values.insert(field.name().to_string(), field.default().clone());
        }
        let mut sequences = BTreeMap::new();
        for sequence in schema.sequences() {
            sequences.insert(sequence.name().to_string(), EntryList::seeded(sequence));
        }
        Self {
            values,
            sequences,
            touched: BTreeSet::new(),
        }
    }

    pub fn value(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&FieldValue::Unset)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.value(field).as_text()
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.value(field).as_number()
    }

    pub fn boolean(&self, field: &str) -> Option<bool> {
        self.value(field).as_bool()
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.value(field).as_date()
    }

    pub fn list(&self, field: &str) -> Option<&[String]> {
        self.value(field).as_list()
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn sequence(&self, name: &str) -> Option<&EntryList> {
        self.sequences.get(name)
    }

    /// A user edit: writes the value and marks the field touched
    pub(crate) fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
        self.touched.insert(field.to_string());
    }

    /// A system write (derived-state reconciliation): no touched mark
    pub(crate) fn write(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }

    pub(crate) fn touch(&mut self, field: &str) {
        self.touched.insert(field.to_string());
    }

    pub(crate) fn sequence_mut(&mut self, name: &str) -> Option<&mut EntryList> {
        self.sequences.get_mut(name)
    }

    /// Serialize the whole state for the submission boundary
    pub fn to_payload(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (name, value) in &self.values {
            object.insert(name.clone(), value.to_json());
        }
        for (name, list) in &self.sequences {
            let entries: Vec<serde_json::Value> =
                list.entries().iter().map(|e| e.to_payload()).collect();
            object.insert(name.clone(), serde_json::Value::Array(entries));
        }
        serde_json::Value::Object(object)
    }
}
