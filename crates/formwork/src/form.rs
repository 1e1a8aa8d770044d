// File: src/form.rs
// Purpose: The form facade: single update path, reconciliation, submission

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::derived::{DerivedRules, DerivedState};
use crate::error::FormError;
use crate::schema::{FieldKind, Schema};
use crate::state::FormState;
use crate::validation::{validate, ValidationResult};
use crate::value::FieldValue;

/// A form never suspends except during submission; while Submitting, every
/// mutating operation is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
}

/// One mounted form instance. Owns its state exclusively; every mutation
/// funnels through [`Form::set`] and revalidates wholesale, so the exposed
/// [`ValidationResult`] and [`DerivedState`] are never stale.
#[derive(Debug, Clone)]
pub struct Form {
    schema: Schema,
    derived_rules: Option<DerivedRules>,
    state: FormState,
    validation: ValidationResult,
    derived: DerivedState,
    status: FormStatus,
}

impl Form {
    pub fn new(schema: Schema) -> Self {
        Self::assemble(schema, None)
    }

    /// A form whose option sets, ceilings, and price follow a driver field
    pub fn with_derived(schema: Schema, rules: DerivedRules) -> Self {
        Self::assemble(schema, Some(rules))
    }

    fn assemble(schema: Schema, derived_rules: Option<DerivedRules>) -> Self {
        let state = FormState::with_defaults(&schema);
        let mut form = Self {
            schema,
            derived_rules,
            state,
            validation: ValidationResult::success(),
            derived: DerivedState::default(),
            status: FormStatus::Editing,
        };
        form.refresh_all();
        form
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }

    pub fn value(&self, field: &str) -> &FieldValue {
        self.state.value(field)
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.validation.error(field)
    }

    pub fn touched(&self, field: &str) -> bool {
        self.state.is_touched(field)
    }

    /// The single update path. Rejects unknown fields, kind mismatches, and
    /// edits while a submission is in flight; otherwise writes the value,
    /// marks it touched, reconciles derived state, and revalidates.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        self.ensure_editable()?;
        let value = value.into();
        let kind = self
            .schema
            .field(field)
            .map(|f| f.kind())
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        if !value.is_unset() && !kind.accepts(&value) {
            return Err(FormError::KindMismatch {
                field: field.to_string(),
                expected: kind,
            });
        }
        self.state.set(field, value);
        self.refresh(field);
        Ok(())
    }

    /// Add the option to a list field if absent, remove it if present
    pub fn toggle(&mut self, field: &str, option: &str) -> Result<(), FormError> {
        let kind = self
            .schema
            .field(field)
            .map(|f| f.kind())
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        if kind != FieldKind::List {
            return Err(FormError::KindMismatch {
                field: field.to_string(),
                expected: FieldKind::List,
            });
        }
        let mut items: Vec<String> = self.state.list(field).unwrap_or(&[]).to_vec();
        match items.iter().position(|i| i == option) {
            Some(position) => {
                items.remove(position);
            }
            None => items.push(option.to_string()),
        }
        self.set(field, FieldValue::List(items))
    }

    /// Append a default-valued entry to a sequence; returns its fresh id
    pub fn push_entry(&mut self, sequence: &str) -> Result<Uuid, FormError> {
        self.ensure_editable()?;
        let id = {
            let seq = self
                .schema
                .sequence(sequence)
                .ok_or_else(|| FormError::UnknownSequence(sequence.to_string()))?;
            let list = self
                .state
                .sequence_mut(sequence)
                .ok_or_else(|| FormError::UnknownSequence(sequence.to_string()))?;
            list.push_default(seq)
        };
        self.state.touch(sequence);
        self.refresh(sequence);
        Ok(id)
    }

    /// Remove a sequence entry by id. Refused when it would leave fewer
    /// entries than the declared minimum.
    pub fn remove_entry(&mut self, sequence: &str, id: Uuid) -> Result<(), FormError> {
        self.ensure_editable()?;
        let min = self
            .schema
            .sequence(sequence)
            .map(|s| s.min())
            .ok_or_else(|| FormError::UnknownSequence(sequence.to_string()))?;
        let list = self
            .state
            .sequence_mut(sequence)
            .ok_or_else(|| FormError::UnknownSequence(sequence.to_string()))?;
        if list.len() <= min {
            return Err(FormError::MinEntriesReached {
                sequence: sequence.to_string(),
                min,
            });
        }
        if list.remove(id).is_none() {
            return Err(FormError::UnknownEntry {
                sequence: sequence.to_string(),
                id,
            });
        }
        self.state.touch(sequence);
        self.refresh(sequence);
        Ok(())
    }

    /// Write one field of one sequence entry, addressed by stable id
    pub fn set_entry(
        &mut self,
        sequence: &str,
        id: Uuid,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.ensure_editable()?;
        let value = value.into();
        let kind = self
            .schema
            .sequence(sequence)
            .ok_or_else(|| FormError::UnknownSequence(sequence.to_string()))?
            .entry_fields()
            .iter()
            .find(|f| f.name() == field)
            .map(|f| f.kind())
            .ok_or_else(|| FormError::UnknownField(format!("{}.{}", sequence, field)))?;
        if !value.is_unset() && !kind.accepts(&value) {
            return Err(FormError::KindMismatch {
                field: format!("{}.{}", sequence, field),
                expected: kind,
            });
        }
        let list = self
            .state
            .sequence_mut(sequence)
            .ok_or_else(|| FormError::UnknownSequence(sequence.to_string()))?;
        let entry = list.entry_mut(id).ok_or(FormError::UnknownEntry {
            sequence: sequence.to_string(),
            id,
        })?;
        entry.set(field, value);
        self.state.touch(sequence);
        self.refresh(sequence);
        Ok(())
    }

    /// Validate only the listed fields, as a step gate does
    pub fn validate_fields(&self, fields: &[&str]) -> ValidationResult {
        crate::validation::validate_fields(&self.schema, &self.state, fields)
    }

    /// Share of the listed fields that are filled in and error-free, as a
    /// percentage for progress display
    pub fn completion(&self, fields: &[&str]) -> f64 {
        if fields.is_empty() {
            return 100.0;
        }
        let complete = fields
            .iter()
            .filter(|field| {
                !self.state.value(field).is_empty() && self.validation.error(field).is_none()
            })
            .count();
        (complete as f64 / fields.len() as f64) * 100.0
    }

    /// Back to schema defaults: fresh values, reseeded sequences, nothing
    /// touched. Equivalent to a fresh mount.
    pub fn reset(&mut self) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.state = FormState::with_defaults(&self.schema);
        self.refresh_all();
        debug!("Form `{}` reset to defaults", self.schema.name());
        Ok(())
    }

    /// Validate, then hand the serialized state to the submit handler. An
    /// invalid form is rejected without calling the handler. While the
    /// handler runs the form is locked against edits.
    pub async fn submit<F, Fut>(&mut self, handler: F) -> Result<(), FormError>
    where
        F: FnOnce(serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(), String>>,
    {
        self.ensure_editable()?;
        if !self.validation.is_valid {
            warn!(
                "Form `{}` submission rejected with {} validation errors",
                self.schema.name(),
                self.validation.errors.len()
            );
            return Err(FormError::Rejected(self.validation.clone()));
        }
        self.status = FormStatus::Submitting;
        info!("Form `{}` submitting", self.schema.name());
        let payload = self.state.to_payload();
        let outcome = handler(payload).await;
        self.status = FormStatus::Editing;
        match outcome {
            Ok(()) => {
                info!("Form `{}` submission accepted", self.schema.name());
                Ok(())
            }
            Err(message) => {
                warn!("Form `{}` submit handler failed: {}", self.schema.name(), message);
                Err(FormError::SubmitFailed(message))
            }
        }
    }

    fn ensure_editable(&self) -> Result<(), FormError> {
        if self.status == FormStatus::Submitting {
            return Err(FormError::SubmissionInFlight);
        }
        Ok(())
    }

    fn refresh(&mut self, changed: &str) {
        self.refresh_all();
        debug!(
            "Form `{}` field `{}` updated (valid: {})",
            self.schema.name(),
            changed,
            self.validation.is_valid
        );
    }

    fn refresh_all(&mut self) {
        if let Some(rules) = &self.derived_rules {
            rules.reconcile(&self.schema, &mut self.state);
            self.derived = rules.compute(&self.state);
        }
        self.validation = validate(&self.schema, &self.state);
    }
}

/// Stand-in submit handler with the simulated network delay
pub async fn simulate_submit(payload: serde_json::Value) -> Result<(), String> {
    debug!("Simulated submit of {} bytes", payload.to_string().len());
    tokio::time::sleep(Duration::from_millis(1000)).await;
    Ok(())
}
