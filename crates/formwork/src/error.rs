// File: src/error.rs
// Purpose: Typed errors for schema construction and form operations

use thiserror::Error;
use uuid::Uuid;

use crate::schema::FieldKind;
use crate::validation::ValidationResult;

/// Schema authoring faults. All of these are raised when the schema is
/// built, never during evaluation.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    #[error("Rule references unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid pattern for field `{field}`: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule `{rule}` does not apply to {kind} field `{field}`")]
    RuleKindConflict {
        field: String,
        rule: &'static str,
        kind: FieldKind,
    },

    #[error("Minimum bound exceeds maximum bound for field `{0}`")]
    InvertedBounds(String),

    #[error("Default value for field `{field}` is not a valid {kind}")]
    InvalidDefault { field: String, kind: FieldKind },

    #[error("Empty option set for field `{0}`")]
    EmptyOptions(String),

    #[error("Sequence `{0}` declares no entry fields")]
    EmptySequence(String),

    #[error("Step `{step}` references unknown field: {field}")]
    UnknownStepField { step: String, field: String },
}

/// Runtime faults raised by form operations. Validation errors are not
/// errors in this sense; they live in [`ValidationResult`].
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Wrong value kind for field `{field}`, expected {expected}")]
    KindMismatch { field: String, expected: FieldKind },

    #[error("Unknown sequence: {0}")]
    UnknownSequence(String),

    #[error("No entry {id} in sequence `{sequence}`")]
    UnknownEntry { sequence: String, id: Uuid },

    #[error("Sequence `{sequence}` cannot drop below {min} entries")]
    MinEntriesReached { sequence: String, min: usize },

    #[error("Form is locked while a submission is in flight")]
    SubmissionInFlight,

    #[error("Submission rejected: form has validation errors")]
    Rejected(ValidationResult),

    #[error("Submit handler failed: {0}")]
    SubmitFailed(String),
}
