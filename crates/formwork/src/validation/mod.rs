// File: src/validation/mod.rs
// Purpose: The validation pass: per-field rules, cross-field rules, sequences

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::schema::{CrossCheck, CrossFieldRule, FieldSchema, Rule, Schema};
use crate::state::FormState;
use crate::value::FieldValue;

pub mod validators;

/// Per-field error messages plus the overall flag. Derived from
/// (state, schema) alone and recomputed wholesale on every change; ordered
/// maps keep repeated runs byte-identical when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: BTreeMap::new(),
        }
    }

    /// Create a failed validation result
    pub fn failure(errors: BTreeMap<String, String>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the error for a specific field
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Validate the whole form
pub fn validate(schema: &Schema, state: &FormState) -> ValidationResult {
    run(schema, state, None)
}

/// Validate a named subset of fields (per-step gating). Cross-field rules
/// participate only when every field they reference is inside the subset.
pub fn validate_fields(schema: &Schema, state: &FormState, fields: &[&str]) -> ValidationResult {
    let subset: BTreeSet<&str> = fields.iter().copied().collect();
    run(schema, state, Some(&subset))
}

fn run(schema: &Schema, state: &FormState, subset: Option<&BTreeSet<&str>>) -> ValidationResult {
    let included = |name: &str| subset.map_or(true, |s| s.contains(name));
    let mut errors = BTreeMap::new();

    for field in schema.fields() {
        if !included(field.name()) {
            continue;
        }
        if let Some(message) = check_field(field, state.value(field.name())) {
            errors.insert(field.name().to_string(), message);
        }
    }

    for sequence in schema.sequences() {
        if !included(sequence.name()) {
            continue;
        }
        let empty = crate::sequence::EntryList::default();
        let list = state.sequence(sequence.name()).unwrap_or(&empty);
        for (index, entry) in list.entries().iter().enumerate() {
            for field in sequence.entry_fields() {
                if let Some(message) = check_field(field, entry.value(field.name())) {
                    errors.insert(
                        format!("{}.{}.{}", sequence.name(), index, field.name()),
                        message,
                    );
                }
            }
        }
        if list.len() < sequence.min() {
            errors
                .entry(sequence.name().to_string())
                .or_insert_with(|| sequence.min_message());
        }
    }

    for rule in schema.cross_rules() {
        if !rule.referenced_fields().iter().all(|f| included(f)) {
            continue;
        }
        if !cross_rule_passes(rule, state) {
            // First failure wins; never overwrite an existing error
            errors
                .entry(rule.target().to_string())
                .or_insert_with(|| rule.message().to_string());
        }
    }

    if errors.is_empty() {
        ValidationResult::success()
    } else {
        ValidationResult::failure(errors)
    }
}

/// Run one field's checks in order: required, kind conformance, then the
/// declared rules. The first failing check's message is the field's error.
pub(crate) fn check_field(field: &FieldSchema, value: &FieldValue) -> Option<String> {
    if value.is_empty() {
        if field.is_required() {
            return Some(field.required_error_message());
        }
        // Optional and empty: remaining checks do not apply
        return None;
    }
    if !field.kind().accepts(value) {
        return Some(field.kind().mismatch_message().to_string());
    }
    for constraint in field.constraints() {
        if !rule_passes(&constraint.rule, value) {
            return Some(constraint.message());
        }
    }
    None
}

fn rule_passes(rule: &Rule, value: &FieldValue) -> bool {
    match (rule, value) {
        (Rule::MinLength(min), FieldValue::Text(s)) => s.len() >= *min,
        (Rule::MaxLength(max), FieldValue::Text(s)) => s.len() <= *max,
        (Rule::Pattern(pattern), FieldValue::Text(s)) => validators::matches_pattern(s, pattern),
        (Rule::Email, FieldValue::Text(s)) => validators::is_valid_email(s),
        (Rule::Url, FieldValue::Text(s)) => validators::is_valid_url(s),
        (Rule::Min(min), FieldValue::Number(n)) => n >= min,
        (Rule::Max(max), FieldValue::Number(n)) => n <= max,
        (Rule::OneOf(allowed), FieldValue::Text(s)) => allowed.iter().any(|o| o == s),
        (Rule::OneOf(allowed), FieldValue::List(items)) => {
            items.iter().all(|item| allowed.contains(item))
        }
        (Rule::MinItems(min), FieldValue::List(items)) => items.len() >= *min,
        (Rule::MaxItems(max), FieldValue::List(items)) => items.len() <= *max,
        (Rule::MustBeTrue, FieldValue::Bool(b)) => *b,
        // Kind conformance was checked before rules run
        _ => true,
    }
}

fn cross_rule_passes(rule: &CrossFieldRule, state: &FormState) -> bool {
    match rule.check() {
        CrossCheck::FieldsMatch { field, other } => state.value(field) == state.value(other),
        CrossCheck::RequiredWhen {
            field,
            other,
            equals,
        } => {
            if state.value(other).to_display() == *equals {
                !state.value(field).is_empty()
            } else {
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CrossFieldRule, FieldSchema, Rule, SequenceSchema};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn username_schema() -> Schema {
        Schema::builder("demo")
            .field(
                FieldSchema::text("username")
                    .required()
                    .rule(Rule::MinLength(3))
                    .rule(Rule::MaxLength(20))
                    .rule(Rule::Pattern(r"^[a-zA-Z0-9_]+$".to_string())),
            )
            .build()
            .unwrap()
    }

    fn state_with(schema: &Schema, field: &str, value: FieldValue) -> FormState {
        let mut state = FormState::with_defaults(schema);
        state.set(field, value);
        state
    }

    #[rstest]
    #[case("ab", Some("Must be at least 3 characters"))]
    #[case("ab cd", Some("Invalid format"))]
    #[case("abcd", None)]
    #[case("a_long_but_legal_nm", None)]
    fn test_username_checks_in_order(#[case] input: &str, #[case] expected: Option<&str>) {
        let schema = username_schema();
        let state = state_with(&schema, "username", FieldValue::from(input));
        let result = validate(&schema, &state);
        assert_eq!(result.error("username"), expected);
        assert_eq!(result.is_valid, expected.is_none());
    }

    #[test]
    fn test_required_runs_before_rules() {
        let schema = username_schema();
        let state = FormState::with_defaults(&schema);
        let result = validate(&schema, &state);
        assert_eq!(result.error("username"), Some("Username is required"));
    }

    #[test]
    fn test_optional_empty_field_skips_rules() {
        let schema = Schema::builder("demo")
            .field(FieldSchema::text("website").rule(Rule::Url))
            .build()
            .unwrap();
        let state = FormState::with_defaults(&schema);
        assert!(validate(&schema, &state).is_valid);

        let state = state_with(&schema, "website", FieldValue::from("not a url"));
        assert_eq!(
            validate(&schema, &state).error("website"),
            Some("Invalid URL")
        );
    }

    #[test]
    fn test_cross_rule_attaches_to_designated_field_only() {
        let schema = Schema::builder("demo")
            .field(FieldSchema::text("password").required())
            .field(FieldSchema::text("confirm_password").required())
            .cross_rule(CrossFieldRule::fields_match(
                "password",
                "confirm_password",
                "Passwords don't match",
            ))
            .build()
            .unwrap();
        let mut state = FormState::with_defaults(&schema);
        state.set("password", FieldValue::from("abc12345"));
        state.set("confirm_password", FieldValue::from("abc12344"));

        let result = validate(&schema, &state);
        assert_eq!(
            result.error("confirm_password"),
            Some("Passwords don't match")
        );
        assert_eq!(result.error("password"), None);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_cross_rule_never_overwrites_field_error() {
        let schema = Schema::builder("demo")
            .field(FieldSchema::text("password").required())
            .field(
                FieldSchema::text("confirm_password")
                    .required()
                    .rule(Rule::MinLength(8)),
            )
            .cross_rule(CrossFieldRule::fields_match(
                "password",
                "confirm_password",
                "Passwords don't match",
            ))
            .build()
            .unwrap();
        let mut state = FormState::with_defaults(&schema);
        state.set("password", FieldValue::from("abc12345"));
        state.set("confirm_password", FieldValue::from("abc"));

        let result = validate(&schema, &state);
        // The per-field error stays; the cross rule does not clobber it
        assert_eq!(
            result.error("confirm_password"),
            Some("Must be at least 8 characters")
        );
    }

    #[test]
    fn test_required_when_rule() {
        let schema = Schema::builder("demo")
            .field(FieldSchema::choice("contact_method", ["email", "phone"]).default_value("email"))
            .field(FieldSchema::text("phone"))
            .cross_rule(CrossFieldRule::required_when(
                "phone",
                "contact_method",
                "phone",
                "Phone number is required for phone contact",
            ))
            .build()
            .unwrap();
        let mut state = FormState::with_defaults(&schema);
        assert!(validate(&schema, &state).is_valid);

        state.set("contact_method", FieldValue::from("phone"));
        let result = validate(&schema, &state);
        assert_eq!(
            result.error("phone"),
            Some("Phone number is required for phone contact")
        );
    }

    #[test]
    fn test_sequence_entries_validated_independently() {
        let schema = Schema::builder("demo")
            .sequence(
                SequenceSchema::new("team_members")
                    .entry_field(FieldSchema::text("name").required_message("Name is required"))
                    .entry_field(FieldSchema::text("email").required().rule(Rule::Email))
                    .min_entries_message(1, "At least one team member is required"),
            )
            .build()
            .unwrap();
        let mut state = FormState::with_defaults(&schema);
        {
            let schema_seq = schema.sequence("team_members").unwrap().clone();
            let list = state.sequence_mut("team_members").unwrap();
            let second = list.push_default(&schema_seq);
            let first = list.ids()[0];
            list.entry_mut(first).unwrap().set("name", FieldValue::from("Ada"));
            list.entry_mut(first)
                .unwrap()
                .set("email", FieldValue::from("ada@example.com"));
            list.entry_mut(second)
                .unwrap()
                .set("email", FieldValue::from("nope"));
        }

        let result = validate(&schema, &state);
        assert_eq!(result.error("team_members.0.name"), None);
        assert_eq!(result.error("team_members.1.name"), Some("Name is required"));
        assert_eq!(
            result.error("team_members.1.email"),
            Some("Invalid email address")
        );
        assert_eq!(result.error("team_members"), None);
    }

    #[test]
    fn test_subset_validation_gates_cross_rules() {
        let schema = Schema::builder("demo")
            .field(FieldSchema::text("first_name").required())
            .field(FieldSchema::text("password").required())
            .field(FieldSchema::text("confirm_password").required())
            .cross_rule(CrossFieldRule::fields_match(
                "password",
                "confirm_password",
                "Passwords don't match",
            ))
            .build()
            .unwrap();
        let mut state = FormState::with_defaults(&schema);
        state.set("first_name", FieldValue::from("Ada"));
        state.set("password", FieldValue::from("one"));
        state.set("confirm_password", FieldValue::from("two"));

        // The first step never looks at the password pair
        let result = validate_fields(&schema, &state, &["first_name"]);
        assert!(result.is_valid);

        let result = validate_fields(&schema, &state, &["password", "confirm_password"]);
        assert_eq!(
            result.error("confirm_password"),
            Some("Passwords don't match")
        );
    }

    #[test]
    fn test_idempotent_and_serially_identical() {
        let schema = username_schema();
        let state = state_with(&schema, "username", FieldValue::from("ab"));
        let first = validate(&schema, &state);
        let second = validate(&schema, &state);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_single_violation_isolation() {
        let schema = Schema::builder("demo")
            .field(FieldSchema::text("first_name").required())
            .field(FieldSchema::text("last_name").required())
            .field(FieldSchema::number("age").rule(Rule::Min(18.0)))
            .build()
            .unwrap();
        let mut state = FormState::with_defaults(&schema);
        state.set("first_name", FieldValue::from("Ada"));
        state.set("age", FieldValue::from(30));

        let result = validate(&schema, &state);
        assert_eq!(result.errors.len(), 1);
        assert!(result.error("last_name").is_some());
    }
}
