// File: src/schema.rs
// Purpose: Declarative form schema: field kinds, rules, cross-field rules, sequences

use std::fmt;

use crate::error::SchemaError;
use crate::validation::validators;
use crate::value::FieldValue;

// ============================================================================
// Field kinds
// ============================================================================

/// What shape of value a field holds. Choice fields hold text constrained to
/// an option set; list fields hold an unordered set of selected options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    Date,
    Choice,
    List,
}

impl FieldKind {
    /// Whether a stored value's variant conforms to this kind
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Text, FieldValue::Text(_))
                | (FieldKind::Choice, FieldValue::Text(_))
                | (FieldKind::Number, FieldValue::Number(_))
                | (FieldKind::Bool, FieldValue::Bool(_))
                | (FieldKind::Date, FieldValue::Date(_))
                | (FieldKind::List, FieldValue::List(_))
        )
    }

    /// Error message shown when a value of the wrong variant reaches validation
    pub(crate) fn mismatch_message(&self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::Choice => "Must be text",
            FieldKind::Number => "Must be a number",
            FieldKind::Bool => "Must be true or false",
            FieldKind::Date => "Must be a date",
            FieldKind::List => "Must be a list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Bool => "boolean",
            FieldKind::Date => "date",
            FieldKind::Choice => "choice",
            FieldKind::List => "list",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Rules
// ============================================================================

/// A single per-field constraint. Evaluation dispatches on the variant; no
/// validation logic lives anywhere else.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    MinLength(usize),
    MaxLength(usize),
    /// Raw pattern source; compiled once when the schema is built
    Pattern(String),
    Email,
    Url,
    Min(f64),
    Max(f64),
    OneOf(Vec<String>),
    MinItems(usize),
    MaxItems(usize),
    MustBeTrue,
}

impl Rule {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Rule::MinLength(_) => "min_length",
            Rule::MaxLength(_) => "max_length",
            Rule::Pattern(_) => "pattern",
            Rule::Email => "email",
            Rule::Url => "url",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::OneOf(_) => "one_of",
            Rule::MinItems(_) => "min_items",
            Rule::MaxItems(_) => "max_items",
            Rule::MustBeTrue => "must_be_true",
        }
    }

    pub(crate) fn applies_to(&self, kind: FieldKind) -> bool {
        match self {
            Rule::MinLength(_) | Rule::MaxLength(_) | Rule::Pattern(_) | Rule::Email | Rule::Url => {
                matches!(kind, FieldKind::Text)
            }
            Rule::Min(_) | Rule::Max(_) => matches!(kind, FieldKind::Number),
            // Membership applies to a single choice or to every selected item
            Rule::OneOf(_) => matches!(kind, FieldKind::Choice | FieldKind::List),
            Rule::MinItems(_) | Rule::MaxItems(_) => matches!(kind, FieldKind::List),
            Rule::MustBeTrue => matches!(kind, FieldKind::Bool),
        }
    }

    pub(crate) fn default_message(&self) -> String {
        match self {
            Rule::MinLength(n) => format!("Must be at least {} characters", n),
            Rule::MaxLength(n) => format!("Must be at most {} characters", n),
            Rule::Pattern(_) => "Invalid format".to_string(),
            Rule::Email => "Invalid email address".to_string(),
            Rule::Url => "Invalid URL".to_string(),
            Rule::Min(n) => format!("Must be at least {}", n),
            Rule::Max(n) => format!("Must be at most {}", n),
            Rule::OneOf(allowed) => format!("Must be one of: {}", allowed.join(", ")),
            Rule::MinItems(n) => format!("Must have at least {} items", n),
            Rule::MaxItems(n) => format!("Must have at most {} items", n),
            Rule::MustBeTrue => "Must be accepted".to_string(),
        }
    }
}

/// A rule plus its optional custom message
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Constraint {
    pub(crate) rule: Rule,
    pub(crate) message: Option<String>,
}

impl Constraint {
    pub(crate) fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.rule.default_message())
    }
}

// ============================================================================
// Field schema
// ============================================================================

/// Constraints and defaults for one named field. Immutable once the schema
/// is built.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: String,
    label: String,
    kind: FieldKind,
    required: bool,
    required_message: Option<String>,
    constraints: Vec<Constraint>,
    default: FieldValue,
}

impl FieldSchema {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let label = title_case(&name);
        Self {
            name,
            label,
            kind,
            required: false,
            required_message: None,
            constraints: Vec::new(),
            default: FieldValue::Unset,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    /// A single selection out of a fixed option set
    pub fn choice<S: Into<String>>(name: impl Into<String>, options: impl IntoIterator<Item = S>) -> Self {
        Self::new(name, FieldKind::Choice).rule(Rule::OneOf(
            options.into_iter().map(Into::into).collect(),
        ))
    }

    /// Zero or more selections out of a fixed option set
    pub fn list<S: Into<String>>(name: impl Into<String>, options: impl IntoIterator<Item = S>) -> Self {
        Self::new(name, FieldKind::List).rule(Rule::OneOf(
            options.into_iter().map(Into::into).collect(),
        ))
    }

    /// Zero or more free-form entries, no fixed option set
    pub fn open_list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::List)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark required with a custom message
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.required_message = Some(message.into());
        self
    }

    /// Append a rule with its default message
    pub fn rule(mut self, rule: Rule) -> Self {
        self.constraints.push(Constraint { rule, message: None });
        self
    }

    /// Append a rule with a custom message
    pub fn rule_message(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint {
            rule,
            message: Some(message.into()),
        });
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = value.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> &FieldValue {
        &self.default
    }

    /// The declared option set, when the field carries one
    pub fn options(&self) -> Option<&[String]> {
        self.constraints.iter().find_map(|c| match &c.rule {
            Rule::OneOf(allowed) => Some(allowed.as_slice()),
            _ => None,
        })
    }

    pub(crate) fn required_error_message(&self) -> String {
        self.required_message
            .clone()
            .unwrap_or_else(|| format!("{} is required", self.label))
    }

    pub(crate) fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    fn check(&self) -> Result<(), SchemaError> {
        let mut min_len = None;
        let mut max_len = None;
        let mut min = None;
        let mut max = None;
        let mut min_items = None;
        let mut max_items = None;

        for constraint in &self.constraints {
            let rule = &constraint.rule;
            if !rule.applies_to(self.kind) {
                return Err(SchemaError::RuleKindConflict {
                    field: self.name.clone(),
                    rule: rule.name(),
                    kind: self.kind,
                });
            }
            match rule {
                Rule::Pattern(pattern) => {
                    validators::compile_pattern(pattern).map_err(|source| {
                        SchemaError::InvalidPattern {
                            field: self.name.clone(),
                            source,
                        }
                    })?;
                }
                Rule::OneOf(allowed) => {
                    if allowed.is_empty() {
                        return Err(SchemaError::EmptyOptions(self.name.clone()));
                    }
                }
                Rule::MinLength(n) => min_len = Some(*n),
                Rule::MaxLength(n) => max_len = Some(*n),
                Rule::Min(n) => min = Some(*n),
                Rule::Max(n) => max = Some(*n),
                Rule::MinItems(n) => min_items = Some(*n),
                Rule::MaxItems(n) => max_items = Some(*n),
                _ => {}
            }
        }

        let inverted = matches!((min_len, max_len), (Some(lo), Some(hi)) if lo > hi)
            || matches!((min, max), (Some(lo), Some(hi)) if lo > hi)
            || matches!((min_items, max_items), (Some(lo), Some(hi)) if lo > hi);
        if inverted {
            return Err(SchemaError::InvertedBounds(self.name.clone()));
        }

        if !self.default.is_unset() {
            if !self.kind.accepts(&self.default) {
                return Err(SchemaError::InvalidDefault {
                    field: self.name.clone(),
                    kind: self.kind,
                });
            }
            // A choice default must name one of the options
            if self.kind == FieldKind::Choice {
                let allowed = self.options().unwrap_or(&[]);
                if let Some(text) = self.default.as_text() {
                    if !text.is_empty() && !allowed.iter().any(|o| o == text) {
                        return Err(SchemaError::InvalidDefault {
                            field: self.name.clone(),
                            kind: self.kind,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Cross-field rules
// ============================================================================

/// Predicate spanning more than one field
#[derive(Debug, Clone, PartialEq)]
pub enum CrossCheck {
    /// The two fields hold equal values (password confirmation)
    FieldsMatch { field: String, other: String },
    /// `field` becomes required when `other` currently equals `equals`
    RequiredWhen {
        field: String,
        other: String,
        equals: String,
    },
}

/// A cross-field constraint with the field its error reports against
#[derive(Debug, Clone, PartialEq)]
pub struct CrossFieldRule {
    check: CrossCheck,
    attach_to: String,
    message: String,
}

impl CrossFieldRule {
    /// Equality across two fields; the error lands on `other`
    pub fn fields_match(
        field: impl Into<String>,
        other: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let other = other.into();
        Self {
            check: CrossCheck::FieldsMatch {
                field: field.into(),
                other: other.clone(),
            },
            attach_to: other,
            message: message.into(),
        }
    }

    /// Conditional requirement; the error lands on the dependent field
    pub fn required_when(
        field: impl Into<String>,
        other: impl Into<String>,
        equals: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let field = field.into();
        Self {
            check: CrossCheck::RequiredWhen {
                field: field.clone(),
                other: other.into(),
                equals: equals.into(),
            },
            attach_to: field,
            message: message.into(),
        }
    }

    pub fn attach_to(mut self, field: impl Into<String>) -> Self {
        self.attach_to = field.into();
        self
    }

    pub(crate) fn check(&self) -> &CrossCheck {
        &self.check
    }

    pub(crate) fn target(&self) -> &str {
        &self.attach_to
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn referenced_fields(&self) -> Vec<&str> {
        match &self.check {
            CrossCheck::FieldsMatch { field, other } => vec![field, other],
            CrossCheck::RequiredWhen { field, other, .. } => vec![field, other],
        }
    }
}

// ============================================================================
// Sequences
// ============================================================================

/// An ordered list of structured entries (e.g. team members), each validated
/// against the entry fields, with a minimum-count rule on the list itself.
#[derive(Debug, Clone)]
pub struct SequenceSchema {
    name: String,
    label: String,
    entry_fields: Vec<FieldSchema>,
    min_entries: usize,
    min_message: Option<String>,
}

impl SequenceSchema {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = title_case(&name);
        Self {
            name,
            label,
            entry_fields: Vec::new(),
            min_entries: 0,
            min_message: None,
        }
    }

    pub fn entry_field(mut self, field: FieldSchema) -> Self {
        self.entry_fields.push(field);
        self
    }

    pub fn min_entries(mut self, min: usize) -> Self {
        self.min_entries = min;
        self
    }

    pub fn min_entries_message(mut self, min: usize, message: impl Into<String>) -> Self {
        self.min_entries = min;
        self.min_message = Some(message.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_fields(&self) -> &[FieldSchema] {
        &self.entry_fields
    }

    pub fn min(&self) -> usize {
        self.min_entries
    }

    pub(crate) fn min_message(&self) -> String {
        self.min_message
            .clone()
            .unwrap_or_else(|| format!("Must have at least {} {}", self.min_entries, self.label))
    }

    fn check(&self) -> Result<(), SchemaError> {
        if self.entry_fields.is_empty() {
            return Err(SchemaError::EmptySequence(self.name.clone()));
        }
        let mut seen = std::collections::BTreeSet::new();
        for field in &self.entry_fields {
            if !seen.insert(field.name().to_string()) {
                return Err(SchemaError::DuplicateField(format!(
                    "{}.{}",
                    self.name,
                    field.name()
                )));
            }
            field.check()?;
        }
        Ok(())
    }
}

// ============================================================================
// Schema
// ============================================================================

/// The full declarative description of one form. Built fail-fast: every
/// authoring fault surfaces from [`SchemaBuilder::build`], never during
/// evaluation.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSchema>,
    cross_rules: Vec<CrossFieldRule>,
    sequences: Vec<SequenceSchema>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            cross_rules: Vec::new(),
            sequences: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn cross_rules(&self) -> &[CrossFieldRule] {
        &self.cross_rules
    }

    pub fn sequences(&self) -> &[SequenceSchema] {
        &self.sequences
    }

    pub fn sequence(&self, name: &str) -> Option<&SequenceSchema> {
        self.sequences.iter().find(|s| s.name() == name)
    }
}

pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSchema>,
    cross_rules: Vec<CrossFieldRule>,
    sequences: Vec<SequenceSchema>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn cross_rule(mut self, rule: CrossFieldRule) -> Self {
        self.cross_rules.push(rule);
        self
    }

    pub fn sequence(mut self, sequence: SequenceSchema) -> Self {
        self.sequences.push(sequence);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut names = std::collections::BTreeSet::new();
        for field in &self.fields {
            if !names.insert(field.name().to_string()) {
                return Err(SchemaError::DuplicateField(field.name().to_string()));
            }
            field.check()?;
        }
        for sequence in &self.sequences {
            if !names.insert(sequence.name().to_string()) {
                return Err(SchemaError::DuplicateField(sequence.name().to_string()));
            }
            sequence.check()?;
        }
        for rule in &self.cross_rules {
            for referenced in rule.referenced_fields() {
                if !names.contains(referenced) {
                    return Err(SchemaError::UnknownField(referenced.to_string()));
                }
            }
            if !names.contains(rule.target()) {
                return Err(SchemaError::UnknownField(rule.target().to_string()));
            }
        }
        Ok(Schema {
            name: self.name,
            fields: self.fields,
            cross_rules: self.cross_rules,
            sequences: self.sequences,
        })
    }
}

/// Convert snake_case to Title Case for default labels
pub(crate) fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
