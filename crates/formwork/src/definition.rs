// File: src/definition.rs
// Purpose: Declarative form definitions parsed from TOML

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::flow::StepFlow;
use crate::schema::{CrossFieldRule, FieldKind, FieldSchema, Rule, Schema, SequenceSchema};
use crate::value::FieldValue;

/// A whole form described as data. Parsed with serde, then pushed through
/// the same fail-fast builder as code-defined schemas.
#[derive(Debug, Clone, Deserialize)]
pub struct FormDefinition {
    pub form: FormMeta,

    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDef>,

    #[serde(default, rename = "cross")]
    pub cross_rules: Vec<CrossDef>,

    #[serde(default, rename = "sequence")]
    pub sequences: Vec<SequenceDef>,

    #[serde(default, rename = "step")]
    pub steps: Vec<StepDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormMeta {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Implies `required`
    #[serde(default)]
    pub required_message: Option<String>,

    /// Option set for choice and list fields
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub default: Option<toml::Value>,

    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDef {
    MinLength {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    MaxLength {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    Pattern {
        value: String,
        #[serde(default)]
        message: Option<String>,
    },
    Email {
        #[serde(default)]
        message: Option<String>,
    },
    Url {
        #[serde(default)]
        message: Option<String>,
    },
    Min {
        value: f64,
        #[serde(default)]
        message: Option<String>,
    },
    Max {
        value: f64,
        #[serde(default)]
        message: Option<String>,
    },
    MinItems {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    MaxItems {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    MustBeTrue {
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrossDef {
    FieldsMatch {
        field: String,
        other: String,
        message: String,
        #[serde(default)]
        attach_to: Option<String>,
    },
    RequiredWhen {
        field: String,
        other: String,
        equals: String,
        message: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SequenceDef {
    pub name: String,

    #[serde(default)]
    pub min_entries: usize,

    #[serde(default)]
    pub min_message: Option<String>,

    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepDef {
    pub name: String,
    pub fields: Vec<String>,
}

fn default_kind() -> String {
    "text".to_string()
}

impl FormDefinition {
    /// Parse a definition from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse form definition")
    }

    /// Load a definition from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read form definition: {:?}", path))?;
        let definition = Self::parse(&content)
            .with_context(|| format!("Failed to parse form definition: {:?}", path))?;
        info!("Loaded form definition `{}` from {:?}", definition.form.name, path);
        Ok(definition)
    }

    /// Build the schema through the fail-fast construction path
    pub fn to_schema(&self) -> Result<Schema> {
        let mut builder = Schema::builder(&self.form.name);
        for field in &self.fields {
            builder = builder.field(field.to_field_schema()?);
        }
        for sequence in &self.sequences {
            let mut seq = SequenceSchema::new(&sequence.name);
            for field in &sequence.fields {
                seq = seq.entry_field(field.to_field_schema()?);
            }
            seq = match &sequence.min_message {
                Some(message) => seq.min_entries_message(sequence.min_entries, message),
                None => seq.min_entries(sequence.min_entries),
            };
            builder = builder.sequence(seq);
        }
        for cross in &self.cross_rules {
            builder = builder.cross_rule(cross.to_cross_rule());
        }
        let schema = builder
            .build()
            .with_context(|| format!("Invalid schema in form definition `{}`", self.form.name))?;
        Ok(schema)
    }

    /// Build the step flow declared by the definition, if any
    pub fn to_flow(&self, schema: &Schema) -> Result<Option<StepFlow>> {
        if self.steps.is_empty() {
            return Ok(None);
        }
        let mut builder = StepFlow::builder();
        for step in &self.steps {
            builder = builder.step(&step.name, step.fields.iter().map(String::as_str));
        }
        let flow = builder
            .build(schema)
            .with_context(|| format!("Invalid steps in form definition `{}`", self.form.name))?;
        Ok(Some(flow))
    }
}

impl FieldDef {
    fn to_field_schema(&self) -> Result<FieldSchema> {
        let kind = match self.kind.as_str() {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Bool,
            "date" => FieldKind::Date,
            "choice" => FieldKind::Choice,
            "list" => FieldKind::List,
            other => bail!("Unknown kind `{}` for field `{}`", other, self.name),
        };

        let mut field = match kind {
            FieldKind::Text => FieldSchema::text(&self.name),
            FieldKind::Number => FieldSchema::number(&self.name),
            FieldKind::Bool => FieldSchema::boolean(&self.name),
            FieldKind::Date => FieldSchema::date(&self.name),
            FieldKind::Choice => FieldSchema::choice(&self.name, self.options.clone()),
            FieldKind::List if self.options.is_empty() => FieldSchema::open_list(&self.name),
            FieldKind::List => FieldSchema::list(&self.name, self.options.clone()),
        };

        if let Some(label) = &self.label {
            field = field.label(label);
        }
        match &self.required_message {
            Some(message) => field = field.required_message(message),
            None if self.required => field = field.required(),
            None => {}
        }
        for rule in &self.rules {
            let (rule, message) = rule.to_rule();
            field = match message {
                Some(message) => field.rule_message(rule, message),
                None => field.rule(rule),
            };
        }
        if let Some(default) = &self.default {
            field = field.default_value(parse_default(&self.name, kind, default)?);
        }
        Ok(field)
    }
}

impl RuleDef {
    fn to_rule(&self) -> (Rule, Option<String>) {
        match self {
            RuleDef::MinLength { value, message } => (Rule::MinLength(*value), message.clone()),
            RuleDef::MaxLength { value, message } => (Rule::MaxLength(*value), message.clone()),
            RuleDef::Pattern { value, message } => (Rule::Pattern(value.clone()), message.clone()),
            RuleDef::Email { message } => (Rule::Email, message.clone()),
            RuleDef::Url { message } => (Rule::Url, message.clone()),
            RuleDef::Min { value, message } => (Rule::Min(*value), message.clone()),
            RuleDef::Max { value, message } => (Rule::Max(*value), message.clone()),
            RuleDef::MinItems { value, message } => (Rule::MinItems(*value), message.clone()),
            RuleDef::MaxItems { value, message } => (Rule::MaxItems(*value), message.clone()),
            RuleDef::MustBeTrue { message } => (Rule::MustBeTrue, message.clone()),
        }
    }
}

impl CrossDef {
    fn to_cross_rule(&self) -> CrossFieldRule {
        match self {
            CrossDef::FieldsMatch {
                field,
                other,
                message,
                attach_to,
            } => {
                let rule = CrossFieldRule::fields_match(field, other, message);
                match attach_to {
                    Some(target) => rule.attach_to(target),
                    None => rule,
                }
            }
            CrossDef::RequiredWhen {
                field,
                other,
                equals,
                message,
            } => CrossFieldRule::required_when(field, other, equals, message),
        }
    }
}

fn parse_default(field: &str, kind: FieldKind, value: &toml::Value) -> Result<FieldValue> {
    let parsed = match (kind, value) {
        (FieldKind::Text | FieldKind::Choice, toml::Value::String(s)) => {
            FieldValue::Text(s.clone())
        }
        (FieldKind::Number, toml::Value::Integer(n)) => FieldValue::Number(*n as f64),
        (FieldKind::Number, toml::Value::Float(n)) => FieldValue::Number(*n),
        (FieldKind::Bool, toml::Value::Boolean(b)) => FieldValue::Bool(*b),
        (FieldKind::Date, toml::Value::String(s)) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Bad default date for field `{}`", field))?;
            FieldValue::Date(date)
        }
        (FieldKind::Date, toml::Value::Datetime(dt)) => {
            let date = NaiveDate::parse_from_str(&dt.to_string(), "%Y-%m-%d")
                .with_context(|| format!("Bad default date for field `{}`", field))?;
            FieldValue::Date(date)
        }
        (FieldKind::List, toml::Value::Array(items)) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    toml::Value::String(s) => list.push(s.clone()),
                    _ => bail!("Default list for field `{}` must hold strings", field),
                }
            }
            FieldValue::List(list)
        }
        _ => bail!(
            "Default for {} field `{}` has the wrong type",
            kind,
            field
        ),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Form;
    use pretty_assertions::assert_eq;

    const SIGNUP: &str = r#"
        [form]
        name = "signup"

        [[field]]
        name = "username"
        required_message = "Username is required"

        [[field.rule]]
        kind = "min_length"
        value = 3
        message = "Username must be at least 3 characters"

        [[field]]
        name = "password"
        required = true

        [[field]]
        name = "confirm_password"
        required = true

        [[field]]
        name = "priority"
        kind = "choice"
        options = ["low", "medium", "high"]
        default = "low"

        [[cross]]
        kind = "fields_match"
        field = "password"
        other = "confirm_password"
        message = "Passwords don't match"
    "#;

    #[test]
    fn test_parse_and_build_schema() {
        let definition = FormDefinition::parse(SIGNUP).unwrap();
        let schema = definition.to_schema().unwrap();
        assert_eq!(schema.name(), "signup");
        assert_eq!(schema.fields().len(), 4);
        assert_eq!(schema.cross_rules().len(), 1);

        let mut form = Form::new(schema);
        assert_eq!(form.error("username"), Some("Username is required"));
        form.set("username", "ab").unwrap();
        assert_eq!(
            form.error("username"),
            Some("Username must be at least 3 characters")
        );
        assert_eq!(form.value("priority").as_text(), Some("low"));
    }

    #[test]
    fn test_bad_pattern_fails_at_load() {
        let definition = FormDefinition::parse(
            r#"
            [form]
            name = "broken"

            [[field]]
            name = "code"

            [[field.rule]]
            kind = "pattern"
            value = "[unclosed"
        "#,
        )
        .unwrap();
        let err = definition.to_schema().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let definition = FormDefinition::parse(
            r#"
            [form]
            name = "broken"

            [[field]]
            name = "x"
            kind = "tristate"
        "#,
        )
        .unwrap();
        assert!(definition.to_schema().is_err());
    }

    #[test]
    fn test_sequence_and_steps_round_trip() {
        let definition = FormDefinition::parse(
            r#"
            [form]
            name = "project"

            [[field]]
            name = "project_name"
            required_message = "Project name is required"

            [[sequence]]
            name = "team_members"
            min_entries = 1
            min_message = "At least one team member is required"

            [[sequence.field]]
            name = "name"
            required_message = "Name is required"

            [[step]]
            name = "Basics"
            fields = ["project_name"]

            [[step]]
            name = "Team"
            fields = ["team_members"]
        "#,
        )
        .unwrap();
        let schema = definition.to_schema().unwrap();
        let flow = definition.to_flow(&schema).unwrap().unwrap();
        assert_eq!(flow.steps().len(), 2);
        assert_eq!(schema.sequence("team_members").unwrap().min(), 1);

        let form = Form::new(schema);
        assert_eq!(
            form.validation().error("team_members.0.name"),
            Some("Name is required")
        );
    }

    #[test]
    fn test_date_defaults_parse_both_forms() {
        let definition = FormDefinition::parse(
            r#"
            [form]
            name = "dates"

            [[field]]
            name = "start"
            kind = "date"
            default = "2024-05-01"

            [[field]]
            name = "end"
            kind = "date"
            default = 2024-06-01
        "#,
        )
        .unwrap();
        let schema = definition.to_schema().unwrap();
        let form = Form::new(schema);
        assert_eq!(
            form.value("start").as_date(),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(
            form.value("end").as_date(),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
    }
}
