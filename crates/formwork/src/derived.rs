// File: src/derived.rs
// Purpose: Conditional option sets, ceilings, and price derived from one driver field

use std::collections::BTreeMap;

use tracing::debug;

use crate::schema::Schema;
use crate::state::FormState;
use crate::value::FieldValue;

/// What one value of the driver field makes available: option sets for
/// dependent choice/list fields, ceilings for dependent numbers, forced
/// boolean flags, and the variant's base price.
#[derive(Debug, Clone, Default)]
pub struct DerivedVariant {
    options: BTreeMap<String, Vec<String>>,
    ceilings: BTreeMap<String, f64>,
    forced_flags: BTreeMap<String, bool>,
    base_price: f64,
}

impl DerivedVariant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options<S: Into<String>>(
        mut self,
        field: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        self.options
            .insert(field.into(), options.into_iter().map(Into::into).collect());
        self
    }

    pub fn ceiling(mut self, field: impl Into<String>, max: f64) -> Self {
        self.ceilings.insert(field.into(), max);
        self
    }

    pub fn force_flag(mut self, field: impl Into<String>, value: bool) -> Self {
        self.forced_flags.insert(field.into(), value);
        self
    }

    pub fn price(mut self, base: f64) -> Self {
        self.base_price = base;
        self
    }
}

/// A flat price adjustment on top of the variant base
#[derive(Debug, Clone, PartialEq)]
pub enum Surcharge {
    /// Applies while a boolean field is on
    FlagEnabled { field: String, amount: f64 },
    /// Applies while a choice field holds, or a list field contains, the option
    OptionChosen {
        field: String,
        option: String,
        amount: f64,
    },
}

impl Surcharge {
    pub fn when_flag(field: impl Into<String>, amount: f64) -> Self {
        Surcharge::FlagEnabled {
            field: field.into(),
            amount,
        }
    }

    pub fn when_option(field: impl Into<String>, option: impl Into<String>, amount: f64) -> Self {
        Surcharge::OptionChosen {
            field: field.into(),
            option: option.into(),
            amount,
        }
    }

    fn amount_for(&self, state: &FormState) -> f64 {
        match self {
            Surcharge::FlagEnabled { field, amount } => {
                if state.boolean(field) == Some(true) {
                    *amount
                } else {
                    0.0
                }
            }
            Surcharge::OptionChosen {
                field,
                option,
                amount,
            } => {
                let chosen = match state.value(field) {
                    FieldValue::Text(s) => s == option,
                    FieldValue::List(items) => items.iter().any(|i| i == option),
                    _ => false,
                };
                if chosen {
                    *amount
                } else {
                    0.0
                }
            }
        }
    }
}

/// The variant table for one driver field, plus price surcharges shared by
/// all variants.
#[derive(Debug, Clone, Default)]
pub struct DerivedRules {
    driver: String,
    variants: BTreeMap<String, DerivedVariant>,
    surcharges: Vec<Surcharge>,
}

/// The computed output: what is currently available, and at what price.
/// A pure function of the state; recomputed after every mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedState {
    pub options: BTreeMap<String, Vec<String>>,
    pub ceilings: BTreeMap<String, f64>,
    pub price: f64,
}

impl DerivedState {
    pub fn options_for(&self, field: &str) -> &[String] {
        self.options.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ceiling_for(&self, field: &str) -> Option<f64> {
        self.ceilings.get(field).copied()
    }
}

impl DerivedRules {
    pub fn for_field(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            variants: BTreeMap::new(),
            surcharges: Vec::new(),
        }
    }

    pub fn variant(mut self, value: impl Into<String>, variant: DerivedVariant) -> Self {
        self.variants.insert(value.into(), variant);
        self
    }

    pub fn surcharge(mut self, surcharge: Surcharge) -> Self {
        self.surcharges.push(surcharge);
        self
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    fn active_variant<'a>(&'a self, state: &FormState) -> Option<&'a DerivedVariant> {
        let key = state.value(&self.driver).to_display();
        self.variants.get(&key)
    }

    /// Map the current state to its derived option sets, ceilings, and price
    pub fn compute(&self, state: &FormState) -> DerivedState {
        let Some(variant) = self.active_variant(state) else {
            return DerivedState::default();
        };
        let surcharges: f64 = self.surcharges.iter().map(|s| s.amount_for(state)).sum();
        DerivedState {
            options: variant.options.clone(),
            ceilings: variant.ceilings.clone(),
            price: variant.base_price + surcharges,
        }
    }

    /// Pull every dependent field back inside the active variant, in the same
    /// update that changed the driver. Returns the fields that were adjusted.
    pub fn reconcile(&self, schema: &Schema, state: &mut FormState) -> Vec<String> {
        let Some(variant) = self.active_variant(state) else {
            return Vec::new();
        };
        let mut adjusted = Vec::new();

        for (field, available) in &variant.options {
            match state.value(field).clone() {
                FieldValue::List(items) => {
                    let kept: Vec<String> = items
                        .iter()
                        .filter(|item| available.contains(item))
                        .cloned()
                        .collect();
                    if kept.len() != items.len() {
                        state.write(field, FieldValue::List(kept));
                        adjusted.push(field.clone());
                    }
                }
                FieldValue::Text(current) => {
                    if !available.iter().any(|o| *o == current) {
                        let fallback = self.fallback_option(schema, field, available);
                        state.write(field, FieldValue::Text(fallback));
                        adjusted.push(field.clone());
                    }
                }
                _ => {}
            }
        }

        for (field, max) in &variant.ceilings {
            if let Some(current) = state.number(field) {
                if current > *max {
                    state.write(field, FieldValue::Number(*max));
                    adjusted.push(field.clone());
                }
            }
        }

        for (field, forced) in &variant.forced_flags {
            if state.boolean(field) != Some(*forced) {
                state.write(field, FieldValue::Bool(*forced));
                adjusted.push(field.clone());
            }
        }

        if !adjusted.is_empty() {
            debug!("Reconciled fields {:?} after `{}` change", adjusted, self.driver);
        }
        adjusted
    }

    /// Schema default if still available, else the first available option
    fn fallback_option(&self, schema: &Schema, field: &str, available: &[String]) -> String {
        if let Some(field_schema) = schema.field(field) {
            if let Some(default) = field_schema.default().as_text() {
                if available.iter().any(|o| o == default) {
                    return default.to_string();
                }
            }
        }
        available.first().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use pretty_assertions::assert_eq;

    fn plan_schema() -> Schema {
        Schema::builder("plan")
            .field(
                FieldSchema::choice("tier", ["basic", "premium"]).default_value("basic"),
            )
            .field(FieldSchema::list("features", ["A", "B", "C"]))
            .field(
                FieldSchema::choice("support", ["email", "chat"]).default_value("email"),
            )
            .field(FieldSchema::number("seats").default_value(1))
            .field(FieldSchema::boolean("domain").default_value(false))
            .build()
            .unwrap()
    }

    fn plan_rules() -> DerivedRules {
        DerivedRules::for_field("tier")
            .variant(
                "basic",
                DerivedVariant::new()
                    .options("features", ["A"])
                    .options("support", ["email"])
                    .ceiling("seats", 5.0)
                    .force_flag("domain", false)
                    .price(29.0),
            )
            .variant(
                "premium",
                DerivedVariant::new()
                    .options("features", ["A", "B", "C"])
                    .options("support", ["email", "chat"])
                    .ceiling("seats", 25.0)
                    .price(99.0),
            )
            .surcharge(Surcharge::when_flag("domain", 20.0))
            .surcharge(Surcharge::when_option("support", "chat", 30.0))
    }

    #[test]
    fn test_compute_price_with_surcharges() {
        let schema = plan_schema();
        let rules = plan_rules();
        let mut state = FormState::with_defaults(&schema);
        state.set("tier", FieldValue::from("premium"));
        state.set("domain", FieldValue::from(true));
        state.set("support", FieldValue::from("chat"));

        let derived = rules.compute(&state);
        assert_eq!(derived.price, 99.0 + 20.0 + 30.0);
        assert_eq!(derived.options_for("features"), &["A", "B", "C"]);
        assert_eq!(derived.ceiling_for("seats"), Some(25.0));
    }

    #[test]
    fn test_reconcile_filters_resets_and_clamps() {
        let schema = plan_schema();
        let rules = plan_rules();
        let mut state = FormState::with_defaults(&schema);
        state.set("tier", FieldValue::from("premium"));
        state.set("features", FieldValue::from(vec!["A", "B"]));
        state.set("support", FieldValue::from("chat"));
        state.set("seats", FieldValue::from(20));
        state.set("domain", FieldValue::from(true));
        assert!(rules.reconcile(&schema, &mut state).is_empty());

        // Downgrade: everything outside the basic variant snaps back
        state.set("tier", FieldValue::from("basic"));
        let adjusted = rules.reconcile(&schema, &mut state);
        assert_eq!(state.list("features").unwrap(), &["A".to_string()]);
        assert_eq!(state.text("support"), Some("email"));
        assert_eq!(state.number("seats"), Some(5.0));
        assert_eq!(state.boolean("domain"), Some(false));
        assert_eq!(adjusted.len(), 4);

        // Price no longer counts the dropped surcharges
        assert_eq!(rules.compute(&state).price, 29.0);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let schema = plan_schema();
        let rules = plan_rules();
        let mut state = FormState::with_defaults(&schema);
        state.set("tier", FieldValue::from("basic"));
        rules.reconcile(&schema, &mut state);
        let snapshot = state.clone();
        assert!(rules.reconcile(&schema, &mut state).is_empty());
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_unknown_driver_value_has_no_derived_state() {
        let schema = plan_schema();
        let rules = plan_rules();
        let mut state = FormState::with_defaults(&schema);
        state.write("tier", FieldValue::Unset);
        assert_eq!(rules.compute(&state), DerivedState::default());
        assert!(rules.reconcile(&schema, &mut state).is_empty());
    }
}
