// File: src/subscription.rs
// Purpose: Subscription form whose options, limits, and price follow the tier

use formwork::{DerivedRules, DerivedVariant, FieldSchema, Form, Rule, Schema, Surcharge};

pub const BASIC_FEATURES: [&str; 3] = ["Email Support", "Basic Analytics", "5 Users"];

pub const PREMIUM_FEATURES: [&str; 5] = [
    "Email Support",
    "Basic Analytics",
    "25 Users",
    "Chat Support",
    "Advanced Analytics",
];

pub const ENTERPRISE_FEATURES: [&str; 7] = [
    "Email Support",
    "Basic Analytics",
    "Unlimited Users",
    "Chat Support",
    "Advanced Analytics",
    "Phone Support",
    "Custom Integration",
];

pub const ADDITIONAL_SERVICES: [&str; 4] = [
    "Training",
    "Custom Development",
    "Priority Support",
    "Data Migration",
];

pub fn schema() -> Schema {
    // Membership net across every tier; the active tier narrows it further
    let mut all_features: Vec<&str> = BASIC_FEATURES.to_vec();
    for feature in PREMIUM_FEATURES.iter().chain(ENTERPRISE_FEATURES.iter()) {
        if !all_features.contains(feature) {
            all_features.push(feature);
        }
    }

    Schema::builder("subscription")
        .field(
            FieldSchema::choice("subscription_type", ["basic", "premium", "enterprise"])
                .required()
                .default_value("basic"),
        )
        .field(FieldSchema::list("features", all_features))
        .field(
            FieldSchema::number("max_users")
                .required()
                .rule_message(Rule::Min(1.0), "Must have at least 1 user")
                .default_value(1.0),
        )
        .field(FieldSchema::boolean("custom_domain").default_value(false))
        .field(
            FieldSchema::choice("support_level", ["email", "chat", "phone"])
                .required()
                .default_value("email"),
        )
        .field(FieldSchema::list("additional_services", ADDITIONAL_SERVICES))
        .build()
        .expect("subscription schema is valid")
}

pub fn derived_rules() -> DerivedRules {
    DerivedRules::for_field("subscription_type")
        .variant(
            "basic",
            DerivedVariant::new()
                .options("features", BASIC_FEATURES)
                .options("support_level", ["email"])
                .ceiling("max_users", 5.0)
                .force_flag("custom_domain", false)
                .price(29.0),
        )
        .variant(
            "premium",
            DerivedVariant::new()
                .options("features", PREMIUM_FEATURES)
                .options("support_level", ["email", "chat"])
                .ceiling("max_users", 25.0)
                .price(99.0),
        )
        .variant(
            "enterprise",
            DerivedVariant::new()
                .options("features", ENTERPRISE_FEATURES)
                .options("support_level", ["email", "chat", "phone"])
                .ceiling("max_users", 1000.0)
                .price(299.0),
        )
        .surcharge(Surcharge::when_flag("custom_domain", 20.0))
        .surcharge(Surcharge::when_option("support_level", "chat", 30.0))
        .surcharge(Surcharge::when_option("support_level", "phone", 50.0))
}

pub fn form() -> Form {
    Form::with_derived(schema(), derived_rules())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_tier_baseline() {
        let form = form();
        assert_eq!(form.derived().price, 29.0);
        assert_eq!(form.derived().options_for("features"), BASIC_FEATURES);
        assert_eq!(form.derived().options_for("support_level"), ["email"]);
        assert_eq!(form.derived().ceiling_for("max_users"), Some(5.0));
        assert!(form.is_valid());
    }

    #[test]
    fn test_upgrades_widen_and_price_follows() {
        let mut form = form();
        form.set("subscription_type", "enterprise").unwrap();
        form.set("support_level", "phone").unwrap();
        form.set("custom_domain", true).unwrap();
        form.set("max_users", 500.0).unwrap();

        assert_eq!(form.derived().price, 299.0 + 50.0 + 20.0);
        assert_eq!(form.derived().options_for("features"), ENTERPRISE_FEATURES);
    }

    #[test]
    fn test_downgrade_to_basic_clears_unavailable_selections() {
        let mut form = form();
        form.set("subscription_type", "enterprise").unwrap();
        form.set("support_level", "phone").unwrap();
        form.set("custom_domain", true).unwrap();
        form.set("max_users", 500.0).unwrap();
        form.toggle("features", "Phone Support").unwrap();
        form.toggle("features", "Email Support").unwrap();

        form.set("subscription_type", "basic").unwrap();

        assert_eq!(form.value("support_level").as_text(), Some("email"));
        assert_eq!(form.value("custom_domain").as_bool(), Some(false));
        assert_eq!(form.value("max_users").as_number(), Some(5.0));
        assert_eq!(
            form.value("features").as_list().unwrap(),
            &["Email Support".to_string()]
        );
        assert_eq!(form.derived().price, 29.0);
    }
}
