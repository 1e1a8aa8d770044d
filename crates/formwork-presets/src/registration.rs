// File: src/registration.rs
// Purpose: Account sign-up form with password confirmation and a strength meter

use chrono::Local;
use formwork::{CrossFieldRule, FieldSchema, Rule, Schema};

pub use formwork::validation::validators::{password_strength, PasswordStrength};

pub const COUNTRIES: [&str; 7] = [
    "USA", "Canada", "UK", "Germany", "France", "Japan", "Australia",
];

pub const SKILLS: [&str; 7] = [
    "JavaScript", "TypeScript", "React", "Node.js", "Python", "Java", "C++",
];

pub fn schema() -> Schema {
    let username = "Username must be at least 3 characters";
    let password = "Password must be at least 8 characters";

    Schema::builder("registration")
        .field(
            FieldSchema::text("username")
                .required_message(username)
                .rule_message(Rule::MinLength(3), username),
        )
        .field(
            FieldSchema::text("password")
                .required_message(password)
                .rule_message(Rule::MinLength(8), password),
        )
        // Left unconstrained on its own; the match rule reports mismatches
        .field(FieldSchema::text("confirm_password"))
        .field(
            FieldSchema::date("birth_date")
                .required()
                .default_value(Local::now().date_naive()),
        )
        .field(
            FieldSchema::choice("gender", ["male", "female", "other"])
                .required()
                .default_value("male"),
        )
        .field(FieldSchema::choice("country", COUNTRIES).required_message("Please select a country"))
        .field(FieldSchema::list("skills", SKILLS).required_message("Please select at least one skill"))
        .field(
            FieldSchema::boolean("agree_to_terms")
                .rule_message(Rule::MustBeTrue, "You must agree to terms")
                .default_value(false),
        )
        .field(FieldSchema::boolean("newsletter").default_value(false))
        .cross_rule(CrossFieldRule::fields_match(
            "password",
            "confirm_password",
            "Passwords don't match",
        ))
        .build()
        .expect("registration schema is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork::Form;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mismatch_reported_on_the_confirmation_field() {
        let mut form = Form::new(schema());
        form.set("password", "correcthorse").unwrap();
        assert_eq!(
            form.error("confirm_password"),
            Some("Passwords don't match")
        );

        form.set("confirm_password", "correcthorse").unwrap();
        assert_eq!(form.error("confirm_password"), None);
        assert_eq!(form.error("password"), None);
    }

    #[test]
    fn test_terms_must_be_accepted() {
        let mut form = Form::new(schema());
        assert_eq!(form.error("agree_to_terms"), Some("You must agree to terms"));
        form.set("agree_to_terms", true).unwrap();
        assert_eq!(form.error("agree_to_terms"), None);
    }

    #[test]
    fn test_empty_skill_selection_is_rejected() {
        let mut form = Form::new(schema());
        assert_eq!(
            form.error("skills"),
            Some("Please select at least one skill")
        );
        form.toggle("skills", "Python").unwrap();
        assert_eq!(form.error("skills"), None);
    }

    #[test]
    fn test_birth_date_defaults_to_today() {
        let form = Form::new(schema());
        assert_eq!(
            form.value("birth_date").as_date(),
            Some(Local::now().date_naive())
        );
    }

    #[test]
    fn test_strength_meter_bands() {
        assert_eq!(password_strength("abc"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdef"), PasswordStrength::Medium);
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::Strong);
    }
}
