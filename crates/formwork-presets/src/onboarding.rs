// File: src/onboarding.rs
// Purpose: Three-step onboarding flow with per-step gating

use formwork::{FieldSchema, Form, Rule, Schema, StepFlow};

pub const NOTIFICATION_OPTIONS: [&str; 4] = [
    "Email Updates",
    "Push Notifications",
    "SMS Alerts",
    "Newsletter",
];

pub fn schema() -> Schema {
    let email = "Please enter a valid email";
    let username = "Username must be at least 3 characters";

    Schema::builder("onboarding")
        .field(FieldSchema::text("first_name").required_message("First name is required"))
        .field(FieldSchema::text("last_name").required_message("Last name is required"))
        .field(
            FieldSchema::text("email")
                .required_message(email)
                .rule_message(Rule::Email, email),
        )
        .field(
            FieldSchema::choice("theme", ["light", "dark", "auto"])
                .required()
                .default_value("dark"),
        )
        .field(FieldSchema::list("notifications", NOTIFICATION_OPTIONS))
        .field(
            FieldSchema::choice("language", ["en", "es", "fr", "de", "zh"])
                .required_message("Please select a language"),
        )
        .field(
            FieldSchema::text("username")
                .required_message(username)
                .rule_message(Rule::MinLength(3), username),
        )
        .field(
            FieldSchema::text("bio")
                .rule_message(Rule::MaxLength(200), "Bio must be less than 200 characters"),
        )
        .field(FieldSchema::boolean("is_public").default_value(false))
        .build()
        .expect("onboarding schema is valid")
}

pub fn flow(schema: &Schema) -> StepFlow {
    StepFlow::builder()
        .step("Personal Information", ["first_name", "last_name", "email"])
        .step("Preferences", ["theme", "notifications", "language"])
        .step("Account Settings", ["username", "bio", "is_public"])
        .build(schema)
        .expect("onboarding steps name schema fields")
}

pub fn form() -> Form {
    Form::new(schema())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fill_personal(form: &mut Form) {
        form.set("first_name", "Ada").unwrap();
        form.set("last_name", "Lovelace").unwrap();
        form.set("email", "ada@example.com").unwrap();
    }

    #[test]
    fn test_walkthrough_to_review() {
        let mut form = form();
        let mut flow = flow(form.schema());

        assert_eq!(flow.current_step().unwrap().name(), "Personal Information");
        let blocked = flow.advance(&form).unwrap_err();
        assert_eq!(blocked.error("first_name"), Some("First name is required"));

        fill_personal(&mut form);
        flow.advance(&form).unwrap();
        assert_eq!(flow.current_step().unwrap().name(), "Preferences");

        // Theme has a default; language does not
        let blocked = flow.advance(&form).unwrap_err();
        assert_eq!(blocked.error("language"), Some("Please select a language"));
        assert_eq!(blocked.error("theme"), None);

        form.set("language", "fr").unwrap();
        flow.advance(&form).unwrap();

        form.set("username", "ada").unwrap();
        flow.advance(&form).unwrap();
        assert!(flow.is_review());
        assert_eq!(flow.progress(), 100.0);
    }

    #[test]
    fn test_restart_returns_to_the_first_step() {
        let mut form = form();
        let mut flow = flow(form.schema());

        fill_personal(&mut form);
        flow.advance(&form).unwrap();
        assert_eq!(flow.progress(), 1.0 / 3.0 * 100.0);

        flow.restart();
        assert_eq!(flow.current(), 0);
        assert_eq!(flow.progress(), 0.0);
    }

    #[test]
    fn test_long_bio_blocks_the_settings_step() {
        let mut form = form();
        let mut flow = flow(form.schema());

        fill_personal(&mut form);
        flow.advance(&form).unwrap();
        form.set("language", "en").unwrap();
        flow.advance(&form).unwrap();

        form.set("username", "ada").unwrap();
        form.set("bio", "x".repeat(201)).unwrap();
        let blocked = flow.advance(&form).unwrap_err();
        assert_eq!(
            blocked.error("bio"),
            Some("Bio must be less than 200 characters")
        );
    }
}
