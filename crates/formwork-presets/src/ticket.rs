// File: src/ticket.rs
// Purpose: Progress-tracked ticket form with the densest per-field rules

use formwork::{FieldSchema, Form, Rule, Schema};

pub const TAG_OPTIONS: [&str; 8] = [
    "React",
    "TypeScript",
    "Material-UI",
    "Node.js",
    "Python",
    "JavaScript",
    "CSS",
    "HTML",
];

/// The fields the completion meter watches; `website` stays out because it
/// is optional.
pub const PROGRESS_FIELDS: [&str; 5] = ["username", "email", "phone", "priority", "tags"];

pub fn schema() -> Schema {
    let username_min = "Username must be at least 3 characters";
    let email = "Please enter a valid email address";
    let phone = "Please enter a valid phone number";

    Schema::builder("ticket")
        .field(
            FieldSchema::text("username")
                .required_message(username_min)
                .rule_message(Rule::MinLength(3), username_min)
                .rule_message(Rule::MaxLength(20), "Username must be less than 20 characters")
                .rule_message(
                    Rule::Pattern("^[a-zA-Z0-9_]+$".to_string()),
                    "Username can only contain letters, numbers, and underscores",
                ),
        )
        .field(
            FieldSchema::text("email")
                .required_message(email)
                .rule_message(Rule::Email, email),
        )
        .field(
            FieldSchema::text("phone")
                .required_message(phone)
                .rule_message(Rule::Pattern(r"^\+?[\d\s\-\(\)]+$".to_string()), phone)
                .rule_message(Rule::MinLength(10), "Phone number must be at least 10 digits"),
        )
        .field(FieldSchema::text("website").rule_message(Rule::Url, "Please enter a valid URL"))
        .field(
            FieldSchema::choice("priority", ["low", "medium", "high"])
                .required_message("Please select a priority level")
                .default_value("medium"),
        )
        .field(
            FieldSchema::list("tags", TAG_OPTIONS)
                .required_message("Please select at least one tag"),
        )
        .build()
        .expect("ticket schema is valid")
}

pub fn form() -> Form {
    Form::new(schema())
}

/// Percent of the watched fields that are filled in and passing
pub fn progress(form: &Form) -> f64 {
    form.completion(&PROGRESS_FIELDS)
}
