// File: src/profile.rs
// Purpose: Basic contact-profile form

use formwork::{FieldSchema, Rule, Schema};

pub fn schema() -> Schema {
    let first = "First name must be at least 2 characters";
    let last = "Last name must be at least 2 characters";
    let email = "Invalid email address";
    let bio_min = "Bio must be at least 10 characters";

    Schema::builder("profile")
        .field(
            FieldSchema::text("first_name")
                .required_message(first)
                .rule_message(Rule::MinLength(2), first),
        )
        .field(
            FieldSchema::text("last_name")
                .required_message(last)
                .rule_message(Rule::MinLength(2), last),
        )
        .field(
            FieldSchema::text("email")
                .required_message(email)
                .rule_message(Rule::Email, email),
        )
        .field(
            FieldSchema::number("age")
                .required()
                .rule_message(Rule::Min(18.0), "Must be at least 18 years old")
                .rule_message(Rule::Max(100.0), "Must be under 100")
                .default_value(25.0),
        )
        .field(
            FieldSchema::text("bio")
                .required_message(bio_min)
                .rule_message(Rule::MinLength(10), bio_min)
                .rule_message(Rule::MaxLength(500), "Bio must be under 500 characters"),
        )
        .build()
        .expect("profile schema is valid")
}
