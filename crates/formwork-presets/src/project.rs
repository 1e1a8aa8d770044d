// File: src/project.rs
// Purpose: Project form with a repeatable team-member section

use formwork::{FieldSchema, Rule, Schema, SequenceSchema};

pub fn schema() -> Schema {
    let description = "Description must be at least 10 characters";
    let email = "Invalid email";

    Schema::builder("project")
        .field(FieldSchema::text("project_name").required_message("Project name is required"))
        .field(
            FieldSchema::text("description")
                .required_message(description)
                .rule_message(Rule::MinLength(10), description),
        )
        .sequence(
            SequenceSchema::new("team_members")
                .entry_field(FieldSchema::text("name").required_message("Name is required"))
                .entry_field(FieldSchema::text("role").required_message("Role is required"))
                .entry_field(
                    FieldSchema::text("email")
                        .required_message(email)
                        .rule_message(Rule::Email, email),
                )
                .min_entries_message(1, "At least one team member is required"),
        )
        .field(FieldSchema::open_list("tags"))
        .build()
        .expect("project schema is valid")
}
