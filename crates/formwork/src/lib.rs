//! # formwork
//!
//! A headless, schema-driven form engine: declare fields, rules, and messages
//! once, then drive values, validation, derived state, and submission from any
//! frontend.
//!
//! ## Quick Start
//!
//! ```rust
//! use formwork::{Form, Rule, FieldSchema, Schema};
//!
//! let schema = Schema::builder("signup")
//!     .field(
//!         FieldSchema::text("username")
//!             .required_message("Username is required")
//!             .rule_message(Rule::MinLength(3), "Username must be at least 3 characters"),
//!     )
//!     .field(FieldSchema::text("email").required().rule(Rule::Email))
//!     .build()
//!     .unwrap();
//!
//! let mut form = Form::new(schema);
//! form.set("username", "ab").unwrap();
//! assert_eq!(
//!     form.error("username"),
//!     Some("Username must be at least 3 characters")
//! );
//! form.set("username", "abcd").unwrap();
//! assert_eq!(form.error("username"), None);
//! ```
//!
//! ## Architecture
//!
//! - **`schema`** - Field, rule, cross-field, and sequence declarations with
//!   fail-fast construction
//! - **`state`** - Current values, repeatable entries, and touched tracking
//! - **`validation`** - Pure evaluation of a state against a schema
//! - **`derived`** - Options, ceilings, and pricing that follow a driver field
//! - **`form`** - The stateful facade tying the above together
//! - **`flow`** - Multi-step progression gated on per-step validity
//! - **`definition`** - The same schemas declared in TOML

pub mod value;
pub mod error;
pub mod schema;

// Engine modules
pub mod state;
pub mod sequence;
pub mod validation;
pub mod derived;
pub mod form;
pub mod flow;
pub mod definition;

// Re-export core declaration types
pub use schema::{
    CrossFieldRule, FieldKind, FieldSchema, Rule, Schema, SchemaBuilder, SequenceSchema,
};

// Re-export runtime types
pub use definition::FormDefinition;
pub use derived::{DerivedRules, DerivedState, DerivedVariant, Surcharge};
pub use error::{FormError, SchemaError};
pub use flow::{Step, StepFlow, StepFlowBuilder};
pub use form::{simulate_submit, Form, FormStatus};
pub use sequence::{EntryList, SequenceEntry};
pub use state::FormState;
pub use validation::{validate, validate_fields, ValidationResult};
pub use value::FieldValue;

// Re-export commonly used types from dependencies
pub use chrono::NaiveDate;
pub use uuid::Uuid;
