//! # formwork-presets
//!
//! Ready-made schemas for the forms the engine was built around: a contact
//! profile, an account registration, a project team form with repeatable
//! entries, a subscription form with tier-derived options and pricing, a
//! three-step onboarding flow, and a progress-tracked ticket form.
//!
//! Each module exposes `schema()`; the presets that need more also expose
//! `derived_rules()`, `flow()`, or a `form()` convenience constructor.
//!
//! ```rust
//! let mut form = formwork_presets::subscription::form();
//! assert_eq!(form.derived().price, 29.0);
//!
//! form.set("subscription_type", "premium").unwrap();
//! form.set("support_level", "chat").unwrap();
//! assert_eq!(form.derived().price, 129.0);
//! ```

pub mod onboarding;
pub mod profile;
pub mod project;
pub mod registration;
pub mod subscription;
pub mod ticket;
