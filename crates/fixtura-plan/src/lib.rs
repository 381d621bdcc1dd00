//! Plan contracts and validation for Fixtura.
//!
//! A plan is a declaration document listing models, their inheritance,
//! shapes and field rules. This crate owns the serde/schemars models, the
//! emitted JSON Schema, and structural plus semantic validation.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
pub use load::load_plan_value;
pub use model::{
    ConstRule, FakeRule, FieldKeyword, FieldRule, GenRule, ModelPlan, Plan, SeqRule, SeqSpec,
    ShapeSpec, SubListRule, SubRule, TemplateRule,
};
pub use schema::{plan_json_schema, plan_json_schema_value};
pub use validate::{
    PLAN_VERSION, ValidatedPlan, Vocabulary, validate_plan, validate_plan_json,
    validate_plan_semantics,
};
