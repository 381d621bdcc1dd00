use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::Plan;

/// Emit the JSON Schema for plan documents.
pub fn plan_json_schema() -> RootSchema {
    schema_for!(Plan)
}

/// [`plan_json_schema`] as a JSON value, ready for [`crate::validate_plan_json`].
pub fn plan_json_schema_value() -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(plan_json_schema())
}
