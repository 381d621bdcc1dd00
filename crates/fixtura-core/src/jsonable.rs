//! Conversion between resolved values and plain JSON.
//!
//! Encoding rules:
//! - dates, times and timestamps become ISO-8601 strings
//! - UUIDs become their hyphenated string form
//! - decimals become JSON floats
//! - enum members become their underlying value
//! - bytes become lowercase hex strings
//! - lists and maps are converted element-wise, keeping key order

use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::value::{FieldMap, Value};

/// Converts a resolved value into JSON-serializable data.
pub fn to_jsonable(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(value) => JsonValue::Bool(*value),
        Value::Int(value) => JsonValue::Number(Number::from(*value)),
        Value::Float(value) => float(*value),
        Value::Decimal(value) => value.to_f64().map(float).unwrap_or(JsonValue::Null),
        Value::Text(value) => JsonValue::String(value.clone()),
        Value::Bytes(value) => JsonValue::String(hex::encode(value)),
        Value::Uuid(value) => JsonValue::String(value.to_string()),
        Value::Date(_) | Value::Time(_) | Value::Timestamp(_) => {
            JsonValue::String(value.to_display_string())
        }
        Value::Enum(member) => to_jsonable(&member.value),
        Value::List(items) => JsonValue::Array(items.iter().map(to_jsonable).collect()),
        Value::Map(fields) => JsonValue::Object(fields_to_json_map(fields)),
    }
}

/// Converts a whole record into a JSON object, keeping field order.
pub fn fields_to_jsonable(fields: &FieldMap) -> JsonValue {
    JsonValue::Object(fields_to_json_map(fields))
}

fn fields_to_json_map(fields: &FieldMap) -> JsonMap<String, JsonValue> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), to_jsonable(value)))
        .collect()
}

// Non-finite floats have no JSON form.
fn float(value: f64) -> JsonValue {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Lifts plain JSON into a [`Value`].
///
/// Strings stay strings; no attempt is made to recover dates or UUIDs.
pub fn from_json(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(value) => Value::Bool(value),
        JsonValue::Number(number) => match number.as_i64() {
            Some(int) => Value::Int(int),
            None => number.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        JsonValue::String(value) => Value::Text(value),
        JsonValue::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        JsonValue::Object(fields) => Value::Map(
            fields
                .into_iter()
                .map(|(name, value)| (name, from_json(value)))
                .collect(),
        ),
    }
}
