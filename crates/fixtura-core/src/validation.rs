use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::{RecordShape, TargetShape};
use crate::types::FieldType;

/// Validate internal consistency of a target shape.
///
/// This checks:
/// - the record has a name
/// - field names are non-empty and unique
/// - `any` never appears nested inside a container
pub fn validate_shape(shape: &TargetShape) -> Result<()> {
    match shape {
        TargetShape::Map => Ok(()),
        TargetShape::Opaque { name } if name.trim().is_empty() => {
            Err(Error::InvalidShape("opaque shape without a name".to_string()))
        }
        TargetShape::Opaque { .. } => Ok(()),
        TargetShape::Record(record) => validate_record(record),
    }
}

fn validate_record(record: &RecordShape) -> Result<()> {
    if record.name.trim().is_empty() {
        return Err(Error::InvalidShape("record shape without a name".to_string()));
    }

    let mut seen = BTreeSet::new();
    for field in &record.fields {
        if field.name.trim().is_empty() {
            return Err(Error::InvalidShape(format!(
                "empty field name in record {}",
                record.name
            )));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(Error::InvalidShape(format!(
                "duplicate field name: {}.{}",
                record.name, field.name
            )));
        }
        if contains_nested_any(&field.field_type) {
            return Err(Error::InvalidShape(format!(
                "field {}.{} nests 'any' inside a container",
                record.name, field.name
            )));
        }
    }

    Ok(())
}

fn contains_nested_any(field_type: &FieldType) -> bool {
    match field_type {
        FieldType::Optional(inner) | FieldType::List(inner) | FieldType::Map(inner) => {
            matches!(**inner, FieldType::Any) || contains_nested_any(inner)
        }
        _ => false,
    }
}
