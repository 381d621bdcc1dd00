use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::value::{FieldMap, Value};

/// Typed extraction out of a resolved [`Value`].
///
/// `field` names the value's origin and is only used for error messages.
pub trait FromValue: Sized {
    fn from_value(field: &str, value: Value) -> Result<Self>;
}

/// Keyword construction of a record from its resolved fields.
pub trait FromFields: Sized {
    fn from_fields(fields: FieldMap) -> Result<Self>;
}

/// Field-by-field assignment onto an existing instance.
pub trait AssignField {
    fn assign_field(&mut self, name: &str, value: Value) -> Result<()>;
}

/// Typed accessors over a resolved [`FieldMap`].
pub trait FieldMapExt {
    /// Removes `name` and converts it; missing fields are an error.
    fn take_field<T: FromValue>(&mut self, name: &str) -> Result<T>;
    /// Removes `name` and converts it; missing fields become `None`.
    fn take_optional<T: FromValue>(&mut self, name: &str) -> Result<Option<T>>;
    /// Removes a nested record and builds it through [`FromFields`].
    fn take_record<T: FromFields>(&mut self, name: &str) -> Result<T>;
    /// Removes a list of nested records and builds each through [`FromFields`].
    fn take_records<T: FromFields>(&mut self, name: &str) -> Result<Vec<T>>;
}

impl FieldMapExt for FieldMap {
    fn take_field<T: FromValue>(&mut self, name: &str) -> Result<T> {
        let value = self
            .shift_remove(name)
            .ok_or_else(|| Error::MissingField(name.to_string()))?;
        T::from_value(name, value)
    }

    fn take_optional<T: FromValue>(&mut self, name: &str) -> Result<Option<T>> {
        match self.shift_remove(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::from_value(name, value).map(Some),
        }
    }

    fn take_record<T: FromFields>(&mut self, name: &str) -> Result<T> {
        let fields: FieldMap = self.take_field(name)?;
        T::from_fields(fields)
    }

    fn take_records<T: FromFields>(&mut self, name: &str) -> Result<Vec<T>> {
        let items: Vec<FieldMap> = self.take_field(name)?;
        items.into_iter().map(T::from_fields).collect()
    }
}

impl FromValue for Value {
    fn from_value(_field: &str, value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Text(value) => Ok(value),
            other => Err(Error::mismatch(field, "string", other.kind())),
        }
    }
}

impl FromValue for i64 {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Int(value) => Ok(value),
            other => Err(Error::mismatch(field, "int", other.kind())),
        }
    }
}

impl FromValue for i32 {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        let wide = i64::from_value(field, value)?;
        i32::try_from(wide).map_err(|_| Error::mismatch(field, "i32", "int"))
    }
}

impl FromValue for u32 {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        let wide = i64::from_value(field, value)?;
        u32::try_from(wide).map_err(|_| Error::mismatch(field, "u32", "int"))
    }
}

impl FromValue for u64 {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        let wide = i64::from_value(field, value)?;
        u64::try_from(wide).map_err(|_| Error::mismatch(field, "u64", "int"))
    }
}

impl FromValue for f64 {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Float(value) => Ok(value),
            Value::Int(value) => Ok(value as f64),
            other => Err(Error::mismatch(field, "float", other.kind())),
        }
    }
}

impl FromValue for bool {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Bool(value) => Ok(value),
            other => Err(Error::mismatch(field, "bool", other.kind())),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Decimal(value) => Ok(value),
            Value::Int(value) => Ok(Decimal::from(value)),
            Value::Float(value) => Decimal::from_f64(value)
                .ok_or_else(|| Error::mismatch(field, "decimal", "float")),
            other => Err(Error::mismatch(field, "decimal", other.kind())),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Uuid(value) => Ok(value),
            Value::Text(text) => {
                Uuid::parse_str(&text).map_err(|_| Error::mismatch(field, "uuid", "string"))
            }
            other => Err(Error::mismatch(field, "uuid", other.kind())),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Date(value) => Ok(value),
            Value::Timestamp(value) => Ok(value.date()),
            other => Err(Error::mismatch(field, "date", other.kind())),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Time(value) => Ok(value),
            other => Err(Error::mismatch(field, "time", other.kind())),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(value) => Ok(value),
            other => Err(Error::mismatch(field, "datetime", other.kind())),
        }
    }
}

impl FromValue for FieldMap {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Map(fields) => Ok(fields),
            other => Err(Error::mismatch(field, "map", other.kind())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(field, other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| T::from_value(field, item))
                .collect(),
            other => Err(Error::mismatch(field, "list", other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Profile {
        bio: String,
    }

    impl FromFields for Profile {
        fn from_fields(mut fields: FieldMap) -> Result<Self> {
            Ok(Self {
                bio: fields.take_field("bio")?,
            })
        }
    }

    #[test]
    fn take_field_reports_missing_and_mismatched() {
        let mut fields = FieldMap::new();
        fields.insert("age".to_string(), Value::Text("old".to_string()));

        assert_eq!(
            fields.take_field::<String>("name"),
            Err(Error::MissingField("name".to_string()))
        );
        assert!(matches!(
            fields.take_field::<i64>("age"),
            Err(Error::TypeMismatch { expected: "int", found: "string", .. })
        ));
    }

    #[test]
    fn take_optional_treats_null_as_none() {
        let mut fields = FieldMap::new();
        fields.insert("city".to_string(), Value::Null);
        assert_eq!(fields.take_optional::<String>("city"), Ok(None));
        assert_eq!(fields.take_optional::<String>("absent"), Ok(None));
    }

    #[test]
    fn take_records_builds_nested_lists() {
        let mut profile = FieldMap::new();
        profile.insert("bio".to_string(), Value::from("hello"));
        let mut fields = FieldMap::new();
        fields.insert(
            "profiles".to_string(),
            Value::List(vec![Value::Map(profile.clone()), Value::Map(profile)]),
        );

        let profiles: Vec<Profile> = fields.take_records("profiles").expect("profiles");
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].bio, "hello");
    }
}
