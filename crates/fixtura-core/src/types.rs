use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Leaf types a record field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Int,
    Float,
    Bool,
    DateTime,
    Date,
    Time,
    Decimal,
    Uuid,
    Bytes,
}

impl ScalarType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::Decimal => "decimal",
            Self::Uuid => "uuid",
            Self::Bytes => "bytes",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "string" | "str" | "text" => Some(Self::String),
            "int" | "integer" | "i64" => Some(Self::Int),
            "float" | "f64" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            "datetime" | "timestamp" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "decimal" => Some(Self::Decimal),
            "uuid" => Some(Self::Uuid),
            "bytes" => Some(Self::Bytes),
            _ => None,
        }
    }
}

/// Declared type of a record field.
///
/// Serialized as a compact type expression: `string`, `int?`,
/// `optional<date>`, `list<string>`, `map<int>`, `any`, or the name of a
/// nested record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    Scalar(ScalarType),
    Optional(Box<FieldType>),
    List(Box<FieldType>),
    Map(Box<FieldType>),
    Record(String),
    Any,
}

impl FieldType {
    pub const STRING: FieldType = FieldType::Scalar(ScalarType::String);
    pub const INT: FieldType = FieldType::Scalar(ScalarType::Int);
    pub const FLOAT: FieldType = FieldType::Scalar(ScalarType::Float);
    pub const BOOL: FieldType = FieldType::Scalar(ScalarType::Bool);
    pub const DATETIME: FieldType = FieldType::Scalar(ScalarType::DateTime);
    pub const DATE: FieldType = FieldType::Scalar(ScalarType::Date);
    pub const TIME: FieldType = FieldType::Scalar(ScalarType::Time);
    pub const DECIMAL: FieldType = FieldType::Scalar(ScalarType::Decimal);
    pub const UUID: FieldType = FieldType::Scalar(ScalarType::Uuid);
    pub const BYTES: FieldType = FieldType::Scalar(ScalarType::Bytes);

    pub fn optional(self) -> Self {
        FieldType::Optional(Box::new(self))
    }

    pub fn list_of(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    pub fn map_of(item: FieldType) -> Self {
        FieldType::Map(Box::new(item))
    }

    pub fn record(name: impl Into<String>) -> Self {
        FieldType::Record(name.into())
    }

    /// Strips a single `Optional` layer, leaving nested ones intact.
    pub fn unwrap_optional(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            FieldType::Scalar(scalar) => Some(*scalar),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(scalar) => f.write_str(scalar.as_str()),
            FieldType::Optional(inner) => write!(f, "{inner}?"),
            FieldType::List(inner) => write!(f, "list<{inner}>"),
            FieldType::Map(inner) => write!(f, "map<{inner}>"),
            FieldType::Record(name) => f.write_str(name),
            FieldType::Any => f.write_str("any"),
        }
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let value = input.trim();
        if value.is_empty() {
            return Err(Error::InvalidFieldType("empty type expression".to_string()));
        }

        if let Some(inner) = value.strip_suffix('?') {
            return Ok(FieldType::Optional(Box::new(inner.parse()?)));
        }

        if let Some((outer, rest)) = value.split_once('<') {
            let inner = rest.strip_suffix('>').ok_or_else(|| {
                Error::InvalidFieldType(format!("unbalanced '<' in '{input}'"))
            })?;
            let inner: FieldType = inner.parse()?;
            return match outer.trim() {
                "optional" => Ok(FieldType::Optional(Box::new(inner))),
                "list" => Ok(FieldType::List(Box::new(inner))),
                "map" => Ok(FieldType::Map(Box::new(inner))),
                other => Err(Error::InvalidFieldType(format!(
                    "unknown type constructor '{other}'"
                ))),
            };
        }

        if value == "any" {
            return Ok(FieldType::Any);
        }

        if let Some(scalar) = ScalarType::parse(value) {
            return Ok(FieldType::Scalar(scalar));
        }

        if value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.')
        {
            return Ok(FieldType::Record(value.to_string()));
        }

        Err(Error::InvalidFieldType(format!(
            "unrecognized type expression '{input}'"
        )))
    }
}

impl TryFrom<String> for FieldType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_expressions() {
        let parsed: FieldType = "optional<list<string>>".parse().expect("parse");
        assert_eq!(
            parsed,
            FieldType::list_of(FieldType::STRING).optional()
        );
        let parsed: FieldType = "date?".parse().expect("parse");
        assert_eq!(parsed, FieldType::DATE.optional());
        let parsed: FieldType = "Profile".parse().expect("parse");
        assert_eq!(parsed, FieldType::record("Profile"));
    }

    #[test]
    fn display_round_trips() {
        let ty = FieldType::map_of(FieldType::INT).optional();
        let parsed: FieldType = ty.to_string().parse().expect("parse");
        assert_eq!(parsed, ty);
    }

    #[test]
    fn rejects_unknown_constructor() {
        assert!(matches!(
            "set<int>".parse::<FieldType>(),
            Err(Error::InvalidFieldType(_))
        ));
    }

    #[test]
    fn unwraps_only_one_optional_layer() {
        let ty = FieldType::STRING.optional().optional();
        assert_eq!(ty.unwrap_optional(), &FieldType::STRING.optional());
    }
}
