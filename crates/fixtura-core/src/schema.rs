use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::FieldType;
use crate::value::FieldMap;

/// Shape instances of a model are built into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetShape {
    /// Free-form ordered map; no typed fields to infer from.
    Map,
    /// Named record with an introspectable field list.
    Record(RecordShape),
    /// A type that exposes neither map semantics nor typed fields.
    Opaque { name: String },
}

impl TargetShape {
    pub fn name(&self) -> &str {
        match self {
            TargetShape::Map => "map",
            TargetShape::Record(shape) => &shape.name,
            TargetShape::Opaque { name } => name,
        }
    }

    pub fn record(&self) -> Option<&RecordShape> {
        match self {
            TargetShape::Record(shape) => Some(shape),
            _ => None,
        }
    }
}

/// Field list of a structured record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordShape {
    /// Record type name (e.g. `User`).
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<ShapeField>,
}

impl RecordShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(ShapeField {
            name: name.into(),
            field_type,
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&ShapeField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A typed field of a record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShapeField {
    pub name: String,
    /// Type expression such as `string`, `int?` or `list<Profile>`.
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub field_type: FieldType,
}

/// Types that can describe the shape a factory builds them from.
///
/// This is the explicit replacement for runtime type-hint introspection:
/// implementors list their fields and types by hand.
pub trait Shaped {
    fn target_shape() -> TargetShape;
}

impl Shaped for FieldMap {
    fn target_shape() -> TargetShape {
        TargetShape::Map
    }
}
