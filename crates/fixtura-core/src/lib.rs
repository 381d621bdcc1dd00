//! Core contracts and helpers for Fixtura.
//!
//! This crate defines the value model produced by factories, the target
//! shapes records are built into, typed conversions out of resolved
//! records, and the JSON encoding shared by the engine and the CLI.

pub mod convert;
pub mod error;
pub mod jsonable;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

pub use convert::{AssignField, FieldMapExt, FromFields, FromValue};
pub use error::{Error, Result};
pub use jsonable::{fields_to_jsonable, from_json, to_jsonable};
pub use schema::{RecordShape, ShapeField, Shaped, TargetShape};
pub use types::{FieldType, ScalarType};
pub use validation::validate_shape;
pub use value::{EnumValue, FieldMap, Value};

/// Current contract version for serialized record shapes.
pub const SHAPE_VERSION: &str = "0.1";
