//! Field descriptors and the context they resolve against.

pub mod basic;
pub mod derive;
pub mod faker_rs;
pub mod nested;
pub mod primitives;
pub mod semantic;
pub mod sequence;

use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use fixtura_core::{FieldMap, Value};

use crate::engine::ModelDefinition;
use crate::errors::FactoryError;
use crate::faker_rs::{FakeOp, LocaleKey};

/// When a descriptor is resolved relative to the rest of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Resolved in declaration order before overrides are applied.
    Eager,
    /// Resolved last, after overrides, seeing every other field.
    Deferred,
    /// Never resolved and never written to the record.
    Excluded,
}

/// Strategy that produces the value of a single field.
pub trait Descriptor: Send + Sync {
    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Eager
    }

    /// Short description used in logs and declaration comparisons.
    fn label(&self) -> String;

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError>;

    /// Restores internal state such as sequence counters.
    fn reset(&self) {}
}

/// Shared handle to a descriptor.
///
/// Cloning a `Field` shares the underlying descriptor, including any
/// counter it owns.
#[derive(Clone)]
pub struct Field(Arc<dyn Descriptor>);

impl Field {
    pub fn new(descriptor: impl Descriptor + 'static) -> Self {
        Self(Arc::new(descriptor))
    }

    pub fn kind(&self) -> DescriptorKind {
        self.0.kind()
    }

    pub fn is_excluded(&self) -> bool {
        self.kind() == DescriptorKind::Excluded
    }

    pub fn label(&self) -> String {
        self.0.label()
    }

    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        self.0.resolve(ctx)
    }

    /// Resets the descriptor's internal counter, if it has one.
    pub fn reset_sequence(&self) {
        self.0.reset();
    }

    /// True when both handles point at the same descriptor instance.
    pub fn ptr_eq(&self, other: &Field) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.label()).finish()
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        basic::constant(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        basic::constant(value)
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        basic::constant(value)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        basic::constant(value)
    }
}

impl From<i32> for Field {
    fn from(value: i32) -> Self {
        basic::constant(value)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        basic::constant(value)
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        basic::constant(value)
    }
}

/// Everything a descriptor may consult while resolving one field.
pub struct ResolveContext<'a> {
    model: &'a ModelDefinition,
    record: &'a FieldMap,
    field: &'a str,
}

impl<'a> ResolveContext<'a> {
    pub(crate) fn new(model: &'a ModelDefinition, record: &'a FieldMap, field: &'a str) -> Self {
        Self {
            model,
            record,
            field,
        }
    }

    /// Name of the field being resolved.
    pub fn field(&self) -> &str {
        self.field
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn locale(&self) -> LocaleKey {
        self.model.locale()
    }

    /// Read-only view of the fields resolved so far.
    pub fn record(&self) -> PartialRecord<'a> {
        PartialRecord {
            fields: self.record,
        }
    }

    /// Runs `draw` against the model's random source.
    ///
    /// The lock is held only for the duration of `draw`; nested model
    /// builds must happen outside of it.
    pub fn with_rng<R>(&self, draw: impl FnOnce(&mut dyn RngCore) -> R) -> Result<R, FactoryError> {
        let mut rng = self.model.lock_rng()?;
        Ok(draw(&mut *rng))
    }

    /// Asks the model's provider for a value of `op`.
    pub fn produce(&self, op: FakeOp) -> Result<Value, FactoryError> {
        let locale = self.locale();
        let provider = self.model.provider();
        self.with_rng(|rng| provider.produce(op, locale, rng))?
    }
}

/// Keyed, read-only view of an in-progress record.
#[derive(Debug, Clone, Copy)]
pub struct PartialRecord<'a> {
    fields: &'a FieldMap,
}

impl<'a> PartialRecord<'a> {
    pub fn new(fields: &'a FieldMap) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Result<&'a Value, FactoryError> {
        self.fields.get(name).ok_or_else(|| FactoryError::NotResolved {
            field: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Result<&'a str, FactoryError> {
        let value = self.get(name)?;
        value
            .as_str()
            .ok_or_else(|| fixtura_core::Error::mismatch(name, "string", value.kind()).into())
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, FactoryError> {
        let value = self.get(name)?;
        value
            .as_i64()
            .ok_or_else(|| fixtura_core::Error::mismatch(name, "int", value.kind()).into())
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, FactoryError> {
        let value = self.get(name)?;
        value
            .as_f64()
            .ok_or_else(|| fixtura_core::Error::mismatch(name, "float", value.kind()).into())
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, FactoryError> {
        let value = self.get(name)?;
        value
            .as_bool()
            .ok_or_else(|| fixtura_core::Error::mismatch(name, "bool", value.kind()).into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_record_reports_missing_fields() {
        let mut fields = FieldMap::new();
        fields.insert("age".to_string(), Value::Int(30));
        let record = PartialRecord::new(&fields);

        assert_eq!(record.get_i64("age").expect("age"), 30);
        let err = record.get("name").expect_err("missing");
        assert_eq!(err.to_string(), "field 'name' not yet resolved or does not exist");
        assert!(matches!(
            record.get_str("age"),
            Err(FactoryError::Construct(fixtura_core::Error::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn cloned_fields_share_the_descriptor() {
        let field = sequence::seq();
        let clone = field.clone();
        assert!(field.ptr_eq(&clone));
        assert!(!field.ptr_eq(&sequence::seq()));
    }
}
