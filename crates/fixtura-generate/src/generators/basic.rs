use fixtura_core::{FieldMap, Value};

use crate::errors::FactoryError;
use crate::generators::{Descriptor, DescriptorKind, Field, ResolveContext};

type InvokeFn = dyn Fn(&[Value], &FieldMap) -> Result<Value, FactoryError> + Send + Sync;

/// Fixed value, cloned into every record.
pub fn constant(value: impl Into<Value>) -> Field {
    Field::new(ConstantDescriptor {
        value: value.into(),
    })
}

/// Calls `func` afresh on every resolution.
pub fn call<F, V>(func: F) -> Field
where
    F: Fn() -> V + Send + Sync + 'static,
    V: Into<Value>,
{
    Field::new(InvokeDescriptor {
        func: Box::new(move |_: &[Value], _: &FieldMap| Ok(func().into())),
        args: Vec::new(),
        kwargs: FieldMap::new(),
    })
}

/// Calls `func` with fixed positional and keyword arguments on every resolution.
pub fn call_with<F>(func: F, args: Vec<Value>, kwargs: FieldMap) -> Field
where
    F: Fn(&[Value], &FieldMap) -> Result<Value, FactoryError> + Send + Sync + 'static,
{
    Field::new(InvokeDescriptor {
        func: Box::new(func),
        args,
        kwargs,
    })
}

/// Marks a field as never present in built records, even when overridden.
pub fn exclude() -> Field {
    Field::new(ExcludedDescriptor)
}

struct ConstantDescriptor {
    value: Value,
}

impl Descriptor for ConstantDescriptor {
    fn label(&self) -> String {
        format!("const({})", self.value.to_display_string())
    }

    fn resolve(&self, _ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        Ok(self.value.clone())
    }
}

struct InvokeDescriptor {
    func: Box<InvokeFn>,
    args: Vec<Value>,
    kwargs: FieldMap,
}

impl Descriptor for InvokeDescriptor {
    fn label(&self) -> String {
        format!("call({} args, {} kwargs)", self.args.len(), self.kwargs.len())
    }

    fn resolve(&self, _ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        (self.func)(&self.args, &self.kwargs)
    }
}

struct ExcludedDescriptor;

impl Descriptor for ExcludedDescriptor {
    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Excluded
    }

    fn label(&self) -> String {
        "exclude".to_string()
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        Err(FactoryError::ExcludedResolved {
            field: ctx.field().to_string(),
        })
    }
}
