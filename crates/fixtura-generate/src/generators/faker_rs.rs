use fixtura_core::Value;

use crate::errors::FactoryError;
use crate::faker_rs::FakeOp;
use crate::generators::{Descriptor, Field, ResolveContext};

/// Realistic value for `op`, drawn with the model's locale and random source.
pub fn fake(op: FakeOp) -> Field {
    Field::new(FakeDescriptor { op })
}

/// Like [`fake`], looking the operation up by its catalog id.
pub fn fake_id(id: &str) -> Result<Field, FactoryError> {
    Ok(fake(id.parse()?))
}

struct FakeDescriptor {
    op: FakeOp,
}

impl Descriptor for FakeDescriptor {
    fn label(&self) -> String {
        format!("fake({})", self.op)
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        ctx.produce(self.op)
    }
}
