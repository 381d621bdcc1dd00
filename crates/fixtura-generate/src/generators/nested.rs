use std::fmt;
use std::sync::Arc;

use fixtura_core::{FieldMap, Value};

use crate::engine::ModelDefinition;
use crate::errors::FactoryError;
use crate::generators::{Descriptor, Field, ResolveContext};

type ModelLookup = dyn Fn() -> Result<Arc<ModelDefinition>, FactoryError> + Send + Sync;

/// Reference to the model a nested field is built from.
#[derive(Clone)]
pub enum ModelRef {
    Direct(Arc<ModelDefinition>),
    /// Looked up at resolve time so models may refer to each other.
    Lazy { name: String, lookup: Arc<ModelLookup> },
}

impl ModelRef {
    pub fn lazy<F>(name: impl Into<String>, lookup: F) -> Self
    where
        F: Fn() -> Result<Arc<ModelDefinition>, FactoryError> + Send + Sync + 'static,
    {
        ModelRef::Lazy {
            name: name.into(),
            lookup: Arc::new(lookup),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ModelRef::Direct(model) => model.name(),
            ModelRef::Lazy { name, .. } => name,
        }
    }

    pub fn get(&self) -> Result<Arc<ModelDefinition>, FactoryError> {
        match self {
            ModelRef::Direct(model) => Ok(Arc::clone(model)),
            ModelRef::Lazy { lookup, .. } => lookup(),
        }
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelRef").field(&self.name()).finish()
    }
}

impl From<Arc<ModelDefinition>> for ModelRef {
    fn from(model: Arc<ModelDefinition>) -> Self {
        ModelRef::Direct(model)
    }
}

impl From<&Arc<ModelDefinition>> for ModelRef {
    fn from(model: &Arc<ModelDefinition>) -> Self {
        ModelRef::Direct(Arc::clone(model))
    }
}

/// Nested record rebuilt from `model` on every parent resolution.
pub fn sub(model: impl Into<ModelRef>, overrides: FieldMap) -> Field {
    Field::new(SubRecordDescriptor {
        model: model.into(),
        overrides,
    })
}

/// Nested record whose model is produced by `lookup` at resolve time.
pub fn sub_lazy<F>(name: impl Into<String>, lookup: F, overrides: FieldMap) -> Field
where
    F: Fn() -> Arc<ModelDefinition> + Send + Sync + 'static,
{
    sub(ModelRef::lazy(name, move || Ok(lookup())), overrides)
}

/// List of `count` nested records built from `model`.
pub fn sub_list(model: impl Into<ModelRef>, count: usize, overrides: FieldMap) -> Field {
    Field::new(SubRecordListDescriptor {
        model: model.into(),
        count,
        overrides,
    })
}

struct SubRecordDescriptor {
    model: ModelRef,
    overrides: FieldMap,
}

impl Descriptor for SubRecordDescriptor {
    fn label(&self) -> String {
        format!("sub({})", self.model.name())
    }

    fn resolve(&self, _ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        let model = self.model.get()?;
        Ok(Value::Map(model.build(&self.overrides)?))
    }
}

struct SubRecordListDescriptor {
    model: ModelRef,
    count: usize,
    overrides: FieldMap,
}

impl Descriptor for SubRecordListDescriptor {
    fn label(&self) -> String {
        format!("sub_list({}, {})", self.model.name(), self.count)
    }

    fn resolve(&self, _ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        let model = self.model.get()?;
        let records = model.build_batch(self.count, &self.overrides)?;
        Ok(Value::List(records.into_iter().map(Value::Map).collect()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::declarations::ModelSpec;

    #[test]
    fn lazy_references_resolve_models_defined_later() {
        let owner_slot: Arc<OnceLock<Arc<ModelDefinition>>> = Arc::new(OnceLock::new());
        let slot = Arc::clone(&owner_slot);
        let pet = ModelSpec::new("Pet")
            .field("name", "Rex")
            .field(
                "owner",
                sub_lazy(
                    "Owner",
                    move || Arc::clone(slot.get().expect("owner defined")),
                    FieldMap::new(),
                ),
            )
            .define()
            .expect("define pet");
        assert_eq!(format!("{:?}", pet.declarations()["owner"]), "Field(\"sub(Owner)\")");

        let owner = ModelSpec::new("Owner")
            .field("name", "Ada")
            .define()
            .expect("define owner");
        assert!(owner_slot.set(owner).is_ok());

        let record = pet.build(&FieldMap::new()).expect("build pet");
        let owner = record["owner"].as_map().expect("owner map");
        assert_eq!(owner.get("name"), Some(&Value::from("Ada")));
    }

    #[test]
    fn failed_lookups_surface_at_build_time() {
        let field = sub(
            ModelRef::lazy("Missing", || Err(FactoryError::UnknownModel("Missing".into()))),
            FieldMap::new(),
        );
        let model = ModelSpec::new("Holder")
            .field("inner", field)
            .define()
            .expect("define");
        assert!(matches!(
            model.build(&FieldMap::new()),
            Err(FactoryError::UnknownModel(name)) if name == "Missing"
        ));
    }
}
