use std::fmt;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use fixtura_core::{AssignField, FieldMap, FromFields, fields_to_jsonable};

use crate::engine::ModelDefinition;
use crate::errors::FactoryError;

type BuildFn<T> = dyn Fn(FieldMap) -> Result<T, FactoryError> + Send + Sync;

/// Turns a resolved record into an instance of `T`.
pub struct BuildStrategy<T> {
    name: &'static str,
    build: Arc<BuildFn<T>>,
}

impl<T> Clone for BuildStrategy<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> fmt::Debug for BuildStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BuildStrategy").field(&self.name).finish()
    }
}

impl<T: 'static> BuildStrategy<T> {
    /// Keyword construction through [`FromFields`].
    pub fn construct() -> Self
    where
        T: FromFields,
    {
        Self {
            name: "construct",
            build: Arc::new(|fields| Ok(T::from_fields(fields)?)),
        }
    }

    /// Field-by-field assignment onto `T::default()`.
    pub fn assign() -> Self
    where
        T: Default + AssignField,
    {
        Self {
            name: "assign",
            build: Arc::new(|fields| {
                let mut instance = T::default();
                for (name, value) in fields {
                    instance.assign_field(&name, value)?;
                }
                Ok(instance)
            }),
        }
    }

    /// Serde construction from the JSON view of the record.
    pub fn deserialize() -> Self
    where
        T: DeserializeOwned,
    {
        Self {
            name: "deserialize",
            build: Arc::new(|fields| Ok(serde_json::from_value(fields_to_jsonable(&fields))?)),
        }
    }

    pub fn custom<F>(build: F) -> Self
    where
        F: Fn(FieldMap) -> Result<T, FactoryError> + Send + Sync + 'static,
    {
        Self {
            name: "custom",
            build: Arc::new(build),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, fields: FieldMap) -> Result<T, FactoryError> {
        (self.build)(fields)
    }
}

/// Stores built instances somewhere and hands back the stored form.
pub trait Persist<T>: Send + Sync {
    fn persist(&self, instance: T) -> Result<T, FactoryError>;
}

/// Refuses every instance; for factories that must never write.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingPersist;

impl<T> Persist<T> for RejectingPersist {
    fn persist(&self, _instance: T) -> Result<T, FactoryError> {
        Err(FactoryError::Persistence(
            "this factory does not support persistence".to_string(),
        ))
    }
}

/// Keeps a copy of every persisted instance in memory.
#[derive(Debug, Default)]
pub struct InMemoryPersist<T> {
    stored: Mutex<Vec<T>>,
}

impl<T: Clone> InMemoryPersist<T> {
    pub fn new() -> Self {
        Self {
            stored: Mutex::new(Vec::new()),
        }
    }

    pub fn stored(&self) -> Result<Vec<T>, FactoryError> {
        self.stored
            .lock()
            .map(|stored| stored.clone())
            .map_err(|_| FactoryError::Poisoned("in-memory store"))
    }
}

impl<T: Clone + Send> Persist<T> for InMemoryPersist<T> {
    fn persist(&self, instance: T) -> Result<T, FactoryError> {
        let mut stored = self
            .stored
            .lock()
            .map_err(|_| FactoryError::Poisoned("in-memory store"))?;
        stored.push(instance.clone());
        Ok(instance)
    }
}

/// Typed front end over a [`ModelDefinition`].
pub struct Factory<T> {
    model: Arc<ModelDefinition>,
    strategy: BuildStrategy<T>,
    persist: Arc<dyn Persist<T>>,
}

impl<T: 'static> Factory<T> {
    pub fn new(model: Arc<ModelDefinition>, strategy: BuildStrategy<T>) -> Self {
        Self {
            model,
            strategy,
            persist: Arc::new(RejectingPersist),
        }
    }

    pub fn with_persist(mut self, persist: Arc<dyn Persist<T>>) -> Self {
        self.persist = persist;
        self
    }

    pub fn model(&self) -> &Arc<ModelDefinition> {
        &self.model
    }

    pub fn strategy(&self) -> &BuildStrategy<T> {
        &self.strategy
    }

    pub fn build(&self, overrides: &FieldMap) -> Result<T, FactoryError> {
        let fields = self.model.build(overrides)?;
        self.strategy.apply(fields)
    }

    pub fn build_batch(&self, count: usize, overrides: &FieldMap) -> Result<Vec<T>, FactoryError> {
        (0..count).map(|_| self.build(overrides)).collect()
    }

    pub fn to_map(&self, overrides: &FieldMap) -> Result<FieldMap, FactoryError> {
        self.model.to_map(overrides)
    }

    pub fn to_jsonable(&self, overrides: &FieldMap) -> Result<JsonValue, FactoryError> {
        self.model.to_jsonable(overrides)
    }

    /// Builds one instance and passes it through the persistence hook.
    pub fn create(&self, overrides: &FieldMap) -> Result<T, FactoryError> {
        let instance = self.build(overrides)?;
        debug!(
            model = %self.model.name(),
            strategy = self.strategy.name(),
            "persisting instance"
        );
        self.persist.persist(instance)
    }

    pub fn create_batch(&self, count: usize, overrides: &FieldMap) -> Result<Vec<T>, FactoryError> {
        (0..count).map(|_| self.create(overrides)).collect()
    }
}

impl Factory<FieldMap> {
    /// Factory whose instances are the resolved maps themselves.
    pub fn maps(model: Arc<ModelDefinition>) -> Self {
        Factory::new(model, BuildStrategy::custom(Ok))
    }
}

impl<T> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("model", &self.model.name())
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
