use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use fixtura_core::{Shaped, TargetShape, validate_shape};

use crate::engine::ModelDefinition;
use crate::errors::FactoryError;
use crate::faker_rs::{FakeProvider, FakeRsAdapter, LocaleKey};
use crate::generators::Field;
use crate::generators::semantic::auto;
use crate::model::{FactoryConfig, default_config};

/// Ordered field declarations of a model.
pub type Declarations = IndexMap<String, Field>;

/// Declaration of a model before it is merged and frozen.
///
/// Parents added with [`ModelSpec::extends`] contribute their own merged
/// chain; parents added later are less specific than earlier ones, and the
/// model's own fields override all of them.
#[derive(Clone)]
pub struct ModelSpec {
    name: String,
    shape: Option<TargetShape>,
    parents: Vec<ModelSpec>,
    fields: Declarations,
    seed: Option<u64>,
    locale: Option<LocaleKey>,
    provider: Option<Arc<dyn FakeProvider>>,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: None,
            parents: Vec::new(),
            fields: Declarations::new(),
            seed: None,
            locale: None,
            provider: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds instances shaped like `T`.
    pub fn shape<T: Shaped>(self) -> Self {
        self.with_shape(T::target_shape())
    }

    pub fn with_shape(mut self, shape: TargetShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn extends(mut self, parent: &ModelSpec) -> Self {
        self.parents.push(parent.clone());
        self
    }

    /// Declares a field. Re-declaring a name keeps its position and replaces
    /// its descriptor.
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn locale(mut self, locale: LocaleKey) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn config(mut self, config: FactoryConfig) -> Self {
        self.seed = config.seed.or(self.seed);
        self.locale = Some(config.locale);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn FakeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Shape declared here or, failing that, by the nearest parent.
    pub fn resolved_shape(&self) -> Option<TargetShape> {
        self.shape
            .clone()
            .or_else(|| self.parents.iter().find_map(ModelSpec::resolved_shape))
    }

    /// Seed declared here or by the nearest parent.
    pub fn resolved_seed(&self) -> Option<u64> {
        self.seed
            .or_else(|| self.parents.iter().find_map(ModelSpec::resolved_seed))
    }

    pub fn resolved_locale(&self) -> Option<LocaleKey> {
        self.locale
            .or_else(|| self.parents.iter().find_map(ModelSpec::resolved_locale))
    }

    fn resolved_provider(&self) -> Option<Arc<dyn FakeProvider>> {
        self.provider
            .clone()
            .or_else(|| self.parents.iter().find_map(ModelSpec::resolved_provider))
    }

    /// Explicit declarations of the whole inheritance chain, without
    /// inferred entries.
    pub fn declared_fields(&self) -> Declarations {
        let mut merged = Declarations::new();
        for parent in self.parents.iter().rev() {
            for (name, field) in parent.declared_fields() {
                merged.insert(name, field);
            }
        }
        for (name, field) in &self.fields {
            merged.insert(name.clone(), field.clone());
        }
        merged
    }

    /// Merges the chain and synthesizes inferred entries for undeclared
    /// record fields.
    pub fn merge(&self) -> Result<(TargetShape, Declarations), FactoryError> {
        let shape = self.resolved_shape().unwrap_or(TargetShape::Map);
        if let TargetShape::Opaque { name } = &shape {
            return Err(FactoryError::UnsupportedShape {
                shape: name.clone(),
            });
        }
        validate_shape(&shape).map_err(|err| FactoryError::InvalidDeclaration(err.to_string()))?;

        let mut declarations = self.declared_fields();
        if let Some(record) = shape.record() {
            for (name, field) in &declarations {
                if record.get(name).is_none() && !field.is_excluded() {
                    warn!(
                        model = %self.name,
                        field = %name,
                        record = %record.name,
                        "declared field is not part of the record shape"
                    );
                }
            }
            for shape_field in &record.fields {
                if !declarations.contains_key(&shape_field.name) {
                    declarations.insert(
                        shape_field.name.clone(),
                        auto(shape_field.name.clone(), shape_field.field_type.clone()),
                    );
                }
            }
        }
        Ok((shape, declarations))
    }

    /// Merges once and freezes the result into a shareable definition.
    pub fn define(self) -> Result<Arc<ModelDefinition>, FactoryError> {
        let (shape, declarations) = self.merge()?;
        let defaults = default_config()?;
        let seed = match self.resolved_seed().or(defaults.seed) {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                debug!(model = %self.name, seed, "no seed configured; drew a random one");
                seed
            }
        };
        let locale = self.resolved_locale().unwrap_or(defaults.locale);
        let provider = self
            .resolved_provider()
            .unwrap_or_else(|| Arc::new(FakeRsAdapter));

        debug!(
            model = %self.name,
            shape = %shape.name(),
            fields = declarations.len(),
            seed,
            locale = %locale,
            "model defined"
        );
        Ok(Arc::new(ModelDefinition::new(
            self.name,
            shape,
            declarations,
            seed,
            locale,
            provider,
        )))
    }
}
