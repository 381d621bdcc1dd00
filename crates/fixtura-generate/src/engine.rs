use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value as JsonValue;
use tracing::{debug, info, trace};

use fixtura_core::{FieldMap, TargetShape, fields_to_jsonable};

use crate::declarations::Declarations;
use crate::errors::FactoryError;
use crate::faker_rs::{FakeProvider, LocaleKey};
use crate::generators::{DescriptorKind, Field, ResolveContext};
use crate::model::{BuildReport, FactoryConfig};

/// Step of the field resolution algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPhase {
    Eager,
    Overrides,
    Deferred,
    Complete,
}

impl fmt::Display for ResolutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionPhase::Eager => "eager",
            ResolutionPhase::Overrides => "overrides",
            ResolutionPhase::Deferred => "deferred",
            ResolutionPhase::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Frozen, merged model: the shape it targets, its ordered declarations and
/// the random source they draw from.
pub struct ModelDefinition {
    name: String,
    shape: TargetShape,
    declarations: Declarations,
    seed: u64,
    locale: LocaleKey,
    rng: Mutex<ChaCha8Rng>,
    provider: Arc<dyn FakeProvider>,
}

impl ModelDefinition {
    pub(crate) fn new(
        name: String,
        shape: TargetShape,
        declarations: Declarations,
        seed: u64,
        locale: LocaleKey,
        provider: Arc<dyn FakeProvider>,
    ) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(hash_seed(seed, &name));
        Self {
            name,
            shape,
            declarations,
            seed,
            locale,
            rng: Mutex::new(rng),
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &TargetShape {
        &self.shape
    }

    /// Merged declarations, inferred entries included, in resolution order.
    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.declarations.get(name)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn locale(&self) -> LocaleKey {
        self.locale
    }

    pub fn config(&self) -> FactoryConfig {
        FactoryConfig::new()
            .with_seed(self.seed)
            .with_locale(self.locale)
    }

    pub fn provider(&self) -> &dyn FakeProvider {
        self.provider.as_ref()
    }

    pub(crate) fn lock_rng(&self) -> Result<MutexGuard<'_, ChaCha8Rng>, FactoryError> {
        self.rng
            .lock()
            .map_err(|_| FactoryError::Poisoned("model random source"))
    }

    /// Rewinds every sequence declared on this model.
    pub fn reset_sequences(&self) {
        for field in self.declarations.values() {
            field.reset_sequence();
        }
    }

    /// Restarts the random source from `seed`.
    pub fn reseed(&self, seed: u64) -> Result<(), FactoryError> {
        let mut rng = self.lock_rng()?;
        *rng = ChaCha8Rng::seed_from_u64(hash_seed(seed, &self.name));
        debug!(model = %self.name, seed, "model reseeded");
        Ok(())
    }

    /// Resolves one record.
    ///
    /// Eager declarations resolve first in declaration order, then overrides
    /// are applied, then deferred declarations resolve seeing everything
    /// before them. Excluded names never reach the record, even when an
    /// override supplies them.
    pub fn build(&self, overrides: &FieldMap) -> Result<FieldMap, FactoryError> {
        let mut record = FieldMap::with_capacity(self.declarations.len() + overrides.len());

        self.trace_phase(ResolutionPhase::Eager);
        for (name, field) in &self.declarations {
            if field.kind() != DescriptorKind::Eager || overrides.contains_key(name) {
                continue;
            }
            let value = field.resolve(&ResolveContext::new(self, &record, name))?;
            record.insert(name.clone(), value);
        }

        self.trace_phase(ResolutionPhase::Overrides);
        for (name, value) in overrides {
            if self.is_excluded(name) {
                trace!(model = %self.name, field = %name, "override for excluded field dropped");
                continue;
            }
            record.insert(name.clone(), value.clone());
        }

        self.trace_phase(ResolutionPhase::Deferred);
        for (name, field) in &self.declarations {
            if field.kind() != DescriptorKind::Deferred || overrides.contains_key(name) {
                continue;
            }
            let value = field.resolve(&ResolveContext::new(self, &record, name))?;
            record.insert(name.clone(), value);
        }

        self.trace_phase(ResolutionPhase::Complete);
        Ok(record)
    }

    /// Runs [`ModelDefinition::build`] `count` times with the same overrides.
    pub fn build_batch(
        &self,
        count: usize,
        overrides: &FieldMap,
    ) -> Result<Vec<FieldMap>, FactoryError> {
        (0..count).map(|_| self.build(overrides)).collect()
    }

    /// Like [`ModelDefinition::build_batch`], also reporting timing.
    pub fn build_batch_reported(
        &self,
        count: usize,
        overrides: &FieldMap,
    ) -> Result<(Vec<FieldMap>, BuildReport), FactoryError> {
        let start = Instant::now();
        let records = self.build_batch(count, overrides)?;
        let report = BuildReport {
            model: self.name.clone(),
            records: records.len() as u64,
            seed: self.seed,
            locale: self.locale,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            model = %report.model,
            records = report.records,
            duration_ms = report.duration_ms,
            "batch built"
        );
        Ok((records, report))
    }

    /// Resolved record as a plain map; no shape construction happens.
    pub fn to_map(&self, overrides: &FieldMap) -> Result<FieldMap, FactoryError> {
        self.build(overrides)
    }

    /// Resolved record with every leaf converted to a JSON primitive.
    pub fn to_jsonable(&self, overrides: &FieldMap) -> Result<JsonValue, FactoryError> {
        Ok(fields_to_jsonable(&self.build(overrides)?))
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.declarations
            .get(name)
            .is_some_and(Field::is_excluded)
    }

    fn trace_phase(&self, phase: ResolutionPhase) {
        trace!(model = %self.name, phase = %phase, "resolution phase");
    }
}

impl fmt::Debug for ModelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDefinition")
            .field("name", &self.name)
            .field("shape", &self.shape.name())
            .field("declarations", &self.declarations)
            .field("seed", &self.seed)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use fixtura_core::Value;
    use crate::declarations::ModelSpec;
    use crate::generators::basic::exclude;
    use crate::generators::derive::lazy;
    use crate::generators::primitives;
    use crate::generators::sequence::seq_from;

    fn overrides(pairs: &[(&str, Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn hash_seed_is_stable() {
        assert_eq!(hash_seed(42, "User"), hash_seed(42, "User"));
        assert_ne!(hash_seed(42, "User"), hash_seed(42, "Order"));
    }

    #[test]
    fn overrides_skip_eager_resolution() {
        let model = ModelSpec::new("Counter")
            .field("id", seq_from(1))
            .seed(1)
            .define()
            .expect("define");

        let first = model
            .build(&overrides(&[("id", Value::Int(99))]))
            .expect("build");
        assert_eq!(first["id"], Value::Int(99));
        let second = model.build(&FieldMap::new()).expect("build");
        assert_eq!(second["id"], Value::Int(1));
    }

    #[test]
    fn deferred_fields_see_overrides() {
        let model = ModelSpec::new("Greeting")
            .field("name", "Ada")
            .field(
                "greeting",
                lazy(|record| Ok(format!("hi {}", record.get_str("name")?))),
            )
            .seed(1)
            .define()
            .expect("define");

        let record = model
            .build(&overrides(&[("name", Value::from("Grace"))]))
            .expect("build");
        assert_eq!(record["greeting"], Value::from("hi Grace"));
    }

    #[test]
    fn overridden_deferred_fields_are_never_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let model = ModelSpec::new("Lazy")
            .field(
                "a",
                lazy(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok("computed")
                }),
            )
            .field("b", lazy(|record| Ok(format!("{}!", record.get_str("a")?))))
            .seed(1)
            .define()
            .expect("define");

        let record = model
            .build(&overrides(&[("a", Value::from("over"))]))
            .expect("build");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(record["b"], Value::from("over!"));

        let record = model.build(&FieldMap::new()).expect("build");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(record["b"], Value::from("computed!"));
    }

    #[test]
    fn deferred_fields_cannot_read_later_deferred_fields() {
        let model = ModelSpec::new("Backwards")
            .field("b", lazy(|record| Ok(format!("{}!", record.get_str("a")?))))
            .field("a", lazy(|_| Ok("late")))
            .seed(1)
            .define()
            .expect("define");

        let result = model.build(&FieldMap::new());
        assert!(matches!(
            result,
            Err(FactoryError::NotResolved { ref field }) if field == "a"
        ));
    }

    #[test]
    fn excluded_wins_over_override() {
        let model = ModelSpec::new("Secretive")
            .field("visible", 1)
            .field("hidden", exclude())
            .seed(1)
            .define()
            .expect("define");

        let record = model
            .build(&overrides(&[("hidden", Value::Int(5))]))
            .expect("build");
        assert!(!record.contains_key("hidden"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn unknown_override_names_are_appended() {
        let model = ModelSpec::new("Open")
            .field("a", 1)
            .seed(1)
            .define()
            .expect("define");
        let record = model
            .build(&overrides(&[("extra", Value::Bool(true))]))
            .expect("build");
        let names: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "extra"]);
    }

    #[test]
    fn reseeding_replays_draws() {
        let model = ModelSpec::new("Dice")
            .field("roll", primitives::int(1, 1_000_000))
            .seed(7)
            .define()
            .expect("define");
        let first = model.build(&FieldMap::new()).expect("build");
        model.reseed(7).expect("reseed");
        let replay = model.build(&FieldMap::new()).expect("build");
        assert_eq!(first, replay);
    }
}
