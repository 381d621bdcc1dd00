//! Compiles plan documents into model definitions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, Weak};

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use fixtura_core::{FieldMap, Value, from_json};
use fixtura_plan::{FieldKeyword, FieldRule, ModelPlan, Plan, SeqSpec, Vocabulary};

use crate::declarations::ModelSpec;
use crate::engine::ModelDefinition;
use crate::errors::FactoryError;
use crate::faker_rs::{FakeOp, LocaleKey};
use crate::generators::basic::{constant, exclude};
use crate::generators::derive::{email_from, template};
use crate::generators::faker_rs::fake_id;
use crate::generators::nested::{ModelRef, sub, sub_list};
use crate::generators::primitives as random;
use crate::generators::Field;
use crate::generators::sequence::Sequence;
use crate::params::{ParamKind, ParamSpec, validate_params};

const DEFAULT_INT_MIN: i64 = 0;
const DEFAULT_INT_MAX: i64 = 10_000;
const DEFAULT_EMAIL_DOMAIN: &str = "example.com";
const DEFAULT_DATE_SPAN_DAYS: i64 = 365;

/// Facade generator ids accepted by `gen` rules.
pub const GENERATOR_IDS: &[&str] = &[
    "random.int",
    "random.float",
    "random.decimal",
    "random.normal",
    "random.string",
    "random.alphanumeric",
    "random.bytes",
    "random.bool",
    "random.choice",
    "random.sample",
    "random.choices",
    "random.uuid4",
    "random.pattern",
    "random.date",
    "random.datetime",
    "derive.email_from",
];

const INT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Int, false),
    ParamSpec::new("max", ParamKind::Int, false),
];
const FLOAT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
];
const DECIMAL_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
    ParamSpec::new("places", ParamKind::Int, false),
];
const NORMAL_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("mean", ParamKind::Float, false),
    ParamSpec::new("stdev", ParamKind::Float, true),
];
const STRING_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("length", ParamKind::Int, true),
    ParamSpec::new("alphabet", ParamKind::String, false),
];
const LENGTH_PARAMS: &[ParamSpec] = &[ParamSpec::new("length", ParamKind::Int, true)];
const BYTES_PARAMS: &[ParamSpec] = &[ParamSpec::new("n", ParamKind::Int, true)];
const CHOICE_PARAMS: &[ParamSpec] = &[ParamSpec::new("items", ParamKind::Array, true)];
const SAMPLE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("items", ParamKind::Array, true),
    ParamSpec::new("k", ParamKind::Int, true),
];
const CHOICES_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("items", ParamKind::Array, true),
    ParamSpec::new("k", ParamKind::Int, true),
    ParamSpec::new("weights", ParamKind::FloatList, false),
];
const PATTERN_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("pattern", ParamKind::Pattern, true),
    ParamSpec::new("max_repeat", ParamKind::Int, false),
];
const DATE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Date, false),
    ParamSpec::new("max", ParamKind::Date, false),
];
const DATETIME_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Timestamp, false),
    ParamSpec::new("max", ParamKind::Timestamp, false),
];
const EMAIL_FROM_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("fields", ParamKind::StringList, true),
    ParamSpec::new("domain", ParamKind::String, false),
];

/// Ids and locales plans compiled by this crate may use.
pub fn vocabulary() -> Vocabulary {
    Vocabulary {
        generators: GENERATOR_IDS.iter().map(|id| id.to_string()).collect(),
        providers: FakeOp::ALL_IDS.iter().map(|id| id.to_string()).collect(),
        locales: LocaleKey::SPELLINGS
            .iter()
            .map(|id| id.to_string())
            .collect(),
    }
}

/// Settings applied on top of what a plan declares.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Replaces every model's seed.
    pub seed: Option<u64>,
    /// Replaces every model's locale.
    pub locale: Option<LocaleKey>,
}

type ModelTable = IndexMap<String, Arc<ModelDefinition>>;

/// Models compiled from one plan, addressable by name.
///
/// Nested rules look their model up through the registry at resolve time,
/// so models may refer to each other in any order.
pub struct PlanRegistry {
    models: Arc<OnceLock<ModelTable>>,
}

impl PlanRegistry {
    pub fn compile(plan: &Plan, options: CompileOptions) -> Result<Self, FactoryError> {
        let models = Arc::new(OnceLock::new());
        let mut compiler = Compiler {
            plan,
            options,
            table: Arc::downgrade(&models),
            index: HashMap::new(),
            specs: HashMap::new(),
            visiting: HashSet::new(),
        };
        for (idx, model) in plan.models.iter().enumerate() {
            if compiler.index.insert(model.name.as_str(), idx).is_some() {
                return Err(FactoryError::InvalidDeclaration(format!(
                    "model '{}' is declared more than once",
                    model.name
                )));
            }
        }

        let mut table = ModelTable::new();
        for model in &plan.models {
            let spec = compiler.spec(&model.name)?;
            table.insert(model.name.clone(), spec.define()?);
        }
        info!(models = table.len(), "plan compiled");

        models
            .set(table)
            .map_err(|_| FactoryError::InvalidDeclaration("plan compiled twice".to_string()))?;
        Ok(Self { models })
    }

    pub fn model(&self, name: &str) -> Result<Arc<ModelDefinition>, FactoryError> {
        lookup(self.models.get(), name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models
            .get()
            .into_iter()
            .flat_map(|table| table.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.models.get().map_or(0, IndexMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lookup(table: Option<&ModelTable>, name: &str) -> Result<Arc<ModelDefinition>, FactoryError> {
    table
        .and_then(|table| table.get(name))
        .cloned()
        .ok_or_else(|| FactoryError::UnknownModel(name.to_string()))
}

struct Compiler<'p> {
    plan: &'p Plan,
    options: CompileOptions,
    table: Weak<OnceLock<ModelTable>>,
    index: HashMap<&'p str, usize>,
    specs: HashMap<String, ModelSpec>,
    visiting: HashSet<String>,
}

impl<'p> Compiler<'p> {
    fn spec(&mut self, name: &str) -> Result<ModelSpec, FactoryError> {
        if let Some(spec) = self.specs.get(name) {
            return Ok(spec.clone());
        }
        if !self.visiting.insert(name.to_string()) {
            return Err(FactoryError::InvalidDeclaration(format!(
                "model '{name}' is part of an inheritance cycle"
            )));
        }
        let model = self.model_plan(name)?;

        let mut spec = ModelSpec::new(name);
        for parent in &model.extends {
            let parent = self.spec(parent)?;
            spec = spec.extends(&parent);
        }
        if let Some(shape) = &model.shape {
            spec = spec.with_shape(shape.target_shape(name));
        }
        for (field_name, rule) in &model.fields {
            let field = self.field(model, field_name, rule)?;
            spec = spec.field(field_name.clone(), field);
        }
        spec = self.apply_settings(spec, model)?;

        debug!(model = %name, parents = model.extends.len(), "model spec compiled");
        self.visiting.remove(name);
        self.specs.insert(name.to_string(), spec.clone());
        Ok(spec)
    }

    fn model_plan(&self, name: &str) -> Result<&'p ModelPlan, FactoryError> {
        let plan: &'p Plan = self.plan;
        self.index
            .get(name)
            .map(|&idx| &plan.models[idx])
            .ok_or_else(|| FactoryError::UnknownModel(name.to_string()))
    }

    fn apply_settings(
        &self,
        mut spec: ModelSpec,
        model: &ModelPlan,
    ) -> Result<ModelSpec, FactoryError> {
        if let Some(seed) = self.options.seed.or(model.seed) {
            spec = spec.seed(seed);
        } else if spec.resolved_seed().is_none()
            && let Some(seed) = self.plan.seed
        {
            spec = spec.seed(seed);
        }

        if let Some(locale) = self.options.locale {
            spec = spec.locale(locale);
        } else if let Some(locale) = &model.locale {
            spec = spec.locale(locale.parse()?);
        } else if spec.resolved_locale().is_none()
            && let Some(locale) = &self.plan.locale
        {
            spec = spec.locale(locale.parse()?);
        }
        Ok(spec)
    }

    fn field(
        &self,
        model: &ModelPlan,
        name: &str,
        rule: &FieldRule,
    ) -> Result<Field, FactoryError> {
        let field = match rule {
            FieldRule::Keyword(FieldKeyword::Exclude) => exclude(),
            FieldRule::Const(rule) => constant(from_json(rule.value.clone())),
            FieldRule::Seq(rule) => compile_seq(&rule.seq)?,
            FieldRule::Gen(rule) => compile_gen(&rule.generator, rule.params.as_ref())?,
            FieldRule::Fake(rule) => fake_id(&rule.fake)?,
            FieldRule::Sub(rule) => sub(self.model_ref(&rule.sub)?, attrs(&rule.attrs)),
            FieldRule::SubList(rule) => {
                let count = usize::try_from(rule.count).map_err(|_| {
                    FactoryError::InvalidDeclaration(format!(
                        "{}.{name}: count {} is out of range",
                        model.name, rule.count
                    ))
                })?;
                sub_list(self.model_ref(&rule.sub_list)?, count, attrs(&rule.attrs))
            }
            FieldRule::Template(rule) => template(&rule.template)?,
        };
        Ok(field)
    }

    fn model_ref(&self, name: &str) -> Result<ModelRef, FactoryError> {
        if !self.index.contains_key(name) {
            return Err(FactoryError::UnknownModel(name.to_string()));
        }
        let table = self.table.clone();
        let target = name.to_string();
        Ok(ModelRef::lazy(name, move || {
            let table = table
                .upgrade()
                .ok_or_else(|| FactoryError::UnknownModel(target.clone()))?;
            lookup(table.get(), &target)
        }))
    }
}

fn attrs(map: &serde_json::Map<String, JsonValue>) -> FieldMap {
    map.iter()
        .map(|(name, value)| (name.clone(), from_json(value.clone())))
        .collect()
}

fn compile_seq(spec: &SeqSpec) -> Result<Field, FactoryError> {
    let mut sequence = Sequence::starting_at(spec.start.unwrap_or(1));
    if let Some(format) = &spec.format {
        sequence = sequence.format(format)?;
    }
    Ok(sequence.into_field())
}

/// Builds a facade descriptor from a generator id and its JSON params.
pub fn compile_gen(id: &str, params: Option<&JsonValue>) -> Result<Field, FactoryError> {
    let field = match id {
        "random.int" => {
            let p = validate_params(params, INT_PARAMS, id)?;
            random::int(
                p.get_i64("min").unwrap_or(DEFAULT_INT_MIN),
                p.get_i64("max").unwrap_or(DEFAULT_INT_MAX),
            )
        }
        "random.float" => {
            let p = validate_params(params, FLOAT_PARAMS, id)?;
            random::float(p.get_f64("min").unwrap_or(0.0), p.get_f64("max").unwrap_or(1.0))
        }
        "random.decimal" => {
            let p = validate_params(params, DECIMAL_PARAMS, id)?;
            let places = match p.get_i64("places") {
                None => 2,
                Some(places) => u32::try_from(places).map_err(|_| {
                    FactoryError::invalid(format!("{id}: places must be >= 0"))
                })?,
            };
            random::decimal(
                p.get_f64("min").unwrap_or(0.0),
                p.get_f64("max").unwrap_or(DEFAULT_INT_MAX as f64),
                places,
            )
        }
        "random.normal" => {
            let p = validate_params(params, NORMAL_PARAMS, id)?;
            random::normal(
                p.get_f64("mean").unwrap_or(0.0),
                p.get_f64("stdev").unwrap_or(1.0),
            )?
        }
        "random.string" => {
            let p = validate_params(params, STRING_PARAMS, id)?;
            let length = p.get_i64("length").unwrap_or(0);
            match p.get_str("alphabet") {
                Some(alphabet) => random::string(length, alphabet)?,
                None => random::alphanumeric(length)?,
            }
        }
        "random.alphanumeric" => {
            let p = validate_params(params, LENGTH_PARAMS, id)?;
            random::alphanumeric(p.get_i64("length").unwrap_or(0))?
        }
        "random.bytes" => {
            let p = validate_params(params, BYTES_PARAMS, id)?;
            random::bytes(p.get_i64("n").unwrap_or(0))?
        }
        "random.bool" => {
            validate_params(params, &[], id)?;
            random::bool()
        }
        "random.choice" => {
            let p = validate_params(params, CHOICE_PARAMS, id)?;
            random::choice(items(p.get_array("items")))
        }
        "random.sample" => {
            let p = validate_params(params, SAMPLE_PARAMS, id)?;
            random::sample(items(p.get_array("items")), count_param(p.get_i64("k"), id)?)
        }
        "random.choices" => {
            let p = validate_params(params, CHOICES_PARAMS, id)?;
            random::choices(
                items(p.get_array("items")),
                count_param(p.get_i64("k"), id)?,
                p.get_floats("weights"),
            )
        }
        "random.uuid4" => {
            validate_params(params, &[], id)?;
            random::uuid4()
        }
        "random.pattern" => {
            let p = validate_params(params, PATTERN_PARAMS, id)?;
            let pattern = p.get_str("pattern").unwrap_or_default();
            match p.get_u32("max_repeat") {
                Some(max_repeat) => random::pattern_with_repeat(pattern, max_repeat)?,
                None => random::pattern(pattern)?,
            }
        }
        "random.date" => {
            let p = validate_params(params, DATE_PARAMS, id)?;
            let min = p.get_date("min").unwrap_or_else(default_base_date);
            let max = p
                .get_date("max")
                .unwrap_or(min + Duration::days(DEFAULT_DATE_SPAN_DAYS));
            random::date_between(min, max)
        }
        "random.datetime" => {
            let p = validate_params(params, DATETIME_PARAMS, id)?;
            let min = p
                .get_timestamp("min")
                .unwrap_or_else(|| default_base_date().and_time(chrono::NaiveTime::MIN));
            let max = p
                .get_timestamp("max")
                .unwrap_or(min + Duration::days(DEFAULT_DATE_SPAN_DAYS));
            random::datetime_between(min, max)
        }
        "derive.email_from" => {
            let p = validate_params(params, EMAIL_FROM_PARAMS, id)?;
            email_from(
                p.get_strings("fields").unwrap_or_default(),
                p.get_str("domain").unwrap_or(DEFAULT_EMAIL_DOMAIN),
            )?
        }
        other => return Err(FactoryError::UnknownGenerator(other.to_string())),
    };
    Ok(field)
}

fn items(values: Option<&[JsonValue]>) -> Vec<Value> {
    values
        .unwrap_or_default()
        .iter()
        .cloned()
        .map(from_json)
        .collect()
}

fn count_param(value: Option<i64>, id: &str) -> Result<usize, FactoryError> {
    let value = value.unwrap_or(0);
    usize::try_from(value).map_err(|_| FactoryError::invalid(format!("{id}: k must be >= 0")))
}

fn default_base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}
