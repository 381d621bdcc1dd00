use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use fixtura_core::{RecordShape, ShapeField, TargetShape};

/// Declaration document: a set of models compiled together.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Plan contract version.
    pub plan_version: String,
    /// Default seed for models that declare none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Default locale (`en_US`, `pt_BR`) for models that declare none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Models in the document. Names must be unique.
    pub models: Vec<ModelPlan>,
}

impl Plan {
    pub fn model(&self, name: &str) -> Option<&ModelPlan> {
        self.models.iter().find(|model| model.name == name)
    }
}

/// A single model declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ModelPlan {
    pub name: String,
    /// Parent models, most specific first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    /// Shape built records follow. Inherited from parents when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Field declarations in resolution order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, FieldRule>,
}

/// Shape declaration of a model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ShapeSpec {
    /// `map` or `record`. Any other kind names an unsupported shape.
    pub kind: String,
    /// Record type name; defaults to the model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Typed record fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ShapeField>,
}

pub const SHAPE_KIND_MAP: &str = "map";
pub const SHAPE_KIND_RECORD: &str = "record";

impl ShapeSpec {
    pub fn target_shape(&self, model_name: &str) -> TargetShape {
        match self.kind.as_str() {
            SHAPE_KIND_MAP => TargetShape::Map,
            SHAPE_KIND_RECORD => TargetShape::Record(RecordShape {
                name: self
                    .name
                    .clone()
                    .unwrap_or_else(|| model_name.to_string()),
                fields: self.fields.clone(),
            }),
            other => TargetShape::Opaque {
                name: self.name.clone().unwrap_or_else(|| other.to_string()),
            },
        }
    }
}

/// How a field's value is produced.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldRule {
    Keyword(FieldKeyword),
    Const(ConstRule),
    Seq(SeqRule),
    Gen(GenRule),
    Fake(FakeRule),
    Sub(SubRule),
    SubList(SubListRule),
    Template(TemplateRule),
}

/// Bare-string field rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKeyword {
    /// Never present in built records.
    Exclude,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConstRule {
    #[serde(rename = "const")]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SeqRule {
    pub seq: SeqSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SeqSpec {
    /// First value; defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Template applied to each value, e.g. `user{:03}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GenRule {
    /// Facade generator id such as `random.int`.
    #[serde(rename = "gen")]
    pub generator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FakeRule {
    /// Provider operation id such as `person.first_name`.
    pub fake: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SubRule {
    /// Model the nested record is built from.
    pub sub: String,
    /// Overrides applied to the nested record.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SubListRule {
    pub sub_list: String,
    /// Number of nested records.
    pub count: u64,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TemplateRule {
    /// Interpolated over sibling fields, e.g. `{first_name} {last_name}`.
    pub template: String,
}

impl FieldRule {
    /// Model referenced by a nested rule.
    pub fn referenced_model(&self) -> Option<&str> {
        match self {
            FieldRule::Sub(rule) => Some(&rule.sub),
            FieldRule::SubList(rule) => Some(&rule.sub_list),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldRule::Keyword(FieldKeyword::Exclude) => "exclude",
            FieldRule::Const(_) => "const",
            FieldRule::Seq(_) => "seq",
            FieldRule::Gen(_) => "gen",
            FieldRule::Fake(_) => "fake",
            FieldRule::Sub(_) => "sub",
            FieldRule::SubList(_) => "sub_list",
            FieldRule::Template(_) => "template",
        }
    }
}
