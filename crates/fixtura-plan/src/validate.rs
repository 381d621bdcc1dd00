use std::collections::{HashMap, HashSet};

use jsonschema::JSONSchema;
use serde_json::Value;

use fixtura_core::validate_shape;

use crate::errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
use crate::model::{FieldKeyword, FieldRule, ModelPlan, Plan, SHAPE_KIND_MAP, SHAPE_KIND_RECORD};

/// Current plan contract version.
pub const PLAN_VERSION: &str = "0.1";

/// Identifiers a plan may refer to, supplied by the engine that compiles it.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// Facade generator ids usable in `gen` rules.
    pub generators: Vec<String>,
    /// Provider operation ids usable in `fake` rules.
    pub providers: Vec<String>,
    /// Accepted locale spellings.
    pub locales: Vec<String>,
}

/// Validated plan with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: Plan,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a plan JSON document against the plan JSON Schema.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Check references, inheritance and generator ids of a parsed plan.
pub fn validate_plan_semantics(plan: &Plan, vocabulary: &Vocabulary) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plan.plan_version != PLAN_VERSION {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "plan_version_mismatch",
            "/plan_version",
            format!(
                "plan_version '{}' is not supported (expected '{PLAN_VERSION}')",
                plan.plan_version
            ),
            Some(format!("set plan_version to \"{PLAN_VERSION}\"")),
        ));
    }

    if let Some(locale) = &plan.locale {
        validate_locale(locale, "/locale", vocabulary, &mut report);
    }

    if plan.models.is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "models_empty",
            "/models",
            "plan requires at least one model".to_string(),
            Some("declare at least one model".to_string()),
        ));
        return report;
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    for (idx, model) in plan.models.iter().enumerate() {
        if index.insert(model.name.as_str(), idx).is_some() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "duplicate_model",
                format!("/models/{idx}/name"),
                format!("model '{}' is declared more than once", model.name),
                Some("rename or merge the duplicate declarations".to_string()),
            ));
        }
    }

    for (idx, model) in plan.models.iter().enumerate() {
        let base_path = format!("/models/{idx}");
        validate_model(model, &base_path, &index, vocabulary, &mut report);
    }

    validate_extends_cycles(plan, &index, &mut report);

    report
}

/// Validate the plan end-to-end, returning structured issues on failure.
pub fn validate_plan(
    plan_json: &Value,
    plan_schema: &Value,
    vocabulary: &Vocabulary,
) -> Result<ValidatedPlan, ValidationReport> {
    let structural = match validate_plan_json(plan_json, plan_schema) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: Plan = match serde_json::from_value(plan_json.clone()) {
        Ok(plan) => plan,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_plan_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let semantic = validate_plan_semantics(&plan, vocabulary);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedPlan {
        plan,
        warnings: semantic.warnings,
    })
}

fn validate_model(
    model: &ModelPlan,
    base_path: &str,
    index: &HashMap<&str, usize>,
    vocabulary: &Vocabulary,
    report: &mut ValidationReport,
) {
    if model.name.trim().is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "model_name_empty",
            format!("{base_path}/name"),
            "model name cannot be empty".to_string(),
            None,
        ));
    }

    for (pos, parent) in model.extends.iter().enumerate() {
        if !index.contains_key(parent.as_str()) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "unknown_parent",
                format!("{base_path}/extends/{pos}"),
                format!("model '{}' extends unknown model '{parent}'", model.name),
                Some("declare the parent model in the same plan".to_string()),
            ));
        }
    }

    if let Some(locale) = &model.locale {
        validate_locale(locale, &format!("{base_path}/locale"), vocabulary, report);
    }

    let mut record_fields: Option<HashSet<&str>> = None;
    if let Some(shape) = &model.shape {
        let shape_path = format!("{base_path}/shape");
        match shape.kind.as_str() {
            SHAPE_KIND_MAP => {
                if !shape.fields.is_empty() {
                    report.push_warning(ValidationIssue::new(
                        IssueSeverity::Warning,
                        "shape_fields_ignored",
                        format!("{shape_path}/fields"),
                        "map shapes have no typed fields; the list is ignored".to_string(),
                        Some("use kind \"record\" to enable field inference".to_string()),
                    ));
                }
            }
            SHAPE_KIND_RECORD => {
                if let Err(err) = validate_shape(&shape.target_shape(&model.name)) {
                    report.push_error(ValidationIssue::new(
                        IssueSeverity::Error,
                        "invalid_shape",
                        shape_path.clone(),
                        err.to_string(),
                        None,
                    ));
                }
                record_fields = Some(shape.fields.iter().map(|f| f.name.as_str()).collect());
            }
            other => {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "unsupported_shape",
                    format!("{shape_path}/kind"),
                    format!("shape kind '{other}' is not supported"),
                    Some("use \"map\" or \"record\"".to_string()),
                ));
            }
        }
    }

    for (name, rule) in &model.fields {
        let field_path = format!("{base_path}/fields/{}", escape_pointer(name));
        validate_field(name, rule, &field_path, index, vocabulary, report);

        if let Some(record_fields) = &record_fields
            && !record_fields.contains(name.as_str())
            && !matches!(rule, FieldRule::Keyword(FieldKeyword::Exclude))
        {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "field_not_in_shape",
                field_path,
                format!("field '{name}' is not part of the record shape"),
                Some("add it to shape.fields or mark it \"exclude\"".to_string()),
            ));
        }
    }
}

fn validate_field(
    name: &str,
    rule: &FieldRule,
    field_path: &str,
    index: &HashMap<&str, usize>,
    vocabulary: &Vocabulary,
    report: &mut ValidationReport,
) {
    match rule {
        FieldRule::Gen(rule) => {
            if !vocabulary.generators.iter().any(|id| id == &rule.generator) {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "unknown_generator",
                    format!("{field_path}/gen"),
                    format!("field '{name}' uses unknown generator '{}'", rule.generator),
                    Some("run `fixtura generators` to list the available ids".to_string()),
                ));
            }
        }
        FieldRule::Fake(rule) => {
            if !vocabulary.providers.iter().any(|id| id == &rule.fake) {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "unknown_provider",
                    format!("{field_path}/fake"),
                    format!("field '{name}' uses unknown provider operation '{}'", rule.fake),
                    Some("run `fixtura generators` to list the available ids".to_string()),
                ));
            }
        }
        FieldRule::SubList(rule) if rule.count == 0 => {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "sub_list_empty",
                format!("{field_path}/count"),
                format!("field '{name}' always builds an empty list"),
                None,
            ));
        }
        _ => {}
    }

    if let Some(target) = rule.referenced_model()
        && !index.contains_key(target)
    {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "unknown_model",
            field_path.to_string(),
            format!("field '{name}' references unknown model '{target}'"),
            Some("declare the referenced model in the same plan".to_string()),
        ));
    }
}

fn validate_locale(locale: &str, path: &str, vocabulary: &Vocabulary, report: &mut ValidationReport) {
    if !vocabulary.locales.iter().any(|known| known == locale) {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "unknown_locale",
            path.to_string(),
            format!("locale '{locale}' is not supported"),
            Some(format!("use one of: {}", vocabulary.locales.join(", "))),
        ));
    }
}

fn validate_extends_cycles(
    plan: &Plan,
    index: &HashMap<&str, usize>,
    report: &mut ValidationReport,
) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        Visiting,
        Done,
    }

    fn visit(
        idx: usize,
        plan: &Plan,
        index: &HashMap<&str, usize>,
        marks: &mut [Mark],
        report: &mut ValidationReport,
    ) {
        marks[idx] = Mark::Visiting;
        for parent in &plan.models[idx].extends {
            let Some(&parent_idx) = index.get(parent.as_str()) else {
                continue;
            };
            match marks[parent_idx] {
                Mark::Unvisited => visit(parent_idx, plan, index, marks, report),
                Mark::Visiting => report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "extends_cycle",
                    format!("/models/{idx}/extends"),
                    format!(
                        "model '{}' is part of an inheritance cycle through '{parent}'",
                        plan.models[idx].name
                    ),
                    Some("remove one of the extends entries".to_string()),
                )),
                Mark::Done => {}
            }
        }
        marks[idx] = Mark::Done;
    }

    let mut marks = vec![Mark::Unvisited; plan.models.len()];
    for idx in 0..plan.models.len() {
        if marks[idx] == Mark::Unvisited {
            visit(idx, plan, index, &mut marks, report);
        }
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vocabulary() -> Vocabulary {
        Vocabulary {
            generators: vec!["random.int".to_string()],
            providers: vec!["person.first_name".to_string()],
            locales: vec!["en_US".to_string(), "pt_BR".to_string()],
        }
    }

    fn parse(value: Value) -> Plan {
        serde_json::from_value(value).expect("parse plan")
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|issue| issue.code.as_str()).collect()
    }

    #[test]
    fn reports_unknown_references() {
        let plan = parse(json!({
            "plan_version": "0.1",
            "models": [{
                "name": "User",
                "extends": ["Missing"],
                "fields": {
                    "age": {"gen": "random.nope"},
                    "first": {"fake": "person.nope"},
                    "owner": {"sub": "Ghost"}
                }
            }]
        }));
        let report = validate_plan_semantics(&plan, &vocabulary());
        assert_eq!(
            codes(&report.errors),
            vec!["unknown_parent", "unknown_generator", "unknown_provider", "unknown_model"]
        );
    }

    #[test]
    fn detects_inheritance_cycles() {
        let plan = parse(json!({
            "plan_version": "0.1",
            "models": [
                {"name": "A", "extends": ["B"]},
                {"name": "B", "extends": ["A"]}
            ]
        }));
        let report = validate_plan_semantics(&plan, &vocabulary());
        assert_eq!(codes(&report.errors), vec!["extends_cycle"]);
    }

    #[test]
    fn flags_unsupported_shapes_and_stray_fields() {
        let plan = parse(json!({
            "plan_version": "0.1",
            "models": [
                {"name": "Blob", "shape": {"kind": "opaque"}},
                {
                    "name": "User",
                    "shape": {"kind": "record", "fields": [{"name": "id", "type": "int"}]},
                    "fields": {"nickname": {"const": "x"}, "secret": "exclude"}
                }
            ]
        }));
        let report = validate_plan_semantics(&plan, &vocabulary());
        assert_eq!(codes(&report.errors), vec!["unsupported_shape"]);
        assert_eq!(codes(&report.warnings), vec!["field_not_in_shape"]);
        assert_eq!(report.warnings[0].path, "/models/1/fields/nickname");
    }

    #[test]
    fn rejects_duplicate_models_and_bad_versions() {
        let plan = parse(json!({
            "plan_version": "9",
            "locale": "fr_FR",
            "models": [{"name": "A"}, {"name": "A"}]
        }));
        let report = validate_plan_semantics(&plan, &vocabulary());
        assert_eq!(
            codes(&report.errors),
            vec!["plan_version_mismatch", "unknown_locale", "duplicate_model"]
        );
    }

    #[test]
    fn escapes_pointer_segments() {
        assert_eq!(escape_pointer("a/b~c"), "a~1b~0c");
    }
}
