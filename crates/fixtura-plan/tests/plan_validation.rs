use fixtura_plan::{
    FieldRule, Vocabulary, load_plan_value, plan_json_schema_value, validate_plan,
    validate_plan_json,
};
use serde_json::json;
use std::path::Path;

fn vocabulary() -> Vocabulary {
    let ids = |items: &[&str]| items.iter().map(|item| item.to_string()).collect();
    Vocabulary {
        generators: ids(&[
            "random.int",
            "random.choice",
            "random.sample",
            "derive.email_from",
        ]),
        providers: ids(&["person.first_name", "person.last_name"]),
        locales: ids(&["en_US", "pt_BR"]),
    }
}

#[test]
fn example_plan_validates_against_schema() {
    let plan_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../plans/examples/people.plan.json");
    let plan_json = load_plan_value(&plan_path).expect("load plan");
    let plan_schema = plan_json_schema_value().expect("plan schema");

    let structural = validate_plan_json(&plan_json, &plan_schema).expect("validate plan json");
    assert!(
        structural.errors.is_empty(),
        "structural errors found: {:?}",
        structural.errors
    );

    let validated =
        validate_plan(&plan_json, &plan_schema, &vocabulary()).expect("plan validation");
    assert!(validated.warnings.is_empty(), "unexpected warnings");

    let member = validated.plan.model("Member").expect("member model");
    assert_eq!(member.extends, vec!["Person".to_string()]);
    let names: Vec<&str> = member.fields.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "handle",
            "first_name",
            "last_name",
            "display_name",
            "email",
            "profile",
            "roles"
        ]
    );
    assert!(matches!(member.fields["roles"], FieldRule::SubList(ref rule) if rule.count == 2));
}

#[test]
fn structural_errors_carry_json_pointers() {
    let plan_schema = plan_json_schema_value().expect("plan schema");
    let plan_json = json!({
        "plan_version": "0.1",
        "models": [{"name": "User", "seed": "not-a-number"}]
    });
    let report = validate_plan_json(&plan_json, &plan_schema).expect("validate plan json");
    assert!(!report.is_ok());
    assert!(
        report
            .errors
            .iter()
            .any(|issue| issue.path == "/models/0/seed")
    );
}

#[test]
fn semantic_errors_fail_validation() {
    let plan_schema = plan_json_schema_value().expect("plan schema");
    let plan_json = json!({
        "plan_version": "0.1",
        "models": [{
            "name": "User",
            "fields": {"friend": {"sub": "Nobody"}}
        }]
    });
    let report = validate_plan(&plan_json, &plan_schema, &vocabulary()).expect_err("unknown model");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "unknown_model");
    assert_eq!(report.errors[0].path, "/models/0/fields/friend");
}
