use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use fixtura_core::{EnumValue, FieldMap, FieldType, RecordShape, TargetShape, Value};
use fixtura_generate::{
    FactoryError, ModelSpec, constant, exclude, lazy, random, seq, seq_format, seq_from, seq_with,
    sub, sub_list, template,
};

fn no_overrides() -> FieldMap {
    FieldMap::new()
}

fn overrides(pairs: &[(&str, Value)]) -> FieldMap {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn user_shape() -> TargetShape {
    TargetShape::Record(
        RecordShape::new("User")
            .field("id", FieldType::INT)
            .field("first_name", FieldType::STRING)
            .field("email", FieldType::STRING)
            .field("created_at", FieldType::DATETIME.optional())
            .field("tags", FieldType::list_of(FieldType::STRING)),
    )
}

#[test]
fn deferred_fields_see_eager_fields_across_builds() {
    let model = ModelSpec::new("Person")
        .field("id", seq_from(10))
        .field("first_name", "Ada")
        .field(
            "full_name",
            lazy(|record| Ok(format!("{} Byron", record.get_str("first_name")?))),
        )
        .seed(1)
        .define()
        .expect("define person");

    let first = model.build(&no_overrides()).expect("first build");
    assert_eq!(
        model.to_jsonable(&no_overrides()).expect("second build"),
        json!({"id": 11, "first_name": "Ada", "full_name": "Ada Byron"})
    );
    assert_eq!(first["id"], Value::Int(10));
    assert_eq!(first["full_name"], Value::from("Ada Byron"));
}

#[test]
fn sub_list_rebuilds_children_each_time() {
    let child = ModelSpec::new("Line")
        .field("line_no", seq())
        .field("qty", random::int(1, 5))
        .seed(3)
        .define()
        .expect("define child");
    let parent = ModelSpec::new("Order")
        .field("lines", sub_list(&child, 2, no_overrides()))
        .seed(3)
        .define()
        .expect("define parent");

    let first = parent.build(&no_overrides()).expect("build order");
    let lines = first["lines"].as_list().expect("lines list");
    assert_eq!(lines.len(), 2);
    let numbers: Vec<i64> = lines
        .iter()
        .map(|line| {
            line.as_map()
                .and_then(|fields| fields.get("line_no"))
                .and_then(Value::as_i64)
                .expect("line_no")
        })
        .collect();
    assert_eq!(numbers, vec![1, 2]);

    let second = parent.build(&no_overrides()).expect("build order");
    let next = second["lines"].as_list().expect("lines list")[0]
        .as_map()
        .and_then(|fields| fields.get("line_no"))
        .cloned();
    assert_eq!(next, Some(Value::Int(3)));
}

#[test]
fn nested_record_applies_its_own_overrides() {
    let address = ModelSpec::new("Address")
        .field("city", "Lisbon")
        .field("zip", "1000")
        .seed(1)
        .define()
        .expect("define address");
    let person = ModelSpec::new("Person")
        .field(
            "address",
            sub(&address, overrides(&[("city", Value::from("Porto"))])),
        )
        .seed(1)
        .define()
        .expect("define person");

    let record = person.to_jsonable(&no_overrides()).expect("build");
    assert_eq!(record, json!({"address": {"city": "Porto", "zip": "1000"}}));
}

#[test]
fn excluded_fields_never_appear() {
    let model = ModelSpec::new("Account")
        .field("login", "ada")
        .field("password_confirm", exclude())
        .seed(1)
        .define()
        .expect("define account");

    for record in [
        model.build(&no_overrides()).expect("build"),
        model
            .build(&overrides(&[("password_confirm", Value::from("x"))]))
            .expect("build with override"),
    ] {
        assert!(!record.contains_key("password_confirm"));
    }
}

#[test]
fn explicit_declarations_beat_inference() {
    let model = ModelSpec::new("User")
        .with_shape(user_shape())
        .field("email", "fixed@example.com")
        .seed(5)
        .define()
        .expect("define user");

    let record = model.build(&no_overrides()).expect("build");
    assert_eq!(record["email"], Value::from("fixed@example.com"));
}

#[test]
fn inferred_fields_follow_name_and_type() {
    let model = ModelSpec::new("User")
        .with_shape(user_shape())
        .field("id", seq())
        .seed(5)
        .define()
        .expect("define user");

    let names: Vec<&str> = model.declarations().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["id", "first_name", "email", "created_at", "tags"]);

    let record = model.build(&no_overrides()).expect("build");
    let email = record["email"].as_str().expect("email is text");
    assert!(email.contains('@'), "{email} is not an email");
    assert!(matches!(record["created_at"], Value::Timestamp(_)));
    assert_eq!(record["tags"], Value::List(Vec::new()));
}

#[test]
fn sequences_count_independently() {
    let a = ModelSpec::new("A")
        .field("n", seq())
        .field("code", seq_format("A-{:03}").expect("format"))
        .seed(1)
        .define()
        .expect("define a");
    let b = ModelSpec::new("B")
        .field("n", seq())
        .seed(1)
        .define()
        .expect("define b");

    for _ in 0..3 {
        a.build(&no_overrides()).expect("build a");
    }
    let a_record = a.build(&no_overrides()).expect("build a");
    let b_record = b.build(&no_overrides()).expect("build b");
    assert_eq!(a_record["n"], Value::Int(4));
    assert_eq!(a_record["code"], Value::from("A-004"));
    assert_eq!(b_record["n"], Value::Int(1));
}

#[test]
fn sequence_reset_is_explicit() {
    let model = ModelSpec::new("Ticket")
        .field(
            "code",
            seq_with(|record, n| format!("{}-{n}", record.len())),
        )
        .seed(1)
        .define()
        .expect("define ticket");

    let batch = model.build_batch(3, &no_overrides()).expect("batch");
    assert_eq!(batch[2]["code"], Value::from("0-3"));
    model.reset_sequences();
    let record = model.build(&no_overrides()).expect("build");
    assert_eq!(record["code"], Value::from("0-1"));
}

#[test]
fn merging_twice_is_idempotent() {
    let base = ModelSpec::new("Base").field("id", seq()).field("kind", "base");
    let spec = ModelSpec::new("User")
        .extends(&base)
        .with_shape(user_shape())
        .field("kind", "user");

    let (_, first) = spec.merge().expect("first merge");
    let (_, second) = spec.merge().expect("second merge");
    let labels = |declarations: &fixtura_generate::Declarations| -> Vec<(String, String)> {
        declarations
            .iter()
            .map(|(name, field)| (name.clone(), field.label()))
            .collect()
    };
    assert_eq!(labels(&first), labels(&second));
    assert!(first["id"].ptr_eq(&second["id"]));
    assert_eq!(first.len(), 6);
}

#[test]
fn jsonable_converts_leaf_types() {
    let id = Uuid::nil();
    let model = ModelSpec::new("Invoice")
        .field("issued", constant(NaiveDate::from_ymd_opt(2024, 3, 9).expect("date")))
        .field("id", constant(id))
        .field("total", constant(Decimal::new(1250, 2)))
        .field("status", constant(EnumValue::new("Paid", "paid")))
        .field("blob", constant(Value::Bytes(vec![0xde, 0xad])))
        .seed(1)
        .define()
        .expect("define invoice");

    assert_eq!(
        model.to_jsonable(&no_overrides()).expect("jsonable"),
        json!({
            "issued": "2024-03-09",
            "id": "00000000-0000-0000-0000-000000000000",
            "total": 12.5,
            "status": "paid",
            "blob": "dead"
        })
    );
}

#[test]
fn facade_rejects_bad_arguments_at_construction() {
    let err = random::string(-1, "abc").expect_err("negative length");
    assert!(matches!(err, FactoryError::InvalidArgument(_)));
    let err = random::string(1, "").expect_err("empty alphabet");
    assert!(matches!(err, FactoryError::InvalidArgument(_)));
}

#[test]
fn facade_rejects_bad_ranges_at_resolve() {
    let model = ModelSpec::new("Broken")
        .field("n", random::int(5, 1))
        .seed(1)
        .define()
        .expect("construction succeeds");
    assert!(matches!(
        model.build(&no_overrides()),
        Err(FactoryError::InvalidArgument(_))
    ));
}

#[test]
fn template_reads_siblings_after_overrides() {
    let model = ModelSpec::new("Person")
        .field("first", "Ada")
        .field("last", "Lovelace")
        .field("display", template("{first} {last}").expect("template"))
        .seed(1)
        .define()
        .expect("define person");

    let record = model
        .build(&overrides(&[("last", Value::from("Byron"))]))
        .expect("build");
    assert_eq!(record["display"], Value::from("Ada Byron"));

    let missing = ModelSpec::new("Broken")
        .field("display", template("{nope}").expect("template"))
        .seed(1)
        .define()
        .expect("define broken");
    assert!(matches!(
        missing.build(&no_overrides()),
        Err(FactoryError::NotResolved { field }) if field == "nope"
    ));
}

#[test]
fn same_seed_replays_the_same_records() {
    let define = || {
        ModelSpec::new("Dice")
            .field("roll", random::int(1, 6))
            .field("token", random::alphanumeric(12).expect("alphanumeric"))
            .field("pick", random::choice(["a", "b", "c"]))
            .seed(2024)
            .define()
            .expect("define dice")
    };
    let left = define().build_batch(5, &no_overrides()).expect("left");
    let right = define().build_batch(5, &no_overrides()).expect("right");
    assert_eq!(left, right);
}
