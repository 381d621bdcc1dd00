use chrono::NaiveDate;
use fixtura_core::{fields_to_jsonable, to_jsonable, EnumValue, FieldMap, Value};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

#[test]
fn encodes_rich_values_as_plain_json() {
    let date = NaiveDate::from_ymd_opt(1815, 12, 10).expect("date");
    let stamp = date.and_hms_opt(8, 15, 0).expect("timestamp");
    let id = Uuid::nil();

    let mut nested = FieldMap::new();
    nested.insert("bio".to_string(), Value::from("analyst"));

    let mut fields = FieldMap::new();
    fields.insert("born".to_string(), Value::Date(date));
    fields.insert("seen_at".to_string(), Value::Timestamp(stamp));
    fields.insert("id".to_string(), Value::Uuid(id));
    fields.insert("balance".to_string(), Value::Decimal(Decimal::new(1050, 2)));
    fields.insert(
        "status".to_string(),
        Value::Enum(EnumValue::new("Active", "active")),
    );
    fields.insert("blob".to_string(), Value::Bytes(vec![0xde, 0xad]));
    fields.insert("profile".to_string(), Value::Map(nested));
    fields.insert(
        "tags".to_string(),
        Value::List(vec![Value::Int(1), Value::Null]),
    );

    let json = fields_to_jsonable(&fields);
    assert_eq!(
        json,
        json!({
            "born": "1815-12-10",
            "seen_at": "1815-12-10T08:15:00",
            "id": "00000000-0000-0000-0000-000000000000",
            "balance": 10.5,
            "status": "active",
            "blob": "dead",
            "profile": {"bio": "analyst"},
            "tags": [1, null]
        })
    );

    let keys: Vec<&String> = json.as_object().expect("object").keys().collect();
    assert_eq!(keys[0], "born");
    assert_eq!(keys[7], "tags");
}

#[test]
fn scalars_pass_through_unchanged() {
    assert_eq!(to_jsonable(&Value::Int(42)), json!(42));
    assert_eq!(to_jsonable(&Value::from("x")), json!("x"));
    assert_eq!(to_jsonable(&Value::Bool(true)), json!(true));
    assert_eq!(to_jsonable(&Value::Null), json!(null));
}
