//! JSON integration tests (requires the `serde` feature)

#![cfg(feature = "serde")]

use ouroboros_rules::{MessageTemplates, Record, Session};
use serde_json::json;

#[tokio::test]
async fn test_json_record_validation() {
    let record = Record::from_json(&json!({
        "username": "ada",
        "age": 0,
        "newsletter": true,
        "nickname": null,
    }))
    .unwrap();

    let mut session = Session::new(record);
    session.add_rule("username", "Username", "required|minLength[3]").unwrap();
    session.add_rule("age", "Age", "required|naturalNoZero").unwrap();
    session.add_rule("newsletter", "Newsletter", "boolean").unwrap();
    session.add_rule("nickname", "Nickname", "required").unwrap();

    let outcome = session.run().await;
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(
        value,
        json!({
            "errors": {
                "age": "The Age field must contain a number greater than zero.",
                "nickname": "The Nickname field is required.",
            },
            "data": {
                "age": "0",
                "newsletter": "true",
                "nickname": null,
                "username": "ada",
            },
        })
    );
}

#[test]
fn test_valid_outcome_serializes_null_errors() {
    let session = Session::new(Record::new().with("name", "Ada"));
    let value = serde_json::to_value(session.run_blocking()).unwrap();
    assert_eq!(value, json!({ "errors": null, "data": { "name": "Ada" } }));
}

#[test]
fn test_record_deserializes_from_json_text() {
    let record: Record = serde_json::from_str(r#"{"pin": 1234, "note": null}"#).unwrap();
    assert_eq!(record.get("pin"), Some("1234"));
    assert!(record.contains("note"));

    assert!(serde_json::from_str::<Record>(r#"{"pin": [1]}"#).is_err());
}

#[test]
fn test_templates_deserialize_from_map() {
    let templates: MessageTemplates =
        serde_json::from_value(json!({ "required": "%s is mandatory" })).unwrap();
    assert_eq!(templates.get("required"), Some("%s is mandatory"));
    assert!(!templates.contains("email"));
}
