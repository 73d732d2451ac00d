//! The four report shapes.

use nebula_rulebook::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

const EMAIL: &str = "The email field must be a valid email address.";
const QTY: &str = "The items.1.qty field must be greater than 0.";

fn order() -> (Value, Schema) {
    let data = json!({
        "email": "nope",
        "items": [{ "qty": 1 }, { "qty": 0 }]
    });
    let schema = Schema::new()
        .field("email", "required|string|email")
        .field("items", "required|array")
        .field("items.*.qty", "required|number|positive");
    (data, schema)
}

#[rstest]
#[case(ResponseType::Laravel, json!({
    "email": [EMAIL],
    "items.1.qty": [QTY]
}))]
#[case(ResponseType::Flat, json!([
    { "field": "email", "rule": "email", "message": EMAIL },
    { "field": "items.1.qty", "rule": "positive", "message": QTY }
]))]
#[case(ResponseType::Grouped, json!({
    "email": { "email": EMAIL },
    "items.1.qty": { "positive": QTY }
}))]
#[case(ResponseType::Nested, json!({
    "email": [EMAIL],
    "items": [null, { "qty": [QTY] }]
}))]
fn renders_each_shape(#[case] response_type: ResponseType, #[case] expected: Value) {
    let (data, schema) = order();
    let result = Validator::new()
        .with_config(ValidatorConfig::default().with_response_type(response_type))
        .validate_blocking(&data, &schema)
        .unwrap();

    assert_eq!(result.formatted(), expected);
    assert_eq!(result.formatted_as(response_type), expected);
}

#[test]
fn flat_keeps_schema_order() {
    let schema = Schema::new()
        .field("b", "required")
        .field("a", "required")
        .field("c", "required");
    let result = Validator::new().validate_blocking(&json!({}), &schema).unwrap();
    let fields: Vec<_> = result
        .formatted_as(ResponseType::Flat)
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["field"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(fields, ["b", "a", "c"]);
}

#[test]
fn grouped_keeps_first_message_per_rule() {
    let mut registry = RuleRegistry::with_builtins();
    registry.extend("never", |_, _, _| false);
    let schema = Schema::new().field("x", "string|min:3|custom:never|custom:never,again");
    let result = Validator::with_registry(registry)
        .validate_blocking(&json!({ "x": "ab" }), &schema)
        .unwrap();

    assert_eq!(result.errors.messages("x").len(), 3);
    assert_eq!(
        result.formatted_as(ResponseType::Grouped),
        json!({
            "x": {
                "min": "The x field must be at least 3 characters.",
                "never": "The x field is invalid."
            }
        })
    );
}

#[test]
fn nested_keeps_own_messages_beside_children() {
    let schema = Schema::new()
        .field("meta", "object|keys:a")
        .field("meta.b", "required");
    let result = Validator::new()
        .validate_blocking(&json!({ "meta": { "c": 1 } }), &schema)
        .unwrap();

    assert_eq!(
        result.formatted_as(ResponseType::Nested),
        json!({
            "meta": {
                "b": ["The meta.b field is required."],
                "_errors": ["The meta field must contain the keys: a."]
            }
        })
    );
}

#[test]
fn nested_pads_arrays_with_null() {
    let schema = Schema::new().field("tags.*", "string|min:2");
    let result = Validator::new()
        .validate_blocking(&json!({ "tags": ["ok", "x", "fine", "y"] }), &schema)
        .unwrap();

    assert_eq!(
        result.formatted_as(ResponseType::Nested),
        json!({
            "tags": [
                null,
                ["The tags.1 field must be at least 2 characters."],
                null,
                ["The tags.3 field must be at least 2 characters."]
            ]
        })
    );
}

#[test]
fn valid_results_render_empty() {
    let (_, schema) = order();
    let data = json!({ "email": "a@b.io", "items": [{ "qty": 3 }] });
    let result = Validator::new().validate_blocking(&data, &schema).unwrap();
    assert_eq!(result.formatted_as(ResponseType::Laravel), json!({}));
    assert_eq!(result.formatted_as(ResponseType::Flat), json!([]));
    assert_eq!(result.formatted_as(ResponseType::Grouped), json!({}));
    assert_eq!(result.formatted_as(ResponseType::Nested), json!({}));
}

#[rstest]
#[case("laravel", ResponseType::Laravel)]
#[case("flat", ResponseType::Flat)]
#[case("grouped", ResponseType::Grouped)]
#[case("nested", ResponseType::Nested)]
fn response_type_names(#[case] name: &str, #[case] expected: ResponseType) {
    assert_eq!(name.parse::<ResponseType>().unwrap(), expected);
    assert_eq!(expected.to_string(), name);
    assert!("xml".parse::<ResponseType>().is_err());
}
