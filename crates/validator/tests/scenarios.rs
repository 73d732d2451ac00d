//! End-to-end validation scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nebula_rulebook::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn signup() -> Schema {
    Schema::new()
        .field("email", "required|string|email")
        .field("age", "required|number|min:18")
}

/// A validator with a `custom:count` rule that always passes and counts its
/// invocations.
fn counting_validator() -> (Validator, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = RuleRegistry::with_builtins();
    registry.extend("count", move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });
    (Validator::with_registry(registry), calls)
}

// ============================================================================
// BASIC SCENARIOS
// ============================================================================

#[test]
fn valid_signup_has_no_errors() {
    let result = Validator::new()
        .validate_blocking(&json!({ "email": "a@b.com", "age": 20 }), &signup())
        .unwrap();
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.formatted(), json!({}));
}

#[test]
fn invalid_signup_reports_each_field() {
    let result = Validator::new()
        .validate_blocking(&json!({ "email": "not-an-email", "age": 10 }), &signup())
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(
        result.errors.messages("email"),
        ["The email field must be a valid email address."]
    );
    assert_eq!(
        result.errors.messages("age"),
        ["The age field must be at least 18."]
    );
    assert_eq!(result.errors.fields().collect::<Vec<_>>(), ["email", "age"]);
}

#[test]
fn missing_required_fields() {
    let result = Validator::new()
        .validate_blocking(&json!({}), &signup())
        .unwrap();
    assert_eq!(result.errors.messages("email"), ["The email field is required."]);
    assert_eq!(result.errors.messages("age"), ["The age field is required."]);
}

#[rstest]
#[case(json!({ "plan": "paid" }), false)]
#[case(json!({ "plan": "free" }), true)]
#[case(json!({ "plan": "paid", "card_number": "4242" }), true)]
fn required_if_depends_on_other_field(#[case] data: Value, #[case] valid: bool) {
    let schema = Schema::new()
        .field("plan", "required|string|in:free,paid")
        .field("card_number", "required_if:plan,paid|string");
    let result = Validator::new().validate_blocking(&data, &schema).unwrap();
    assert_eq!(result.is_valid, valid);
    if !valid {
        assert_eq!(
            result.errors.messages("card_number"),
            ["The card number field is required when plan is paid."]
        );
    }
}

#[test]
fn strict_object_rejects_unexpected_keys() {
    let schema = Schema::new()
        .field("user", "required|object|strict")
        .field("user.name", "required|string")
        .field("user.age", "required|number");
    let result = Validator::new()
        .validate_blocking(&json!({ "user": { "name": "x", "age": 1, "extra": true } }), &schema)
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(
        result.errors.messages("user"),
        ["The user field contains unexpected keys: extra."]
    );
}

// ============================================================================
// BAIL
// ============================================================================

#[rstest]
#[case(false, 2)]
#[case(true, 1)]
fn bail_stops_only_the_failing_field(#[case] bail: bool, #[case] expected_calls: usize) {
    let (validator, calls) = counting_validator();
    let validator = validator.with_config(ValidatorConfig::default().with_bail(bail));
    let schema = Schema::new()
        .field("code", "string|min:5|custom:count")
        .field("other", "string|custom:count");

    let result = validator
        .validate_blocking(&json!({ "code": "ab", "other": "x" }), &schema)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
    assert_eq!(
        result.errors.messages("code"),
        ["The code field must be at least 5 characters."]
    );
}

#[test]
fn bail_keeps_first_failure_only() {
    let schema = Schema::new().field("name", "string|min:5|alpha");
    let data = json!({ "name": "a1" });

    let all = Validator::new().validate_blocking(&data, &schema).unwrap();
    assert_eq!(all.errors.messages("name").len(), 2);

    let first = Validator::new()
        .with_config(ValidatorConfig::default().with_bail(true))
        .validate_blocking(&data, &schema)
        .unwrap();
    assert_eq!(
        first.errors.messages("name"),
        ["The name field must be at least 5 characters."]
    );
}

// ============================================================================
// WILDCARDS, UNION AND COERCION
// ============================================================================

#[test]
fn wildcard_validates_every_element() {
    let schema = Schema::new()
        .field("items", "required|array|min:1")
        .field("items.*.qty", "required|number|integer|positive")
        .field("items.*.sku", "required_with:items.*.qty|string");
    let data = json!({
        "items": [
            { "qty": 1, "sku": "A-1" },
            { "qty": 0, "sku": "B-2" },
            { "qty": 2 }
        ]
    });

    let result = Validator::new().validate_blocking(&data, &schema).unwrap();
    assert_eq!(
        result.errors.fields().collect::<Vec<_>>(),
        ["items.1.qty", "items.2.sku"]
    );
    assert_eq!(
        result.errors.first("items.1.qty"),
        Some("The items.1.qty field must be greater than 0.")
    );
}

#[test]
fn union_accepts_any_matching_set() {
    let schema = Schema::new().field(
        "contact",
        r#"required|union:[["string","email"],["number","integer"]],false"#,
    );
    let validator = Validator::new();
    assert!(validator.validate_blocking(&json!({ "contact": "a@b.io" }), &schema).unwrap().is_valid);
    assert!(validator.validate_blocking(&json!({ "contact": 42 }), &schema).unwrap().is_valid);

    let result = validator
        .validate_blocking(&json!({ "contact": true }), &schema)
        .unwrap();
    assert_eq!(
        result.errors.messages("contact"),
        ["The contact field must match one of the following formats: string|email, number|integer."]
    );
}

#[rstest]
#[case(json!("anything"))]
#[case(json!(1))]
#[case(json!(null))]
fn empty_union_fails_for_any_value(#[case] value: Value) {
    let result = Validator::new()
        .validate_blocking(&json!({ "x": value }), &Schema::new().field("x", "union:[]"))
        .unwrap();
    assert!(!result.is_valid);
}

#[rstest]
#[case(true, 1)]
#[case(false, 2)]
fn union_stop_on_first_pass(#[case] stop: bool, #[case] expected_calls: usize) {
    let (validator, calls) = counting_validator();
    let union = Rule::union(
        vec![
            vec![Rule::custom("count", Vec::<String>::new())],
            vec![Rule::named("string"), Rule::custom("count", Vec::<String>::new())],
        ],
        stop,
    );
    let result = validator
        .validate_blocking(&json!({ "x": "a" }), &Schema::new().field("x", vec![union]))
        .unwrap();
    assert!(result.is_valid);
    assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
}

#[test]
fn coercion_is_written_back_to_data() {
    let schema = Schema::new()
        .field("name", "required|string|min:2")
        .field("nickname", "nullable|string|min:3");
    let validator =
        Validator::new().with_config(ValidatorConfig::default().with_empty_strings_as_null(true));

    let result = validator
        .validate_blocking(&json!({ "name": "  Ada ", "nickname": "   " }), &schema)
        .unwrap();
    assert!(result.is_valid);
    assert_eq!(result.data, json!({ "name": "Ada", "nickname": null }));
}

#[test]
fn textual_and_builder_definitions_agree() {
    let text = Schema::new().field("age", "required|number|between:18,65");
    let built = Schema::new().field(
        "age",
        vec![
            Rule::named("required"),
            Rule::named("number"),
            Rule::new("between", ["18", "65"]),
        ],
    );
    let tokens = Schema::new().field("age", vec!["required", "number", "between:18,65"]);

    let validator = Validator::new();
    let data = json!({ "age": 70 });
    let expected = validator.validate_blocking(&data, &text).unwrap();
    assert_eq!(validator.validate_blocking(&data, &built).unwrap(), expected);
    assert_eq!(validator.validate_blocking(&data, &tokens).unwrap(), expected);
}

#[test]
fn schema_from_json() {
    let schema = Schema::from_json(&json!({
        "title": "required|string|max:10",
        "tags": ["array", "distinct"],
    }))
    .unwrap();
    let result = Validator::new()
        .validate_blocking(&json!({ "title": "a much longer title", "tags": [1, 1] }), &schema)
        .unwrap();
    assert!(result.errors.has("title", "max"));
    assert!(result.errors.has("tags", "distinct"));
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

#[rstest]
#[case("string|number")]
#[case("date|boolean")]
#[case("string|string")]
fn two_base_types_conflict(#[case] rules: &str) {
    let err = Validator::new()
        .validate_blocking(&json!({}), &Schema::new().field("x", rules))
        .unwrap_err();
    assert!(matches!(err, ValidatorError::ConflictingDataType { .. }), "{err}");
}

#[test]
fn unknown_rules_abort_validation() {
    let validator = Validator::new();

    let err = validator
        .validate_blocking(&json!({ "x": "a" }), &Schema::new().field("x", "string|frobnicate"))
        .unwrap_err();
    assert!(matches!(err, ValidatorError::UnknownRule { ref name, .. } if name == "frobnicate"));

    let err = validator
        .validate_blocking(&json!({ "x": "a" }), &Schema::new().field("x", "custom:nope"))
        .unwrap_err();
    assert!(matches!(err, ValidatorError::UnknownCustomRule { ref name } if name == "nope"));

    let err = validator
        .validate_blocking(&json!({ "x": "a" }), &Schema::new().field("x", "string|min:abc"))
        .unwrap_err();
    assert!(matches!(err, ValidatorError::InvalidDefinition { .. }));
}

#[test]
fn rule_errors_propagate() {
    let mut registry = RuleRegistry::with_builtins();
    registry.register_custom("explodes", Explodes);
    let err = Validator::with_registry(registry)
        .validate_blocking(&json!({ "x": 1 }), &Schema::new().field("x", "custom:explodes"))
        .unwrap_err();
    assert!(matches!(err, ValidatorError::RuleExecution { .. }));
}

struct Explodes;

impl RuleHandler for Explodes {
    fn check<'a>(
        &'a self,
        _value: Option<&'a Value>,
        _params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        Err(ctx.error("backend unavailable"))
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

#[test]
fn locale_catalog_from_json() {
    let catalog: MessageCatalog = serde_json::from_value(json!({
        "rules": { "min.numeric": "Das Feld :attribute muss mindestens :min sein." },
        "attributes": { "age": "Alter" }
    }))
    .unwrap();
    let mut validator = Validator::new();
    validator.add_catalog("de", catalog);

    let config = ValidatorConfig::default().with_locale("de-AT");
    let result = futures::executor::block_on(validator.validate_with(
        &json!({ "email": "a@b.io", "age": 16 }),
        &signup(),
        &config,
    ))
    .unwrap();
    assert_eq!(
        result.errors.messages("age"),
        ["Das Feld Alter muss mindestens 18 sein."]
    );
}

#[test]
fn config_deserializes_from_camel_case() {
    let config: ValidatorConfig = serde_json::from_value(json!({
        "bail": true,
        "convertEmptyStringToNull": true,
        "responseType": "grouped",
        "messages": { "rules": { "required": ":attribute missing" } }
    }))
    .unwrap();
    assert!(config.bail);
    assert!(config.auto_trim);
    assert_eq!(config.response_type, ResponseType::Grouped);

    let result = Validator::new()
        .with_config(config)
        .validate_blocking(&json!({}), &Schema::new().field("first_name", "required"))
        .unwrap();
    assert_eq!(
        result.formatted(),
        json!({ "first_name": { "required": "first name missing" } })
    );
}
