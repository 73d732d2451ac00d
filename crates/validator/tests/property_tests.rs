//! Property-based tests for nebula-rulebook.

use nebula_rulebook::{Compiler, path};
use nebula_rulebook::prelude::*;
use proptest::prelude::*;
use serde_json::{Value, json};

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z@. ]{0,12}".prop_map(Value::from),
    ]
}

fn profile_schema() -> Schema {
    Schema::new()
        .field("email", "required|string|email")
        .field("age", "nullable|number|between:18,99")
        .field("tags", "array|max:3")
        .field("tags.*", "string|min:2")
        .field("role", "required_with:email|in:admin,user")
}

// ============================================================================
// WILDCARD EXPANSION: `a.*.b` over N elements yields N paths
// ============================================================================

proptest! {
    #[test]
    fn wildcard_yields_one_path_per_element(qtys in prop::collection::vec(any::<i16>(), 0..20)) {
        let items: Vec<Value> = qtys.iter().map(|q| json!({ "qty": q })).collect();
        let data = json!({ "items": items });

        let resolved = path::resolve(&data, "items.*.qty");
        prop_assert_eq!(resolved.len(), qtys.len());
        for (idx, field) in resolved.iter().enumerate() {
            prop_assert_eq!(&field.path, &format!("items.{idx}.qty"));
            prop_assert_eq!(field.value, Some(&json!(qtys[idx])));
        }
    }

    #[test]
    fn wildcard_instances_validate_independently(qtys in prop::collection::vec(-5i16..5, 0..20)) {
        let items: Vec<Value> = qtys.iter().map(|q| json!({ "qty": q })).collect();
        let schema = Schema::new().field("items.*.qty", "required|number|positive");
        let result = Validator::new()
            .validate_blocking(&json!({ "items": items }), &schema)
            .unwrap();

        let failing: Vec<String> = qtys
            .iter()
            .enumerate()
            .filter(|(_, q)| **q <= 0)
            .map(|(idx, _)| format!("items.{idx}.qty"))
            .collect();
        prop_assert_eq!(result.errors.fields().collect::<Vec<_>>(), failing);
    }
}

// ============================================================================
// DETERMINISM: validate(x) == validate(x)
// ============================================================================

proptest! {
    #[test]
    fn validation_is_deterministic(
        email in arb_scalar(),
        age in arb_scalar(),
        tags in prop::collection::vec(arb_scalar(), 0..5),
        role in arb_scalar(),
    ) {
        let data = json!({ "email": email, "age": age, "tags": tags, "role": role });
        let schema = profile_schema();
        let validator = Validator::new();

        let first = validator.validate_blocking(&data, &schema).unwrap();
        let second = validator.validate_blocking(&data, &schema).unwrap();
        prop_assert_eq!(first.errors.to_flat(), second.errors.to_flat());
        prop_assert_eq!(&first, &second);
    }

    #[test]
    fn exactly_one_base_type_compiles(idx in 0usize..7, extra in 0usize..7) {
        let types = ["string", "number", "boolean", "array", "date", "object", "file"];
        let registry = RuleRegistry::with_builtins();
        let compiler = Compiler::new(&registry);

        let single = format!("required|{}", types[idx]);
        prop_assert!(compiler.compile("field", single.as_str()).is_ok());

        let double = format!("{}|nullable|{}", types[idx], types[extra]);
        let conflict = compiler.compile("field", double.as_str());
        prop_assert!(
            matches!(conflict, Err(ValidatorError::ConflictingDataType { .. })),
            "{double}"
        );
    }
}
