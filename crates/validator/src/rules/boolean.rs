//! The `boolean` base type.

use serde_json::Value;

/// Accepts `true`, `false`, `0`, `1`, `"0"`, `"1"`, `"true"` and `"false"`.
#[must_use]
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

crate::rule! {
    /// Base type: the value is boolean-like.
    pub BooleanType => "The :attribute field must be true or false.";
    check(value) { as_bool(value).is_some() }
}

crate::rule! {
    /// `strict`: only JSON `true` or `false`.
    pub Strict => "The :attribute field must be a boolean.";
    check(value) { value.is_boolean() }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::{Schema, Validator};

    #[rstest]
    #[case(json!(true), "boolean", true)]
    #[case(json!("1"), "boolean", true)]
    #[case(json!(0), "boolean", true)]
    #[case(json!(2), "boolean", false)]
    #[case(json!("yes"), "boolean", false)]
    #[case(json!("true"), "boolean|strict", false)]
    #[case(json!(false), "boolean|strict", true)]
    fn boolean_rules(#[case] value: Value, #[case] rules: &str, #[case] valid: bool) {
        let result = Validator::new()
            .validate_blocking(&json!({ "flag": value }), &Schema::new().field("flag", rules))
            .unwrap();
        assert_eq!(result.is_valid, valid, "{rules}");
    }
}
