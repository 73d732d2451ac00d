//! Type-agnostic comparison rules.

use serde_json::Value;

use super::{require_params, scalar_text};

const ACCEPTED: [&str; 4] = ["yes", "on", "1", "true"];
const DECLINED: [&str; 4] = ["no", "off", "0", "false"];

/// True when the scalar (or every element of an array) is one of `params`.
fn is_listed(value: &Value, params: &[String]) -> bool {
    let listed = |item: &Value| {
        scalar_text(item).is_some_and(|text| params.iter().any(|p| *p == text))
    };
    match value {
        Value::Array(items) => items.iter().all(listed),
        other => listed(other),
    }
}

fn is_unlisted(value: &Value, params: &[String]) -> bool {
    let unlisted = |item: &Value| {
        scalar_text(item).is_none_or(|text| params.iter().all(|p| *p != text))
    };
    match value {
        Value::Array(items) => items.iter().all(unlisted),
        other => unlisted(other),
    }
}

crate::rule! {
    /// `in:a,b,c`: the value is one of the listed options.
    pub In => "The selected :attribute is invalid.";
    check(value, params, ctx) { Ok(is_listed(value, params)) }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}

crate::rule! {
    /// `not_in:a,b,c`: the value is none of the listed options.
    pub NotIn => "The selected :attribute is invalid.";
    check(value, params, ctx) { Ok(is_unlisted(value, params)) }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}

crate::rule! {
    /// `same:other`: the value equals another field's value.
    pub Same => "The :attribute field must match :other.";
    check(value, params, ctx) { Ok(ctx.lookup_coerced(&params[0]).as_deref() == Some(value)) }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("other", ctx.attribute_of(&params[0]))] }
}

crate::rule! {
    /// `different:other`: the value differs from another field's value.
    pub Different => "The :attribute field and :other must be different.";
    check(value, params, ctx) { Ok(ctx.lookup_coerced(&params[0]).as_deref() != Some(value)) }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("other", ctx.attribute_of(&params[0]))] }
}

crate::rule! {
    /// `confirmed`: `<field>_confirmation` holds the same value.
    pub Confirmed => "The :attribute field confirmation does not match.";
    check(value, params, ctx) {
        let confirmation = format!("{}_confirmation", ctx.field());
        Ok(ctx.lookup_coerced(&confirmation).as_deref() == Some(value))
    }
}

crate::rule! {
    /// `accepted`: yes, on, 1 or true.
    pub Accepted => "The :attribute field must be accepted.";
    check(value) {
        scalar_text(value).is_some_and(|text| ACCEPTED.contains(&text.as_str()))
    }
}

crate::rule! {
    /// `declined`: no, off, 0 or false.
    pub Declined => "The :attribute field must be declined.";
    check(value) {
        scalar_text(value).is_some_and(|text| DECLINED.contains(&text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::{Schema, Validator};

    fn valid(data: Value, rules: &str) -> bool {
        Validator::new()
            .validate_blocking(&data, &Schema::new().field("v", rules))
            .unwrap()
            .is_valid
    }

    #[rstest]
    #[case(json!("pro"), "in:free,pro", true)]
    #[case(json!("gold"), "in:free,pro", false)]
    #[case(json!(2), "in:1,2,3", true)]
    #[case(json!(["a", "b"]), "in:a,b,c", true)]
    #[case(json!(["a", "z"]), "in:a,b,c", false)]
    #[case(json!("gold"), "not_in:free,pro", true)]
    #[case(json!("pro"), "not_in:free,pro", false)]
    #[case(json!("yes"), "accepted", true)]
    #[case(json!(true), "accepted", true)]
    #[case(json!("nope"), "accepted", false)]
    #[case(json!(0), "declined", true)]
    #[case(json!("off"), "declined", true)]
    #[case(json!("on"), "declined", false)]
    fn scalar_rules(#[case] value: Value, #[case] rules: &str, #[case] expected: bool) {
        assert_eq!(valid(json!({ "v": value }), rules), expected);
    }

    #[test]
    fn same_and_different() {
        let schema = Schema::new()
            .field("password", "string|confirmed")
            .field("repeat", "same:password")
            .field("username", "different:password");
        let data = json!({
            "password": "hunter22",
            "password_confirmation": "hunter2",
            "repeat": "hunter22",
            "username": "hunter22"
        });
        let result = Validator::new().validate_blocking(&data, &schema).unwrap();
        assert_eq!(
            result.errors.to_laravel(),
            json!({
                "password": ["The password field confirmation does not match."],
                "username": ["The username field and password must be different."]
            })
        );
    }

    #[test]
    fn comparisons_see_trimmed_values() {
        let schema = Schema::new()
            .field("password", "required|string|confirmed")
            .field("repeat", "same:password")
            .field("username", "different:password");
        let data = json!({
            "password": "secret ",
            "password_confirmation": "  secret",
            "repeat": "secret ",
            "username": " secret"
        });
        let result = Validator::new().validate_blocking(&data, &schema).unwrap();
        assert_eq!(
            result.errors.to_laravel(),
            json!({ "username": ["The username field and password must be different."] })
        );
    }
}
