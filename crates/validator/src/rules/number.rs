//! The `number` base type and its refinements.
//!
//! JSON numbers and numeric strings both count as numbers.

use serde_json::Value;

use super::{number_param, require_numbers};

/// Numeric value of a JSON number or a numeric string.
#[must_use]
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Digits after the decimal point, as written.
fn decimal_places(value: &Value) -> Option<usize> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) if as_number(value).is_some() => s.trim().to_owned(),
        _ => return None,
    };
    Some(text.split_once('.').map_or(0, |(_, fraction)| fraction.len()))
}

crate::rule! {
    /// Base type: the value is a number.
    pub NumberType => "The :attribute field must be a number.";
    check(value) { as_number(value).is_some() }
}

crate::rule! {
    /// `min:n`: at least `n`.
    pub Min => "The :attribute field must be at least :min.";
    check(value, params, ctx) {
        let min = number_param(ctx, params, 0)?;
        Ok(as_number(value).is_some_and(|n| n >= min))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("min", params[0].clone())] }
}

crate::rule! {
    /// `max:n`: at most `n`.
    pub Max => "The :attribute field must not be greater than :max.";
    check(value, params, ctx) {
        let max = number_param(ctx, params, 0)?;
        Ok(as_number(value).is_some_and(|n| n <= max))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("max", params[0].clone())] }
}

crate::rule! {
    /// `between:min,max`: within the inclusive range.
    pub Between => "The :attribute field must be between :min and :max.";
    check(value, params, ctx) {
        let min = number_param(ctx, params, 0)?;
        let max = number_param(ctx, params, 1)?;
        Ok(as_number(value).is_some_and(|n| (min..=max).contains(&n)))
    }
    params(params) { require_numbers(params, 2) }
    placeholders(params, ctx) {
        vec![("min", params[0].clone()), ("max", params[1].clone())]
    }
}

crate::rule! {
    /// `integer`: no fractional part.
    pub Integer => "The :attribute field must be an integer.";
    check(value) { as_number(value).is_some_and(|n| n.fract().abs() < f64::EPSILON) }
}

crate::rule! {
    /// `positive`: greater than zero.
    pub Positive => "The :attribute field must be greater than 0.";
    check(value) { as_number(value).is_some_and(|n| n > 0.0) }
}

crate::rule! {
    /// `negative`: less than zero.
    pub Negative => "The :attribute field must be less than 0.";
    check(value) { as_number(value).is_some_and(|n| n < 0.0) }
}

crate::rule! {
    /// `multiple_of:n`
    pub MultipleOf => "The :attribute field must be a multiple of :multiple.";
    check(value, params, ctx) {
        let step = number_param(ctx, params, 0)?;
        Ok(as_number(value).is_some_and(|n| {
            let ratio = n / step;
            step.abs() > f64::EPSILON && (ratio - ratio.round()).abs() < 1e-9
        }))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("multiple", params[0].clone())] }
}

crate::rule! {
    /// `decimal:places` or `decimal:min,max`: number of decimal places.
    pub Decimal => "The :attribute field must have :decimal decimal places.";
    check(value, params, ctx) {
        let min = number_param(ctx, params, 0)?;
        let max = if params.len() > 1 { number_param(ctx, params, 1)? } else { min };
        Ok(decimal_places(value).is_some_and(|places| {
            let places = places as f64;
            places >= min && places <= max
        }))
    }
    params(params) { require_numbers(params, params.len().clamp(1, 2)) }
    placeholders(params, ctx) { vec![("decimal", params.join("-"))] }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::as_number;
    use crate::{Schema, Validator};

    fn messages(value: Value, rules: &str) -> Vec<String> {
        let result = Validator::new()
            .validate_blocking(&json!({ "age": value }), &Schema::new().field("age", rules))
            .unwrap();
        result
            .errors
            .messages("age")
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[rstest]
    #[case(json!(20), "number|min:18", true)]
    #[case(json!(16), "number|min:18", false)]
    #[case(json!("19"), "number|min:18", true)]
    #[case(json!("abc"), "number", false)]
    #[case(json!(true), "number", false)]
    #[case(json!(10), "number|max:9", false)]
    #[case(json!(5.5), "number|between:5,6", true)]
    #[case(json!(4), "number|integer", true)]
    #[case(json!(4.5), "number|integer", false)]
    #[case(json!(1), "number|positive", true)]
    #[case(json!(0), "number|positive", false)]
    #[case(json!(-2), "number|negative", true)]
    #[case(json!(0.9), "number|multiple_of:0.3", true)]
    #[case(json!(10), "number|multiple_of:3", false)]
    #[case(json!(1.25), "number|decimal:2", true)]
    #[case(json!(1.5), "number|decimal:2", false)]
    #[case(json!("1.50"), "number|decimal:1,2", true)]
    fn number_rules(#[case] value: Value, #[case] rules: &str, #[case] valid: bool) {
        assert_eq!(messages(value, rules).is_empty(), valid, "{rules}");
    }

    #[test]
    fn min_uses_numeric_wording() {
        assert_eq!(
            messages(json!(16), "required|number|min:18"),
            ["The age field must be at least 18."]
        );
    }

    #[test]
    fn numeric_strings() {
        assert_eq!(as_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!(null)), None);
    }
}
