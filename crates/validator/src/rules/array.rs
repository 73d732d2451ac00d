//! The `array` base type and its refinements. Sizes count elements.

use serde_json::Value;

use super::{number_param, require_numbers, require_params, scalar_text};

fn len(value: &Value) -> Option<f64> {
    value.as_array().map(|items| items.len() as f64)
}

crate::rule! {
    /// Base type: the value is an array.
    pub ArrayType => "The :attribute field must be an array.";
    check(value) { value.is_array() }
}

crate::rule! {
    /// `min:n`: at least `n` elements.
    pub Min => "The :attribute field must have at least :min items.";
    check(value, params, ctx) {
        let min = number_param(ctx, params, 0)?;
        Ok(len(value).is_some_and(|n| n >= min))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("min", params[0].clone())] }
}

crate::rule! {
    /// `max:n`: at most `n` elements.
    pub Max => "The :attribute field must not have more than :max items.";
    check(value, params, ctx) {
        let max = number_param(ctx, params, 0)?;
        Ok(len(value).is_some_and(|n| n <= max))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("max", params[0].clone())] }
}

crate::rule! {
    /// `length:n`: exactly `n` elements.
    pub Length => "The :attribute field must contain :length items.";
    check(value, params, ctx) {
        let length = number_param(ctx, params, 0)?;
        Ok(len(value).is_some_and(|n| (n - length).abs() < f64::EPSILON))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("length", params[0].clone())] }
}

crate::rule! {
    /// `distinct`: no two elements are equal.
    pub Distinct => "The :attribute field has a duplicate value.";
    check(value) {
        value.as_array().is_some_and(|items| {
            items
                .iter()
                .enumerate()
                .all(|(idx, item)| !items[..idx].contains(item))
        })
    }
}

crate::rule! {
    /// `includes:a,b`: every listed value appears among the elements.
    pub Includes => "The :attribute field must include: :values.";
    check(value, params, ctx) {
        Ok(value.as_array().is_some_and(|items| {
            let texts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            params.iter().all(|p| texts.contains(p))
        }))
    }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}
