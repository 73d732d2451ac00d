//! The `date` base type and its comparisons.
//!
//! Accepted inputs: RFC 3339 timestamps, `YYYY-MM-DD`,
//! `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, and integer epoch
//! milliseconds. Comparison parameters are a literal date, `today`, `now`,
//! or the path of another field holding a date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;

use super::require_params;
use crate::context::RuleContext;

/// Parses a date value.
#[must_use]
pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Resolves a comparison parameter. `None` when it names a field that holds
/// no date.
fn resolve_param(param: &str, ctx: &RuleContext<'_>) -> Option<NaiveDateTime> {
    match param {
        "now" => Some(Utc::now().naive_utc()),
        "today" => Some(Utc::now().date_naive().and_time(NaiveTime::MIN)),
        "tomorrow" => Utc::now()
            .date_naive()
            .succ_opt()
            .map(|date| date.and_time(NaiveTime::MIN)),
        "yesterday" => Utc::now()
            .date_naive()
            .pred_opt()
            .map(|date| date.and_time(NaiveTime::MIN)),
        other => parse_date_str(other).or_else(|| ctx.lookup(other).and_then(parse_date)),
    }
}

/// Compares the value against the first parameter.
fn compare(
    value: &Value,
    params: &[String],
    ctx: &RuleContext<'_>,
    accept: fn(NaiveDateTime, NaiveDateTime) -> bool,
) -> bool {
    let (Some(date), Some(param)) = (parse_date(value), params.first()) else {
        return false;
    };
    resolve_param(param, ctx).is_some_and(|bound| accept(date, bound))
}

fn date_placeholder(params: &[String], ctx: &RuleContext<'_>) -> Vec<(&'static str, String)> {
    let param = params.first().map_or("", String::as_str);
    let literal = parse_date_str(param).is_some()
        || matches!(param, "now" | "today" | "tomorrow" | "yesterday");
    let shown = if literal {
        param.to_owned()
    } else {
        ctx.attribute_of(param)
    };
    vec![("date", shown)]
}

crate::rule! {
    /// Base type: the value is a date.
    pub DateType => "The :attribute field must be a valid date.";
    check(value) { parse_date(value).is_some() }
}

crate::rule! {
    /// `before:date`
    pub Before => "The :attribute field must be a date before :date.";
    check(value, params, ctx) { Ok(compare(value, params, ctx, |d, b| d < b)) }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { date_placeholder(params, ctx) }
}

crate::rule! {
    /// `after:date`
    pub After => "The :attribute field must be a date after :date.";
    check(value, params, ctx) { Ok(compare(value, params, ctx, |d, b| d > b)) }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { date_placeholder(params, ctx) }
}

crate::rule! {
    /// `before_or_equal:date`
    pub BeforeOrEqual => "The :attribute field must be a date before or equal to :date.";
    check(value, params, ctx) { Ok(compare(value, params, ctx, |d, b| d <= b)) }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { date_placeholder(params, ctx) }
}

crate::rule! {
    /// `after_or_equal:date`
    pub AfterOrEqual => "The :attribute field must be a date after or equal to :date.";
    check(value, params, ctx) { Ok(compare(value, params, ctx, |d, b| d >= b)) }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { date_placeholder(params, ctx) }
}

crate::rule! {
    /// `between:start,end`: inclusive.
    pub Between => "The :attribute field must be a date between :start and :end.";
    check(value, params, ctx) {
        let bounds = (resolve_param(&params[0], ctx), resolve_param(&params[1], ctx));
        Ok(match (parse_date(value), bounds) {
            (Some(date), (Some(start), Some(end))) => (start..=end).contains(&date),
            _ => false,
        })
    }
    params(params) { require_params(params, 2) }
    placeholders(params, ctx) {
        vec![("start", params[0].clone()), ("end", params[1].clone())]
    }
}

crate::rule! {
    /// `format:<strftime>`: the string parses with the given chrono format.
    pub Format => "The :attribute field must match the format :format.";
    check(value, params, ctx) {
        let format = params[0].as_str();
        Ok(value.as_str().is_some_and(|s| {
            NaiveDateTime::parse_from_str(s, format).is_ok()
                || NaiveDate::parse_from_str(s, format).is_ok()
                || NaiveTime::parse_from_str(s, format).is_ok()
        }))
    }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("format", params[0].clone())] }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::{Schema, Validator};

    #[rstest]
    #[case(json!("2024-02-29"))]
    #[case(json!("2024-02-29 10:30:00"))]
    #[case(json!("2024-02-29T10:30:00"))]
    #[case(json!("2024-02-29T10:30:00+02:00"))]
    #[case(json!(1_709_200_000_000_i64))]
    fn parses_supported_inputs(#[case] value: Value) {
        assert!(parse_date(&value).is_some(), "{value}");
    }

    #[rstest]
    #[case(json!("2023-02-29"))]
    #[case(json!("tomorrow-ish"))]
    #[case(json!(true))]
    fn rejects_other_inputs(#[case] value: Value) {
        assert!(parse_date(&value).is_none(), "{value}");
    }

    #[rstest]
    #[case(json!("2024-01-01"), "date|before:2024-06-01", true)]
    #[case(json!("2024-07-01"), "date|before:2024-06-01", false)]
    #[case(json!("2024-06-01"), "date|before_or_equal:2024-06-01", true)]
    #[case(json!("2024-06-01"), "date|after:2024-06-01", false)]
    #[case(json!("2024-06-01"), "date|after_or_equal:2024-06-01", true)]
    #[case(json!("2024-03-15"), "date|between:2024-01-01,2024-12-31", true)]
    #[case(json!("2025-03-15"), "date|between:2024-01-01,2024-12-31", false)]
    #[case(json!("2000-01-01"), "date|before:today", true)]
    #[case(json!("15/03/2024"), "format:%d/%m/%Y", true)]
    #[case(json!("2024-03-15"), "format:%d/%m/%Y", false)]
    fn date_rules(#[case] value: Value, #[case] rules: &str, #[case] valid: bool) {
        let result = Validator::new()
            .validate_blocking(&json!({ "day": value }), &Schema::new().field("day", rules))
            .unwrap();
        assert_eq!(result.is_valid, valid, "{rules}");
    }

    #[test]
    fn compares_against_other_fields() {
        let schema = Schema::new()
            .field("starts_at", "required|date")
            .field("ends_at", "required|date|after:starts_at");
        let result = Validator::new()
            .validate_blocking(
                &json!({ "starts_at": "2024-05-02", "ends_at": "2024-05-01" }),
                &schema,
            )
            .unwrap();
        assert_eq!(
            result.errors.messages("ends_at"),
            ["The ends at field must be a date after starts at."]
        );
    }
}
