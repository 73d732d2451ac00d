//! Builtin rules.
//!
//! # Base registry
//!
//! - **Types**: `string`, `number`, `boolean`, `array`, `date`, `object`, `file`
//! - **Presence**: `required`, `required_if`, `required_unless`,
//!   `required_with`, `required_without`, `nullable`
//! - **Comparison**: `in`, `not_in`, `same`, `different`, `confirmed`,
//!   `accepted`, `declined`
//! - **Composition**: `union`, `custom:<name>`
//!
//! # Type-scoped rules
//!
//! Resolved under the chain's base type first (`min` means `string.min` in a
//! string chain and `number.min` in a number chain):
//!
//! - **string**: `min`, `max`, `length`, `between`, `email`, `url`, `uuid`,
//!   `alpha`, `alpha_num`, `alpha_dash`, `regex`, `starts_with`, `ends_with`,
//!   `includes`, `lowercase`, `uppercase`, `ip`, `json`
//! - **number**: `min`, `max`, `between`, `integer`, `positive`, `negative`,
//!   `multiple_of`, `decimal`
//! - **boolean**: `strict`
//! - **array**: `min`, `max`, `length`, `distinct`, `includes`
//! - **date**: `before`, `after`, `before_or_equal`, `after_or_equal`,
//!   `between`, `format`
//! - **object**: `shape`, `strict`, `keys`
//! - **file**: `min`, `max`, `mimes`, `types`

pub mod array;
pub mod boolean;
pub(crate) mod custom;
pub mod date;
pub mod file;
pub mod generic;
pub mod number;
pub mod object;
pub mod presence;
pub mod string;
pub mod union;

use serde_json::Value;

use crate::context::RuleContext;
use crate::error::ValidatorError;
use crate::registry::RuleRegistry;
use crate::rule::BaseType;

/// Installs every builtin rule.
pub(crate) fn install(registry: &mut RuleRegistry) {
    // Base types
    registry.register("string", string::StringType);
    registry.register("number", number::NumberType);
    registry.register("boolean", boolean::BooleanType);
    registry.register("array", array::ArrayType);
    registry.register("date", date::DateType);
    registry.register("object", object::ObjectType);
    registry.register("file", file::FileType);

    // Presence
    registry.register("required", presence::Required);
    registry.register("required_if", presence::RequiredIf);
    registry.register("required_unless", presence::RequiredUnless);
    registry.register("required_with", presence::RequiredWith);
    registry.register("required_without", presence::RequiredWithout);
    registry.register("nullable", presence::Nullable);

    // Comparison
    registry.register("in", generic::In);
    registry.register("not_in", generic::NotIn);
    registry.register("same", generic::Same);
    registry.register("different", generic::Different);
    registry.register("confirmed", generic::Confirmed);
    registry.register("accepted", generic::Accepted);
    registry.register("declined", generic::Declined);

    registry.register("union", union::Union);

    let s = BaseType::String;
    registry.register_additional(s, "min", string::Min);
    registry.register_additional(s, "max", string::Max);
    registry.register_additional(s, "length", string::Length);
    registry.register_additional(s, "between", string::Between);
    registry.register_additional(s, "email", string::Email);
    registry.register_additional(s, "url", string::Url);
    registry.register_additional(s, "uuid", string::Uuid);
    registry.register_additional(s, "alpha", string::Alpha);
    registry.register_additional(s, "alpha_num", string::AlphaNum);
    registry.register_additional(s, "alpha_dash", string::AlphaDash);
    registry.register_additional(s, "regex", string::Regex);
    registry.register_additional(s, "starts_with", string::StartsWith);
    registry.register_additional(s, "ends_with", string::EndsWith);
    registry.register_additional(s, "includes", string::Includes);
    registry.register_additional(s, "lowercase", string::Lowercase);
    registry.register_additional(s, "uppercase", string::Uppercase);
    registry.register_additional(s, "ip", string::Ip);
    registry.register_additional(s, "json", string::Json);

    let n = BaseType::Number;
    registry.register_additional(n, "min", number::Min);
    registry.register_additional(n, "max", number::Max);
    registry.register_additional(n, "between", number::Between);
    registry.register_additional(n, "integer", number::Integer);
    registry.register_additional(n, "positive", number::Positive);
    registry.register_additional(n, "negative", number::Negative);
    registry.register_additional(n, "multiple_of", number::MultipleOf);
    registry.register_additional(n, "decimal", number::Decimal);

    registry.register_additional(BaseType::Boolean, "strict", boolean::Strict);

    let a = BaseType::Array;
    registry.register_additional(a, "min", array::Min);
    registry.register_additional(a, "max", array::Max);
    registry.register_additional(a, "length", array::Length);
    registry.register_additional(a, "distinct", array::Distinct);
    registry.register_additional(a, "includes", array::Includes);

    let d = BaseType::Date;
    registry.register_additional(d, "before", date::Before);
    registry.register_additional(d, "after", date::After);
    registry.register_additional(d, "before_or_equal", date::BeforeOrEqual);
    registry.register_additional(d, "after_or_equal", date::AfterOrEqual);
    registry.register_additional(d, "between", date::Between);
    registry.register_additional(d, "format", date::Format);

    let o = BaseType::Object;
    registry.register_additional(o, "shape", object::Shape);
    registry.register_additional(o, "strict", object::Strict);
    registry.register_additional(o, "keys", object::Keys);

    let f = BaseType::File;
    registry.register_additional(f, "min", file::Min);
    registry.register_additional(f, "max", file::Max);
    registry.register_additional(f, "mimes", file::Mimes);
    registry.register_additional(f, "types", file::Types);
}

// ============================================================================
// PARAMETER HELPERS
// ============================================================================

/// Checks that at least `count` parameters are present.
pub fn require_params(params: &[String], count: usize) -> Result<(), String> {
    if params.len() >= count {
        Ok(())
    } else {
        Err(format!(
            "expects at least {count} parameter{}, got {}",
            if count == 1 { "" } else { "s" },
            params.len()
        ))
    }
}

/// Checks that the first `count` parameters are numbers.
pub fn require_numbers(params: &[String], count: usize) -> Result<(), String> {
    require_params(params, count)?;
    params[..count].iter().try_for_each(|param| {
        param
            .parse::<f64>()
            .map(drop)
            .map_err(|_| format!("parameter `{param}` is not a number"))
    })
}

/// Reads parameter `idx` as a number.
pub fn number_param(
    ctx: &RuleContext<'_>,
    params: &[String],
    idx: usize,
) -> Result<f64, ValidatorError> {
    let param = params
        .get(idx)
        .ok_or_else(|| ctx.error(format!("missing parameter {idx}")))?;
    param
        .parse()
        .map_err(|_| ctx.error(format!("parameter `{param}` is not a number")))
}

/// Text form of a scalar for comparisons against string parameters.
///
/// Strings compare bare, `null`, booleans and numbers by their JSON text.
/// Arrays and objects have no text form.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// True for absent, `null`, blank strings, and empty arrays or objects.
#[must_use]
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}
