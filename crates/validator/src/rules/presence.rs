//! Presence rules. All of them are implicit: they run for absent values.

use serde_json::Value;

use super::{is_blank, require_params, scalar_text};
use crate::context::RuleContext;
use crate::error::ValidatorError;
use crate::registry::{Placeholders, RuleCheck, RuleHandler, Verdict};

fn is_absent(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}

/// Verdict of a conditionally required field: when required it must not be
/// blank; when not required an absent value ends the chain.
fn conditional(required: bool, value: Option<&Value>) -> Verdict {
    if required {
        Verdict::from(!is_blank(value))
    } else if is_absent(value) {
        Verdict::Halt
    } else {
        Verdict::Pass
    }
}

/// True when the field named by `params[0]` holds one of `params[1..]`.
fn other_matches(params: &[String], ctx: &RuleContext<'_>) -> bool {
    let Some((other, values)) = params.split_first() else {
        return false;
    };
    ctx.lookup(other)
        .and_then(scalar_text)
        .is_some_and(|text| values.iter().any(|v| *v == text))
}

fn other_placeholders(params: &[String], ctx: &RuleContext<'_>) -> Placeholders {
    let (other, values) = params
        .split_first()
        .map_or(("", &[][..]), |(other, values)| (other.as_str(), values));
    vec![("other", ctx.attribute_of(other)), ("values", values.join(", "))]
}

fn fields_placeholder(params: &[String], ctx: &RuleContext<'_>) -> Placeholders {
    let names: Vec<String> = params.iter().map(|p| ctx.attribute_of(p)).collect();
    vec![("values", names.join(" / "))]
}

// ============================================================================
// REQUIRED
// ============================================================================

/// The value must be present and not blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl RuleHandler for Required {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        _params: &'a [String],
        _ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        Ok(RuleCheck::from(!is_blank(value)))
    }

    fn implicit(&self) -> bool {
        true
    }

    fn fallback_message(&self) -> &str {
        "The :attribute field is required."
    }
}

/// `required_if:other,v1,v2`: required when `other` equals one of the values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredIf;

impl RuleHandler for RequiredIf {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        Ok(conditional(other_matches(params, ctx), value).into())
    }

    fn implicit(&self) -> bool {
        true
    }

    fn validate_params(&self, params: &[String]) -> Result<(), String> {
        require_params(params, 2)
    }

    fn fallback_message(&self) -> &str {
        "The :attribute field is required when :other is :values."
    }

    fn placeholders(&self, params: &[String], ctx: &RuleContext<'_>) -> Placeholders {
        other_placeholders(params, ctx)
    }
}

/// `required_unless:other,v1,v2`: required unless `other` equals one of the
/// values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredUnless;

impl RuleHandler for RequiredUnless {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        Ok(conditional(!other_matches(params, ctx), value).into())
    }

    fn implicit(&self) -> bool {
        true
    }

    fn validate_params(&self, params: &[String]) -> Result<(), String> {
        require_params(params, 2)
    }

    fn fallback_message(&self) -> &str {
        "The :attribute field is required unless :other is in :values."
    }

    fn placeholders(&self, params: &[String], ctx: &RuleContext<'_>) -> Placeholders {
        other_placeholders(params, ctx)
    }
}

/// `required_with:a,b`: required when any of the fields is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredWith;

impl RuleHandler for RequiredWith {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        let required = params.iter().any(|p| !is_blank(ctx.lookup(p)));
        Ok(conditional(required, value).into())
    }

    fn implicit(&self) -> bool {
        true
    }

    fn validate_params(&self, params: &[String]) -> Result<(), String> {
        require_params(params, 1)
    }

    fn fallback_message(&self) -> &str {
        "The :attribute field is required when :values is present."
    }

    fn placeholders(&self, params: &[String], ctx: &RuleContext<'_>) -> Placeholders {
        fields_placeholder(params, ctx)
    }
}

/// `required_without:a,b`: required when any of the fields is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredWithout;

impl RuleHandler for RequiredWithout {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        let required = params.iter().any(|p| is_blank(ctx.lookup(p)));
        Ok(conditional(required, value).into())
    }

    fn implicit(&self) -> bool {
        true
    }

    fn validate_params(&self, params: &[String]) -> Result<(), String> {
        require_params(params, 1)
    }

    fn fallback_message(&self) -> &str {
        "The :attribute field is required when :values is not present."
    }

    fn placeholders(&self, params: &[String], ctx: &RuleContext<'_>) -> Placeholders {
        fields_placeholder(params, ctx)
    }
}

/// Absent or `null` values pass and end the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nullable;

impl RuleHandler for Nullable {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        _params: &'a [String],
        _ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        Ok(if is_absent(value) {
            Verdict::Halt.into()
        } else {
            RuleCheck::pass()
        })
    }

    fn implicit(&self) -> bool {
        true
    }
}
