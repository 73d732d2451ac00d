//! The `object` base type, nested shapes and key checks.

use serde_json::Value;

use super::require_params;
use crate::context::RuleContext;
use crate::error::ValidatorError;
use crate::path::WILDCARD;
use crate::registry::{RuleCheck, RuleHandler, Verdict};
use crate::schema::Schema;

fn parse_shape(param: &str) -> Result<Schema, String> {
    let value: Value =
        serde_json::from_str(param).map_err(|err| format!("shape is not valid JSON: {err}"))?;
    Schema::from_json(&value).map_err(|err| err.to_string())
}

crate::rule! {
    /// Base type: the value is an object.
    pub ObjectType => "The :attribute field must be an object.";
    check(value) { value.is_object() }
}

crate::rule! {
    /// `keys:a,b`: every listed key is present.
    pub Keys => "The :attribute field must contain the keys: :values.";
    check(value, params, ctx) {
        Ok(value.as_object().is_some_and(|map| params.iter().all(|key| map.contains_key(key))))
    }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}

// ============================================================================
// SHAPE
// ============================================================================

/// `shape:{"name":"required|string"}`: validates the object against a nested
/// schema. Nested failures are offered to the message as `:errors`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shape;

impl RuleHandler for Shape {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        let Some(value) = value.filter(|v| v.is_object()) else {
            return Ok(RuleCheck::fail());
        };
        let schema = parse_shape(params.first().map_or("", String::as_str))
            .map_err(|reason| ctx.error(reason))?;

        Ok(RuleCheck::deferred(async move {
            let nested = ctx.validate_nested(value, &schema).await.map_err(|source| {
                ValidatorError::SchemaShape {
                    field: ctx.field().to_owned(),
                    source: Box::new(source),
                }
            })?;
            if nested.is_valid {
                return Ok(Verdict::Pass);
            }
            let errors = nested
                .errors
                .iter()
                .flat_map(|(field, failures)| {
                    failures.iter().map(move |f| format!("{field}: {}", f.message))
                })
                .collect::<Vec<_>>()
                .join("; ");
            Ok(Verdict::FailWithDetails(vec![("errors", errors)]))
        }))
    }

    fn validate_params(&self, params: &[String]) -> Result<(), String> {
        require_params(params, 1)?;
        parse_shape(&params[0]).map(drop)
    }

    fn fallback_message(&self) -> &str {
        "The :attribute field does not match the expected shape (:errors)."
    }
}

// ============================================================================
// STRICT
// ============================================================================

/// `strict` / `strict:a,b`: rejects keys that are not declared.
///
/// Declared keys come from the parameters when given, else from a `shape`
/// rule in the same chain, else from the schema keys nested under this
/// field. A wildcard child allows every key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl Strict {
    fn allowed(params: &[String], ctx: &RuleContext<'_>) -> Result<Option<Vec<String>>, ValidatorError> {
        if !params.is_empty() {
            return Ok(Some(params.to_vec()));
        }
        let keys: Vec<String> = match ctx.chain().find("shape") {
            Some(shape) => {
                let param = shape.params().first().map_or("", String::as_str);
                let schema = parse_shape(param).map_err(|reason| ctx.error(reason))?;
                schema.child_keys("").into_iter().map(str::to_owned).collect()
            }
            None => ctx
                .schema()
                .child_keys(ctx.pattern())
                .into_iter()
                .map(str::to_owned)
                .collect(),
        };
        Ok((!keys.iter().any(|key| key == WILDCARD)).then_some(keys))
    }
}

impl RuleHandler for Strict {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        let Some(map) = value.and_then(Value::as_object) else {
            return Ok(RuleCheck::fail());
        };
        let Some(allowed) = Self::allowed(params, ctx)? else {
            return Ok(RuleCheck::pass());
        };

        let unexpected: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|key| !allowed.iter().any(|a| a == key))
            .collect();
        if unexpected.is_empty() {
            Ok(RuleCheck::pass())
        } else {
            Ok(Verdict::FailWithDetails(vec![("fields", unexpected.join(", "))]).into())
        }
    }

    fn fallback_message(&self) -> &str {
        "The :attribute field contains unexpected keys: :fields."
    }
}
