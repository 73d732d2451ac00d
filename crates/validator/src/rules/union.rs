//! `union`: the value must satisfy at least one of several rule sets.
//!
//! Parameters are a JSON array of rule sets followed by an optional
//! `stop_on_first_pass` flag (default `true`). Each set is either a
//! pipe-delimited string or an array of rule tokens:
//!
//! ```text
//! union:[["string","email"],"number|between:1,5"],false
//! ```
//!
//! Every set runs in bail mode against the same value. The union is implicit
//! so that sets containing presence rules see absent values; it runs after
//! the rest of the chain.

use serde_json::Value;

use super::require_params;
use crate::context::RuleContext;
use crate::error::ValidatorError;
use crate::registry::{RuleCheck, RuleHandler, Verdict};
use crate::rule::{Rule, RulePriority, RuleSource};

/// One alternative rule set, with the text shown in messages.
#[derive(Debug, Clone)]
struct RuleSet {
    rules: Vec<Rule>,
    display: String,
}

fn parse_sets(param: &str) -> Result<Vec<RuleSet>, String> {
    let value: Value = serde_json::from_str(param)
        .map_err(|err| format!("union rule sets are not valid JSON: {err}"))?;
    let Value::Array(sets) = value else {
        return Err("union rule sets must be a JSON array".to_owned());
    };

    sets.iter()
        .map(|set| {
            let tokens: Vec<String> = match set {
                Value::String(text) => text
                    .to_rules()
                    .map_err(|err| err.to_string())?
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(str::to_owned)
                            .ok_or_else(|| format!("union rule tokens must be strings, got {item}"))
                    })
                    .collect::<Result<_, _>>()?,
                other => {
                    return Err(format!(
                        "union rule set must be a string or an array, got {other}"
                    ));
                }
            };
            let rules = tokens.as_slice().to_rules().map_err(|err| err.to_string())?;
            Ok(RuleSet {
                display: tokens.join("|"),
                rules,
            })
        })
        .collect()
}

fn parse_flag(params: &[String]) -> Result<bool, String> {
    match params.get(1).map(String::as_str) {
        None | Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(format!("stop_on_first_pass must be `true` or `false`, got `{other}`")),
    }
}

/// Passes when any rule set passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Union;

impl RuleHandler for Union {
    fn check<'a>(
        &'a self,
        _value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        let sets = parse_sets(params.first().map_or("", String::as_str))
            .map_err(|reason| ctx.error(reason))?;
        let stop_on_first_pass = parse_flag(params).map_err(|reason| ctx.error(reason))?;
        if sets.is_empty() {
            return Ok(RuleCheck::fail());
        }

        Ok(RuleCheck::deferred(async move {
            let mut matched = false;
            for set in &sets {
                // An empty set cannot be satisfied.
                if set.rules.is_empty() {
                    continue;
                }
                if ctx.passes(&set.rules).await? {
                    matched = true;
                    if stop_on_first_pass {
                        break;
                    }
                }
            }
            if matched {
                Ok(Verdict::Pass)
            } else {
                let formats = sets
                    .iter()
                    .map(|set| set.display.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(Verdict::FailWithDetails(vec![("formats", formats)]))
            }
        }))
    }

    fn implicit(&self) -> bool {
        true
    }

    fn priority(&self) -> RulePriority {
        RulePriority::LOW
    }

    fn validate_params(&self, params: &[String]) -> Result<(), String> {
        require_params(params, 1)?;
        parse_sets(&params[0])?;
        parse_flag(params).map(drop)
    }

    fn fallback_message(&self) -> &str {
        "The :attribute field must match one of the following formats: :formats."
    }
}
