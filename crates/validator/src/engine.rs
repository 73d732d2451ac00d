//! The validation engine: compiles a schema, resolves fields, runs chains and
//! collects failures.

use std::borrow::Cow;

use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, trace};

use crate::compiler::{CompiledChain, Compiler};
use crate::config::ValidatorConfig;
use crate::context::RuleContext;
use crate::error::ValidatorError;
use crate::message::{MessageCatalog, MessageFormatter};
use crate::path;
use crate::registry::{RuleRegistry, Verdict};
use crate::report::{ErrorBag, FieldFailure, ValidationResult};
use crate::schema::Schema;

/// One field instance to run a chain against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChainRun<'r> {
    pub(crate) data: &'r Value,
    pub(crate) schema: &'r Schema,
    pub(crate) pattern: &'r str,
    pub(crate) field: &'r str,
    pub(crate) value: Option<&'r Value>,
    pub(crate) chain: &'r CompiledChain,
}

/// Per-call engine state: the registry, the config and the message sources.
#[derive(Debug)]
pub(crate) struct Engine<'v> {
    registry: &'v RuleRegistry,
    config: &'v ValidatorConfig,
    formatter: MessageFormatter<'v>,
}

impl<'v> Engine<'v> {
    pub(crate) fn new(
        registry: &'v RuleRegistry,
        config: &'v ValidatorConfig,
        locale: Option<&'v MessageCatalog>,
    ) -> Self {
        Self {
            registry,
            config,
            formatter: MessageFormatter::new(&config.messages, locale),
        }
    }

    pub(crate) fn registry(&self) -> &'v RuleRegistry {
        self.registry
    }

    pub(crate) fn config(&self) -> &'v ValidatorConfig {
        self.config
    }

    pub(crate) fn formatter(&self) -> &MessageFormatter<'v> {
        &self.formatter
    }

    pub(crate) fn compiler(&self) -> Compiler<'v> {
        Compiler::new(self.registry)
    }

    /// Validates `data` against `schema`.
    ///
    /// Every chain is compiled before any rule runs, so configuration errors
    /// surface without partial results. Field instances run concurrently;
    /// the report keeps schema order, then data order.
    pub(crate) async fn run(
        &self,
        data: &Value,
        schema: &Schema,
    ) -> Result<ValidationResult, ValidatorError> {
        let compiler = self.compiler();
        let chains = schema
            .iter()
            .map(|(pattern, rules)| Ok((pattern, compiler.compile(pattern, rules)?)))
            .collect::<Result<Vec<_>, ValidatorError>>()?;

        let mut output = data.clone();
        let mut instances = Vec::new();
        for (pattern, chain) in &chains {
            for field in path::resolve(data, pattern) {
                let value = coerce(field.value, self.config);
                if let Some(Cow::Owned(coerced)) = &value {
                    path::assign(&mut output, &field.path, coerced.clone());
                }
                instances.push((*pattern, chain, field.path, value));
            }
        }
        debug!(
            fields = chains.len(),
            instances = instances.len(),
            "schema resolved"
        );

        let bail = self.config.bail;
        let outcomes = try_join_all(instances.iter().map(|(pattern, chain, field, value)| {
            self.run_chain(
                ChainRun {
                    data,
                    schema,
                    pattern,
                    field,
                    value: value.as_deref(),
                    chain,
                },
                bail,
            )
        }))
        .await?;

        let mut errors = ErrorBag::new();
        for ((_, _, field, _), failures) in instances.iter().zip(outcomes) {
            if !failures.is_empty() {
                debug!(field = %field, failures = failures.len(), "field failed");
                errors.record(field.clone(), failures);
            }
        }

        Ok(ValidationResult {
            is_valid: errors.is_empty(),
            data: output,
            errors,
            response_type: self.config.response_type,
        })
    }

    /// Runs one chain against one field instance and returns its failures.
    ///
    /// Non-implicit rules are skipped when the value is absent or null. A
    /// halting rule ends the chain as passed; with `bail`, the first failure
    /// ends it.
    pub(crate) async fn run_chain(
        &self,
        run: ChainRun<'_>,
        bail: bool,
    ) -> Result<Vec<FieldFailure>, ValidatorError> {
        let present = run.value.is_some_and(|v| !v.is_null());
        let mut failures = Vec::new();

        for rule in run.chain.rules() {
            let handler = rule.handler();
            if !present && !handler.implicit() {
                continue;
            }

            let ctx = RuleContext {
                engine: self,
                data: run.data,
                schema: run.schema,
                pattern: run.pattern,
                field: run.field,
                value: run.value,
                chain: run.chain,
                rule,
            };
            let verdict = handler.check(run.value, rule.params(), &ctx)?.settle().await?;
            trace!(field = run.field, rule = rule.message_key(), ?verdict, "rule checked");

            let message = match verdict {
                Verdict::Pass => continue,
                Verdict::Halt => break,
                Verdict::Fail => handler.message(rule.params(), &ctx, &[]),
                Verdict::FailWithDetails(extra) => handler.message(rule.params(), &ctx, &extra),
                Verdict::FailWithMessage(template) => {
                    ctx.render_custom(&template, &handler.placeholders(rule.params(), &ctx))
                }
            };
            failures.push(FieldFailure {
                rule: rule.message_key().to_owned(),
                message,
            });
            if bail {
                break;
            }
        }

        Ok(failures)
    }
}

/// Applies `auto_trim` and `convert_empty_string_to_null` to a string value.
pub(crate) fn coerce<'a>(value: Option<&'a Value>, config: &ValidatorConfig) -> Option<Cow<'a, Value>> {
    let value = value?;
    let Value::String(text) = value else {
        return Some(Cow::Borrowed(value));
    };

    let trimmed = if config.auto_trim { text.trim() } else { text.as_str() };
    if config.convert_empty_string_to_null && trimmed.is_empty() {
        return Some(Cow::Owned(Value::Null));
    }
    if trimmed.len() == text.len() {
        Some(Cow::Borrowed(value))
    } else {
        Some(Cow::Owned(Value::String(trimmed.to_owned())))
    }
}
