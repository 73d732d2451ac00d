//! Ambient information handed to every rule invocation.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::compiler::{CompiledChain, CompiledRule};
use crate::config::ValidatorConfig;
use crate::engine::Engine;
use crate::error::{BoxError, ValidatorError};
use crate::message::MessageRequest;
use crate::path;
use crate::registry::RuleRegistry;
use crate::rule::{BaseType, Rule, RuleKind};
use crate::schema::Schema;

/// Where a rule is running: the whole data, the field, the chain and the
/// rule itself.
pub struct RuleContext<'a> {
    pub(crate) engine: &'a Engine<'a>,
    pub(crate) data: &'a Value,
    pub(crate) schema: &'a Schema,
    pub(crate) pattern: &'a str,
    pub(crate) field: &'a str,
    pub(crate) value: Option<&'a Value>,
    pub(crate) chain: &'a CompiledChain,
    pub(crate) rule: &'a CompiledRule,
}

impl<'a> RuleContext<'a> {
    /// The full (original) data being validated.
    #[must_use]
    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// Concrete path of the field, e.g. `items.2.qty`.
    #[must_use]
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// Schema key the field was resolved from, e.g. `items.*.qty`.
    #[must_use]
    pub fn pattern(&self) -> &'a str {
        self.pattern
    }

    /// The (coerced) value under validation.
    #[must_use]
    pub fn value(&self) -> Option<&'a Value> {
        self.value
    }

    /// The schema being validated.
    #[must_use]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &'a ValidatorConfig {
        self.engine.config()
    }

    /// The registry rules are resolved against.
    #[must_use]
    pub fn registry(&self) -> &'a RuleRegistry {
        self.engine.registry()
    }

    /// Base type of the field's chain.
    #[must_use]
    pub fn base_type(&self) -> Option<BaseType> {
        self.chain.base_type()
    }

    /// The field's compiled chain.
    #[must_use]
    pub fn chain(&self) -> &'a CompiledChain {
        self.chain
    }

    /// The rule being run.
    #[must_use]
    pub fn rule(&self) -> &'a CompiledRule {
        self.rule
    }

    /// Message key of the rule being run.
    #[must_use]
    pub fn rule_name(&self) -> &'a str {
        self.rule.message_key()
    }

    /// Reads another field of the original data. Wildcards in `path` are
    /// aligned to the indices of the current field.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        path::lookup(self.data, &path::align(path, self.field))
    }

    /// Like [`lookup`](Self::lookup), with the trimming and empty-string
    /// conversion the engine applies to the field under validation.
    #[must_use]
    pub fn lookup_coerced(&self, path: &str) -> Option<Cow<'a, Value>> {
        crate::engine::coerce(self.lookup(path), self.config())
    }

    /// Renders the catalog template for this rule, or `fallback`.
    #[must_use]
    pub fn render_message(&self, fallback: &str, placeholders: &[(&str, String)]) -> String {
        self.engine
            .formatter()
            .render(&self.message_request(), fallback, placeholders)
    }

    /// Renders a template supplied by the rule itself.
    #[must_use]
    pub fn render_custom(&self, template: &str, placeholders: &[(&str, String)]) -> String {
        self.engine
            .formatter()
            .render_custom(&self.message_request(), template, placeholders)
    }

    /// Display name of the field.
    #[must_use]
    pub fn attribute(&self) -> String {
        self.engine.formatter().attribute(&self.message_request())
    }

    /// Display name of another field, for `:other`-style placeholders.
    #[must_use]
    pub fn attribute_of(&self, other: &str) -> String {
        let field = path::align(other, self.field);
        self.engine.formatter().attribute(&MessageRequest {
            field: &field,
            pattern: other,
            ..self.message_request()
        })
    }

    /// Builds a rule execution error for this rule and field.
    pub fn error(&self, source: impl Into<BoxError>) -> ValidatorError {
        ValidatorError::rule_execution(self.rule_name(), self.field, source)
    }

    /// Runs `rules` against the current value as a bail-mode sub-chain and
    /// reports whether every rule passed.
    pub async fn passes(&self, rules: &[Rule]) -> Result<bool, ValidatorError> {
        let chain = self.engine.compiler().compile(self.pattern, rules)?;
        let failures = self
            .engine
            .run_chain(
                crate::engine::ChainRun {
                    data: self.data,
                    schema: self.schema,
                    pattern: self.pattern,
                    field: self.field,
                    value: self.value,
                    chain: &chain,
                },
                true,
            )
            .await?;
        Ok(failures.is_empty())
    }

    /// Validates `value` against a nested schema with the current
    /// configuration.
    pub async fn validate_nested(
        &self,
        value: &Value,
        schema: &Schema,
    ) -> Result<crate::ValidationResult, ValidatorError> {
        self.engine.run(value, schema).await
    }

    pub(crate) fn message_request(&self) -> MessageRequest<'a> {
        let scope = match self.rule.kind() {
            RuleKind::Additional { parent, .. } => Some(parent.message_scope()),
            _ => self.base_type().map(BaseType::message_scope),
        };
        MessageRequest {
            field: self.field,
            pattern: self.pattern,
            rule: self.rule.message_key(),
            scope,
            value: self.value,
        }
    }
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("field", &self.field)
            .field("pattern", &self.pattern)
            .field("rule", &self.rule.message_key())
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
