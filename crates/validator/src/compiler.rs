//! Compiles a field's rule definition into an executable chain.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::ValidatorError;
use crate::registry::{RuleHandler, RuleRegistry};
use crate::rule::{BaseType, Rule, RuleKind, RulePriority, RuleSource};

/// A rule bound to its handler.
#[derive(Clone)]
pub struct CompiledRule {
    rule: Rule,
    kind: RuleKind,
    handler: Arc<dyn RuleHandler>,
    priority: RulePriority,
}

impl CompiledRule {
    /// The rule as written.
    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// How the name was resolved.
    #[must_use]
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// The handler.
    #[must_use]
    pub fn handler(&self) -> &dyn RuleHandler {
        self.handler.as_ref()
    }

    /// Execution priority.
    #[must_use]
    pub fn priority(&self) -> RulePriority {
        self.priority
    }

    /// Parameters passed to the handler. Custom rules drop their own name.
    #[must_use]
    pub fn params(&self) -> &[String] {
        match self.kind {
            RuleKind::Custom { .. } => self.rule.params().get(1..).unwrap_or_default(),
            _ => self.rule.params(),
        }
    }

    /// Key used for message lookup and error reports.
    #[must_use]
    pub fn message_key(&self) -> &str {
        match &self.kind {
            RuleKind::Base => self.rule.name(),
            RuleKind::Additional { name, .. } | RuleKind::Custom { name } => name,
        }
    }
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("rule", &self.rule)
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// The ordered, resolved rules of one field.
#[derive(Debug, Clone)]
pub struct CompiledChain {
    base_type: Option<BaseType>,
    rules: Vec<CompiledRule>,
}

impl CompiledChain {
    /// Base type declared by the chain, if any.
    #[must_use]
    pub fn base_type(&self) -> Option<BaseType> {
        self.base_type
    }

    /// Rules in execution order.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// First rule with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|rule| rule.rule.name() == name)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True for a chain without rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Resolves rule definitions against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Compiler<'r> {
    /// Creates a compiler over `registry`.
    #[must_use]
    pub const fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Compiles the rule definition of `field`.
    ///
    /// Fails when the definition cannot be parsed, declares two base types,
    /// names an unknown rule, or passes parameters a handler rejects.
    pub fn compile<S>(&self, field: &str, source: &S) -> Result<CompiledChain, ValidatorError>
    where
        S: RuleSource + ?Sized,
    {
        let rules = source.to_rules()?;

        let mut base_type = None;
        for ty in rules.iter().filter_map(Rule::base_type) {
            if let Some(first) = base_type {
                return Err(ValidatorError::ConflictingDataType {
                    field: field.to_owned(),
                    first,
                    second: ty,
                });
            }
            base_type = Some(ty);
        }

        let mut compiled = rules
            .into_iter()
            .map(|rule| self.bind(rule, base_type))
            .collect::<Result<Vec<_>, _>>()?;
        compiled.sort_by_key(|rule| Reverse(rule.priority));

        trace!(field, ?base_type, rules = compiled.len(), "chain compiled");
        Ok(CompiledChain {
            base_type,
            rules: compiled,
        })
    }

    fn bind(&self, rule: Rule, base_type: Option<BaseType>) -> Result<CompiledRule, ValidatorError> {
        let resolved = self.registry.resolve(&rule, base_type)?;
        let priority = resolved.handler.priority();
        let compiled = CompiledRule {
            rule,
            kind: resolved.kind,
            handler: resolved.handler,
            priority,
        };
        compiled
            .handler
            .validate_params(compiled.params())
            .map_err(|reason| ValidatorError::invalid_definition(compiled.rule.to_string(), reason))?;
        Ok(compiled)
    }
}
