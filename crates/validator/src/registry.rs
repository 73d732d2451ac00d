//! Rule registry: the mapping from rule names to handlers.
//!
//! The registry is an explicit value. It is built once (usually through
//! [`RuleRegistry::with_builtins`]), extended at configuration time, and then
//! only read while validations run. Mutation requires `&mut`, so a registry
//! borrowed by an in-flight validation cannot be changed underneath it.
//!
//! Name resolution order, see [`RuleRegistry::resolve`]:
//!
//! 1. `custom:<name>` dispatches through the custom table;
//! 2. exact match in the base table;
//! 3. the additional table of the chain's base type;
//! 4. a scan of every additional table, in registration order.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::context::RuleContext;
use crate::error::ValidatorError;
use crate::rule::{BaseType, Rule, RuleKind, RulePriority};
use crate::rules::custom::CustomRule;

/// Extra placeholder values a handler contributes to its message.
pub type Placeholders = Vec<(&'static str, String)>;

// ============================================================================
// VERDICT & CHECK
// ============================================================================

/// Outcome of one rule invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The rule is satisfied.
    Pass,
    /// The rule failed; the handler's message is rendered.
    Fail,
    /// The rule failed and computed extra placeholders while checking.
    FailWithDetails(Placeholders),
    /// The rule failed and supplies its own message template.
    FailWithMessage(String),
    /// The rule is satisfied and the rest of the chain is skipped.
    Halt,
}

impl Verdict {
    /// True for every failing variant.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Fail | Self::FailWithDetails(_) | Self::FailWithMessage(_)
        )
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

/// Result of [`RuleHandler::check`]: either settled already or still running.
pub enum RuleCheck<'a> {
    /// The verdict is known.
    Immediate(Verdict),
    /// The verdict is produced by a future the engine awaits.
    Deferred(BoxFuture<'a, Result<Verdict, ValidatorError>>),
}

impl<'a> RuleCheck<'a> {
    /// An immediate pass.
    #[must_use]
    pub const fn pass() -> Self {
        Self::Immediate(Verdict::Pass)
    }

    /// An immediate failure.
    #[must_use]
    pub const fn fail() -> Self {
        Self::Immediate(Verdict::Fail)
    }

    /// Wraps a future producing the verdict.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<Verdict, ValidatorError>> + Send + 'a,
    {
        Self::Deferred(Box::pin(future))
    }

    /// Waits for the verdict.
    pub async fn settle(self) -> Result<Verdict, ValidatorError> {
        match self {
            Self::Immediate(verdict) => Ok(verdict),
            Self::Deferred(future) => future.await,
        }
    }
}

impl From<bool> for RuleCheck<'_> {
    fn from(passed: bool) -> Self {
        Self::Immediate(Verdict::from(passed))
    }
}

impl From<Verdict> for RuleCheck<'_> {
    fn from(verdict: Verdict) -> Self {
        Self::Immediate(verdict)
    }
}

impl fmt::Debug for RuleCheck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(verdict) => f.debug_tuple("Immediate").field(verdict).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

// ============================================================================
// HANDLER TRAIT
// ============================================================================

/// A rule implementation.
///
/// `check` receives the (coerced) field value, the rule's bound parameters
/// and the ambient [`RuleContext`]. Non-implicit handlers are only called for
/// present values; `value` is `None` only for implicit handlers.
///
/// Errors returned from `check` are not validation failures: they abort the
/// whole validation call. Expected failure conditions must be reported as a
/// failing [`Verdict`].
pub trait RuleHandler: Send + Sync {
    /// Checks a value.
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError>;

    /// Implicit handlers run even when the value is absent.
    fn implicit(&self) -> bool {
        false
    }

    /// Position of the rule within its chain.
    fn priority(&self) -> RulePriority {
        RulePriority::NORMAL
    }

    /// Validates parameters when the chain is compiled.
    fn validate_params(&self, params: &[String]) -> Result<(), String> {
        let _ = params;
        Ok(())
    }

    /// Message used when no catalog provides a template.
    fn fallback_message(&self) -> &str {
        "The :attribute field is invalid."
    }

    /// Placeholder values for the message template.
    fn placeholders(&self, params: &[String], ctx: &RuleContext<'_>) -> Placeholders {
        let _ = (params, ctx);
        Placeholders::new()
    }

    /// Renders the failure message.
    fn message(&self, params: &[String], ctx: &RuleContext<'_>, extra: &[(&'static str, String)]) -> String {
        let mut placeholders = self.placeholders(params, ctx);
        placeholders.extend(extra.iter().cloned());
        ctx.render_message(self.fallback_message(), &placeholders)
    }
}

// ============================================================================
// CUSTOM OUTCOMES
// ============================================================================

/// What a custom predicate returns.
///
/// Predicates may return `bool`, `CustomOutcome`, or a string: a string is
/// a failure whose text overrides the rule's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomOutcome {
    /// Passed.
    Pass,
    /// Failed with the rule's configured message.
    Fail,
    /// Failed with this message template.
    Message(String),
}

impl From<bool> for CustomOutcome {
    fn from(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

impl From<String> for CustomOutcome {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for CustomOutcome {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<Option<String>> for CustomOutcome {
    fn from(message: Option<String>) -> Self {
        message.map_or(Self::Pass, Self::Message)
    }
}

impl From<CustomOutcome> for Verdict {
    fn from(outcome: CustomOutcome) -> Self {
        match outcome {
            CustomOutcome::Pass => Self::Pass,
            CustomOutcome::Fail => Self::Fail,
            CustomOutcome::Message(message) => Self::FailWithMessage(message),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// A handler together with how its name was resolved.
#[derive(Clone)]
pub struct ResolvedHandler {
    /// Resolution kind.
    pub kind: RuleKind,
    /// The handler.
    pub handler: Arc<dyn RuleHandler>,
}

impl fmt::Debug for ResolvedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHandler")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Name → handler tables.
///
/// Cloning is cheap (handlers are shared), which makes snapshots easy to take
/// before extending a registry.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    base: HashMap<String, Arc<dyn RuleHandler>>,
    additional: IndexMap<BaseType, HashMap<String, Arc<dyn RuleHandler>>>,
    custom: HashMap<String, Arc<dyn RuleHandler>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every builtin rule installed.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::rules::install(&mut registry);
        debug!(
            base = registry.base.len(),
            additional = registry.additional.values().map(HashMap::len).sum::<usize>(),
            "builtin rules registered"
        );
        registry
    }

    /// Inserts or overwrites a base rule.
    pub fn register(&mut self, name: impl Into<String>, handler: impl RuleHandler + 'static) {
        self.register_arc(name, Arc::new(handler));
    }

    /// Inserts or overwrites a base rule from a shared handler.
    pub fn register_arc(&mut self, name: impl Into<String>, handler: Arc<dyn RuleHandler>) {
        let name = name.into();
        if self.base.insert(name.clone(), handler).is_some() {
            debug!(rule = %name, "base rule overwritten");
        }
    }

    /// Inserts or overwrites a type-scoped additional rule.
    pub fn register_additional(
        &mut self,
        parent: BaseType,
        name: impl Into<String>,
        handler: impl RuleHandler + 'static,
    ) {
        self.additional
            .entry(parent)
            .or_default()
            .insert(name.into(), Arc::new(handler));
    }

    /// Inserts or overwrites a custom rule handler, reachable as
    /// `custom:<name>`.
    pub fn register_custom(&mut self, name: impl Into<String>, handler: impl RuleHandler + 'static) {
        let name = name.into();
        debug!(rule = %name, "custom rule registered");
        self.custom.insert(name, Arc::new(handler));
    }

    /// Registers a synchronous custom predicate.
    ///
    /// The predicate returns `bool`, a [`CustomOutcome`], or a string message
    /// (a failure whose text overrides the default message).
    ///
    /// ```rust,ignore
    /// registry.extend("even", |value, _params, _ctx| {
    ///     value.as_i64().is_some_and(|n| n % 2 == 0)
    /// });
    /// ```
    pub fn extend<F, R>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&Value, &[String], &RuleContext<'_>) -> R + Send + Sync + 'static,
        R: Into<CustomOutcome>,
    {
        let name = name.into();
        let rule = CustomRule::sync(name.clone(), predicate, None);
        self.register_custom(name, rule);
    }

    /// Registers a synchronous custom predicate with a message template.
    pub fn extend_with_message<F, R>(
        &mut self,
        name: impl Into<String>,
        predicate: F,
        message: impl Into<String>,
    ) where
        F: Fn(&Value, &[String], &RuleContext<'_>) -> R + Send + Sync + 'static,
        R: Into<CustomOutcome>,
    {
        let name = name.into();
        let rule = CustomRule::sync(name.clone(), predicate, Some(message.into()));
        self.register_custom(name, rule);
    }

    /// Registers an asynchronous custom predicate.
    ///
    /// The predicate receives owned copies of the value and the bound
    /// parameters, so the returned future may outlive the validation borrow.
    pub fn extend_async<F, Fut, R>(
        &mut self,
        name: impl Into<String>,
        predicate: F,
        message: Option<String>,
    ) where
        F: Fn(Value, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<CustomOutcome> + 'static,
    {
        let name = name.into();
        let rule = CustomRule::deferred(name.clone(), predicate, message);
        self.register_custom(name, rule);
    }

    /// True when `name` is a base rule or an additional rule of any type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.base.contains_key(name) || self.additional.values().any(|t| t.contains_key(name))
    }

    /// True when a custom rule named `name` is registered.
    #[must_use]
    pub fn contains_custom(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Names of the additional rules registered under `parent`, sorted.
    #[must_use]
    pub fn additional_rules(&self, parent: BaseType) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .additional
            .get(&parent)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Resolves a bare rule name to its handler.
    ///
    /// `custom` cannot be resolved by name alone; use [`resolve`](Self::resolve).
    pub fn get_handler(
        &self,
        name: &str,
        base_type: Option<BaseType>,
    ) -> Result<Arc<dyn RuleHandler>, ValidatorError> {
        self.resolve(&Rule::named(name), base_type)
            .map(|resolved| resolved.handler)
    }

    /// Resolves a rule to its handler.
    ///
    /// A dotted name such as `string.min` names its additional table
    /// explicitly and skips the other steps.
    pub fn resolve(
        &self,
        rule: &Rule,
        base_type: Option<BaseType>,
    ) -> Result<ResolvedHandler, ValidatorError> {
        let name = rule.name();

        if rule.is_custom() {
            let custom = rule.params().first().ok_or_else(|| {
                ValidatorError::invalid_definition(rule.to_string(), "custom rule requires a name")
            })?;
            return self
                .custom
                .get(custom)
                .map(|handler| ResolvedHandler {
                    kind: RuleKind::Custom {
                        name: custom.clone(),
                    },
                    handler: Arc::clone(handler),
                })
                .ok_or_else(|| ValidatorError::UnknownCustomRule {
                    name: custom.clone(),
                });
        }

        if let Some(handler) = self.base.get(name) {
            return Ok(ResolvedHandler {
                kind: RuleKind::Base,
                handler: Arc::clone(handler),
            });
        }

        if let Some((parent, child)) = name.split_once('.')
            && let Some(parent) = BaseType::from_name(parent)
        {
            return self
                .additional_handler(parent, child)
                .ok_or_else(|| ValidatorError::UnknownRule {
                    name: child.to_owned(),
                    base_type: Some(parent),
                });
        }

        if let Some(parent) = base_type
            && let Some(resolved) = self.additional_handler(parent, name)
        {
            return Ok(resolved);
        }

        self.additional
            .keys()
            .find_map(|parent| self.additional_handler(*parent, name))
            .ok_or_else(|| ValidatorError::UnknownRule {
                name: name.to_owned(),
                base_type,
            })
    }

    fn additional_handler(&self, parent: BaseType, name: &str) -> Option<ResolvedHandler> {
        self.additional
            .get(&parent)
            .and_then(|table| table.get(name))
            .map(|handler| ResolvedHandler {
                kind: RuleKind::Additional {
                    parent,
                    name: name.to_owned(),
                },
                handler: Arc::clone(handler),
            })
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut base: Vec<_> = self.base.keys().collect();
        base.sort_unstable();
        let mut custom: Vec<_> = self.custom.keys().collect();
        custom.sort_unstable();
        f.debug_struct("RuleRegistry")
            .field("base", &base)
            .field(
                "additional",
                &self
                    .additional
                    .keys()
                    .map(|parent| (parent, self.additional_rules(*parent)))
                    .collect::<Vec<_>>(),
            )
            .field("custom", &custom)
            .finish()
    }
}
