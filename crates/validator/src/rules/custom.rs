//! Handlers behind [`RuleRegistry::extend`](crate::RuleRegistry::extend) and
//! [`RuleRegistry::extend_async`](crate::RuleRegistry::extend_async).

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::context::RuleContext;
use crate::error::ValidatorError;
use crate::registry::{CustomOutcome, RuleCheck, RuleHandler, Verdict};

type SyncPredicate =
    Box<dyn Fn(&Value, &[String], &RuleContext<'_>) -> CustomOutcome + Send + Sync>;
type AsyncPredicate =
    Box<dyn Fn(Value, Vec<String>) -> BoxFuture<'static, CustomOutcome> + Send + Sync>;

enum Predicate {
    Sync(SyncPredicate),
    Deferred(AsyncPredicate),
}

/// A user predicate registered under `custom:<name>`.
pub(crate) struct CustomRule {
    name: String,
    predicate: Predicate,
    message: Option<String>,
}

impl CustomRule {
    pub(crate) fn sync<F, R>(name: String, predicate: F, message: Option<String>) -> Self
    where
        F: Fn(&Value, &[String], &RuleContext<'_>) -> R + Send + Sync + 'static,
        R: Into<CustomOutcome>,
    {
        let predicate: SyncPredicate =
            Box::new(move |value, params, ctx| predicate(value, params, ctx).into());
        Self {
            name,
            predicate: Predicate::Sync(predicate),
            message,
        }
    }

    pub(crate) fn deferred<F, Fut, R>(name: String, predicate: F, message: Option<String>) -> Self
    where
        F: Fn(Value, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<CustomOutcome> + 'static,
    {
        let predicate: AsyncPredicate =
            Box::new(move |value, params| predicate(value, params).map(Into::into).boxed());
        Self {
            name,
            predicate: Predicate::Deferred(predicate),
            message,
        }
    }
}

impl RuleHandler for CustomRule {
    fn check<'a>(
        &'a self,
        value: Option<&'a Value>,
        params: &'a [String],
        ctx: &'a RuleContext<'a>,
    ) -> Result<RuleCheck<'a>, ValidatorError> {
        let Some(value) = value else {
            return Ok(RuleCheck::pass());
        };
        Ok(match &self.predicate {
            Predicate::Sync(predicate) => {
                RuleCheck::Immediate(Verdict::from(predicate(value, params, ctx)))
            }
            Predicate::Deferred(predicate) => {
                let future = predicate(value.clone(), params.to_vec());
                RuleCheck::deferred(async move { Ok(Verdict::from(future.await)) })
            }
        })
    }

    fn fallback_message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or("The :attribute field is invalid.")
    }

    fn placeholders(&self, params: &[String], _ctx: &RuleContext<'_>) -> Vec<(&'static str, String)> {
        vec![("params", params.join(", "))]
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.predicate {
            Predicate::Sync(_) => "sync",
            Predicate::Deferred(_) => "async",
        };
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("message", &self.message)
            .finish()
    }
}
