//! Error types for schema and rule configuration problems.
//!
//! A rule returning `false` is never an error: it is recorded as a message in
//! the [`ValidationResult`](crate::ValidationResult). The variants below are
//! programmer/configuration errors that abort the whole validation call.

use std::borrow::Cow;

use crate::rule::BaseType;

/// Boxed source error carried by [`ValidatorError::RuleExecution`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal errors raised while compiling or executing a schema.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The schema references a rule name that is not registered.
    #[error("unknown rule `{name}`{}", base_type_suffix(.base_type))]
    UnknownRule {
        /// Rule name as written in the schema.
        name: String,
        /// Base type of the chain the rule was looked up under.
        base_type: Option<BaseType>,
    },

    /// A field declares more than one base-type rule.
    #[error("field `{field}` declares conflicting data types `{first}` and `{second}`")]
    ConflictingDataType {
        /// Schema key of the offending field.
        field: String,
        /// Base type declared first.
        first: BaseType,
        /// Base type that conflicts with it.
        second: BaseType,
    },

    /// `custom:<name>` references a custom rule that was never registered.
    #[error("unknown custom rule `{name}`")]
    UnknownCustomRule {
        /// Custom rule name.
        name: String,
    },

    /// A nested `object.shape` sub-validation failed with an error instead of
    /// producing a result.
    #[error("nested schema of `{field}` could not be validated: {source}")]
    SchemaShape {
        /// Concrete path of the object being validated.
        field: String,
        /// Error raised by the nested run.
        #[source]
        source: Box<ValidatorError>,
    },

    /// A rule's own check or message logic raised an error.
    #[error("rule `{rule}` failed on `{field}`: {source}")]
    RuleExecution {
        /// Rule name.
        rule: String,
        /// Concrete path of the field being validated.
        field: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// A rule definition could not be parsed.
    #[error("invalid rule definition `{definition}`: {reason}")]
    InvalidDefinition {
        /// The offending definition text.
        definition: String,
        /// Why it was rejected.
        reason: Cow<'static, str>,
    },
}

fn base_type_suffix(base_type: &Option<BaseType>) -> String {
    base_type.map_or_else(String::new, |ty| format!(" for type `{ty}`"))
}

impl ValidatorError {
    /// Creates an [`InvalidDefinition`](Self::InvalidDefinition) error.
    pub fn invalid_definition(
        definition: impl Into<String>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidDefinition {
            definition: definition.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`RuleExecution`](Self::RuleExecution) error.
    pub fn rule_execution(
        rule: impl Into<String>,
        field: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::RuleExecution {
            rule: rule.into(),
            field: field.into(),
            source: source.into(),
        }
    }

    /// Returns true for errors raised while compiling a schema, before any
    /// rule ran.
    #[must_use]
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownRule { .. }
                | Self::ConflictingDataType { .. }
                | Self::UnknownCustomRule { .. }
                | Self::InvalidDefinition { .. }
        )
    }
}
