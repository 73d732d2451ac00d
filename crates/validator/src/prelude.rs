//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use nebula_rulebook::prelude::*;
//!
//! let mut validator = Validator::new();
//! validator.registry_mut().extend("even", |value, _, _| {
//!     value.as_i64().is_some_and(|n| n % 2 == 0)
//! });
//! let schema = Schema::new().field("count", "required|number|custom:even");
//! ```

// ============================================================================
// ENTRY POINTS
// ============================================================================

pub use crate::{Schema, Validator, validate};

// ============================================================================
// CONFIGURATION & REPORTS
// ============================================================================

pub use crate::{
    ErrorBag, FieldFailure, MessageCatalog, ResponseType, ValidationResult, ValidatorConfig,
    ValidatorError,
};

// ============================================================================
// EXTENDING
// ============================================================================

pub use crate::{
    BaseType, CustomOutcome, Placeholders, Rule, RuleCheck, RuleContext, RuleDefinition,
    RuleHandler, RulePriority, RuleRegistry, Value, Verdict,
};
