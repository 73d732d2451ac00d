//! # nebula-rulebook
//!
//! Declarative validation of JSON-like data against schemas of string rules.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nebula_rulebook::prelude::*;
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("email", "required|string|email")
//!     .field("age", "required|number|min:18")
//!     .field("items.*.qty", "required|number|integer|positive");
//!
//! let result = Validator::new().validate_blocking(&json!({ "email": "a@b.io", "age": 16 }), &schema)?;
//! assert_eq!(result.errors.first("age"), Some("The age field must be at least 18."));
//! ```
//!
//! ## Pieces
//!
//! - [`RuleRegistry`]: name → [`RuleHandler`] tables (base, per-type, custom)
//! - [`Compiler`]: turns a [`RuleDefinition`] into an ordered [`CompiledChain`]
//! - [`path`]: dotted paths with `*` wildcards over [`Value`]s
//! - [`Validator`]: runs chains per field instance and builds a [`ValidationResult`]
//! - [`MessageFormatter`]: catalog lookup and `:placeholder` substitution
//! - [`ErrorBag`]: failures per field, rendered as laravel, flat, grouped or nested
//!
//! ## Writing Rules
//!
//! Use the [`rule!`] macro for unit handlers, implement [`RuleHandler`]
//! directly for anything stateful or asynchronous, or register a closure with
//! [`RuleRegistry::extend`] and reference it as `custom:<name>`.

// ValidatorError carries rule and field names; boxing it buys nothing on the
// error path.
#![allow(clippy::result_large_err)]

mod compiler;
mod config;
mod context;
mod engine;
mod error;
mod macros;
mod message;
pub mod path;
pub mod prelude;
mod registry;
mod report;
mod rule;
pub mod rules;
mod schema;
mod validator;

pub use compiler::{CompiledChain, CompiledRule, Compiler};
pub use config::{ResponseType, ValidatorConfig};
pub use context::RuleContext;
pub use error::{BoxError, ValidatorError};
pub use message::{MessageCatalog, MessageFormatter, MessageRequest};
pub use registry::{
    CustomOutcome, Placeholders, ResolvedHandler, RuleCheck, RuleHandler, RuleRegistry, Verdict,
};
pub use report::{ErrorBag, FieldFailure, NESTED_SELF_KEY, ValidationResult};
pub use rule::{BaseType, Params, Rule, RuleDefinition, RuleKind, RulePriority, RuleSource};
pub use schema::Schema;
pub use serde_json::Value;
pub use validator::{Validator, validate};
