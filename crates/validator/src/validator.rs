//! The public entry point: a registry, locale catalogs and a default
//! configuration bundled together.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ValidatorConfig;
use crate::engine::Engine;
use crate::error::ValidatorError;
use crate::message::MessageCatalog;
use crate::registry::RuleRegistry;
use crate::report::ValidationResult;
use crate::schema::Schema;

/// Validates data against schemas.
///
/// ```rust,ignore
/// use nebula_rulebook::{Schema, Validator};
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .field("email", "required|string|email")
///     .field("age", "required|number|min:18");
/// let result = Validator::new()
///     .validate_blocking(&json!({ "email": "a@b.io", "age": 20 }), &schema)?;
/// assert!(result.is_valid);
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    registry: RuleRegistry,
    catalogs: HashMap<String, MessageCatalog>,
    config: ValidatorConfig,
}

impl Validator {
    /// A validator with every builtin rule and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::with_builtins())
    }

    /// A validator over an existing registry.
    #[must_use]
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            catalogs: HashMap::new(),
            config: ValidatorConfig::default(),
        }
    }

    /// Replaces the default configuration.
    #[must_use]
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds (or replaces) the message catalog for `locale`.
    #[must_use]
    pub fn with_catalog(mut self, locale: impl Into<String>, catalog: MessageCatalog) -> Self {
        self.add_catalog(locale, catalog);
        self
    }

    /// Adds (or replaces) the message catalog for `locale`.
    pub fn add_catalog(&mut self, locale: impl Into<String>, catalog: MessageCatalog) {
        self.catalogs.insert(locale.into(), catalog);
    }

    /// The default configuration.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// The rule registry.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Mutable access to the registry, for registering rules.
    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    /// Catalog for `locale`, falling back from `fr-CA` to `fr`.
    fn catalog(&self, locale: &str) -> Option<&MessageCatalog> {
        self.catalogs.get(locale).or_else(|| {
            locale
                .split_once(['-', '_'])
                .and_then(|(language, _)| self.catalogs.get(language))
        })
    }

    /// Validates with the default configuration.
    pub async fn validate(
        &self,
        data: &Value,
        schema: &Schema,
    ) -> Result<ValidationResult, ValidatorError> {
        self.validate_with(data, schema, &self.config).await
    }

    /// Validates with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Configuration errors (unknown rules, conflicting base types, malformed
    /// definitions) and rule execution errors. Validation failures are not
    /// errors; they are reported in the result.
    #[instrument(skip_all, fields(fields = schema.len(), locale = %config.locale))]
    pub async fn validate_with(
        &self,
        data: &Value,
        schema: &Schema,
        config: &ValidatorConfig,
    ) -> Result<ValidationResult, ValidatorError> {
        let catalog = self.catalog(&config.locale);
        let result = Engine::new(&self.registry, config, catalog)
            .run(data, schema)
            .await?;
        debug!(
            valid = result.is_valid,
            failed_fields = result.errors.len(),
            "validation finished"
        );
        Ok(result)
    }

    /// Validates on the current thread, driving async rules to completion.
    ///
    /// Async custom rules that depend on a runtime (timers, sockets) must be
    /// validated through [`validate`](Self::validate) inside that runtime.
    pub fn validate_blocking(
        &self,
        data: &Value,
        schema: &Schema,
    ) -> Result<ValidationResult, ValidatorError> {
        futures::executor::block_on(self.validate(data, schema))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT: LazyLock<Validator> = LazyLock::new(Validator::new);

/// Validates with the builtin rules and `config`.
pub async fn validate(
    data: &Value,
    schema: &Schema,
    config: &ValidatorConfig,
) -> Result<ValidationResult, ValidatorError> {
    DEFAULT.validate_with(data, schema, config).await
}
