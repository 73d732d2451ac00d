//! Message catalogs and placeholder rendering.
//!
//! Templates are looked up most specific first:
//!
//! 1. config override for the field and rule;
//! 2. locale catalog entry for the field and rule;
//! 3. config override for `rule.scope` (`min.string`), then `rule`;
//! 4. locale catalog entry for `rule.scope`, then `rule`;
//! 5. the handler's built-in fallback.
//!
//! Placeholders are written `:name`. `:attribute` and `:value` are always
//! available; handlers add their own (`:min`, `:other`, ...). Unknown
//! placeholders are left in the text untouched.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-z][a-z_]*)").expect("placeholder regex is valid"));

// ============================================================================
// CATALOG
// ============================================================================

/// A set of message templates.
///
/// ```json
/// {
///   "rules": { "required": "Please fill in :attribute.", "min.string": "..." },
///   "fields": { "email": { "required": "We need your email." } },
///   "attributes": { "first_name": "first name" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    /// Templates keyed by rule name or `rule.scope`.
    pub rules: HashMap<String, String>,
    /// Per-field templates keyed by field (concrete path or schema key), then
    /// rule name.
    pub fields: HashMap<String, HashMap<String, String>>,
    /// Display names substituted for `:attribute`.
    pub attributes: HashMap<String, String>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule template. `key` is a rule name or `rule.scope`.
    #[must_use]
    pub fn with_rule(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.rules.insert(key.into(), template.into());
        self
    }

    /// Adds a field-specific template.
    #[must_use]
    pub fn with_field(
        mut self,
        field: impl Into<String>,
        rule: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.fields
            .entry(field.into())
            .or_default()
            .insert(rule.into(), template.into());
        self
    }

    /// Adds a display name for a field.
    #[must_use]
    pub fn with_attribute(mut self, field: impl Into<String>, name: impl Into<String>) -> Self {
        self.attributes.insert(field.into(), name.into());
        self
    }

    /// True when the catalog holds no templates or attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.fields.is_empty() && self.attributes.is_empty()
    }

    fn field_template(&self, request: &MessageRequest<'_>) -> Option<&str> {
        [request.field, request.pattern]
            .into_iter()
            .find_map(|field| self.fields.get(field)?.get(request.rule))
            .map(String::as_str)
    }

    fn rule_template(&self, request: &MessageRequest<'_>) -> Option<&str> {
        request
            .scope
            .and_then(|scope| self.rules.get(&format!("{}.{scope}", request.rule)))
            .or_else(|| self.rules.get(request.rule))
            .map(String::as_str)
    }

    fn attribute(&self, request: &MessageRequest<'_>) -> Option<&str> {
        [request.field, request.pattern]
            .into_iter()
            .find_map(|field| self.attributes.get(field))
            .map(String::as_str)
    }
}

// ============================================================================
// FORMATTER
// ============================================================================

/// What a message is being rendered for.
#[derive(Debug, Clone, Copy)]
pub struct MessageRequest<'a> {
    /// Concrete path of the field.
    pub field: &'a str,
    /// Schema key the field was resolved from.
    pub pattern: &'a str,
    /// Message key of the rule (custom rules use their custom name).
    pub rule: &'a str,
    /// Type scope (`string`, `numeric`, ...) for scoped templates.
    pub scope: Option<&'a str>,
    /// The value that failed.
    pub value: Option<&'a Value>,
}

/// Resolves templates against a config override catalog and an optional
/// locale catalog.
#[derive(Debug, Clone, Copy)]
pub struct MessageFormatter<'a> {
    overrides: &'a MessageCatalog,
    locale: Option<&'a MessageCatalog>,
}

impl<'a> MessageFormatter<'a> {
    /// Creates a formatter.
    #[must_use]
    pub const fn new(overrides: &'a MessageCatalog, locale: Option<&'a MessageCatalog>) -> Self {
        Self { overrides, locale }
    }

    /// Picks the template for `request`, or `fallback`.
    #[must_use]
    pub fn template<'s>(&'s self, request: &MessageRequest<'_>, fallback: &'s str) -> &'s str {
        let locale = self.locale;
        self.overrides
            .field_template(request)
            .or_else(|| locale.and_then(|c| c.field_template(request)))
            .or_else(|| self.overrides.rule_template(request))
            .or_else(|| locale.and_then(|c| c.rule_template(request)))
            .unwrap_or(fallback)
    }

    /// Renders the catalog template for `request` (or `fallback`).
    #[must_use]
    pub fn render(
        &self,
        request: &MessageRequest<'_>,
        fallback: &str,
        placeholders: &[(&str, String)],
    ) -> String {
        let template = self.template(request, fallback);
        self.render_custom(request, template, placeholders)
    }

    /// Renders a template supplied by the rule itself, bypassing catalogs.
    #[must_use]
    pub fn render_custom(
        &self,
        request: &MessageRequest<'_>,
        template: &str,
        placeholders: &[(&str, String)],
    ) -> String {
        substitute(template, |name| match name {
            "attribute" => Some(self.attribute(request)),
            "value" => Some(request.value.map(display_value).unwrap_or_default()),
            other => placeholders
                .iter()
                .find(|(key, _)| *key == other)
                .map(|(_, value)| value.clone()),
        })
    }

    /// Display name of the field: a catalog attribute, or the concrete path
    /// with underscores shown as spaces.
    #[must_use]
    pub fn attribute(&self, request: &MessageRequest<'_>) -> String {
        self.overrides
            .attribute(request)
            .or_else(|| self.locale.and_then(|c| c.attribute(request)))
            .map_or_else(|| request.field.replace('_', " "), str::to_owned)
    }
}

/// Replaces `:name` placeholders for which `lookup` returns a value.
pub fn substitute(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

/// Renders a value for messages: strings bare, everything else as JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn request<'a>(field: &'a str, rule: &'a str, scope: Option<&'a str>) -> MessageRequest<'a> {
        MessageRequest {
            field,
            pattern: field,
            rule,
            scope,
            value: None,
        }
    }

    #[test]
    fn lookup_order() {
        let overrides = MessageCatalog::new().with_rule("min", "override :min");
        let locale = MessageCatalog::new()
            .with_rule("min.string", "locale scoped :min")
            .with_field("name", "min", "locale field");
        let formatter = MessageFormatter::new(&overrides, Some(&locale));

        assert_eq!(
            formatter.template(&request("name", "min", Some("string")), "fallback"),
            "locale field"
        );
        assert_eq!(
            formatter.template(&request("title", "min", Some("string")), "fallback"),
            "override :min"
        );

        let bare = MessageCatalog::new();
        let formatter = MessageFormatter::new(&bare, Some(&locale));
        assert_eq!(
            formatter.template(&request("title", "min", Some("string")), "fallback"),
            "locale scoped :min"
        );
        assert_eq!(
            formatter.template(&request("title", "max", Some("string")), "fallback"),
            "fallback"
        );
    }

    #[test]
    fn substitutes_known_placeholders_only() {
        let catalog = MessageCatalog::new();
        let formatter = MessageFormatter::new(&catalog, None);
        let value = json!(12);
        let request = MessageRequest {
            value: Some(&value),
            ..request("first_name", "min", None)
        };
        let text = formatter.render(
            &request,
            "The :attribute field must be at least :min, got :value (:unknown).",
            &[("min", "18".into())],
        );
        assert_eq!(
            text,
            "The first name field must be at least 18, got 12 (:unknown)."
        );
    }

    #[test]
    fn attribute_names_come_from_catalog() {
        let overrides = MessageCatalog::new().with_attribute("items.*.qty", "quantity");
        let formatter = MessageFormatter::new(&overrides, None);
        let request = MessageRequest {
            pattern: "items.*.qty",
            ..request("items.0.qty", "min", None)
        };
        assert_eq!(formatter.attribute(&request), "quantity");
    }

    #[test]
    fn catalog_deserializes_partially() {
        let catalog: MessageCatalog =
            serde_json::from_value(json!({ "attributes": { "dob": "date of birth" } })).unwrap();
        assert!(catalog.rules.is_empty());
        assert!(!catalog.is_empty());
    }
}
