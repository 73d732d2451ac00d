//! Schemas: ordered maps from field patterns to rule definitions.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ValidatorError;
use crate::path;
use crate::rule::RuleDefinition;

/// Ordered field patterns and their rule definitions.
///
/// Iteration (and therefore the order of the error report) follows insertion
/// order.
///
/// ```rust,ignore
/// let schema = Schema::new()
///     .field("email", "required|string|email")
///     .field("items.*.qty", vec!["required", "number", "min:1"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: IndexMap<String, RuleDefinition>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn field(mut self, pattern: impl Into<String>, rules: impl Into<RuleDefinition>) -> Self {
        self.insert(pattern, rules);
        self
    }

    /// Adds or replaces a field.
    pub fn insert(&mut self, pattern: impl Into<String>, rules: impl Into<RuleDefinition>) {
        self.fields.insert(pattern.into(), rules.into());
    }

    /// Reads a schema from a JSON object whose values are rule strings or
    /// arrays of rule tokens.
    pub fn from_json(value: &Value) -> Result<Self, ValidatorError> {
        let Value::Object(map) = value else {
            return Err(ValidatorError::invalid_definition(
                value.to_string(),
                "schema must be a JSON object",
            ));
        };
        map.iter()
            .map(|(key, rules)| Ok((key.clone(), RuleDefinition::from_json(rules)?)))
            .collect::<Result<IndexMap<_, _>, ValidatorError>>()
            .map(|fields| Self { fields })
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleDefinition)> {
        self.fields.iter().map(|(key, rules)| (key.as_str(), rules))
    }

    /// Field patterns in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Rule definition of one pattern.
    #[must_use]
    pub fn get(&self, pattern: &str) -> Option<&RuleDefinition> {
        self.fields.get(pattern)
    }

    /// Number of field patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Direct child segments declared under `parent`, in declaration order
    /// and without duplicates. `parent` is a pattern; the empty pattern is
    /// the root.
    #[must_use]
    pub fn child_keys(&self, parent: &str) -> Vec<&str> {
        let depth = path::segments(parent).count();
        let mut children: Vec<&str> = Vec::new();
        for key in self.keys() {
            let mut segs = path::segments(key);
            let under_parent = path::segments(parent).all(|p| segs.next() == Some(p));
            if !under_parent {
                continue;
            }
            if let Some(child) = path::segments(key).nth(depth)
                && !children.contains(&child)
            {
                children.push(child);
            }
        }
        children
    }
}

impl<K, D> FromIterator<(K, D)> for Schema
where
    K: Into<String>,
    D: Into<RuleDefinition>,
{
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, rules)| (key.into(), rules.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = (&'a String, &'a RuleDefinition);
    type IntoIter = indexmap::map::Iter<'a, String, RuleDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
