//! Validation results and the four error report shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::ResponseType;
use crate::path;

/// Key holding a node's own messages in the nested shape when the node also
/// has children.
pub const NESTED_SELF_KEY: &str = "_errors";

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    /// Message key of the rule (custom rules report their custom name).
    pub rule: String,
    /// Rendered message.
    pub message: String,
}

/// Failures keyed by concrete field path, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBag {
    fields: IndexMap<String, Vec<FieldFailure>>,
}

impl ErrorBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends failures for a field.
    pub fn record(&mut self, field: impl Into<String>, failures: impl IntoIterator<Item = FieldFailure>) {
        self.fields.entry(field.into()).or_default().extend(failures);
    }

    /// True when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Failures of one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[FieldFailure]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Messages of one field, in rule order.
    #[must_use]
    pub fn messages(&self, field: &str) -> Vec<&str> {
        self.get(field)
            .unwrap_or_default()
            .iter()
            .map(|failure| failure.message.as_str())
            .collect()
    }

    /// First message of one field.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)?.first().map(|failure| failure.message.as_str())
    }

    /// True when `field` failed `rule`.
    #[must_use]
    pub fn has(&self, field: &str, rule: &str) -> bool {
        self.get(field)
            .is_some_and(|failures| failures.iter().any(|f| f.rule == rule))
    }

    /// Failed fields in report order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields and their failures in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldFailure])> {
        self.fields
            .iter()
            .map(|(field, failures)| (field.as_str(), failures.as_slice()))
    }

    /// `{ "field": ["message", ...] }`
    #[must_use]
    pub fn to_laravel(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(field, failures)| {
                    let messages = failures.iter().map(|f| Value::from(f.message.as_str()));
                    (field.to_owned(), Value::Array(messages.collect()))
                })
                .collect(),
        )
    }

    /// `[{ "field", "rule", "message" }, ...]`
    #[must_use]
    pub fn to_flat(&self) -> Value {
        Value::Array(
            self.iter()
                .flat_map(|(field, failures)| {
                    failures.iter().map(move |f| {
                        json!({ "field": field, "rule": f.rule, "message": f.message })
                    })
                })
                .collect(),
        )
    }

    /// `{ "field": { "rule": "message" } }`, keeping the first message per
    /// rule.
    #[must_use]
    pub fn to_grouped(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(field, failures)| {
                    let mut rules = Map::new();
                    for failure in failures {
                        rules
                            .entry(failure.rule.clone())
                            .or_insert_with(|| Value::from(failure.message.as_str()));
                    }
                    (field.to_owned(), Value::Object(rules))
                })
                .collect(),
        )
    }

    /// Messages placed along the data's own structure.
    ///
    /// Segments that index arrays in `data` become JSON arrays, with `null`
    /// in positions that have no errors. A node holding both its own
    /// messages and children keeps its messages under `_errors`.
    #[must_use]
    pub fn to_nested(&self, data: &Value) -> Value {
        if self.is_empty() {
            return Value::Object(Map::new());
        }
        let mut root = Node::default();
        for (field, failures) in self.iter() {
            let node = path::segments(field).fold(&mut root, |node, seg| {
                node.children.entry(seg.to_owned()).or_default()
            });
            node.messages
                .extend(failures.iter().map(|f| f.message.clone()));
        }
        root.render(Some(data))
    }

    /// Renders the requested shape.
    #[must_use]
    pub fn format(&self, response_type: ResponseType, data: &Value) -> Value {
        match response_type {
            ResponseType::Laravel => self.to_laravel(),
            ResponseType::Flat => self.to_flat(),
            ResponseType::Grouped => self.to_grouped(),
            ResponseType::Nested => self.to_nested(data),
        }
    }
}

#[derive(Default)]
struct Node {
    messages: Vec<String>,
    children: IndexMap<String, Node>,
}

impl Node {
    fn render(&self, data: Option<&Value>) -> Value {
        if self.children.is_empty() {
            return Value::Array(self.messages.iter().map(|m| Value::from(m.as_str())).collect());
        }

        if self.messages.is_empty()
            && let Some(Value::Array(items)) = data
            && let Some(indexed) = self.indexed_children()
            && indexed.iter().all(|(idx, _)| *idx < items.len())
        {
            let mut out = vec![Value::Null; items.len()];
            for (idx, child) in indexed {
                out[idx] = child.render(items.get(idx));
            }
            return Value::Array(out);
        }

        let mut out: Map<String, Value> = self
            .children
            .iter()
            .map(|(key, child)| {
                let child_data = data.and_then(|d| path::lookup(d, key));
                (key.clone(), child.render(child_data))
            })
            .collect();
        if !self.messages.is_empty() {
            out.insert(
                NESTED_SELF_KEY.to_owned(),
                Value::Array(self.messages.iter().map(|m| Value::from(m.as_str())).collect()),
            );
        }
        Value::Object(out)
    }

    fn indexed_children(&self) -> Option<Vec<(usize, &Node)>> {
        self.children
            .iter()
            .map(|(key, child)| key.parse::<usize>().ok().map(|idx| (idx, child)))
            .collect()
    }
}

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// True when no field failed.
    pub is_valid: bool,
    /// The data after coercion.
    pub data: Value,
    /// Failures by concrete field path.
    pub errors: ErrorBag,
    /// Shape used by [`formatted`](Self::formatted).
    pub response_type: ResponseType,
}

impl ValidationResult {
    /// Errors in the configured shape.
    #[must_use]
    pub fn formatted(&self) -> Value {
        self.errors.format(self.response_type, &self.data)
    }

    /// Errors in another shape.
    #[must_use]
    pub fn formatted_as(&self, response_type: ResponseType) -> Value {
        self.errors.format(response_type, &self.data)
    }
}
