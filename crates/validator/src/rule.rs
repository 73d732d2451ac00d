//! Rule model and the textual rule grammar.
//!
//! A field's rule definition comes in one of three equivalent forms:
//!
//! - a pipe-delimited string: `"required|string|min:3"`
//! - a list of tokens: `vec!["required", "string", "min:3"]`
//! - a pre-built list of [`Rule`]s
//!
//! All three implement [`RuleSource`], the single seam the compiler reads
//! from.
//!
//! Splitting is bracket- and quote-aware so JSON parameters survive inside a
//! textual chain:
//!
//! ```rust,ignore
//! let rules = r#"required|union:[["string","email"],["number"]],false"#.to_rules()?;
//! assert_eq!(rules[1].params().len(), 2);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::ValidatorError;

/// Rule parameters. Almost every rule takes zero to two.
pub type Params = SmallVec<[String; 2]>;

// ============================================================================
// BASE TYPES
// ============================================================================

/// The fundamental type a field's chain establishes.
///
/// A chain holds at most one base-type rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `date`
    Date,
    /// `object`
    Object,
    /// `file`
    File,
}

impl BaseType {
    /// All base types, in registration order.
    pub const ALL: [Self; 7] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Array,
        Self::Date,
        Self::Object,
        Self::File,
    ];

    /// Parses a reserved base-type token.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }

    /// The rule token naming this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Date => "date",
            Self::Object => "object",
            Self::File => "file",
        }
    }

    /// Suffix used for type-scoped message templates (`min.string`,
    /// `min.numeric`).
    #[must_use]
    pub const fn message_scope(self) -> &'static str {
        match self {
            Self::Number => "numeric",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RULE
// ============================================================================

/// One rule invocation as written in a schema: a name plus its ordered
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    name: String,
    params: Params,
}

impl Rule {
    /// Creates a rule with parameters.
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a rule without parameters.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
        }
    }

    /// Builds a `custom:<name>,...` invocation.
    pub fn custom<I, S>(name: impl Into<String>, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut params = Params::new();
        params.push(name.into());
        params.extend(extra.into_iter().map(Into::into));
        Self {
            name: "custom".to_owned(),
            params,
        }
    }

    /// Builds a `union` invocation from alternative rule sets.
    pub fn union(sets: Vec<Vec<Rule>>, stop_on_first_pass: bool) -> Self {
        let sets: Vec<Vec<String>> = sets
            .iter()
            .map(|set| set.iter().map(ToString::to_string).collect())
            .collect();
        let encoded = serde_json::Value::from(
            sets.into_iter()
                .map(serde_json::Value::from)
                .collect::<Vec<_>>(),
        )
        .to_string();
        Self::new("union", [encoded, stop_on_first_pass.to_string()])
    }

    /// Builds a `shape:<schema>` invocation from a JSON schema object.
    pub fn shape(schema: &serde_json::Value) -> Self {
        Self::new("shape", [schema.to_string()])
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered parameters.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// True for `custom:<name>` invocations.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.name == "custom"
    }

    /// The base type this rule declares, if it is a base-type token.
    #[must_use]
    pub fn base_type(&self) -> Option<BaseType> {
        BaseType::from_name(&self.name)
    }

    /// Parses a single `name` or `name:p1,p2` token.
    pub fn parse(token: &str) -> Result<Self, ValidatorError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ValidatorError::invalid_definition(token, "empty rule token"));
        }

        let Some((name, raw)) = token.split_once(':') else {
            return Ok(Self::named(token));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidatorError::invalid_definition(token, "missing rule name"));
        }

        let params = match name {
            "union" => parse_union_params(token, raw)?,
            "shape" => Params::from_iter([raw.trim().to_owned()]),
            _ => split_top_level(raw, ',')
                .into_iter()
                .map(|p| p.trim().to_owned())
                .collect(),
        };

        Ok(Self {
            name: name.to_owned(),
            params,
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            write!(f, ":{}", self.params.join(","))?;
        }
        Ok(())
    }
}

/// `union:<json>[,<bool>]`. The JSON part may itself contain commas, so it
/// is read with a streaming deserializer and the remainder is the flag.
fn parse_union_params(token: &str, raw: &str) -> Result<Params, ValidatorError> {
    let raw = raw.trim();
    let mut stream = serde_json::Deserializer::from_str(raw).into_iter::<serde_json::Value>();
    let sets = match stream.next() {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            return Err(ValidatorError::invalid_definition(
                token,
                format!("union rule sets are not valid JSON: {err}"),
            ));
        }
        None => {
            return Err(ValidatorError::invalid_definition(token, "union requires rule sets"));
        }
    };
    let rest = raw[stream.byte_offset()..].trim();

    let mut params = Params::new();
    params.push(sets.to_string());
    if let Some(flag) = rest.strip_prefix(',') {
        params.push(flag.trim().to_owned());
    } else if !rest.is_empty() {
        return Err(ValidatorError::invalid_definition(
            token,
            "unexpected text after union rule sets",
        ));
    }
    Ok(params)
}

/// Splits on `separator` outside of brackets and JSON string literals.
/// Parentheses count as brackets so regex alternations survive.
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

// ============================================================================
// RULE KIND & PRIORITY
// ============================================================================

/// How a rule name was resolved against the registry.
///
/// Parameters are bound explicitly at call time rather than captured when
/// the rule is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Entry of the base (type-agnostic) registry.
    Base,
    /// Type-scoped refinement such as `string.min`.
    Additional {
        /// Type whose table the rule was found in.
        parent: BaseType,
        /// Rule name within that table.
        name: String,
    },
    /// `custom:<name>` dispatched through the custom table.
    Custom {
        /// Custom rule name.
        name: String,
    },
}

/// Execution priority. Higher values run earlier; rules of equal priority
/// keep their declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RulePriority(i32);

impl RulePriority {
    /// Default priority of every rule.
    pub const NORMAL: Self = Self(0);
    /// Runs after all normal rules (unions).
    pub const LOW: Self = Self(-1000);

    /// Creates a custom priority.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Raw priority value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

// ============================================================================
// RULE SOURCES
// ============================================================================

/// Anything that exposes an ordered rule list.
///
/// Implemented for the textual form, the token-list form and the pre-built
/// form, so the compiler never has to probe what it was given.
pub trait RuleSource {
    /// Produces the ordered rules of this definition.
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError>;
}

impl RuleSource for str {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        split_top_level(self, '|')
            .into_iter()
            .filter(|token| !token.trim().is_empty())
            .map(Rule::parse)
            .collect()
    }
}

impl RuleSource for String {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        self.as_str().to_rules()
    }
}

impl RuleSource for Vec<Rule> {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        Ok(self.clone())
    }
}

impl RuleSource for [Rule] {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        Ok(self.to_vec())
    }
}

impl RuleSource for Vec<String> {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        self.as_slice().to_rules()
    }
}

impl RuleSource for Vec<&str> {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        self.as_slice().to_rules()
    }
}

impl RuleSource for [String] {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        self.iter().map(|token| Rule::parse(token)).collect()
    }
}

impl RuleSource for [&str] {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        self.iter().map(|token| Rule::parse(token)).collect()
    }
}

/// A stored rule definition in any of the three accepted forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleDefinition {
    /// `"required|string|min:3"`
    Text(String),
    /// `["required", "string", "min:3"]`
    Tokens(Vec<String>),
    /// Pre-built rules.
    Rules(Vec<Rule>),
}

impl RuleSource for RuleDefinition {
    fn to_rules(&self) -> Result<Vec<Rule>, ValidatorError> {
        match self {
            Self::Text(text) => text.to_rules(),
            Self::Tokens(tokens) => tokens.as_slice().to_rules(),
            Self::Rules(rules) => Ok(rules.clone()),
        }
    }
}

impl RuleDefinition {
    /// Reads a definition from JSON: a pipe-delimited string or an array of
    /// string tokens.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidatorError> {
        match value {
            serde_json::Value::String(text) => Ok(Self::Text(text.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_owned).ok_or_else(|| {
                        ValidatorError::invalid_definition(
                            value.to_string(),
                            "rule tokens must be strings",
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Tokens),
            other => Err(ValidatorError::invalid_definition(
                other.to_string(),
                "expected a rule string or an array of rule tokens",
            )),
        }
    }
}

impl From<&str> for RuleDefinition {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RuleDefinition {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<&str>> for RuleDefinition {
    fn from(value: Vec<&str>) -> Self {
        Self::Tokens(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for RuleDefinition {
    fn from(value: Vec<String>) -> Self {
        Self::Tokens(value)
    }
}

impl From<Vec<Rule>> for RuleDefinition {
    fn from(value: Vec<Rule>) -> Self {
        Self::Rules(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_pipe_chain() {
        let rules = "required|string|min:3".to_rules().unwrap();
        let names: Vec<_> = rules.iter().map(Rule::name).collect();
        assert_eq!(names, ["required", "string", "min"]);
        assert_eq!(rules[2].params(), ["3"]);
    }

    #[test]
    fn splits_parameters() {
        let rule = Rule::parse("required_with:a, b,c").unwrap();
        assert_eq!(rule.params(), ["a", "b", "c"]);
    }

    #[test]
    fn union_keeps_json_intact() {
        let rules = r#"required|union:[["string","email"],["number","between:1,5"]],false"#
            .to_rules()
            .unwrap();
        assert_eq!(rules.len(), 2);
        let union = &rules[1];
        assert_eq!(union.name(), "union");
        assert_eq!(union.params().len(), 2);
        assert_eq!(union.params()[1], "false");
        let sets: serde_json::Value = serde_json::from_str(&union.params()[0]).unwrap();
        assert_eq!(sets[1][1], "between:1,5");
    }

    #[test]
    fn union_rejects_garbage() {
        assert!(Rule::parse("union:[[\"string\"]] nope").is_err());
        assert!(Rule::parse("union:[[").is_err());
    }

    #[test]
    fn builder_form_round_trips_through_text() {
        let built = Rule::union(
            vec![
                vec![Rule::named("string"), Rule::named("email")],
                vec![Rule::named("number")],
            ],
            true,
        );
        let reparsed = Rule::parse(&built.to_string()).unwrap();
        assert_eq!(reparsed, built);
    }

    #[test]
    fn text_tokens_and_rules_agree() {
        let text = "required|string|min:3".to_rules().unwrap();
        let tokens = RuleDefinition::from(vec!["required", "string", "min:3"])
            .to_rules()
            .unwrap();
        let built = vec![
            Rule::named("required"),
            Rule::named("string"),
            Rule::new("min", ["3"]),
        ]
        .to_rules()
        .unwrap();
        assert_eq!(text, tokens);
        assert_eq!(text, built);
    }

    #[test]
    fn custom_rule_carries_name_first() {
        let rule = Rule::parse("custom:even,strict").unwrap();
        assert!(rule.is_custom());
        assert_eq!(rule.params(), ["even", "strict"]);
        assert_eq!(Rule::custom("even", ["strict"]), rule);
    }

    #[test]
    fn empty_tokens_are_ignored_in_text() {
        let rules = "required||string|".to_rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert!(Rule::parse("  ").is_err());
        assert!(Rule::parse(":3").is_err());
    }

    #[test]
    fn regex_params_survive_splitting() {
        let rules = r"string|regex:^(ab|cd){1,3}$|max:9".to_rules().unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[1].params(), [r"^(ab|cd){1,3}$"]);
    }

    #[test]
    fn base_type_tokens() {
        assert_eq!(BaseType::from_name("number"), Some(BaseType::Number));
        assert_eq!(BaseType::from_name("min"), None);
        assert_eq!(BaseType::Number.message_scope(), "numeric");
        assert_eq!(Rule::named("date").base_type(), Some(BaseType::Date));
    }

    #[test]
    fn definition_from_json() {
        let def = RuleDefinition::from_json(&serde_json::json!(["required", "string"])).unwrap();
        assert_eq!(def.to_rules().unwrap().len(), 2);
        assert!(RuleDefinition::from_json(&serde_json::json!(42)).is_err());
    }
}
