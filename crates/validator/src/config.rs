//! Validation options.
//!
//! [`ValidatorConfig`] deserializes from camelCase JSON with every key
//! optional, so a config can be loaded straight from application settings:
//!
//! ```rust,ignore
//! let config: ValidatorConfig = serde_json::from_value(json!({
//!     "bail": true,
//!     "responseType": "nested",
//! }))?;
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::message::MessageCatalog;

/// Shape of the error report returned by
/// [`ValidationResult::formatted`](crate::ValidationResult::formatted).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// `{ "field": ["message", ...] }`
    #[default]
    Laravel,
    /// `[{ "field", "rule", "message" }, ...]`
    Flat,
    /// `{ "field": { "rule": "message" } }`
    Grouped,
    /// Errors nested along the data's own structure.
    Nested,
}

impl ResponseType {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Laravel => "laravel",
            Self::Flat => "flat",
            Self::Grouped => "grouped",
            Self::Nested => "nested",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "laravel" => Ok(Self::Laravel),
            "flat" => Ok(Self::Flat),
            "grouped" => Ok(Self::Grouped),
            "nested" => Ok(Self::Nested),
            other => Err(format!("unknown response type `{other}`")),
        }
    }
}

/// Options for one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Stop each field's chain at its first failure.
    pub bail: bool,
    /// Trim string values before checking them.
    pub auto_trim: bool,
    /// Treat empty strings (after trimming) as `null`.
    pub convert_empty_string_to_null: bool,
    /// Locale of the message catalog to use.
    pub locale: String,
    /// Message overrides; they win over the locale catalog.
    pub messages: MessageCatalog,
    /// Report shape.
    pub response_type: ResponseType,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            bail: false,
            auto_trim: true,
            convert_empty_string_to_null: false,
            locale: "en".to_owned(),
            messages: MessageCatalog::default(),
            response_type: ResponseType::default(),
        }
    }
}

impl ValidatorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`bail`](Self::bail).
    #[must_use]
    pub fn with_bail(mut self, bail: bool) -> Self {
        self.bail = bail;
        self
    }

    /// Sets [`auto_trim`](Self::auto_trim).
    #[must_use]
    pub fn with_auto_trim(mut self, auto_trim: bool) -> Self {
        self.auto_trim = auto_trim;
        self
    }

    /// Sets [`convert_empty_string_to_null`](Self::convert_empty_string_to_null).
    #[must_use]
    pub fn with_empty_strings_as_null(mut self, convert: bool) -> Self {
        self.convert_empty_string_to_null = convert;
        self
    }

    /// Sets [`locale`](Self::locale).
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets [`messages`](Self::messages).
    #[must_use]
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// Sets [`response_type`](Self::response_type).
    #[must_use]
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }
}
