//! The `string` base type and its refinements.
//!
//! Refinements fail on non-string values; lengths count characters.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{LazyLock, Mutex, PoisonError};

use serde_json::Value;

use super::{number_param, require_numbers, require_params};

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).unwrap()
});

static URL_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

const PATTERN_CACHE_LIMIT: usize = 256;

static PATTERNS: LazyLock<Mutex<HashMap<String, regex::Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Compiles a `regex:` parameter once and reuses it across field instances.
fn compiled(pattern: &str) -> Result<regex::Regex, regex::Error> {
    let mut cache = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = regex::Regex::new(pattern)?;
    if cache.len() >= PATTERN_CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(pattern.to_owned(), regex.clone());
    Ok(regex)
}

fn char_len(s: &str) -> f64 {
    s.chars().count() as f64
}

crate::rule! {
    /// Base type: the value is a string.
    pub StringType => "The :attribute field must be a string.";
    check(value) { value.is_string() }
}

// ============================================================================
// LENGTH
// ============================================================================

crate::rule! {
    /// `min:n`: at least `n` characters.
    pub Min => "The :attribute field must be at least :min characters.";
    check(value, params, ctx) {
        let min = number_param(ctx, params, 0)?;
        Ok(value.as_str().is_some_and(|s| char_len(s) >= min))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("min", params[0].clone())] }
}

crate::rule! {
    /// `max:n`: at most `n` characters.
    pub Max => "The :attribute field must not be greater than :max characters.";
    check(value, params, ctx) {
        let max = number_param(ctx, params, 0)?;
        Ok(value.as_str().is_some_and(|s| char_len(s) <= max))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("max", params[0].clone())] }
}

crate::rule! {
    /// `length:n`: exactly `n` characters.
    pub Length => "The :attribute field must be :length characters.";
    check(value, params, ctx) {
        let length = number_param(ctx, params, 0)?;
        Ok(value.as_str().is_some_and(|s| (char_len(s) - length).abs() < f64::EPSILON))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("length", params[0].clone())] }
}

crate::rule! {
    /// `between:min,max`: length within the inclusive range.
    pub Between => "The :attribute field must be between :min and :max characters.";
    check(value, params, ctx) {
        let min = number_param(ctx, params, 0)?;
        let max = number_param(ctx, params, 1)?;
        Ok(value.as_str().is_some_and(|s| (min..=max).contains(&char_len(s))))
    }
    params(params) { require_numbers(params, 2) }
    placeholders(params, ctx) {
        vec![("min", params[0].clone()), ("max", params[1].clone())]
    }
}

// ============================================================================
// FORMATS
// ============================================================================

crate::rule! {
    /// `email`
    pub Email => "The :attribute field must be a valid email address.";
    check(value) { value.as_str().is_some_and(|s| EMAIL_REGEX.is_match(s)) }
}

crate::rule! {
    /// `url`: http or https URL.
    pub Url => "The :attribute field must be a valid URL.";
    check(value) { value.as_str().is_some_and(|s| URL_REGEX.is_match(s)) }
}

crate::rule! {
    /// `uuid`
    pub Uuid => "The :attribute field must be a valid UUID.";
    check(value) { value.as_str().is_some_and(|s| UUID_REGEX.is_match(s)) }
}

crate::rule! {
    /// `ip`: IPv4 or IPv6; `ip:v4` / `ip:v6` restrict the family.
    pub Ip => "The :attribute field must be a valid IP address.";
    check(value, params, ctx) {
        let addr = value.as_str().and_then(|s| s.parse::<IpAddr>().ok());
        Ok(match (addr, params.first().map(String::as_str)) {
            (Some(IpAddr::V4(_)), Some("v4") | None) | (Some(IpAddr::V6(_)), Some("v6") | None) => true,
            _ => false,
        })
    }
    params(params) {
        match params.first().map(String::as_str) {
            None | Some("v4" | "v6") => Ok(()),
            Some(other) => Err(format!("unknown address family `{other}`")),
        }
    }
}

crate::rule! {
    /// `json`: the string parses as JSON.
    pub Json => "The :attribute field must be a valid JSON string.";
    check(value) {
        value.as_str().is_some_and(|s| serde_json::from_str::<Value>(s).is_ok())
    }
}

crate::rule! {
    /// `regex:pattern`
    pub Regex => "The :attribute field format is invalid.";
    check(value, params, ctx) {
        let pattern = compiled(&params[0]).map_err(|err| ctx.error(err))?;
        Ok(value.as_str().is_some_and(|s| pattern.is_match(s)))
    }
    params(params) {
        require_params(params, 1)?;
        compiled(&params[0]).map(drop).map_err(|err| err.to_string())
    }
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

crate::rule! {
    /// `alpha`: letters only.
    pub Alpha => "The :attribute field must only contain letters.";
    check(value) {
        value.as_str().is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphabetic))
    }
}

crate::rule! {
    /// `alpha_num`: letters and digits.
    pub AlphaNum => "The :attribute field must only contain letters and numbers.";
    check(value) {
        value.as_str().is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphanumeric))
    }
}

crate::rule! {
    /// `alpha_dash`: letters, digits, dashes and underscores.
    pub AlphaDash => "The :attribute field must only contain letters, numbers, dashes, and underscores.";
    check(value) {
        value.as_str().is_some_and(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        })
    }
}

crate::rule! {
    /// `lowercase`
    pub Lowercase => "The :attribute field must be lowercase.";
    check(value) { value.as_str().is_some_and(|s| s.to_lowercase() == s) }
}

crate::rule! {
    /// `uppercase`
    pub Uppercase => "The :attribute field must be uppercase.";
    check(value) { value.as_str().is_some_and(|s| s.to_uppercase() == s) }
}

// ============================================================================
// SUBSTRINGS
// ============================================================================

crate::rule! {
    /// `starts_with:a,b`: starts with one of the prefixes.
    pub StartsWith => "The :attribute field must start with one of the following: :values.";
    check(value, params, ctx) {
        Ok(value.as_str().is_some_and(|s| params.iter().any(|p| s.starts_with(p.as_str()))))
    }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}

crate::rule! {
    /// `ends_with:a,b`: ends with one of the suffixes.
    pub EndsWith => "The :attribute field must end with one of the following: :values.";
    check(value, params, ctx) {
        Ok(value.as_str().is_some_and(|s| params.iter().any(|p| s.ends_with(p.as_str()))))
    }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}

crate::rule! {
    /// `includes:a,b`: contains every listed substring.
    pub Includes => "The :attribute field must contain: :values.";
    check(value, params, ctx) {
        Ok(value.as_str().is_some_and(|s| params.iter().all(|p| s.contains(p.as_str()))))
    }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}
