//! The `file` base type.
//!
//! Uploads are described by an object:
//!
//! ```json
//! { "name": "photo.jpg", "size": 52314, "type": "image/jpeg" }
//! ```
//!
//! `size` is in bytes; `mime` is accepted in place of `type`. Size rules
//! take kilobytes.

use serde_json::{Map, Value};

use super::{number_param, require_numbers, require_params};

/// The descriptor object, when the value is one.
fn descriptor(value: &Value) -> Option<&Map<String, Value>> {
    value
        .as_object()
        .filter(|map| map.get("name").is_some_and(Value::is_string))
}

fn size_kb(value: &Value) -> Option<f64> {
    let bytes = descriptor(value)?.get("size")?.as_u64()?;
    Some(bytes as f64 / 1024.0)
}

fn extension(value: &Value) -> Option<String> {
    let name = descriptor(value)?.get("name")?.as_str()?;
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

fn mime(value: &Value) -> Option<String> {
    let map = descriptor(value)?;
    map.get("type")
        .or_else(|| map.get("mime"))
        .and_then(Value::as_str)
        .map(str::to_ascii_lowercase)
}

crate::rule! {
    /// Base type: the value is a file descriptor.
    pub FileType => "The :attribute field must be a file.";
    check(value) {
        descriptor(value).is_some_and(|map| map.get("size").is_none_or(Value::is_u64))
    }
}

crate::rule! {
    /// `min:kb`: at least `kb` kilobytes.
    pub Min => "The :attribute field must be at least :min kilobytes.";
    check(value, params, ctx) {
        let min = number_param(ctx, params, 0)?;
        Ok(size_kb(value).is_some_and(|kb| kb >= min))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("min", params[0].clone())] }
}

crate::rule! {
    /// `max:kb`: at most `kb` kilobytes.
    pub Max => "The :attribute field must not be greater than :max kilobytes.";
    check(value, params, ctx) {
        let max = number_param(ctx, params, 0)?;
        Ok(size_kb(value).is_some_and(|kb| kb <= max))
    }
    params(params) { require_numbers(params, 1) }
    placeholders(params, ctx) { vec![("max", params[0].clone())] }
}

crate::rule! {
    /// `mimes:jpg,png`: the file name has one of the extensions.
    pub Mimes => "The :attribute field must be a file of type: :values.";
    check(value, params, ctx) {
        Ok(extension(value).is_some_and(|ext| params.iter().any(|p| p.eq_ignore_ascii_case(&ext))))
    }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}

crate::rule! {
    /// `types:image/*,application/pdf`: the MIME type matches one of the
    /// patterns. `major/*` matches any subtype.
    pub Types => "The :attribute field must be a file of type: :values.";
    check(value, params, ctx) {
        Ok(mime(value).is_some_and(|mime| {
            params.iter().any(|pattern| {
                let pattern = pattern.to_ascii_lowercase();
                match pattern.strip_suffix("/*") {
                    Some(major) => mime.split_once('/').is_some_and(|(m, _)| m == major),
                    None => pattern == mime,
                }
            })
        }))
    }
    params(params) { require_params(params, 1) }
    placeholders(params, ctx) { vec![("values", params.join(", "))] }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::{Schema, Validator};

    fn photo() -> Value {
        json!({ "name": "Photo.JPG", "size": 2048, "type": "image/jpeg" })
    }

    #[rstest]
    #[case(photo(), "file", true)]
    #[case(json!({ "size": 10 }), "file", false)]
    #[case(json!("photo.jpg"), "file", false)]
    #[case(photo(), "file|min:2", true)]
    #[case(photo(), "file|max:1", false)]
    #[case(photo(), "file|mimes:png,jpg", true)]
    #[case(photo(), "file|mimes:pdf", false)]
    #[case(photo(), "file|types:image/*", true)]
    #[case(photo(), "file|types:application/pdf", false)]
    #[case(json!({ "name": "a.pdf", "mime": "application/pdf" }), "file|types:application/pdf", true)]
    fn file_rules(#[case] value: Value, #[case] rules: &str, #[case] valid: bool) {
        let result = Validator::new()
            .validate_blocking(&json!({ "upload": value }), &Schema::new().field("upload", rules))
            .unwrap();
        assert_eq!(result.is_valid, valid, "{rules}");
    }

    #[test]
    fn max_message_in_kilobytes() {
        let result = Validator::new()
            .validate_blocking(
                &json!({ "avatar": photo() }),
                &Schema::new().field("avatar", "required|file|max:1"),
            )
            .unwrap();
        assert_eq!(
            result.errors.messages("avatar"),
            ["The avatar field must not be greater than 1 kilobytes."]
        );
    }
}
