//! Macros for defining rule handlers with minimal boilerplate.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_rulebook::rule;
//!
//! // Value-only check
//! rule! {
//!     pub Lowercase => "The :attribute field must be lowercase.";
//!     check(value) { value.as_str().is_some_and(|s| s.to_lowercase() == s) }
//! }
//!
//! // Parameters, context and placeholders
//! rule! {
//!     pub StartsWith => "The :attribute field must start with one of: :values.";
//!     check(value, params, ctx) {
//!         Ok(value.as_str().is_some_and(|s| params.iter().any(|p| s.starts_with(p.as_str()))))
//!     }
//!     placeholders(params, ctx) { vec![("values", params.join(", "))] }
//! }
//! ```

// ============================================================================
// RULE MACRO
// ============================================================================

/// Creates a unit rule handler: struct definition plus `RuleHandler` impl.
///
/// `#[derive(Debug, Clone, Copy, Default)]` is always applied. The generated
/// handler is not implicit: the engine never calls it for absent values, and
/// the `check` body only sees a present `&Value`.
///
/// # Variants
///
/// **Value-only check** (body evaluates to `bool`):
/// ```rust,ignore
/// rule! {
///     pub Uppercase => "The :attribute field must be uppercase.";
///     check(value) { value.as_str().is_some_and(|s| s.to_uppercase() == s) }
/// }
/// ```
///
/// **Full check** (body evaluates to `Result<bool, ValidatorError>`), with
/// optional compile-time parameter validation and message placeholders:
/// ```rust,ignore
/// rule! {
///     pub Min => "The :attribute field must be at least :min.";
///     check(value, params, ctx) { Ok(value.as_f64() >= Some(number_param(ctx, params, 0)?)) }
///     params(params) { require_params(params, 1) }
///     placeholders(params, ctx) { vec![("min", params[0].clone())] }
/// }
/// ```
#[macro_export]
macro_rules! rule {
    // ── Variant 1: infallible value-only check ───────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident => $message:literal;
        check($value:ident) $check:block
        $(params($vparams:ident) $validate:block)?
        $(placeholders($pparams:ident, $pctx:ident) $placeholders:block)?
    ) => {
        $crate::rule! {
            $(#[$meta])*
            $vis $name => $message;
            check($value, _params, _ctx) { ::std::result::Result::Ok($check) }
            $(params($vparams) $validate)?
            $(placeholders($pparams, $pctx) $placeholders)?
        }
    };

    // ── Variant 2: fallible check with parameters and context ────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident => $message:literal;
        check($value:ident, $params:ident, $ctx:ident) $check:block
        $(params($vparams:ident) $validate:block)?
        $(placeholders($pparams:ident, $pctx:ident) $placeholders:block)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::RuleHandler for $name {
            #[allow(unused_variables)]
            fn check<'a>(
                &'a self,
                value: ::std::option::Option<&'a $crate::Value>,
                $params: &'a [::std::string::String],
                $ctx: &'a $crate::RuleContext<'a>,
            ) -> ::std::result::Result<$crate::RuleCheck<'a>, $crate::ValidatorError> {
                let ::std::option::Option::Some($value) = value else {
                    return ::std::result::Result::Ok($crate::RuleCheck::pass());
                };
                let passed: ::std::result::Result<bool, $crate::ValidatorError> = $check;
                passed.map($crate::RuleCheck::from)
            }

            fn fallback_message(&self) -> &str {
                $message
            }

            $(
                fn validate_params(
                    &self,
                    $vparams: &[::std::string::String],
                ) -> ::std::result::Result<(), ::std::string::String> $validate
            )?

            $(
                #[allow(unused_variables)]
                fn placeholders(
                    &self,
                    $pparams: &[::std::string::String],
                    $pctx: &$crate::RuleContext<'_>,
                ) -> $crate::Placeholders $placeholders
            )?
        }
    };
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{RuleHandler, RuleRegistry, Schema, ValidatorConfig, Validator};

    crate::rule! {
        /// Accepts strings that read the same backwards.
        Palindrome => "The :attribute field must be a palindrome.";
        check(value) {
            value.as_str().is_some_and(|s| s.chars().eq(s.chars().rev()))
        }
    }

    crate::rule! {
        Prefixed => "The :attribute field must start with :prefix.";
        check(value, params, ctx) {
            Ok(value.as_str().is_some_and(|s| s.starts_with(params[0].as_str())))
        }
        params(params) {
            if params.len() == 1 { Ok(()) } else { Err("expects one prefix".into()) }
        }
        placeholders(params, ctx) { vec![("prefix", params[0].clone())] }
    }

    #[test]
    fn generated_handlers_are_not_implicit() {
        assert!(!Palindrome.implicit());
        assert_eq!(Palindrome.fallback_message(), "The :attribute field must be a palindrome.");
        assert!(Prefixed.validate_params(&[]).is_err());
        assert!(Prefixed.validate_params(&["ab".to_owned()]).is_ok());
    }

    #[test]
    fn generated_handlers_run_in_chains() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register("palindrome", Palindrome);
        registry.register("prefixed", Prefixed);
        let validator = Validator::with_registry(registry).with_config(ValidatorConfig::default());

        let schema = Schema::new()
            .field("word", "palindrome")
            .field("code", "prefixed:NB-");
        let result = validator
            .validate_blocking(&json!({ "word": "level", "code": "XX-1" }), &schema)
            .unwrap();

        assert!(result.errors.get("word").is_none());
        assert_eq!(
            result.errors.messages("code"),
            ["The code field must start with NB-."]
        );
    }
}
