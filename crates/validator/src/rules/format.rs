//! String format and content rules.
//!
//! Format rules read strings only; `numeric`, `number` and `boolean` also
//! accept values that already have the matching kind.

use std::sync::LazyLock;

use crate::context::FieldContext;
use crate::error::RuleConfigError;
use crate::value::Value;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap()
});

static UUID_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static NUMERIC_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap());

static NUMBER_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[0-9]+$").unwrap());

static HEXADECIMAL_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^(0[xX])?[0-9a-fA-F]+$").unwrap());

/// Applies `check` to a string value; nil fails, other kinds are misuse.
fn string_rule(
    ctx: &FieldContext<'_>,
    check: impl FnOnce(&str) -> bool,
) -> Result<bool, RuleConfigError> {
    match ctx.value() {
        Value::Str(s) => Ok(check(s)),
        Value::Nil => Ok(false),
        other => Err(RuleConfigError::unsupported_kind(other.kind())),
    }
}

// ============================================================================
// FORMAT
// ============================================================================

pub(super) fn email(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| EMAIL_REGEX.is_match(s))
}

/// Absolute URL with a scheme.
pub(super) fn url(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| url::Url::parse(s).is_ok())
}

/// Canonical lowercase hyphenated UUID.
pub(super) fn uuid(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| UUID_REGEX.is_match(s))
}

/// Optionally signed decimal, e.g. `-12.5`. Numeric kinds always pass.
pub(super) fn numeric(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    match ctx.value() {
        Value::Int(_) | Value::Uint(_) | Value::Float(_) => Ok(true),
        _ => string_rule(ctx, |s| NUMERIC_REGEX.is_match(s)),
    }
}

/// Digits only. Numeric kinds always pass.
pub(super) fn number(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    match ctx.value() {
        Value::Int(_) | Value::Uint(_) | Value::Float(_) => Ok(true),
        _ => string_rule(ctx, |s| NUMBER_REGEX.is_match(s)),
    }
}

pub(super) fn alpha(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic()))
}

pub(super) fn alphanum(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric()))
}

pub(super) fn hexadecimal(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| HEXADECIMAL_REGEX.is_match(s))
}

/// `1 t T TRUE true True 0 f F FALSE false False`. Booleans always pass.
pub(super) fn boolean(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    match ctx.value() {
        Value::Bool(_) => Ok(true),
        _ => string_rule(ctx, |s| {
            matches!(
                s,
                "1" | "t" | "T" | "TRUE" | "true" | "True" | "0" | "f" | "F" | "FALSE" | "false" | "False"
            )
        }),
    }
}

pub(super) fn lowercase(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| !s.is_empty() && s.to_lowercase() == s)
}

pub(super) fn uppercase(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| !s.is_empty() && s.to_uppercase() == s)
}

// ============================================================================
// CONTENT
// ============================================================================

pub(super) fn contains(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| s.contains(ctx.param()))
}

pub(super) fn excludes(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    match ctx.value() {
        Value::Nil => Ok(true),
        _ => string_rule(ctx, |s| !s.contains(ctx.param())),
    }
}

pub(super) fn starts_with(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| s.starts_with(ctx.param()))
}

pub(super) fn ends_with(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    string_rule(ctx, |s| s.ends_with(ctx.param()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::BuiltinFn;
    use crate::rules::test_support::check;
    use rstest::rstest;

    fn s(text: &str) -> Value {
        Value::Str(text.into())
    }

    #[rstest]
    #[case(email, "brian@example.com", true)]
    #[case(email, "brian@", false)]
    #[case(email, "", false)]
    #[case(url, "https://example.com/path?q=1", true)]
    #[case(url, "example.com", false)]
    #[case(uuid, "6ba7b810-9dad-11d1-80b4-00c04fd430c8", true)]
    #[case(uuid, "6BA7B810-9DAD-11D1-80B4-00C04FD430C8", false)]
    #[case(numeric, "-12.5", true)]
    #[case(numeric, "12a", false)]
    #[case(number, "0042", true)]
    #[case(number, "-1", false)]
    #[case(alpha, "Brian", true)]
    #[case(alpha, "Br1an", false)]
    #[case(alphanum, "Br1an", true)]
    #[case(alphanum, "Br 1an", false)]
    #[case(hexadecimal, "0xBEEF", true)]
    #[case(hexadecimal, "xyz", false)]
    #[case(boolean, "True", true)]
    #[case(boolean, "yes", false)]
    #[case(lowercase, "abc1", true)]
    #[case(lowercase, "aBc", false)]
    #[case(uppercase, "ABC", true)]
    #[case(uppercase, "", false)]
    fn format_rules(#[case] rule: BuiltinFn, #[case] input: &str, #[case] expected: bool) {
        assert_eq!(check(rule, &s(input), ""), Ok(expected), "input {input:?}");
    }

    #[rstest]
    #[case(contains, "foobar", "oba", true)]
    #[case(contains, "foobar", "baz", false)]
    #[case(excludes, "foobar", "baz", true)]
    #[case(excludes, "foobar", "foo", false)]
    #[case(starts_with, "foobar", "foo", true)]
    #[case(ends_with, "foobar", "foo", false)]
    fn content_rules(
        #[case] rule: BuiltinFn,
        #[case] input: &str,
        #[case] param: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(rule, &s(input), param), Ok(expected));
    }

    #[test]
    fn kinds_other_than_string() {
        assert_eq!(check(numeric, &Value::Int(-3), ""), Ok(true));
        assert_eq!(check(boolean, &Value::Bool(false), ""), Ok(true));
        assert_eq!(check(email, &Value::Nil, ""), Ok(false));
        assert!(check(email, &Value::Int(1), "").is_err());
    }
}
