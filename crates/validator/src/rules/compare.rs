//! Size and comparison rules against a literal parameter.

use std::cmp::Ordering;

use crate::context::FieldContext;
use crate::error::RuleConfigError;
use crate::value::Value;

/// Orders the value against the parameter.
///
/// Strings, sequences and maps compare their length, numbers their value.
/// Returns `None` for nil and for NaN, which fail every comparison.
fn order(ctx: &FieldContext<'_>) -> Result<Option<Ordering>, RuleConfigError> {
    let value = ctx.value();
    let ordering = match value {
        Value::Nil => return Ok(None),
        Value::Str(_) | Value::Seq(_) | Value::Map(_) => {
            let len = value.len().unwrap_or_default();
            len.cmp(&ctx.param_as::<usize>()?)
        }
        Value::Int(i) => i.cmp(&ctx.param_as::<i64>()?),
        Value::Uint(u) => u.cmp(&ctx.param_as::<u64>()?),
        Value::Float(f) => match f.partial_cmp(&ctx.param_as::<f64>()?) {
            Some(ordering) => ordering,
            None => return Ok(None),
        },
        other => return Err(RuleConfigError::unsupported_kind(other.kind())),
    };
    Ok(Some(ordering))
}

pub(super) fn len(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    Ok(order(ctx)? == Some(Ordering::Equal))
}

pub(super) fn min(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    Ok(order(ctx)?.is_some_and(Ordering::is_ge))
}

pub(super) fn max(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    Ok(order(ctx)?.is_some_and(Ordering::is_le))
}

pub(super) fn gt(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    Ok(order(ctx)?.is_some_and(Ordering::is_gt))
}

pub(super) fn gte(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    min(ctx)
}

pub(super) fn lt(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    Ok(order(ctx)?.is_some_and(Ordering::is_lt))
}

pub(super) fn lte(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    max(ctx)
}

/// Strings compare by content, collections by length, scalars by value.
pub(super) fn eq(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    match ctx.value() {
        Value::Str(s) => Ok(s == ctx.param()),
        Value::Bool(b) => Ok(*b == ctx.param_as::<bool>()?),
        _ => len(ctx),
    }
}

pub(super) fn ne(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    eq(ctx).map(|equal| !equal)
}

/// Value is one of the space-separated parameter words.
///
/// Words may be wrapped in single quotes to include spaces: `oneof='a b' c`.
pub(super) fn one_of(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    let words = split_words(ctx.param());
    match ctx.value() {
        Value::Nil => Ok(false),
        Value::Str(s) => Ok(words.iter().any(|w| w == s)),
        Value::Int(i) => any_parsed(&words, |w: i64| w == *i),
        Value::Uint(u) => any_parsed(&words, |w: u64| w == *u),
        other => Err(RuleConfigError::unsupported_kind(other.kind())),
    }
}

fn any_parsed<T: std::str::FromStr>(
    words: &[String],
    matches: impl Fn(T) -> bool,
) -> Result<bool, RuleConfigError> {
    for word in words {
        let parsed = word
            .parse::<T>()
            .map_err(|_| RuleConfigError::invalid_param(word, std::any::type_name::<T>()))?;
        if matches(parsed) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Splits on whitespace, keeping single-quoted runs together.
pub(crate) fn split_words(param: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in param.chars() {
        match c {
            '\'' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        words.push(current);
    }
    words
}
