//! Rules comparing a field with another field.
//!
//! `*field` rules resolve the parameter relative to the declaring struct,
//! `*csfield` rules resolve it from the top-level value. With an empty
//! parameter both compare against the second value of a pair run.
//!
//! A missing target, or one of a different kind, fails every comparison
//! except the negated forms. Numeric kinds compare with each other by value.

use std::cmp::Ordering;

use crate::context::FieldContext;
use crate::error::RuleConfigError;
use crate::value::Value;

fn same_kind(a: &Value, b: &Value) -> bool {
    a.kind() == b.kind() || (a.as_f64().is_some() && b.as_f64().is_some())
}

fn equal(current: &Value, target: Option<&Value>) -> bool {
    let Some(target) = target else {
        return false;
    };
    if current.is_nil() || !same_kind(current, target) {
        return false;
    }
    match (current, target) {
        (Value::Seq(_) | Value::Map(_), _) => current.len() == target.len(),
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Uint(a), Value::Uint(b)) => a == b,
        _ => match (current.as_f64(), target.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => current == target,
        },
    }
}

fn order(current: &Value, target: Option<&Value>) -> Result<Option<Ordering>, RuleConfigError> {
    let Some(target) = target else {
        return Ok(None);
    };
    if current.is_nil() || !same_kind(current, target) {
        return Ok(None);
    }
    let ordering = match (current, target) {
        (Value::Str(_) | Value::Seq(_) | Value::Map(_), _) => Some(current.len().cmp(&target.len())),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Uint(a), Value::Uint(b)) => Some(a.cmp(b)),
        _ => match (current.as_f64(), target.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => return Err(RuleConfigError::unsupported_kind(current.kind())),
        },
    };
    Ok(ordering)
}

fn field_target<'a>(ctx: &FieldContext<'a>) -> Option<&'a Value> {
    ctx.param_field()
}

fn cs_target<'a>(ctx: &FieldContext<'a>) -> Option<&'a Value> {
    ctx.cross_struct_field(ctx.param())
}

macro_rules! cross_rules {
    ($($name:ident => $target:ident, $check:expr;)+) => {
        $(
            pub(super) fn $name(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
                let check: fn(&Value, Option<&Value>) -> Result<bool, RuleConfigError> = $check;
                check(ctx.value(), $target(ctx))
            }
        )+
    };
}

cross_rules! {
    eq_field => field_target, |c, t| Ok(equal(c, t));
    ne_field => field_target, |c, t| Ok(!equal(c, t));
    gt_field => field_target, |c, t| Ok(order(c, t)?.is_some_and(Ordering::is_gt));
    gte_field => field_target, |c, t| Ok(order(c, t)?.is_some_and(Ordering::is_ge));
    lt_field => field_target, |c, t| Ok(order(c, t)?.is_some_and(Ordering::is_lt));
    lte_field => field_target, |c, t| Ok(order(c, t)?.is_some_and(Ordering::is_le));
    eq_cs_field => cs_target, |c, t| Ok(equal(c, t));
    ne_cs_field => cs_target, |c, t| Ok(!equal(c, t));
    gt_cs_field => cs_target, |c, t| Ok(order(c, t)?.is_some_and(Ordering::is_gt));
    gte_cs_field => cs_target, |c, t| Ok(order(c, t)?.is_some_and(Ordering::is_ge));
    lt_cs_field => cs_target, |c, t| Ok(order(c, t)?.is_some_and(Ordering::is_lt));
    lte_cs_field => cs_target, |c, t| Ok(order(c, t)?.is_some_and(Ordering::is_le));
}
