//! Presence rules.

use crate::context::FieldContext;
use crate::error::RuleConfigError;
use crate::value::Value;

/// Value is not zero: non-empty string or collection, non-zero number, `true`.
///
/// Structs fail only when nil, or when all their fields are zero and
/// [`EngineConfig::zero_struct_fails_required`](crate::EngineConfig::zero_struct_fails_required)
/// is set.
pub(super) fn required(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    Ok(match ctx.value() {
        Value::Struct(s) => !ctx.config().zero_struct_fails_required || !s.is_zero(),
        other => !other.is_zero(),
    })
}

/// Value is the zero value of its kind.
pub(super) fn is_default(ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
    Ok(ctx.value().is_zero())
}
