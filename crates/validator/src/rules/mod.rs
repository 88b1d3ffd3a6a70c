//! Built-in field rules.
//!
//! # Categories
//!
//! - **Presence**: `required`, `isdefault`
//! - **Size / comparison**: `len`, `min`, `max`, `eq`, `ne`, `gt`, `gte`, `lt`, `lte`, `oneof`
//! - **Cross field**: `eqfield`, `nefield`, `gtfield`, `gtefield`, `ltfield`, `ltefield`
//!   and their `*csfield` forms resolved from the top-level value
//! - **String format**: `email`, `url`, `uuid`, `numeric`, `number`, `alpha`,
//!   `alphanum`, `hexadecimal`, `boolean`, `lowercase`, `uppercase`
//! - **String content**: `contains`, `excludes`, `startswith`, `endswith`
//!
//! Size and comparison rules measure strings in characters, collections in
//! entries and numbers by value. A parameter that cannot be read for the
//! value's kind is a [`RuleConfigError`], never a plain failure.

mod compare;
mod cross_field;
mod format;
mod presence;

use crate::context::FieldContext;
use crate::error::RuleConfigError;

/// A built-in rule predicate.
pub(crate) type BuiltinFn = fn(&FieldContext<'_>) -> Result<bool, RuleConfigError>;

/// Every built-in rule, registered by [`RuleRegistry::with_builtins`](crate::RuleRegistry::with_builtins).
pub(crate) const BUILTINS: &[(&str, BuiltinFn)] = &[
    // presence
    ("required", presence::required),
    ("isdefault", presence::is_default),
    // size / comparison
    ("len", compare::len),
    ("min", compare::min),
    ("max", compare::max),
    ("eq", compare::eq),
    ("ne", compare::ne),
    ("gt", compare::gt),
    ("gte", compare::gte),
    ("lt", compare::lt),
    ("lte", compare::lte),
    ("oneof", compare::one_of),
    // cross field
    ("eqfield", cross_field::eq_field),
    ("nefield", cross_field::ne_field),
    ("gtfield", cross_field::gt_field),
    ("gtefield", cross_field::gte_field),
    ("ltfield", cross_field::lt_field),
    ("ltefield", cross_field::lte_field),
    ("eqcsfield", cross_field::eq_cs_field),
    ("necsfield", cross_field::ne_cs_field),
    ("gtcsfield", cross_field::gt_cs_field),
    ("gtecsfield", cross_field::gte_cs_field),
    ("ltcsfield", cross_field::lt_cs_field),
    ("ltecsfield", cross_field::lte_cs_field),
    // string format
    ("email", format::email),
    ("url", format::url),
    ("uuid", format::uuid),
    ("numeric", format::numeric),
    ("number", format::number),
    ("alpha", format::alpha),
    ("alphanum", format::alphanum),
    ("hexadecimal", format::hexadecimal),
    ("boolean", format::boolean),
    ("lowercase", format::lowercase),
    ("uppercase", format::uppercase),
    // string content
    ("contains", format::contains),
    ("excludes", format::excludes),
    ("startswith", format::starts_with),
    ("endswith", format::ends_with),
];
