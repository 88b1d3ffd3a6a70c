//! Contexts handed to rule predicates and struct-level hooks.

use std::str::FromStr;

use crate::config::EngineConfig;
use crate::error::{RuleConfigError, ValidationFailure};
use crate::validatable::Validatable;
use crate::value::{StructValue, Value};

// ============================================================================
// FIELD CONTEXT
// ============================================================================

/// Everything a field rule can see while checking one value.
///
/// # Examples
///
/// ```rust,ignore
/// use tagrule::{Engine, FieldContext, RuleConfigError};
///
/// let engine = Engine::new();
/// engine.register_rule("pin", |ctx: &FieldContext<'_>| {
///     let length: usize = ctx.param_as()?;
///     Ok(ctx.value().as_str().is_some_and(|s| {
///         s.len() == length && s.bytes().all(|b| b.is_ascii_digit())
///     }))
/// })?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub(crate) value: &'a Value,
    pub(crate) param: &'a str,
    pub(crate) field: &'a str,
    pub(crate) struct_field: &'a str,
    pub(crate) parent: Option<&'a StructValue>,
    pub(crate) top: &'a Value,
    pub(crate) pair: Option<&'a Value>,
    pub(crate) config: &'a EngineConfig,
}

impl<'a> FieldContext<'a> {
    /// The value being checked.
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The rule parameter (text after `=`), empty if none.
    #[must_use]
    pub fn param(&self) -> &'a str {
        self.param
    }

    /// Parses the parameter, reporting a configuration error on failure.
    pub fn param_as<T: FromStr>(&self) -> Result<T, RuleConfigError> {
        self.param
            .parse()
            .map_err(|_| RuleConfigError::invalid_param(self.param, std::any::type_name::<T>()))
    }

    /// Display name of the field (with index suffix for elements).
    #[must_use]
    pub fn field_name(&self) -> &'a str {
        self.field
    }

    /// Struct field name of the field (with index suffix for elements).
    #[must_use]
    pub fn struct_field_name(&self) -> &'a str {
        self.struct_field
    }

    /// The struct that declares the field, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&'a StructValue> {
        self.parent
    }

    /// The value the run started from.
    #[must_use]
    pub fn top(&self) -> &'a Value {
        self.top
    }

    /// Resolves a path relative to the declaring struct.
    #[must_use]
    pub fn sibling(&self, path: &str) -> Option<&'a Value> {
        let parent = self.parent?;
        let (head, rest) = split_head(path);
        let value = parent.get(head)?;
        value.lookup(rest)
    }

    /// Resolves the parameter as a sibling path.
    ///
    /// With an empty parameter this is the second value of a pair run.
    #[must_use]
    pub fn param_field(&self) -> Option<&'a Value> {
        if self.param.is_empty() {
            self.pair
        } else {
            self.sibling(self.param)
        }
    }

    /// Resolves a path from the top-level value.
    ///
    /// With an empty path this is the second value of a pair run.
    #[must_use]
    pub fn cross_struct_field(&self, path: &str) -> Option<&'a Value> {
        if path.is_empty() {
            self.pair
        } else {
            self.top.lookup(path)
        }
    }

    /// Engine configuration in effect for this run.
    #[must_use]
    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }
}

fn split_head(path: &str) -> (&str, &str) {
    let end = path.find(['.', '[']).unwrap_or(path.len());
    let (head, rest) = path.split_at(end);
    (head, rest.strip_prefix('.').unwrap_or(rest))
}

// ============================================================================
// STRUCT LEVEL
// ============================================================================

/// Context for a struct-level hook.
///
/// Hooks inspect the whole struct and append failures with
/// [`report_error`](Self::report_error). They run after the struct's field
/// rules, whether or not those passed.
#[derive(Debug)]
pub struct StructLevel<'a> {
    current: &'a StructValue,
    top: &'a Value,
    namespace: &'a str,
    struct_namespace: &'a str,
    failures: Vec<ValidationFailure>,
}

impl<'a> StructLevel<'a> {
    pub(crate) fn new(
        current: &'a StructValue,
        top: &'a Value,
        namespace: &'a str,
        struct_namespace: &'a str,
    ) -> Self {
        Self {
            current,
            top,
            namespace,
            struct_namespace,
            failures: Vec::new(),
        }
    }

    /// The struct being checked.
    #[must_use]
    pub fn current(&self) -> &'a StructValue {
        self.current
    }

    /// The value the run started from.
    #[must_use]
    pub fn top(&self) -> &'a Value {
        self.top
    }

    /// Shorthand for `current().get(name)`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.current.get(name)
    }

    /// Namespace of the struct being checked.
    #[must_use]
    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    /// Appends a failure for `field_name` to the run's result.
    pub fn report_error(
        &mut self,
        value: impl Validatable,
        field_name: &str,
        struct_field_name: &str,
        tag: &str,
        param: &str,
    ) {
        self.failures.push(ValidationFailure {
            namespace: join(self.namespace, field_name),
            struct_namespace: join(self.struct_namespace, struct_field_name),
            field: field_name.to_owned(),
            struct_field: struct_field_name.to_owned(),
            tag: tag.to_owned(),
            actual_tag: tag.to_owned(),
            param: param.to_owned(),
            value: value.to_value(),
        });
    }

    pub(crate) fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }
}

/// Joins a namespace and a child name with `.`.
pub(crate) fn join(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{namespace}.{name}")
    }
}
