//! Error types for validation runs and engine misuse.
//!
//! A validation call has three distinct outcomes:
//!
//! - `Ok(())`: the value is valid;
//! - `Err(Error::Validation(_))`: the value is invalid, with every
//!   [`ValidationFailure`] found in traversal order;
//! - any other [`Error`] variant: the engine was misused (bad rule string,
//!   unknown rule, misconfigured rule parameter, ...).

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::value::{Kind, Value};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// ENGINE ERROR
// ============================================================================

/// Every error the engine can return.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The value failed one or more rules.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A rule string is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A rule string references a rule that is not registered.
    #[error("unknown rule `{name}` in `{spec}`")]
    UnknownRule {
        /// Rule name as written.
        name: String,
        /// The rule string being parsed.
        spec: String,
    },

    /// A rule or alias name is already bound.
    #[error("rule `{name}` is already registered")]
    DuplicateRule {
        /// The conflicting name.
        name: String,
    },

    /// An alias could not be registered.
    #[error("invalid alias `{name}`: {reason}")]
    InvalidAlias {
        /// Alias name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The name cannot be used for a rule or alias.
    #[error("`{name}` cannot be used as a rule name")]
    InvalidRuleName {
        /// The rejected name.
        name: String,
    },

    /// A rule could not interpret its own parameter, or was applied to a
    /// value kind it does not support. Aborts the whole run.
    #[error("rule `{rule}` on `{namespace}` is misconfigured: {source}")]
    RuleConfiguration {
        /// Rule name.
        rule: String,
        /// Namespace of the field being checked.
        namespace: String,
        /// The underlying problem.
        #[source]
        source: RuleConfigError,
    },
}

impl Error {
    /// Returns `true` if the value was checked and found invalid.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Returns `true` for setup or configuration mistakes.
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        !self.is_validation()
    }

    /// Borrows the failures if this is a validation error.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Takes the failures if this is a validation error.
    pub fn into_validation_errors(self) -> Result<ValidationErrors, Error> {
        match self {
            Error::Validation(errors) => Ok(errors),
            other => Err(other),
        }
    }
}

// ============================================================================
// PARSE ERROR
// ============================================================================

/// A malformed rule string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rule spec `{spec}` at item {position}: {kind}")]
pub struct ParseError {
    /// The full rule string.
    pub spec: String,
    /// Zero-based index of the offending comma-separated item.
    pub position: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(spec: &str, position: usize, kind: ParseErrorKind) -> Self {
        Self {
            spec: spec.to_owned(),
            position,
            kind,
        }
    }
}

/// The reason a rule string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// An empty item, e.g. `required,,min=3` or a trailing comma.
    #[error("empty rule")]
    EmptyRule,
    /// `name=` with nothing after the `=`.
    #[error("rule `{rule}` has `=` but no parameter")]
    MissingParam {
        /// Rule name.
        rule: String,
    },
    /// A marker used where it has no meaning.
    #[error("`{marker}` is not allowed here")]
    MisplacedMarker {
        /// The marker.
        marker: String,
    },
    /// `keys` not directly after `dive`.
    #[error("`keys` must directly follow `dive`")]
    KeysWithoutDive,
    /// `keys` without a closing `endkeys`.
    #[error("`keys` is missing its closing `endkeys`")]
    UnclosedKeys,
    /// `endkeys` without an opening `keys`.
    #[error("`endkeys` without a matching `keys`")]
    DanglingEndKeys,
    /// `-` combined with other rules.
    #[error("`-` must be the only rule")]
    SkipNotAlone,
    /// An alias expanding to several items used as an OR alternative.
    #[error("alias `{alias}` expands to several rules and cannot be an OR alternative")]
    AliasInOrGroup {
        /// The alias name.
        alias: String,
    },
}

// ============================================================================
// RULE CONFIGURATION ERROR
// ============================================================================

/// Raised by a rule that cannot work with its parameter or input kind.
///
/// Custom rules return this from their closure; the engine wraps it in
/// [`Error::RuleConfiguration`] together with the rule name and field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RuleConfigError {
    message: Cow<'static, str>,
}

impl RuleConfigError {
    /// Creates an error with a custom message.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The parameter could not be read as `expected`.
    pub fn invalid_param(param: &str, expected: &str) -> Self {
        Self::new(format!("parameter `{param}` is not a valid {expected}"))
    }

    /// The rule does not support values of this kind.
    pub fn unsupported_kind(kind: Kind) -> Self {
        Self::new(format!("cannot be applied to a {kind} value"))
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// VALIDATION FAILURE
// ============================================================================

/// One violated rule.
///
/// Namespaces are rooted at the validated struct's type name, e.g.
/// `User.Addresses[0].Country`; `struct_namespace` uses struct field names
/// where `namespace` uses display names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    /// Path of the field, using display names.
    pub namespace: String,
    /// Path of the field, using struct field names.
    pub struct_namespace: String,
    /// Display name of the field (with index suffix for elements).
    pub field: String,
    /// Struct field name of the field (with index suffix for elements).
    pub struct_field: String,
    /// The rule as written in the rule string (the alias name for expanded aliases).
    pub tag: String,
    /// The rule that actually failed.
    pub actual_tag: String,
    /// Rule parameter, empty if none.
    pub param: String,
    /// The offending value.
    pub value: Value,
}

impl ValidationFailure {
    /// Shape of the offending value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    /// Converts the failure to a JSON object.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key: '{}' Error:Field validation for '{}' failed on the '{}' tag",
            self.namespace, self.field, self.tag
        )
    }
}

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// All failures from one validation run, in traversal order.
///
/// Only ever constructed non-empty by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    failures: Vec<ValidationFailure>,
}

impl ValidationErrors {
    pub(crate) fn from_failures(failures: Vec<ValidationFailure>) -> Self {
        Self { failures }
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns `true` if there are no failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// All failures in traversal order.
    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Iterates over the failures.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationFailure> {
        self.failures.iter()
    }

    /// The first failure recorded for a namespace.
    #[must_use]
    pub fn for_namespace(&self, namespace: &str) -> Option<&ValidationFailure> {
        self.failures.iter().find(|f| f.namespace == namespace)
    }

    /// Failures whose field name matches.
    pub fn by_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationFailure> {
        self.failures.iter().filter(move |f| f.field == field)
    }

    /// Namespaces of all failures, in order.
    #[must_use]
    pub fn namespaces(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.namespace.as_str()).collect()
    }

    /// Consumes the collection.
    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationFailure> {
        self.failures
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationFailure;
    type IntoIter = std::slice::Iter<'a, ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationFailure;
    type IntoIter = std::vec::IntoIter<ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
