//! Traversal of lowered values and evaluation of rule chains.
//!
//! Fields are visited in declaration order, depth-first. A field whose chain
//! fails is neither dived into nor recursed into. A struct's hook runs after
//! all of its fields, nested ones included.

use tracing::warn;

use crate::config::FailureMode;
use crate::context::{FieldContext, StructLevel, join};
use crate::engine::EngineInner;
use crate::error::{Error, RuleConfigError, ValidationFailure};
use crate::parser::{RuleGroup, RuleSpec};
use crate::value::{StructValue, Value};

/// Where a value sits in the traversal.
#[derive(Debug, Clone, Default)]
pub(crate) struct Location<'a> {
    pub(crate) namespace: String,
    pub(crate) struct_namespace: String,
    pub(crate) field: String,
    pub(crate) struct_field: String,
    pub(crate) parent: Option<&'a StructValue>,
}

impl Location<'_> {
    fn element(&self, suffix: &str) -> Self {
        Self {
            namespace: format!("{}[{suffix}]", self.namespace),
            struct_namespace: format!("{}[{suffix}]", self.struct_namespace),
            field: format!("{}[{suffix}]", self.field),
            struct_field: format!("{}[{suffix}]", self.struct_field),
            parent: self.parent,
        }
    }
}

/// One validation run.
pub(crate) struct Walker<'a> {
    engine: &'a EngineInner,
    top: &'a Value,
    pair: Option<&'a Value>,
    failures: Vec<ValidationFailure>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(engine: &'a EngineInner, top: &'a Value) -> Self {
        Self {
            engine,
            top,
            pair: None,
            failures: Vec::new(),
        }
    }

    /// Sets the second value of a pair run.
    pub(crate) fn with_pair(mut self, pair: &'a Value) -> Self {
        self.pair = Some(pair);
        self
    }

    pub(crate) fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }

    // ========================================================================
    // TRAVERSAL
    // ========================================================================

    /// Walks every field of a struct, then runs its hook.
    pub(crate) fn walk_struct(
        &mut self,
        value: &'a StructValue,
        location: &Location<'a>,
        run_hook: bool,
    ) -> Result<(), Error> {
        for field in value.fields() {
            let child = Location {
                namespace: join(&location.namespace, field.name()),
                struct_namespace: join(&location.struct_namespace, field.struct_name()),
                field: field.name().to_owned(),
                struct_field: field.struct_name().to_owned(),
                parent: Some(value),
            };

            match field.rules() {
                Some(rules) => {
                    let spec = self.engine.spec(rules)?;
                    self.walk_field(field.value(), &spec, &child)?;
                }
                None => {
                    if let Value::Struct(nested) = field.value() {
                        self.walk_struct(nested, &child, true)?;
                    }
                }
            }
        }

        if run_hook {
            self.run_hook(value, location);
        }
        Ok(())
    }

    fn run_hook(&mut self, value: &'a StructValue, location: &Location<'a>) {
        let Some(hook) = value.type_id().and_then(|id| self.engine.struct_hook(id)) else {
            return;
        };
        let mut level = StructLevel::new(
            value,
            self.top,
            &location.namespace,
            &location.struct_namespace,
        );
        hook(&mut level);
        self.failures.extend(level.into_failures());
    }

    /// Checks one value against a spec, then dives or recurses.
    pub(crate) fn walk_field(
        &mut self,
        value: &'a Value,
        spec: &RuleSpec,
        location: &Location<'a>,
    ) -> Result<(), Error> {
        if spec.is_skip() || (spec.omit_empty() && value.is_zero()) {
            return Ok(());
        }
        if !self.evaluate(value, spec, location)? {
            return Ok(());
        }

        if let Some(dive) = spec.dive() {
            return match value {
                Value::Nil => Ok(()),
                Value::Seq(items) => {
                    if dive.keys().is_some() {
                        let source = RuleConfigError::unsupported_kind(value.kind());
                        return Err(misuse("keys", location, source));
                    }
                    for (index, item) in items.iter().enumerate() {
                        let child = location.element(&index.to_string());
                        self.walk_field(item, dive.elements(), &child)?;
                    }
                    Ok(())
                }
                Value::Map(entries) => {
                    for (key, item) in entries {
                        let child = location.element(&key.to_string());
                        if let Some(keys) = dive.keys() {
                            self.walk_field(key, keys, &child)?;
                        }
                        self.walk_field(item, dive.elements(), &child)?;
                    }
                    Ok(())
                }
                other => {
                    let source = RuleConfigError::unsupported_kind(other.kind());
                    Err(misuse("dive", location, source))
                }
            };
        }

        if let Value::Struct(nested) = value
            && !spec.struct_only()
        {
            self.walk_struct(nested, location, !spec.no_struct_level())?;
        }
        Ok(())
    }

    // ========================================================================
    // EVALUATION
    // ========================================================================

    /// Runs the spec's groups; returns `true` if none failed.
    fn evaluate(
        &mut self,
        value: &'a Value,
        spec: &RuleSpec,
        location: &Location<'a>,
    ) -> Result<bool, Error> {
        let mut passed = true;
        for group in spec.groups() {
            if self.check_group(group, value, location)? {
                continue;
            }
            passed = false;
            self.failures.push(ValidationFailure {
                namespace: location.namespace.clone(),
                struct_namespace: location.struct_namespace.clone(),
                field: location.field.clone(),
                struct_field: location.struct_field.clone(),
                tag: group.failure_tag().to_owned(),
                actual_tag: group.failure_actual_tag().to_owned(),
                param: group.failure_param().to_owned(),
                value: value.clone(),
            });
            if self.engine.config().failure_mode == FailureMode::FirstPerField {
                break;
            }
        }
        Ok(passed)
    }

    /// An OR-group passes on its first passing alternative.
    fn check_group(
        &self,
        group: &RuleGroup,
        value: &Value,
        location: &Location<'a>,
    ) -> Result<bool, Error> {
        for invocation in group.alternatives() {
            let ctx = FieldContext {
                value,
                param: invocation.param(),
                field: &location.field,
                struct_field: &location.struct_field,
                parent: location.parent,
                top: self.top,
                pair: self.pair,
                config: self.engine.config(),
            };
            match invocation.rule().check(&ctx) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(source) => {
                    return Err(misuse(invocation.name(), location, source));
                }
            }
        }
        Ok(false)
    }
}

fn misuse(rule: &str, location: &Location<'_>, source: RuleConfigError) -> Error {
    warn!(
        rule,
        namespace = %location.namespace,
        error = %source,
        "validation aborted by misconfigured rule"
    );
    Error::RuleConfiguration {
        rule: rule.to_owned(),
        namespace: location.namespace.clone(),
        source,
    }
}
