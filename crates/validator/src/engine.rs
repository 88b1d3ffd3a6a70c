//! The validation engine.
//!
//! An [`Engine`] owns the rule and alias tables, the struct-level hooks and
//! a cache of parsed rule strings. It is cheap to clone and safe to share
//! across threads: validation only takes read locks.
//!
//! Registration takes write locks and clears the spec cache. It is meant for
//! setup time; a rule registered while other threads validate becomes
//! visible to runs that start after the registration returns.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::context::{FieldContext, StructLevel};
use crate::error::{Error, RuleConfigError, ValidationErrors, ValidationFailure};
use crate::parser::{self, RuleSpec};
use crate::registry::RuleRegistry;
use crate::validatable::Validatable;
use crate::value::Value;
use crate::walker::{Location, Walker};

/// Signature of a struct-level hook.
pub type StructLevelFn = dyn Fn(&mut StructLevel<'_>) + Send + Sync;

// ============================================================================
// ENGINE
// ============================================================================

/// Tag-driven validation engine.
///
/// # Examples
///
/// ```rust,ignore
/// use tagrule::{Engine, Validatable};
///
/// #[derive(Validatable)]
/// struct User {
///     #[validate("required")]
///     username: String,
///     #[validate("required,email")]
///     email: String,
/// }
///
/// let engine = Engine::new();
/// engine.validate_variable("12345", "required,numeric,min=5,max=10")?;
///
/// let err = engine
///     .validate_value(&User { username: String::new(), email: "nope".into() })
///     .unwrap_err();
/// let failures = err.validation_errors().unwrap();
/// assert_eq!(failures.namespaces(), ["User.username", "User.email"]);
/// ```
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    registry: RwLock<RuleRegistry>,
    hooks: RwLock<HashMap<TypeId, Arc<StructLevelFn>>>,
    cache: Option<moka::sync::Cache<String, Arc<RuleSpec>>>,
    config: EngineConfig,
}

impl EngineInner {
    fn new(config: EngineConfig) -> Self {
        let cache = (config.spec_cache_capacity > 0).then(|| {
            moka::sync::Cache::builder()
                .max_capacity(config.spec_cache_capacity)
                .build()
        });
        Self {
            registry: RwLock::new(RuleRegistry::with_builtins()),
            hooks: RwLock::new(HashMap::new()),
            cache,
            config,
        }
    }

    pub(crate) fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses a rule string, consulting the cache first.
    pub(crate) fn spec(&self, source: &str) -> Result<Arc<RuleSpec>, Error> {
        if let Some(hit) = self.cache.as_ref().and_then(|cache| cache.get(source)) {
            return Ok(hit);
        }

        let spec = Arc::new(parser::parse(source, &self.registry.read())?);
        trace!(spec = source, groups = spec.groups().len(), "parsed rule spec");
        if let Some(cache) = &self.cache {
            cache.insert(source.to_owned(), Arc::clone(&spec));
        }
        Ok(spec)
    }

    pub(crate) fn struct_hook(&self, type_id: TypeId) -> Option<Arc<StructLevelFn>> {
        self.hooks.read().get(&type_id).cloned()
    }

    fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}

impl Engine {
    /// Creates an engine with every built-in rule registered.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with a custom configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        debug!(?config, "creating validation engine");
        Self {
            inner: Arc::new(EngineInner::new(config)),
        }
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Validates a standalone value against a rule string.
    ///
    /// Failures have an empty namespace; elements reached through `dive`
    /// are named `[0]`, `[1]`, ... or `[key]`.
    pub fn validate_variable<T>(&self, value: &T, rules: &str) -> Result<(), Error>
    where
        T: Validatable + ?Sized,
    {
        let value = value.to_value();
        let spec = self.inner.spec(rules)?;
        let mut walker = Walker::new(&self.inner, &value);
        walker.walk_field(&value, &spec, &Location::default())?;
        finish("variable", walker.into_failures())
    }

    /// Validates `value` against a rule string with `other` as the comparison
    /// target of cross-field rules that have no parameter.
    ///
    /// ```rust,ignore
    /// engine.validate_variable_pair("secret", "secret", "eqfield")?;
    /// ```
    pub fn validate_variable_pair<T, U>(&self, value: &T, other: &U, rules: &str) -> Result<(), Error>
    where
        T: Validatable + ?Sized,
        U: Validatable + ?Sized,
    {
        let value = value.to_value();
        let other = other.to_value();
        let spec = self.inner.spec(rules)?;
        let mut walker = Walker::new(&self.inner, &value).with_pair(&other);
        walker.walk_field(&value, &spec, &Location::default())?;
        finish("variable pair", walker.into_failures())
    }

    /// Validates a struct using the rule strings attached to its fields.
    ///
    /// Sequences and maps are walked element by element; nil and scalar
    /// values have nothing to check and pass.
    pub fn validate_value<T>(&self, value: &T) -> Result<(), Error>
    where
        T: Validatable + ?Sized,
    {
        let value = value.to_value();
        let mut walker = Walker::new(&self.inner, &value);
        match &value {
            Value::Struct(root) => {
                let location = Location {
                    namespace: root.type_name().to_owned(),
                    struct_namespace: root.type_name().to_owned(),
                    ..Location::default()
                };
                walker.walk_struct(root, &location, true)?;
            }
            Value::Seq(_) | Value::Map(_) => {
                let spec = self.inner.spec("dive")?;
                walker.walk_field(&value, &spec, &Location::default())?;
            }
            _ => {}
        }
        finish("value", walker.into_failures())
    }

    /// Parses a rule string, using the cache when enabled.
    pub fn parse_spec(&self, rules: &str) -> Result<Arc<RuleSpec>, Error> {
        self.inner.spec(rules)
    }

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    /// Registers a field rule.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateRule`] if the name is taken, [`Error::InvalidRuleName`]
    /// if it is empty, a marker, or contains `,`, `|`, `=` or whitespace.
    pub fn register_rule<F>(&self, name: &str, rule: F) -> Result<(), Error>
    where
        F: Fn(&FieldContext<'_>) -> Result<bool, RuleConfigError> + Send + Sync + 'static,
    {
        self.inner.registry.write().register(name, Arc::new(rule))?;
        self.inner.clear_cache();
        debug!(rule = name, "registered custom rule");
        Ok(())
    }

    /// Registers an alias expanding to a rule string.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAlias`] on cycles, empty expansions or nesting beyond
    /// [`EngineConfig::max_alias_depth`]; naming errors as for
    /// [`register_rule`](Self::register_rule).
    pub fn register_alias(&self, name: &str, expansion: &str) -> Result<(), Error> {
        self.inner
            .registry
            .write()
            .register_alias(name, expansion, self.inner.config.max_alias_depth)?;
        self.inner.clear_cache();
        debug!(alias = name, expansion, "registered alias");
        Ok(())
    }

    /// Registers a hook run after every field of a `T` value was checked.
    ///
    /// Registering again for the same type replaces the hook.
    pub fn register_struct_validation<T, F>(&self, hook: F)
    where
        T: ?Sized + 'static,
        F: Fn(&mut StructLevel<'_>) + Send + Sync + 'static,
    {
        let replaced = self
            .inner
            .hooks
            .write()
            .insert(TypeId::of::<T>(), Arc::new(hook))
            .is_some();
        debug!(type_name = std::any::type_name::<T>(), replaced, "registered struct-level hook");
    }

    // ========================================================================
    // INTROSPECTION
    // ========================================================================

    /// Returns `true` if `name` is a rule or alias.
    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.inner.registry.read().contains(name)
    }

    /// Sorted names of all rules, built-in and custom.
    #[must_use]
    pub fn rule_names(&self) -> Vec<String> {
        self.inner
            .registry
            .read()
            .rule_names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Spec cache statistics; `None` when caching is disabled.
    #[must_use]
    pub fn spec_cache_stats(&self) -> Option<SpecCacheStats> {
        let cache = self.inner.cache.as_ref()?;
        cache.run_pending_tasks();
        Some(SpecCacheStats {
            entries: cache.entry_count(),
            capacity: cache.policy().max_capacity().unwrap_or(0),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.registry.read();
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("rules", &registry.rule_names().len())
            .field("struct_hooks", &self.inner.hooks.read().len())
            .finish_non_exhaustive()
    }
}

fn finish(entry: &str, failures: Vec<ValidationFailure>) -> Result<(), Error> {
    trace!(entry, failures = failures.len(), "validation finished");
    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(ValidationErrors::from_failures(failures)))
    }
}

/// Statistics about the parsed-spec cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCacheStats {
    /// Parsed specs currently cached.
    pub entries: u64,
    /// Maximum number of cached specs.
    pub capacity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn specs_are_cached() {
        let engine = Engine::new();
        let first = engine.parse_spec("required,min=3").unwrap();
        let second = engine.parse_spec("required,min=3").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.spec_cache_stats().unwrap().entries, 1);
    }

    #[test]
    fn registration_clears_cache() {
        let engine = Engine::new();
        let before = engine.parse_spec("required").unwrap();
        engine.register_alias("name", "required,max=10").unwrap();
        let after = engine.parse_spec("required").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn cache_can_be_disabled() {
        let engine = Engine::with_config(EngineConfig::default().with_spec_cache_capacity(0));
        let first = engine.parse_spec("required").unwrap();
        let second = engine.parse_spec("required").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(engine.spec_cache_stats().is_none());
    }

    #[test]
    fn clones_share_state() {
        let engine = Engine::new();
        let clone = engine.clone();
        clone.register_rule("always", |_: &FieldContext<'_>| Ok(true)).unwrap();
        assert!(engine.has_rule("always"));
        assert!(engine.rule_names().iter().any(|name| name == "always"));
    }

    #[test]
    fn unknown_rule_is_misuse() {
        let err = Engine::new().validate_variable("x", "required,bogus").unwrap_err();
        assert!(err.is_misuse());
        assert!(matches!(err, Error::UnknownRule { ref name, .. } if name == "bogus"));
    }
}
