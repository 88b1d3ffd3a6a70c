//! Named rules and aliases.
//!
//! The registry maps rule names to predicates and alias names to the rule
//! strings they expand to. Rules and aliases share one namespace, and names
//! are bound once: registering a name twice fails with
//! [`Error::DuplicateRule`], even if the predicate is the same closure.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::FieldContext;
use crate::error::{Error, RuleConfigError};

/// Signature of a field rule predicate.
pub type RuleFn = dyn Fn(&FieldContext<'_>) -> Result<bool, RuleConfigError> + Send + Sync;

/// Words with structural meaning in a rule string.
pub const MARKERS: &[&str] = &[
    "dive",
    "keys",
    "endkeys",
    "omitempty",
    "structonly",
    "nostructlevel",
    "-",
];

/// Returns `true` if `name` is one of the [`MARKERS`].
#[must_use]
pub fn is_marker(name: &str) -> bool {
    MARKERS.contains(&name)
}

// ============================================================================
// RULE
// ============================================================================

/// Where a rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleOrigin {
    /// Registered by [`Engine::new`](crate::Engine::new).
    Builtin,
    /// Registered by the caller.
    Custom,
}

/// A registered field rule.
#[derive(Clone)]
pub struct Rule {
    name: Arc<str>,
    origin: RuleOrigin,
    func: Arc<RuleFn>,
}

impl Rule {
    pub(crate) fn new(name: &str, origin: RuleOrigin, func: Arc<RuleFn>) -> Self {
        Self {
            name: Arc::from(name),
            origin,
            func,
        }
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the rule came from.
    #[must_use]
    pub fn origin(&self) -> RuleOrigin {
        self.origin
    }

    /// Runs the predicate.
    pub fn check(&self, ctx: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
        (self.func)(ctx)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("func", &"<function>")
            .finish()
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Rule and alias tables.
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rules: HashMap<String, Rule>,
    aliases: HashMap<String, String>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in rule.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, func) in crate::rules::BUILTINS {
            registry
                .rules
                .insert((*name).to_owned(), Rule::new(name, RuleOrigin::Builtin, Arc::new(*func)));
        }
        registry
    }

    /// Binds a rule name.
    pub fn register(&mut self, name: &str, func: Arc<RuleFn>) -> Result<(), Error> {
        self.check_available(name)?;
        self.rules
            .insert(name.to_owned(), Rule::new(name, RuleOrigin::Custom, func));
        Ok(())
    }

    /// Binds an alias, rejecting cycles and runaway nesting.
    pub fn register_alias(
        &mut self,
        name: &str,
        expansion: &str,
        max_depth: usize,
    ) -> Result<(), Error> {
        self.check_available(name)?;
        if expansion.trim().is_empty() {
            return Err(Error::InvalidAlias {
                name: name.to_owned(),
                reason: "expansion is empty".into(),
            });
        }

        let mut stack = vec![name.to_owned()];
        self.check_expansion(name, expansion, &mut stack, max_depth)?;
        self.aliases.insert(name.to_owned(), expansion.to_owned());
        Ok(())
    }

    fn check_expansion(
        &self,
        alias: &str,
        expansion: &str,
        stack: &mut Vec<String>,
        max_depth: usize,
    ) -> Result<(), Error> {
        // The alias being registered is not counted.
        if stack.len() - 1 > max_depth {
            return Err(Error::InvalidAlias {
                name: alias.to_owned(),
                reason: format!("expansion nests deeper than {max_depth} aliases"),
            });
        }
        for item in expansion.split([',', '|']) {
            let rule = item.split_once('=').map_or(item, |(name, _)| name);
            if stack.iter().any(|seen| seen == rule) {
                stack.push(rule.to_owned());
                return Err(Error::InvalidAlias {
                    name: alias.to_owned(),
                    reason: format!("alias cycle: {}", stack.join(" -> ")),
                });
            }
            if let Some(nested) = self.aliases.get(rule) {
                stack.push(rule.to_owned());
                self.check_expansion(alias, nested, stack, max_depth)?;
                stack.pop();
            }
        }
        Ok(())
    }

    fn check_available(&self, name: &str) -> Result<(), Error> {
        let malformed = name.is_empty()
            || is_marker(name)
            || name.contains([',', '|', '='])
            || name.chars().any(char::is_whitespace);
        if malformed {
            return Err(Error::InvalidRuleName {
                name: name.to_owned(),
            });
        }
        if self.rules.contains_key(name) || self.aliases.contains_key(name) {
            return Err(Error::DuplicateRule {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Looks up a rule by name.
    pub fn lookup(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Returns the expansion of an alias.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Returns `true` if `name` is bound to a rule or alias.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Sorted names of all rules.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &FieldContext<'_>) -> Result<bool, RuleConfigError> {
        Ok(true)
    }

    #[test]
    fn builtins_are_present() {
        let registry = RuleRegistry::with_builtins();
        for name in ["required", "min", "max", "email", "numeric", "eqfield", "eqcsfield", "gt"] {
            let rule = registry.lookup(name).unwrap();
            assert_eq!(rule.origin(), RuleOrigin::Builtin);
        }
        assert!(registry.lookup("dive").is_none());
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register("username", Arc::new(always)).unwrap();

        assert!(matches!(
            registry.register("username", Arc::new(always)),
            Err(Error::DuplicateRule { .. })
        ));
        assert!(matches!(
            registry.register("required", Arc::new(always)),
            Err(Error::DuplicateRule { .. })
        ));
        assert!(matches!(
            registry.register_alias("username", "required", 8),
            Err(Error::DuplicateRule { .. })
        ));
    }

    #[test]
    fn reserved_names_are_rejected() {
        let mut registry = RuleRegistry::new();
        for name in ["", "dive", "keys", "-", "a,b", "a|b", "a=b", "a b"] {
            assert!(
                matches!(
                    registry.register(name, Arc::new(always)),
                    Err(Error::InvalidRuleName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn alias_cycles_are_rejected() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register_alias("a", "required,b", 8).unwrap();
        let err = registry.register_alias("b", "min=1|a", 8).unwrap_err();
        match err {
            Error::InvalidAlias { name, reason } => {
                assert_eq!(name, "b");
                assert!(reason.contains("b -> a -> b"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(registry.alias("b").is_none());
    }

    #[test]
    fn self_referencing_alias_is_rejected() {
        let mut registry = RuleRegistry::with_builtins();
        assert!(matches!(
            registry.register_alias("loop", "required,loop", 8),
            Err(Error::InvalidAlias { .. })
        ));
    }

    #[test]
    fn alias_depth_is_bounded() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register_alias("a1", "required", 1).unwrap();
        registry.register_alias("a2", "a1", 1).unwrap();
        assert!(matches!(
            registry.register_alias("a3", "a2", 1),
            Err(Error::InvalidAlias { .. })
        ));
    }

    #[test]
    fn zero_depth_allows_only_flat_aliases() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register_alias("varchar", "required,max=255", 0).unwrap();
        assert!(matches!(
            registry.register_alias("name", "varchar", 0),
            Err(Error::InvalidAlias { .. })
        ));
    }

    #[test]
    fn empty_alias_is_rejected() {
        let mut registry = RuleRegistry::with_builtins();
        assert!(matches!(
            registry.register_alias("blank", " ", 8),
            Err(Error::InvalidAlias { .. })
        ));
    }
}
