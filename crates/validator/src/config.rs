//! Engine configuration.

use serde::{Deserialize, Serialize};

/// How many failures one field's rule chain may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Stop a field's chain at its first failing rule or OR-group.
    ///
    /// Traversal still continues with the next field, element or key.
    #[default]
    FirstPerField,
    /// Report every failing rule or OR-group of a field's chain.
    AllPerField,
}

/// Configuration for an [`Engine`](crate::Engine).
///
/// Deserializable so it can be embedded in an application's own config file;
/// missing keys take their default.
///
/// # Examples
///
/// ```rust,ignore
/// use tagrule::{Engine, EngineConfig, FailureMode};
///
/// let engine = Engine::with_config(
///     EngineConfig::default()
///         .with_failure_mode(FailureMode::AllPerField)
///         .with_spec_cache_capacity(0),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of parsed rule strings kept in the cache. `0` disables caching.
    pub spec_cache_capacity: u64,
    /// Per-field failure reporting.
    pub failure_mode: FailureMode,
    /// Whether `required` fails on a struct whose fields are all zero.
    ///
    /// When `false`, only a nil struct fails `required` and zero structs are
    /// recursed into.
    pub zero_struct_fails_required: bool,
    /// Maximum number of aliases an alias may nest, not counting itself.
    ///
    /// `0` allows only aliases that expand to plain rules.
    pub max_alias_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spec_cache_capacity: 1024,
            failure_mode: FailureMode::FirstPerField,
            zero_struct_fails_required: true,
            max_alias_depth: 32,
        }
    }
}

impl EngineConfig {
    /// Sets the parsed-spec cache capacity.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_spec_cache_capacity(mut self, capacity: u64) -> Self {
        self.spec_cache_capacity = capacity;
        self
    }

    /// Sets the per-field failure mode.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Sets whether zero structs fail `required`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_zero_struct_fails_required(mut self, enabled: bool) -> Self {
        self.zero_struct_fails_required = enabled;
        self
    }

    /// Sets the alias nesting limit.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_alias_depth(mut self, depth: usize) -> Self {
        self.max_alias_depth = depth;
        self
    }
}
