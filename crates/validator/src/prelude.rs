//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use tagrule::prelude::*;
//!
//! let engine = Engine::new();
//! engine.register_rule("pin", |ctx: &FieldContext<'_>| {
//!     let digits: usize = ctx.param_as()?;
//!     Ok(ctx.value().as_str().is_some_and(|s| s.len() == digits))
//! })?;
//! ```

pub use crate::{
    Engine, EngineConfig, Error, FailureMode, FieldContext, FieldValue, RuleConfigError,
    StructLevel, StructValue, Validatable, ValidationErrors, ValidationFailure, Value,
};
