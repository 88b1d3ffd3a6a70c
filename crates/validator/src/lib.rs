//! # tagrule
//!
//! A tag-driven validation engine: rule strings attached to struct fields are
//! parsed once, cached, and evaluated against values lowered into a small
//! closed value model.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tagrule::prelude::*;
//!
//! #[derive(Validatable)]
//! struct User {
//!     #[validate("required")]
//!     username: String,
//!     #[validate("required,email")]
//!     email: String,
//!     #[validate("required,dive,required,min=3")]
//!     hobbies: Vec<String>,
//! }
//!
//! let engine = Engine::new();
//! engine.validate_variable("12345", "required,numeric,min=5,max=10")?;
//!
//! if let Err(err) = engine.validate_value(&user) {
//!     for failure in err.validation_errors().into_iter().flatten() {
//!         println!("{failure}");
//!     }
//! }
//! ```
//!
//! ## Rule Strings
//!
//! - `,` separates rules that must all pass, `|` separates alternatives
//! - `name=param` passes a parameter; `0x2C` and `0x7C` escape `,` and `|`
//! - `dive` applies the rest to each element; `dive,keys,...,endkeys,...`
//!   splits map key rules from value rules
//! - `omitempty`, `structonly`, `nostructlevel` and `-` adjust traversal
//!
//! [`Engine::rule_names`] lists the registered rules, built-in ones included.
//!
//! ## Outcomes
//!
//! Every entry point returns `Result<(), Error>`. `Ok(())` means valid,
//! [`Error::Validation`] carries every failure in traversal order, and the
//! remaining variants report misuse (bad rule strings, unknown rules,
//! misconfigured parameters).

// Lets the derive refer to `::tagrule` from inside this crate's own tests.
extern crate self as tagrule;

mod config;
mod context;
mod engine;
mod error;
mod parser;
pub mod prelude;
mod registry;
mod rules;
mod validatable;
mod value;
mod walker;

pub use config::{EngineConfig, FailureMode};
pub use context::{FieldContext, StructLevel};
pub use engine::{Engine, SpecCacheStats, StructLevelFn};
pub use error::{
    Error, ParseError, ParseErrorKind, Result, RuleConfigError, ValidationErrors,
    ValidationFailure,
};
pub use parser::{Dive, RuleGroup, RuleInvocation, RuleSpec};
pub use registry::{MARKERS, Rule, RuleFn, RuleOrigin, RuleRegistry, is_marker};
pub use validatable::Validatable;
pub use value::{FieldValue, Kind, StructValue, Value};

#[cfg(feature = "derive")]
pub use tagrule_macros::Validatable;
