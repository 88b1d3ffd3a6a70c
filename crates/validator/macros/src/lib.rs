//! # tagrule-macros
//!
//! `#[derive(Validatable)]` for the `tagrule` validation engine.
//!
//! Re-exported by `tagrule` behind its default `derive` feature; depend on
//! `tagrule` rather than on this crate directly.
//!
//! ## Examples
//!
//! ```ignore
//! use tagrule::Validatable;
//!
//! #[derive(Validatable)]
//! struct Signup {
//!     #[validate("required,email")]
//!     email: String,
//!     #[validate(rules = "required,eqfield=email", name = "ConfirmEmail")]
//!     confirm_email: String,
//!     #[validate(skip)]
//!     session: Option<String>,
//!     address: Address,
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod support;
mod validatable;

/// Derive macro for the `Validatable` trait.
///
/// Lowers a struct with named fields into a `tagrule::Value::Struct`, in
/// declaration order, with each field's rule string attached.
///
/// # Field attributes
///
/// - `#[validate("rules")]` - rule string for the field
/// - `#[validate(rules = "...", name = "...")]` - rule string and the name
///   reported in failure namespaces
/// - `#[validate(skip)]` - the field is not exposed to the engine
///
/// Fields without an attribute are exposed with no rules, so nested structs
/// are still walked. Every exposed field type must implement `Validatable`.
///
/// Structs with lifetime parameters lower to anonymous struct values and
/// never trigger struct-level hooks.
#[proc_macro_derive(Validatable, attributes(validate))]
pub fn derive_validatable(input: TokenStream) -> TokenStream {
    validatable::derive(input)
}
