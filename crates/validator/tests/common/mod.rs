//! Shared helpers for integration tests.

#![allow(dead_code)]

use tagrule::{Error, ValidationErrors};

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Unwraps the failures of a validation error, panicking on any other outcome.
pub fn failures(result: Result<(), Error>) -> ValidationErrors {
    match result {
        Err(Error::Validation(errors)) => errors,
        other => panic!("expected validation failures, got {other:?}"),
    }
}

/// `(namespace, tag)` pairs in order.
pub fn summary(errors: &ValidationErrors) -> Vec<(String, String)> {
    errors
        .iter()
        .map(|f| (f.namespace.clone(), f.tag.clone()))
        .collect()
}
