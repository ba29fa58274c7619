// cloven-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared helpers for the language-level integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{run_str, new_runtime, run_with};
//! ```
//!
//! `run_str` evaluates source in a fresh runtime with the full standard
//! library; `new_runtime` + `run_with` share one runtime across several
//! evaluations.

#[allow(unused_imports)]
pub use cloven_core::{ClovenVal, Keyword, Runtime, Symbol};

/// Evaluate source in a fresh runtime with the standard library loaded.
///
/// Returns the last form's value, or the printed error.
#[allow(dead_code)]
pub fn run_str(source: &str) -> Result<ClovenVal, String> {
    let runtime = new_runtime();
    run_with(&runtime, source)
}

/// Create a runtime with built-ins and the standard library.
#[allow(dead_code)]
pub fn new_runtime() -> Runtime {
    Runtime::new().expect("standard library failed to load")
}

/// Evaluate source in an existing runtime.
#[allow(dead_code)]
pub fn run_with(runtime: &Runtime, source: &str) -> Result<ClovenVal, String> {
    runtime.run(source).map_err(|e| e.to_string())
}

/// Assert that source evaluates to the expected value.
macro_rules! assert_eval {
    ($source:expr, $expected:expr) => {
        match crate::common::run_str($source) {
            Ok(value) => assert_eq!(value, $expected, "evaluating {:?}", $source),
            Err(e) => panic!("evaluating {:?} failed: {}", $source, e),
        }
    };
}

/// Assert that source fails to evaluate, with the message containing the
/// given fragment.
macro_rules! assert_eval_err {
    ($source:expr, $fragment:expr) => {
        match crate::common::run_str($source) {
            Ok(value) => panic!("expected {:?} to fail, got {:?}", $source, value),
            Err(e) => assert!(
                e.contains($fragment),
                "error for {:?} was {:?}, expected to contain {:?}",
                $source,
                e,
                $fragment
            ),
        }
    };
}

#[allow(unused_imports)]
pub(crate) use assert_eval;
#[allow(unused_imports)]
pub(crate) use assert_eval_err;
