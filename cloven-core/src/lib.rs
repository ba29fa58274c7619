// cloven-core - Runtime and built-in functions for the Cloven programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # cloven-core
//!
//! The Cloven runtime: native built-in functions, the embedded standard
//! library, and the [`Runtime`] driver that reads, compiles and executes
//! source one top-level form at a time.
//!
//! # Quick Start
//!
//! ```
//! use cloven_core::Runtime;
//!
//! let runtime = Runtime::new().unwrap();
//! let result = runtime.run("(+ (* 2 20) 2)").unwrap();
//! assert_eq!(result.to_string(), "42");
//! ```

pub mod builtins;
pub mod runtime;

pub use builtins::register_builtins;
pub use runtime::Runtime;

// Re-export the core value types for convenience
pub use cloven_vm::{ClovenVal, Error, Keyword, NamespaceRegistry, Result, Symbol};
