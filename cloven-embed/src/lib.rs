// cloven-embed - Embedding API for the Cloven programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # cloven-embed
//!
//! Embed the Cloven interpreter in a Rust program: evaluate code, bind
//! host values as Vars, expose host functions as native functions,
//! forward host channels into Cloven channels, and register method
//! tables for opaque host types.
//!
//! # Quick Start
//!
//! ```
//! use cloven_embed::Engine;
//!
//! let engine = Engine::new().unwrap();
//! engine.def("answer", 42i64);
//! let result = engine.run("(+ answer 0)").unwrap();
//! assert_eq!(result.to_string(), "42");
//! ```

pub mod convert;
pub mod engine;

pub use convert::{BoxedType, FromClovenVal, IntoClovenVal};
pub use engine::Engine;

// Re-export the value type embedders work with
pub use cloven_vm::{ClovenVal, Error, Result};
