// cloven-parser - Reader for the Cloven programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # cloven-parser
//!
//! The Cloven reader: turns s-expression source text into `ClovenVal`
//! form trees, one form at a time.
//!
//! # Quick Start
//!
//! ```
//! use cloven_parser::Reader;
//!
//! let mut reader = Reader::new("(+ 1 2)", "example");
//! let form = reader.read().unwrap().unwrap();
//! assert_eq!(form.to_string(), "(+ 1 2)");
//! assert!(reader.read().unwrap().is_none());
//! ```

pub mod reader;
mod syntax_quote;
pub mod tokens;

pub use reader::Reader;
pub use tokens::{Token, TokenKind};
