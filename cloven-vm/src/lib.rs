// cloven-vm - Value model, bytecode compiler and virtual machine for the Cloven programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # cloven-vm
//!
//! The heart of the Cloven interpreter: the tagged value model, the bytecode
//! chunk format, the stack-machine frame that executes it, namespaces and
//! Vars, and the single-pass compiler that lowers read forms into bytecode.
//!
//! Everything lives in one crate because the pieces are mutually recursive:
//! compiled functions hold chunks, chunks hold constant pools, constant
//! pools hold values, and values include compiled functions. The compiler
//! sits beside them because macro expansion executes compiled code during
//! compilation.

pub mod atom;
pub mod boxed;
pub mod chan;
pub mod chunk;
pub mod compiler;
pub mod constpool;
pub mod error;
pub mod frame;
pub mod func;
mod intern;
pub mod keyword;
pub mod lazy;
pub mod list;
pub mod namespace;
pub mod opcode;
pub mod seq;
pub mod symbol;
pub mod value;
pub mod var;

pub use atom::ClovenAtom;
pub use boxed::{Boxed, BoxedMethod, MethodTable};
pub use chan::Chan;
pub use chunk::Chunk;
pub use compiler::Compiler;
pub use constpool::ConstPool;
pub use error::{Error, Result};
pub use frame::Frame;
pub use func::{invoke, Closure, CompiledFn, MultiArityFn, NativeFn};
pub use keyword::Keyword;
pub use lazy::{Iterate, Range, Repeat};
pub use list::List;
pub use namespace::{Namespace, NamespaceRegistry};
pub use opcode::Op;
pub use symbol::Symbol;
pub use value::{ClovenRegex, ClovenVal, Meta, ValueKind};
pub use var::ClovenVar;
