// cloven-core - Runtime driver
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The runtime: ties the reader, compiler and VM together.
//!
//! Source is processed one top-level form at a time: read, compile,
//! execute, then move on. Executing before compiling the next form is
//! what makes macros work - a `def` + `set-macro!` takes effect before
//! the following form is compiled.

use std::sync::Arc;

use cloven_parser::Reader;
use cloven_vm::error::Result;
use cloven_vm::frame::Frame;
use cloven_vm::namespace::NamespaceRegistry;
use cloven_vm::value::ClovenVal;
use cloven_vm::{Compiler, ConstPool};

use crate::builtins::register_builtins;

/// Embedded standard library: macros and functions defined in Cloven
/// itself, loaded into `cloven.core` at startup.
const CORE_STDLIB: &str = include_str!("core.clv");

/// A complete Cloven runtime: namespaces, constant pool and trace flag.
///
/// Cheap to clone; clones share the same namespaces and pool.
#[derive(Clone)]
pub struct Runtime {
    registry: NamespaceRegistry,
    pool: ConstPool,
}

impl Runtime {
    /// Create a runtime with built-ins registered and the standard
    /// library loaded. The current namespace starts as `user`.
    pub fn new() -> Result<Self> {
        let runtime = Runtime::bare();
        runtime.load_stdlib()?;
        Ok(runtime)
    }

    /// Create a runtime with built-ins but without the standard library.
    /// Macros like `defn`, `let` and `and` are unavailable until
    /// [`load_stdlib`](Self::load_stdlib) runs.
    #[must_use]
    pub fn bare() -> Self {
        let registry = NamespaceRegistry::new();
        register_builtins(&registry);
        Runtime {
            registry,
            pool: ConstPool::new(),
        }
    }

    /// Evaluate the embedded standard library into `cloven.core`.
    pub fn load_stdlib(&self) -> Result<()> {
        let previous = self.registry.current_name();
        self.registry.set_current(NamespaceRegistry::CORE_NS);
        let result = self.run_source(CORE_STDLIB, "cloven.core");
        self.registry.set_current(&previous);
        result.map(|_| ())
    }

    /// The namespace registry.
    #[must_use]
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// Enable or disable VM tracing for frames started from now on.
    pub fn set_trace(&self, enabled: bool) {
        cloven_vm::frame::set_default_trace(enabled);
    }

    /// Bind a value as a Var in the current namespace.
    pub fn def(&self, name: &str, value: ClovenVal) {
        self.registry.current().def(name, value);
    }

    /// Read, compile and execute source, returning the last form's value.
    pub fn run(&self, source: &str) -> Result<ClovenVal> {
        self.run_source(source, "<run>")
    }

    /// Like [`run`](Self::run), with a source name for error positions.
    pub fn run_source(&self, source: &str, source_name: &str) -> Result<ClovenVal> {
        let mut reader = Reader::new(source, source_name);
        let mut compiler = Compiler::new(self.registry.clone(), self.pool.clone());
        let mut result = ClovenVal::Nil;

        loop {
            // ::keywords resolve against whatever namespace the previous
            // form left current
            reader.set_current_ns(&self.registry.current_name());
            let form = match reader.read()? {
                Some(form) => form,
                None => break,
            };
            if matches!(form, ClovenVal::Void) {
                continue;
            }
            let chunk = compiler.compile(&form)?;
            result = self.execute(chunk)?;
        }
        Ok(result)
    }

    /// Read and evaluate a single expression; `nil` for blank input.
    pub fn eval_expr(&self, source: &str) -> Result<ClovenVal> {
        self.run_source(source, "<expr>")
    }

    fn execute(&self, chunk: Arc<cloven_vm::Chunk>) -> Result<ClovenVal> {
        Frame::new(chunk, Vec::new(), Vec::new()).run()
    }
}
