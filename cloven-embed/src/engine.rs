// cloven-embed - Engine implementation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Engine struct - main entry point for embedding Cloven.

use std::path::Path;
use std::sync::mpsc::Receiver;

use cloven_core::Runtime;
use cloven_vm::chan::Chan;
use cloven_vm::error::{Error, Result};
use cloven_vm::func::{invoke, NativeFn};
use cloven_vm::symbol::Symbol;
use cloven_vm::value::ClovenVal;

use crate::convert::{FromClovenVal, IntoClovenVal};

/// The Cloven scripting engine.
///
/// `Engine` wraps a [`Runtime`] with host-value conversion: evaluate
/// code, bind Rust values as Vars, register Rust functions, and forward
/// Rust channels into Cloven channels.
///
/// Values are `Send + Sync`, and `go*` tasks share the engine's
/// namespaces, so an engine may be used from multiple threads; each
/// evaluation still runs its own frames.
///
/// # Example
///
/// ```rust
/// use cloven_embed::Engine;
///
/// let engine = Engine::new().unwrap();
/// let result = engine.run("(+ 1 2 3)").unwrap();
/// assert_eq!(result.to_string(), "6");
/// ```
pub struct Engine {
    runtime: Runtime,
}

impl Engine {
    /// Create an engine with the standard library loaded, in the `user`
    /// namespace.
    pub fn new() -> Result<Self> {
        Ok(Engine {
            runtime: Runtime::new()?,
        })
    }

    /// Create an engine whose current namespace is `namespace`.
    pub fn with_namespace(namespace: &str) -> Result<Self> {
        let engine = Engine::new()?;
        engine.runtime.registry().set_current(namespace);
        Ok(engine)
    }

    /// Create an engine without the standard library. Only the native
    /// built-ins are available.
    #[must_use]
    pub fn new_bare() -> Self {
        Engine {
            runtime: Runtime::bare(),
        }
    }

    /// Read, compile and execute source, returning the last form's
    /// value.
    ///
    /// # Errors
    ///
    /// Returns reader, compile or execution errors with their cause
    /// chains.
    pub fn run(&self, code: &str) -> Result<ClovenVal> {
        self.runtime.run(code)
    }

    /// Evaluate a file of Cloven source.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<ClovenVal> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path).map_err(|e| {
            Error::execution(format!("reading '{}': {}", path.display(), e))
        })?;
        self.runtime.run_source(&code, &path.display().to_string())
    }

    /// Bind a host value as a Var in the current namespace.
    pub fn def(&self, name: &str, value: impl IntoClovenVal) {
        self.runtime.def(name, value.into_cloven_val());
    }

    /// Get a value from the current namespace, or `None` when undefined.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ClovenVal> {
        self.runtime
            .registry()
            .resolve(&Symbol::new(name))
            .map(|var| var.deref())
    }

    /// Get a typed value from the current namespace.
    ///
    /// Returns `None` when the symbol is undefined or the conversion
    /// fails.
    #[must_use]
    pub fn get_as<T: FromClovenVal>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| T::from_cloven_val(&v).ok())
    }

    /// Call a function bound in the current namespace.
    pub fn call(&self, name: &str, args: &[ClovenVal]) -> Result<ClovenVal> {
        let f = self
            .get(name)
            .ok_or_else(|| Error::execution(format!("unable to resolve symbol: {}", name)))?;
        invoke(&f, args)
    }

    /// Register a host function as a native function in the current
    /// namespace.
    pub fn register_native(
        &self,
        name: &str,
        f: impl Fn(&[ClovenVal]) -> Result<ClovenVal> + Send + Sync + 'static,
    ) {
        self.runtime
            .def(name, ClovenVal::NativeFn(NativeFn::new(name, f)));
    }

    /// Bind a host channel as a Cloven channel.
    ///
    /// A forwarding task drains the receiver into the Cloven channel and
    /// closes it when the host side disconnects.
    pub fn def_channel<T>(&self, name: &str, receiver: Receiver<T>)
    where
        T: IntoClovenVal + Send + 'static,
    {
        let chan = Chan::new();
        let forward = chan.clone();
        std::thread::spawn(move || {
            for item in receiver {
                if forward.send(item.into_cloven_val()).is_err() {
                    break;
                }
            }
            forward.close();
        });
        self.runtime.def(name, ClovenVal::Chan(chan));
    }

    /// Enable or disable VM tracing.
    pub fn set_trace(&self, enabled: bool) {
        self.runtime.set_trace(enabled);
    }

    /// The underlying runtime, for advanced use.
    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// The current namespace name.
    #[must_use]
    pub fn current_namespace(&self) -> String {
        self.runtime.registry().current_name()
    }
}
