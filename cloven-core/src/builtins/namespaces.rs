// cloven-core - Namespace built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Namespace manipulation: in-ns, refer, alias, all-ns.
//!
//! These close over the runtime's registry handle, so they are
//! registered per-runtime rather than as free functions.

use cloven_vm::error::{Error, Result};
use cloven_vm::namespace::NamespaceRegistry;
use cloven_vm::value::ClovenVal;

fn ns_name(what: &str, v: &ClovenVal) -> Result<String> {
    match v {
        ClovenVal::Symbol(sym, _) => Ok(sym.name().to_string()),
        ClovenVal::String(s) => Ok(s.to_string()),
        other => Err(Error::type_expected(
            other.type_name(),
            format!("is not a namespace name for {}, expected", what),
            "symbol",
        )),
    }
}

/// Register the namespace built-ins against a registry handle.
pub(crate) fn register(registry: &NamespaceRegistry) {
    let core = registry.core();

    // (in-ns 'name) - switch the current namespace, creating it if needed
    let reg = registry.clone();
    core.define_native("in-ns", move |args: &[ClovenVal]| {
        if args.len() != 1 {
            return Err(Error::arity_named("in-ns", 1, args.len()));
        }
        let name = ns_name("in-ns", &args[0])?;
        Ok(ClovenVal::Namespace(reg.set_current(&name)))
    });

    // (refer 'ns) - make all of ns's vars visible unqualified
    let reg = registry.clone();
    core.define_native("refer", move |args: &[ClovenVal]| {
        if args.len() != 1 {
            return Err(Error::arity_named("refer", 1, args.len()));
        }
        let name = ns_name("refer", &args[0])?;
        let ns = reg
            .find(&name)
            .ok_or_else(|| Error::execution(format!("no namespace: {}", name)))?;
        reg.current().refer(&name, ns, true);
        Ok(ClovenVal::Nil)
    });

    // (alias 'short 'ns) - make ns reachable as short/name
    let reg = registry.clone();
    core.define_native("alias", move |args: &[ClovenVal]| {
        if args.len() != 2 {
            return Err(Error::arity_named("alias", 2, args.len()));
        }
        let alias = ns_name("alias", &args[0])?;
        let target = ns_name("alias", &args[1])?;
        let ns = reg
            .find(&target)
            .ok_or_else(|| Error::execution(format!("no namespace: {}", target)))?;
        reg.current().refer(&alias, ns, false);
        Ok(ClovenVal::Nil)
    });

    // (all-ns) - names of every registered namespace
    let reg = registry.clone();
    core.define_native("all-ns", move |args: &[ClovenVal]| {
        if !args.is_empty() {
            return Err(Error::arity_named("all-ns", 0, args.len()));
        }
        let mut names = reg.all_names();
        names.sort();
        Ok(ClovenVal::list(
            names.into_iter().map(ClovenVal::string).collect(),
        ))
    });
}
