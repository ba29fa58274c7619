// cloven-core - Var and metadata built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Vars, macros and metadata: set-macro!, gensym, with-meta, meta.

use std::sync::atomic::{AtomicU64, Ordering};

use cloven_vm::error::{Error, Result};
use cloven_vm::symbol::Symbol;
use cloven_vm::value::ClovenVal;

static GENSYM_COUNTER: AtomicU64 = AtomicU64::new(0);

/// (set-macro! var) - flag the Var's root as a macro; the compiler will
/// run it at compile time from now on
pub(crate) fn builtin_set_macro(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("set-macro!", 1, args.len()));
    }
    match &args[0] {
        ClovenVal::Var(var) => {
            var.set_macro(true);
            Ok(args[0].clone())
        }
        other => Err(Error::type_expected(other.type_name(), "is not a", "var")),
    }
}

/// (gensym) / (gensym prefix) - a fresh uninterned-looking symbol
pub(crate) fn builtin_gensym(args: &[ClovenVal]) -> Result<ClovenVal> {
    let prefix = match args.first() {
        None => "G__".to_string(),
        Some(ClovenVal::String(s)) => s.to_string(),
        Some(ClovenVal::Symbol(sym, _)) => sym.name().to_string(),
        Some(other) => {
            return Err(Error::type_mismatch(
                other.type_name(),
                "is not a gensym prefix",
            ))
        }
    };
    if args.len() > 1 {
        return Err(Error::arity_named("gensym", 1, args.len()));
    }
    let id = GENSYM_COUNTER.fetch_add(1, Ordering::Relaxed);
    Ok(ClovenVal::symbol(Symbol::new(&format!("{}{}", prefix, id))))
}

/// (with-meta v m) - v with metadata m attached
pub(crate) fn builtin_with_meta(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("with-meta", 2, args.len()));
    }
    let meta = match &args[1] {
        ClovenVal::Map(map, _) => map.clone(),
        other => return Err(Error::type_expected(other.type_name(), "is not a", "map")),
    };
    args[0].with_meta(meta)
}

/// (meta v) - the metadata map, or nil
pub(crate) fn builtin_meta(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("meta", 1, args.len()));
    }
    Ok(args[0]
        .meta()
        .map(|m| ClovenVal::Map((*m).clone(), None))
        .unwrap_or(ClovenVal::Nil))
}
