// cloven-core - Atom built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Atom operations: atom, deref, swap!, reset!.
//!
//! `swap!` runs its update function while holding the atom's guard; the
//! function must not touch the same atom again.

use cloven_vm::atom::ClovenAtom;
use cloven_vm::error::{Error, Result};
use cloven_vm::value::ClovenVal;

/// (atom x)
pub(crate) fn builtin_atom(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("atom", 1, args.len()));
    }
    Ok(ClovenVal::Atom(ClovenAtom::new(args[0].clone())))
}

/// (deref ref) - read an atom or var; `@x` reads as `(deref x)`
pub(crate) fn builtin_deref(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("deref", 1, args.len()));
    }
    match &args[0] {
        ClovenVal::Atom(atom) => Ok(atom.deref()),
        ClovenVal::Var(var) => Ok(var.deref()),
        other => Err(Error::type_mismatch(
            other.type_name(),
            "cannot be dereferenced",
        )),
    }
}

/// (swap! atom f & args) - atomically set the value to (f current & args)
pub(crate) fn builtin_swap(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() < 2 {
        return Err(Error::arity_at_least("swap!", 2, args.len()));
    }
    match &args[0] {
        ClovenVal::Atom(atom) => atom.swap(&args[1], &args[2..]),
        other => Err(Error::type_expected(other.type_name(), "is not an", "atom")),
    }
}

/// (reset! atom v) - set the value, returning it
pub(crate) fn builtin_reset(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("reset!", 2, args.len()));
    }
    match &args[0] {
        ClovenVal::Atom(atom) => Ok(atom.reset(args[1].clone())),
        other => Err(Error::type_expected(other.type_name(), "is not an", "atom")),
    }
}
