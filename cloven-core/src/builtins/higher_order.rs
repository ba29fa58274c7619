// cloven-core - Higher-order built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Higher-order functions: apply, map, filter, remove, reduce, identity,
//! constantly, comp and partial.
//!
//! These call back into user code through the VM's uniform `invoke`, so
//! they accept anything callable: compiled functions, closures,
//! keywords, maps and sets.

use cloven_vm::error::{Error, Result};
use cloven_vm::func::{invoke, NativeFn};
use cloven_vm::seq;
use cloven_vm::value::ClovenVal;

/// (apply f & args coll) - call f with the leading args followed by the
/// elements of the final collection
pub(crate) fn builtin_apply(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() < 2 {
        return Err(Error::arity_at_least("apply", 2, args.len()));
    }
    let f = &args[0];
    let mut call_args: Vec<ClovenVal> = args[1..args.len() - 1].to_vec();
    call_args.extend(seq::to_vec(&args[args.len() - 1])?);
    invoke(f, &call_args)
}

/// (map f coll & colls) - eager map over one or more collections,
/// stopping at the shortest
pub(crate) fn builtin_map(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() < 2 {
        return Err(Error::arity_at_least("map", 2, args.len()));
    }
    let f = &args[0];
    let colls: Vec<Vec<ClovenVal>> = args[1..]
        .iter()
        .map(seq::to_vec)
        .collect::<Result<Vec<_>>>()?;
    let shortest = colls.iter().map(Vec::len).min().unwrap_or(0);

    let mut out = Vec::with_capacity(shortest);
    for i in 0..shortest {
        let call_args: Vec<ClovenVal> = colls.iter().map(|c| c[i].clone()).collect();
        out.push(invoke(f, &call_args)?);
    }
    Ok(ClovenVal::list(out))
}

/// (filter pred coll) - keep elements where pred is truthy
pub(crate) fn builtin_filter(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("filter", 2, args.len()));
    }
    let mut out = Vec::new();
    for item in seq::to_vec(&args[1])? {
        if invoke(&args[0], &[item.clone()])?.is_truthy() {
            out.push(item);
        }
    }
    Ok(ClovenVal::list(out))
}

/// (remove pred coll) - drop elements where pred is truthy
pub(crate) fn builtin_remove(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("remove", 2, args.len()));
    }
    let mut out = Vec::new();
    for item in seq::to_vec(&args[1])? {
        if !invoke(&args[0], &[item.clone()])?.is_truthy() {
            out.push(item);
        }
    }
    Ok(ClovenVal::list(out))
}

/// (reduce f coll) / (reduce f init coll)
pub(crate) fn builtin_reduce(args: &[ClovenVal]) -> Result<ClovenVal> {
    let (f, init, items) = match args.len() {
        2 => {
            let items = seq::to_vec(&args[1])?;
            match items.split_first() {
                Some((first, rest)) => (&args[0], first.clone(), rest.to_vec()),
                // Reducing an empty collection calls f with no arguments
                None => return invoke(&args[0], &[]),
            }
        }
        3 => (&args[0], args[1].clone(), seq::to_vec(&args[2])?),
        n => return Err(Error::arity_named("reduce", 2, n)),
    };
    let mut acc = init;
    for item in items {
        acc = invoke(f, &[acc, item])?;
    }
    Ok(acc)
}

/// (identity x)
pub(crate) fn builtin_identity(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("identity", 1, args.len()));
    }
    Ok(args[0].clone())
}

/// (constantly x) - a function that ignores its arguments and returns x
pub(crate) fn builtin_constantly(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("constantly", 1, args.len()));
    }
    let value = args[0].clone();
    Ok(ClovenVal::NativeFn(NativeFn::new("constantly", move |_| {
        Ok(value.clone())
    })))
}

/// (comp & fs) - right-to-left composition; (comp) is identity
pub(crate) fn builtin_comp(args: &[ClovenVal]) -> Result<ClovenVal> {
    let fs: Vec<ClovenVal> = args.to_vec();
    Ok(ClovenVal::NativeFn(NativeFn::new("comp", move |call_args| {
        match fs.split_last() {
            None => {
                if call_args.len() != 1 {
                    return Err(Error::arity_named("identity", 1, call_args.len()));
                }
                Ok(call_args[0].clone())
            }
            Some((innermost, outer)) => {
                let mut acc = invoke(innermost, call_args)?;
                for f in outer.iter().rev() {
                    acc = invoke(f, &[acc])?;
                }
                Ok(acc)
            }
        }
    })))
}

/// (partial f & preset) - f with leading arguments preset
pub(crate) fn builtin_partial(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.is_empty() {
        return Err(Error::arity_at_least("partial", 1, 0));
    }
    let f = args[0].clone();
    let preset: Vec<ClovenVal> = args[1..].to_vec();
    Ok(ClovenVal::NativeFn(NativeFn::new(
        "partial",
        move |call_args| {
            let mut full = preset.clone();
            full.extend_from_slice(call_args);
            invoke(&f, &full)
        },
    )))
}
