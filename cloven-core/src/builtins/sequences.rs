// cloven-core - Sequence built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Sequence operations: first/rest/next/seq, concat, into, reverse,
//! butlast, take, drop, and the lazy sources range, repeat and iterate.
//!
//! `take` and `drop` step lazily, so they work on unbounded repeats and
//! iterates; operations that must realise their input reject unbounded
//! sequences.

use cloven_vm::error::{Error, Result};
use cloven_vm::lazy::{Iterate, Range, Repeat};
use cloven_vm::seq;
use cloven_vm::value::ClovenVal;

use super::require_int;

/// (first coll)
pub(crate) fn builtin_first(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("first", 1, args.len()));
    }
    seq::first(&args[0])
}

/// (rest coll) - empty list when exhausted
pub(crate) fn builtin_rest(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("rest", 1, args.len()));
    }
    seq::rest(&args[0])
}

/// (next coll) - nil when exhausted
pub(crate) fn builtin_next(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("next", 1, args.len()));
    }
    seq::next(&args[0])
}

/// (seq coll) - nil for an empty collection
pub(crate) fn builtin_seq(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("seq", 1, args.len()));
    }
    seq::seq(&args[0])
}

/// (concat & colls) - eager concatenation into a list
pub(crate) fn builtin_concat(args: &[ClovenVal]) -> Result<ClovenVal> {
    let mut items = Vec::new();
    for coll in args {
        items.extend(seq::to_vec(coll)?);
    }
    Ok(ClovenVal::list(items))
}

/// (into to from) - conj every element of from into to
pub(crate) fn builtin_into(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("into", 2, args.len()));
    }
    let mut coll = args[0].clone();
    for item in seq::to_vec(&args[1])? {
        coll = seq::conj(&coll, item)?;
    }
    Ok(coll)
}

/// (reverse coll)
pub(crate) fn builtin_reverse(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("reverse", 1, args.len()));
    }
    let mut items = seq::to_vec(&args[0])?;
    items.reverse();
    Ok(ClovenVal::list(items))
}

/// (butlast coll) - everything but the last element; nil when empty
pub(crate) fn builtin_butlast(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("butlast", 1, args.len()));
    }
    let mut items = seq::to_vec(&args[0])?;
    if items.len() <= 1 {
        return Ok(ClovenVal::Nil);
    }
    items.pop();
    Ok(ClovenVal::list(items))
}

/// (take n coll) - steps the sequence, so unbounded sources work
pub(crate) fn builtin_take(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("take", 2, args.len()));
    }
    let n = require_int(&args[0])?.max(0);
    let mut items = Vec::with_capacity(n as usize);
    let mut cursor = args[1].clone();
    for _ in 0..n {
        match seq::seq(&cursor)? {
            ClovenVal::Nil => break,
            _ => {
                items.push(seq::first(&cursor)?);
                cursor = seq::rest(&cursor)?;
            }
        }
    }
    Ok(ClovenVal::list(items))
}

/// (drop n coll) - returns the advanced sequence without realising it
pub(crate) fn builtin_drop(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("drop", 2, args.len()));
    }
    let n = require_int(&args[0])?.max(0);
    let mut cursor = args[1].clone();
    for _ in 0..n {
        match seq::seq(&cursor)? {
            ClovenVal::Nil => break,
            _ => cursor = seq::rest(&cursor)?,
        }
    }
    Ok(cursor)
}

// ============================================================================
// Lazy sources
// ============================================================================

/// (range end) / (range start end) / (range start end step)
pub(crate) fn builtin_range(args: &[ClovenVal]) -> Result<ClovenVal> {
    let (start, end, step) = match args.len() {
        1 => (0, require_int(&args[0])?, 1),
        2 => (require_int(&args[0])?, require_int(&args[1])?, 1),
        3 => (
            require_int(&args[0])?,
            require_int(&args[1])?,
            require_int(&args[2])?,
        ),
        n => return Err(Error::arity_named("range", 1, n)),
    };
    if step == 0 {
        return Err(Error::execution("range step must not be zero"));
    }
    Ok(ClovenVal::Range(Range::new(start, end, step)))
}

/// (repeat x) - unbounded; (repeat n x) - bounded
pub(crate) fn builtin_repeat(args: &[ClovenVal]) -> Result<ClovenVal> {
    match args.len() {
        1 => Ok(ClovenVal::Repeat(Repeat::unbounded(args[0].clone()))),
        2 => {
            let n = require_int(&args[0])?;
            Ok(ClovenVal::Repeat(Repeat::bounded(n, args[1].clone())))
        }
        n => Err(Error::arity_named("repeat", 1, n)),
    }
}

/// (iterate f x) - x, (f x), (f (f x)), ...
pub(crate) fn builtin_iterate(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("iterate", 2, args.len()));
    }
    Ok(ClovenVal::Iterate(Iterate::new(
        args[0].clone(),
        args[1].clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat() {
        let a = ClovenVal::list(vec![ClovenVal::int(1)]);
        let b = ClovenVal::vector(vec![ClovenVal::int(2), ClovenVal::int(3)]);
        let out = builtin_concat(&[a, b]).unwrap();
        assert_eq!(out.to_string(), "(1 2 3)");
    }

    #[test]
    fn test_take_from_unbounded_repeat() {
        let repeat = builtin_repeat(&[ClovenVal::int(7)]).unwrap();
        let out = builtin_take(&[ClovenVal::int(3), repeat]).unwrap();
        assert_eq!(out.to_string(), "(7 7 7)");
    }

    #[test]
    fn test_drop_stays_lazy_on_range() {
        let range = builtin_range(&[ClovenVal::int(10)]).unwrap();
        let out = builtin_drop(&[ClovenVal::int(8), range]).unwrap();
        assert_eq!(seq::to_vec(&out).unwrap().len(), 2);
    }

    #[test]
    fn test_range_forms() {
        assert_eq!(
            builtin_range(&[ClovenVal::int(3)]).unwrap().to_string(),
            "(0 1 2)"
        );
        assert_eq!(
            builtin_range(&[ClovenVal::int(1), ClovenVal::int(4)])
                .unwrap()
                .to_string(),
            "(1 2 3)"
        );
        assert!(builtin_range(&[
            ClovenVal::int(0),
            ClovenVal::int(4),
            ClovenVal::int(0)
        ])
        .is_err());
    }

    #[test]
    fn test_into_vector_appends() {
        let to = ClovenVal::vector(vec![ClovenVal::int(1)]);
        let from = ClovenVal::list(vec![ClovenVal::int(2), ClovenVal::int(3)]);
        let out = builtin_into(&[to, from]).unwrap();
        assert_eq!(out.to_string(), "[1 2 3]");
    }
}
