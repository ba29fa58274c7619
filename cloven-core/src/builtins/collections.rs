// cloven-core - Collection built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Collection constructors and operations: list, vector, hash-map,
//! hash-set, conj, cons, assoc, dissoc, get, nth, count and friends.

use im::{OrdMap, OrdSet};

use cloven_vm::error::{Error, Result};
use cloven_vm::seq;
use cloven_vm::value::ClovenVal;

use super::require_int;

/// (list & xs)
pub(crate) fn builtin_list(args: &[ClovenVal]) -> Result<ClovenVal> {
    Ok(ClovenVal::list(args.to_vec()))
}

/// (vector & xs)
pub(crate) fn builtin_vector(args: &[ClovenVal]) -> Result<ClovenVal> {
    Ok(ClovenVal::vector(args.to_vec()))
}

/// (hash-map & kvs)
pub(crate) fn builtin_hash_map(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() % 2 != 0 {
        return Err(Error::execution(
            "hash-map requires an even number of arguments",
        ));
    }
    let mut map = OrdMap::new();
    for pair in args.chunks(2) {
        map.insert(pair[0].clone(), pair[1].clone());
    }
    Ok(ClovenVal::map(map))
}

/// (hash-set & xs)
pub(crate) fn builtin_hash_set(args: &[ClovenVal]) -> Result<ClovenVal> {
    let mut set = OrdSet::new();
    for arg in args {
        set.insert(arg.clone());
    }
    Ok(ClovenVal::set(set))
}

/// (conj coll & xs) - add at the collection's natural insertion point
pub(crate) fn builtin_conj(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.is_empty() {
        return Err(Error::arity_at_least("conj", 1, 0));
    }
    let mut coll = args[0].clone();
    for x in &args[1..] {
        coll = seq::conj(&coll, x.clone())?;
    }
    Ok(coll)
}

/// (cons x coll) - prepend, producing a list
pub(crate) fn builtin_cons(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("cons", 2, args.len()));
    }
    seq::cons(args[0].clone(), &args[1])
}

/// (assoc coll k v & kvs)
pub(crate) fn builtin_assoc(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() < 3 || args.len() % 2 == 0 {
        return Err(Error::execution(
            "assoc requires a collection and an even number of key/value arguments",
        ));
    }
    let mut coll = args[0].clone();
    for pair in args[1..].chunks(2) {
        coll = seq::assoc(&coll, pair[0].clone(), pair[1].clone())?;
    }
    Ok(coll)
}

/// (dissoc coll & ks)
pub(crate) fn builtin_dissoc(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.is_empty() {
        return Err(Error::arity_at_least("dissoc", 1, 0));
    }
    let mut coll = args[0].clone();
    for key in &args[1..] {
        coll = seq::dissoc(&coll, key)?;
    }
    Ok(coll)
}

/// (merge & maps) - combine maps left to right; later keys win, nil
/// arguments are ignored
pub(crate) fn builtin_merge(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.iter().all(|a| matches!(a, ClovenVal::Nil)) {
        return Ok(ClovenVal::Nil);
    }
    let mut merged = OrdMap::new();
    for arg in args {
        match arg {
            ClovenVal::Nil => {}
            ClovenVal::Map(map, _) => {
                for (k, v) in map.iter() {
                    merged.insert(k.clone(), v.clone());
                }
            }
            other => {
                return Err(Error::type_expected(other.type_name(), "is not a", "map"))
            }
        }
    }
    Ok(ClovenVal::map(merged))
}

/// (get coll k) / (get coll k default)
pub(crate) fn builtin_get(args: &[ClovenVal]) -> Result<ClovenVal> {
    match args.len() {
        2 => seq::value_at(&args[0], &args[1]),
        3 => seq::value_at_or(&args[0], &args[1], &args[2]),
        n => Err(Error::arity_named("get", 2, n)),
    }
}

/// (contains? coll k) - key membership (index membership for vectors)
pub(crate) fn builtin_contains_p(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("contains?", 2, args.len()));
    }
    let found = match (&args[0], &args[1]) {
        (ClovenVal::Map(map, _), key) => map.contains_key(key),
        (ClovenVal::Set(set, _), key) => set.contains(key),
        (ClovenVal::Vector(vector, _), ClovenVal::Int(n)) => {
            *n >= 0 && (*n as usize) < vector.len()
        }
        (ClovenVal::Vector(..), _) => false,
        (ClovenVal::Nil, _) => false,
        (other, _) => {
            return Err(Error::type_mismatch(
                other.type_name(),
                "does not support contains?",
            ))
        }
    };
    Ok(ClovenVal::bool(found))
}

/// (count coll)
pub(crate) fn builtin_count(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("count", 1, args.len()));
    }
    Ok(ClovenVal::int(seq::count(&args[0])? as i64))
}

/// (empty coll) - an empty collection of the same kind
pub(crate) fn builtin_empty(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("empty", 1, args.len()));
    }
    seq::empty(&args[0])
}

/// (empty? coll)
pub(crate) fn builtin_empty_p(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("empty?", 1, args.len()));
    }
    Ok(ClovenVal::bool(matches!(
        seq::seq(&args[0])?,
        ClovenVal::Nil
    )))
}

/// (keys m)
pub(crate) fn builtin_keys(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("keys", 1, args.len()));
    }
    match &args[0] {
        ClovenVal::Nil => Ok(ClovenVal::Nil),
        ClovenVal::Map(map, _) => Ok(ClovenVal::list(map.keys().cloned().collect())),
        other => Err(Error::type_expected(other.type_name(), "is not a", "map")),
    }
}

/// (vals m)
pub(crate) fn builtin_vals(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("vals", 1, args.len()));
    }
    match &args[0] {
        ClovenVal::Nil => Ok(ClovenVal::Nil),
        ClovenVal::Map(map, _) => Ok(ClovenVal::list(map.values().cloned().collect())),
        other => Err(Error::type_expected(other.type_name(), "is not a", "map")),
    }
}

/// (nth coll i) / (nth coll i default)
pub(crate) fn builtin_nth(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 && args.len() != 3 {
        return Err(Error::arity_named("nth", 2, args.len()));
    }
    let index = require_int(&args[1])?;
    if index < 0 {
        return match args.get(2) {
            Some(default) => Ok(default.clone()),
            None => Err(Error::execution(format!("negative index {}", index))),
        };
    }
    match seq::nth(&args[0], index as usize) {
        Ok(v) => Ok(v),
        Err(e) => match args.get(2) {
            Some(default) => Ok(default.clone()),
            None => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloven_vm::keyword::Keyword;

    #[test]
    fn test_list_preserves_order() {
        let out = builtin_list(&[ClovenVal::int(1), ClovenVal::int(2)]).unwrap();
        assert_eq!(out.to_string(), "(1 2)");
    }

    #[test]
    fn test_hash_map_odd_args() {
        assert!(builtin_hash_map(&[ClovenVal::int(1)]).is_err());
    }

    #[test]
    fn test_assoc_get_roundtrip() {
        let key = ClovenVal::keyword(Keyword::new("k"));
        let map = builtin_hash_map(&[]).unwrap();
        let map = builtin_assoc(&[map, key.clone(), ClovenVal::int(1)]).unwrap();
        assert_eq!(
            builtin_get(&[map, key]).unwrap(),
            ClovenVal::int(1)
        );
    }

    #[test]
    fn test_get_default() {
        let map = builtin_hash_map(&[]).unwrap();
        let out = builtin_get(&[
            map,
            ClovenVal::keyword(Keyword::new("missing")),
            ClovenVal::int(9),
        ])
        .unwrap();
        assert_eq!(out, ClovenVal::int(9));
    }

    #[test]
    fn test_merge_later_keys_win() {
        let key = ClovenVal::keyword(Keyword::new("k"));
        let a = builtin_hash_map(&[key.clone(), ClovenVal::int(1)]).unwrap();
        let b = builtin_hash_map(&[key.clone(), ClovenVal::int(2)]).unwrap();
        let merged = builtin_merge(&[a, b]).unwrap();
        assert_eq!(builtin_get(&[merged, key]).unwrap(), ClovenVal::int(2));
    }

    #[test]
    fn test_merge_nil_handling() {
        assert_eq!(builtin_merge(&[]).unwrap(), ClovenVal::Nil);
        assert_eq!(
            builtin_merge(&[ClovenVal::Nil, ClovenVal::Nil]).unwrap(),
            ClovenVal::Nil
        );
        let map = builtin_hash_map(&[]).unwrap();
        assert_eq!(
            builtin_merge(&[ClovenVal::Nil, map.clone()]).unwrap(),
            map
        );
        assert!(builtin_merge(&[ClovenVal::int(1)]).is_err());
    }

    #[test]
    fn test_nth_out_of_bounds() {
        let v = ClovenVal::vector(vec![ClovenVal::int(1)]);
        assert!(builtin_nth(&[v.clone(), ClovenVal::int(3)]).is_err());
        assert_eq!(
            builtin_nth(&[v, ClovenVal::int(3), ClovenVal::Nil]).unwrap(),
            ClovenVal::Nil
        );
    }

    #[test]
    fn test_empty_p() {
        assert_eq!(
            builtin_empty_p(&[ClovenVal::empty_list()]).unwrap(),
            ClovenVal::bool(true)
        );
        assert_eq!(
            builtin_empty_p(&[ClovenVal::Nil]).unwrap(),
            ClovenVal::bool(true)
        );
        let v = ClovenVal::vector(vec![ClovenVal::int(1)]);
        assert_eq!(builtin_empty_p(&[v]).unwrap(), ClovenVal::bool(false));
    }
}
